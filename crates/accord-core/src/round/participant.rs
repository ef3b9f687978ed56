//! Per-party commitment state for one round.

use crate::audit::AuditSink;
use crate::crypto::{self, CommitError, Commitment, Salt};

/// One party's state within a single round.
///
/// Created fresh at the start of every round; the state machine owns it
/// and never carries it across rounds. Mutated only by its own commit
/// operations, read-only during reveal.
pub struct Participant {
    name: String,
    pub(crate) chosen_bit: Option<u8>,
    pub(crate) bit_commitment: Option<Commitment>,
    pub(crate) bit_salt: Option<Salt>,
    pub(crate) chosen_message: Option<String>,
    pub(crate) message_commitment: Option<Commitment>,
    pub(crate) message_salt: Option<Salt>,
}

impl Participant {
    /// Fresh participant with no committed state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chosen_bit: None,
            bit_commitment: None,
            bit_salt: None,
            chosen_message: None,
            message_commitment: None,
            message_salt: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commit the yes/no choice. Digest, salt, and bit are stored
    /// together or not at all; a rejected bit leaves no partial state.
    ///
    /// The round state machine calls this at most once per round.
    pub fn commit_choice(&mut self, bit: u8, audit: &dyn AuditSink) -> Result<(), CommitError> {
        let (commitment, salt) = crypto::commit_bit(bit, audit)?;
        self.chosen_bit = Some(bit);
        self.bit_commitment = Some(commitment);
        self.bit_salt = Some(salt);
        Ok(())
    }

    /// Optionally commit a text message. Independent of the bit
    /// commitment, same one-shot contract.
    pub fn commit_text(&mut self, message: &str, audit: &dyn AuditSink) {
        let (commitment, salt) = crypto::commit_message(message, audit);
        self.chosen_message = Some(message.to_string());
        self.message_commitment = Some(commitment);
        self.message_salt = Some(salt);
    }

    /// The bit and hex salt to present at reveal. Pure accessor.
    pub fn reveal_choice(&self) -> Option<(u8, String)> {
        let bit = self.chosen_bit?;
        let salt = self.bit_salt.as_ref()?;
        Some((bit, salt.to_hex()))
    }

    /// The message and hex salt to present at reveal. Pure accessor.
    pub fn reveal_text(&self) -> Option<(String, String)> {
        let message = self.chosen_message.clone()?;
        let salt = self.message_salt.as_ref()?;
        Some((message, salt.to_hex()))
    }

    pub fn bit_commitment(&self) -> Option<&Commitment> {
        self.bit_commitment.as_ref()
    }

    pub fn message_commitment(&self) -> Option<&Commitment> {
        self.message_commitment.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.chosen_message.as_deref()
    }

    pub fn has_committed_bit(&self) -> bool {
        self.bit_commitment.is_some()
    }
}
