//! Where choices come from.

use async_trait::async_trait;

/// Supplier of participant input for a round.
///
/// The round state machine awaits these under a phase deadline; when the
/// deadline fires first the pending future is dropped and whatever it
/// would have produced is discarded, never merged into round state.
#[async_trait]
pub trait ChoiceSource: Send {
    /// Ask the named party for their yes/no choice as a bit. A value
    /// outside {0, 1} is rejected by the round and the party is asked
    /// again.
    async fn choose_bit(&mut self, party: &str) -> u8;

    /// Ask the named party for an optional short message. `None` or an
    /// empty string skips the message commitment for that party.
    async fn compose_message(&mut self, party: &str) -> Option<String>;
}
