//! Round state machine.
//!
//! Drives two participants through Commit → (optional) Message → Reveal
//! and computes the round result. Phases run strictly in order, and
//! within a phase participants are processed A then B, so audit events
//! and any partial failure are reproducible. Every blocking interaction
//! is bounded by the phase deadline.

mod participant;
mod source;
mod timer;

pub use participant::Participant;
pub use source::ChoiceSource;

use crate::audit::{AuditLevel, AuditSink};
use crate::crypto::{self, IntegrityError};
use crate::protocol::{Phase, RoundId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use timer::PhaseTimer;
use tracing::debug;

/// Per-phase deadline applied when the engine is not configured
/// otherwise.
pub const DEFAULT_PHASE_BUDGET: Duration = Duration::from_secs(30);

/// Protocol-level error that abandons the enclosing round.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("timeout during {0} phase")]
    PhaseTimeout(Phase),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// Await `fut` under a fresh phase deadline.
///
/// On completion the timer is cancelled before the value is handed back,
/// so no observable side effect can happen under an armed timer. When
/// the deadline wins, `fut` is dropped — late input is discarded rather
/// than merged into round state — and the abort is audited once.
async fn with_deadline<T>(
    phase: Phase,
    budget: Duration,
    audit: &dyn AuditSink,
    fut: impl Future<Output = T>,
) -> Result<T, RoundError> {
    let mut timer = PhaseTimer::arm(phase, budget);
    match tokio::time::timeout_at(timer.deadline(), fut).await {
        Ok(value) => {
            timer.cancel();
            Ok(value)
        }
        Err(_elapsed) => {
            if timer.fire() {
                audit.record(
                    AuditLevel::Warning,
                    &format!("timeout during {phase} phase, round abandoned"),
                );
            }
            Err(RoundError::PhaseTimeout(timer.phase()))
        }
    }
}

/// State machine for one round between two participants.
///
/// A context never outlives a single engine `play_round` call and owns
/// its two participants exclusively.
pub struct RoundContext {
    id: RoundId,
    phase: Phase,
    budget: Duration,
    audit: Arc<dyn AuditSink>,
    pub(crate) a: Participant,
    pub(crate) b: Participant,
}

impl RoundContext {
    pub fn new(
        a: Participant,
        b: Participant,
        budget: Duration,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            id: RoundId::new(),
            phase: Phase::Commit,
            budget,
            audit,
            a,
            b,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Both parties' revealed messages, A then B.
    pub fn messages(&self) -> (Option<String>, Option<String>) {
        (
            self.a.message().map(str::to_string),
            self.b.message().map(str::to_string),
        )
    }

    /// Drive the round through all phases in order and compute the
    /// result. Returns the AND of the two revealed bits, or the error
    /// that abandoned the round.
    pub async fn run<S>(&mut self, source: &mut S, require_message: bool) -> Result<bool, RoundError>
    where
        S: ChoiceSource + ?Sized,
    {
        let result = self.drive(source, require_message).await;
        self.phase = match result {
            Ok(_) => Phase::Resolved,
            Err(_) => Phase::Aborted,
        };
        result
    }

    async fn drive<S>(&mut self, source: &mut S, require_message: bool) -> Result<bool, RoundError>
    where
        S: ChoiceSource + ?Sized,
    {
        self.commit_phase(source).await?;
        if require_message {
            self.phase = Phase::Message;
            self.message_phase(source).await?;
        }
        self.phase = Phase::Reveal;
        self.reveal_phase().await?;
        Ok(self.resolve())
    }

    /// Collect each participant's bit under the phase deadline, A then
    /// B. An out-of-range bit is audited and asked again; the timed-out
    /// participant retains no partial commitment.
    async fn commit_phase<S>(&mut self, source: &mut S) -> Result<(), RoundError>
    where
        S: ChoiceSource + ?Sized,
    {
        let budget = self.budget;
        let audit = Arc::clone(&self.audit);
        for participant in [&mut self.a, &mut self.b] {
            let name = participant.name().to_string();
            with_deadline(Phase::Commit, budget, audit.as_ref(), async {
                loop {
                    let bit = source.choose_bit(&name).await;
                    match participant.commit_choice(bit, audit.as_ref()) {
                        Ok(()) => break,
                        Err(err) => {
                            audit.record(
                                AuditLevel::Warning,
                                &format!("{name} offered an invalid choice ({err}), asking again"),
                            );
                        }
                    }
                }
            })
            .await?;
            debug!(party = %name, "bit committed");
        }
        Ok(())
    }

    /// Optionally collect a message commitment from each participant.
    /// A skipped message is not a failure, now or at reveal.
    async fn message_phase<S>(&mut self, source: &mut S) -> Result<(), RoundError>
    where
        S: ChoiceSource + ?Sized,
    {
        let budget = self.budget;
        let audit = Arc::clone(&self.audit);
        for participant in [&mut self.a, &mut self.b] {
            let name = participant.name().to_string();
            with_deadline(Phase::Message, budget, audit.as_ref(), async {
                if let Some(text) = source.compose_message(&name).await {
                    if !text.is_empty() {
                        participant.commit_text(&text, audit.as_ref());
                        debug!(party = %name, "message committed");
                    }
                }
            })
            .await?;
        }
        Ok(())
    }

    /// Verify both reveals, A then B. The first failure aborts without
    /// examining the other participant or any message.
    async fn reveal_phase(&mut self) -> Result<(), RoundError> {
        let budget = self.budget;
        let audit = Arc::clone(&self.audit);
        for participant in [&self.a, &self.b] {
            let name = participant.name();
            with_deadline(Phase::Reveal, budget, audit.as_ref(), async {
                let commitment = participant
                    .bit_commitment()
                    .ok_or(IntegrityError::NothingCommitted)?;
                let (bit, salt_hex) = participant
                    .reveal_choice()
                    .ok_or(IntegrityError::NothingCommitted)?;
                crypto::verify_bit(commitment, bit, &salt_hex, audit.as_ref())?;

                if let Some(commitment) = participant.message_commitment() {
                    let (text, salt_hex) = participant
                        .reveal_text()
                        .ok_or(IntegrityError::NothingCommitted)?;
                    crypto::verify_message(commitment, &text, &salt_hex, audit.as_ref())?;
                }
                Ok::<(), IntegrityError>(())
            })
            .await??;
            debug!(party = %name, "reveal verified");
        }
        Ok(())
    }

    /// AND of the two revealed bits. Defined only after both reveals
    /// verified.
    fn resolve(&self) -> bool {
        matches!(
            (self.a.chosen_bit, self.b.chosen_bit),
            (Some(1), Some(1))
        )
    }
}
