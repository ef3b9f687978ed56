//! Session engine.
//!
//! Owns the two long-lived identities and the audit sink, and runs one
//! round at a time. Protocol failures become normal (negative) outcomes
//! here; nothing protocol-level escapes to the caller as an error.

use crate::audit::AuditSink;
use crate::protocol::{AbortReason, RoundOutcome};
use crate::round::{ChoiceSource, Participant, RoundContext, RoundError, DEFAULT_PHASE_BUDGET};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// High-level interface for playing commit-reveal rounds.
pub struct Engine {
    name_a: String,
    name_b: String,
    phase_budget: Duration,
    audit: Arc<dyn AuditSink>,
}

impl Engine {
    pub fn new(
        name_a: impl Into<String>,
        name_b: impl Into<String>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            name_a: name_a.into(),
            name_b: name_b.into(),
            phase_budget: DEFAULT_PHASE_BUDGET,
            audit,
        }
    }

    /// Override the per-phase deadline.
    pub fn with_phase_budget(mut self, budget: Duration) -> Self {
        self.phase_budget = budget;
        self
    }

    pub fn names(&self) -> (&str, &str) {
        (&self.name_a, &self.name_b)
    }

    /// Fresh participants from the identity strings alone. A stale
    /// salt/digest pair from a prior round must never be revealed
    /// against a new round's commitments.
    fn fresh_round(&self) -> RoundContext {
        RoundContext::new(
            Participant::new(&self.name_a),
            Participant::new(&self.name_b),
            self.phase_budget,
            Arc::clone(&self.audit),
        )
    }

    /// Execute one full commit-reveal round.
    pub async fn play_round<S>(&self, source: &mut S, require_message: bool) -> RoundOutcome
    where
        S: ChoiceSource + ?Sized,
    {
        let mut round = self.fresh_round();
        info!(round = %round.id(), require_message, "starting round");

        match round.run(source, require_message).await {
            Ok(matched) => {
                let (message_a, message_b) = round.messages();
                debug!(round = %round.id(), matched, "round resolved");
                RoundOutcome::Completed {
                    matched,
                    message_a,
                    message_b,
                }
            }
            Err(RoundError::PhaseTimeout(phase)) => {
                info!(round = %round.id(), %phase, "round abandoned on timeout");
                RoundOutcome::Aborted {
                    reason: AbortReason::Timeout(phase),
                }
            }
            Err(RoundError::Integrity(err)) => {
                info!(round = %round.id(), %err, "round aborted on integrity failure");
                RoundOutcome::Aborted {
                    reason: AbortReason::Integrity,
                }
            }
        }
    }
}
