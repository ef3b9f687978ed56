//! Round identifiers, seats, phases, and outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique round identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(Uuid);

impl RoundId {
    /// Create a new random round ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RoundId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoundId({})", self.0)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seat of a participant within a round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    /// Get the counterpart seat
    pub fn opponent(&self) -> Seat {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::A => write!(f, "A"),
            Seat::B => write!(f, "B"),
        }
    }
}

/// Phase of a round. Transitions are strictly forward; no phase is
/// revisited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Commit,
    Message,
    Reveal,
    Resolved,
    Aborted,
}

impl Phase {
    /// Short name used in audit lines and timeout errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Commit => "commit",
            Phase::Message => "message",
            Phase::Reveal => "reveal",
            Phase::Resolved => "resolved",
            Phase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a round was abandoned before producing a result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// A reveal did not match its commitment
    Integrity,
    /// A phase exceeded its deadline
    Timeout(Phase),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Integrity => write!(f, "integrity failure"),
            AbortReason::Timeout(phase) => write!(f, "timeout during {phase} phase"),
        }
    }
}

/// Outcome of one round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Both reveals verified; `matched` is the AND of the two bits
    Completed {
        matched: bool,
        message_a: Option<String>,
        message_b: Option<String>,
    },
    /// The round was abandoned; no result is defined
    Aborted { reason: AbortReason },
}

impl RoundOutcome {
    /// True only for a completed round where both parties chose yes
    pub fn matched(&self) -> bool {
        matches!(self, RoundOutcome::Completed { matched: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_id_generation() {
        let id1 = RoundId::new();
        let id2 = RoundId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::A.opponent(), Seat::B);
        assert_eq!(Seat::B.opponent(), Seat::A);
    }

    #[test]
    fn test_phase_str() {
        assert_eq!(Phase::Commit.as_str(), "commit");
        assert_eq!(Phase::Reveal.as_str(), "reveal");
    }

    #[test]
    fn test_outcome_matched() {
        let matched = RoundOutcome::Completed {
            matched: true,
            message_a: None,
            message_b: None,
        };
        let unmatched = RoundOutcome::Completed {
            matched: false,
            message_a: None,
            message_b: None,
        };
        let aborted = RoundOutcome::Aborted {
            reason: AbortReason::Integrity,
        };

        assert!(matched.matched());
        assert!(!unmatched.matched());
        assert!(!aborted.matched());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = RoundOutcome::Aborted {
            reason: AbortReason::Timeout(Phase::Commit),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let back: RoundOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, back);
    }
}
