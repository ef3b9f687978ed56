//! Protocol types.

mod types;

pub use types::{AbortReason, Phase, RoundId, RoundOutcome, Seat};
