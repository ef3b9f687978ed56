//! Cancellable per-phase deadline.

use crate::protocol::Phase;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerState {
    Armed,
    Fired,
    Cancelled,
}

/// Deadline bookkeeping for a single bounded phase interaction.
///
/// The timer does not interrupt anything by itself; the phase races its
/// input future against `deadline()` and reports the outcome back via
/// `cancel` or `fire`. Both transitions are idempotent and safe in
/// either order, so a deadline can abort a round at most once and a
/// completed phase can never be aborted retroactively.
pub(crate) struct PhaseTimer {
    phase: Phase,
    deadline: Instant,
    state: TimerState,
}

impl PhaseTimer {
    /// Arm a timer for `phase` expiring `budget` from now.
    pub fn arm(phase: Phase, budget: Duration) -> Self {
        Self {
            phase,
            deadline: Instant::now() + budget,
            state: TimerState::Armed,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Cancel the timer. No-op if already cancelled or already fired.
    pub fn cancel(&mut self) {
        if self.state == TimerState::Armed {
            self.state = TimerState::Cancelled;
        }
    }

    /// Mark the deadline as fired. Returns true only on the first
    /// transition out of `Armed`; a cancelled or already-fired timer
    /// reports false so the round cannot be aborted twice.
    pub fn fire(&mut self) -> bool {
        if self.state == TimerState::Armed {
            self.state = TimerState::Fired;
            true
        } else {
            false
        }
    }

    pub fn is_fired(&self) -> bool {
        self.state == TimerState::Fired
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == TimerState::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let mut timer = PhaseTimer::arm(Phase::Commit, Duration::from_secs(30));
        timer.cancel();
        timer.cancel();
        assert!(timer.is_cancelled());
        assert!(!timer.is_fired());
    }

    #[tokio::test]
    async fn test_cancel_after_fire_does_not_unfire() {
        let mut timer = PhaseTimer::arm(Phase::Reveal, Duration::from_secs(30));
        assert!(timer.fire());
        timer.cancel();
        assert!(timer.is_fired());
        assert!(!timer.is_cancelled());
    }

    #[tokio::test]
    async fn test_fire_after_cancel_reports_false() {
        let mut timer = PhaseTimer::arm(Phase::Commit, Duration::from_secs(30));
        timer.cancel();
        assert!(!timer.fire());
        assert!(timer.is_cancelled());
    }

    #[tokio::test]
    async fn test_fire_is_one_shot() {
        let mut timer = PhaseTimer::arm(Phase::Commit, Duration::from_secs(30));
        assert!(timer.fire());
        assert!(!timer.fire());
    }

    #[tokio::test]
    async fn test_timer_remembers_its_phase() {
        let timer = PhaseTimer::arm(Phase::Message, Duration::from_secs(30));
        assert_eq!(timer.phase(), Phase::Message);
        assert!(timer.deadline() > Instant::now());
    }
}
