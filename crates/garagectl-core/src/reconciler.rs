//! Reconciliation state machine for the garage door.
//!
//! This module implements the policy layer - reconciling the commanded
//! target against an unreliable, latency-bearing status source without
//! producing spurious or premature state flips.
//!
//! # Architecture: Action-Based State Machine
//!
//! This state machine follows the action pattern:
//! - Methods accept time as parameter (no stored clock)
//! - Periodic and write paths return `Vec<ReconcilerAction>`
//! - Driver code executes actions (push to hub, dispatch control command)
//!
//! This enables:
//! - Pure reconciliation logic (no I/O)
//! - Easy testing (no mocking time or transports)
//! - Reuse across the production runtime and scenario harness
//!
//! # State Machine
//!
//! ```text
//!                position != target                tolerance exceeded
//!  ┌──────────┐ (or Unknown)       ┌──────────────┐ and position definite
//!  │ Settled  │───────────────────>│ Transitional │──────────────────────┐
//!  │ (OPEN /  │<───────────────────│ (OPENING /   │  target := position  │
//!  │  CLOSED) │ position == target │  CLOSING)    │                      │
//!  └──────────┘                    └──────────────┘                      │
//!       ^                                                                │
//!       └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Tolerance window
//!
//! A position/target mismatch within the tolerance window is attributed to
//! an in-flight commanded motion and reported as a transitional state. A
//! definite mismatch that outlives the window means somebody moved the door
//! by other means, so the observed position is adopted as the new target.
//! An `Unknown` position extends the window forever but is never adopted.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::state::{DoorPosition, DoorState, DoorTarget};

/// Actions returned by the reconciler state machine.
///
/// The driver (accessory runtime or test harness) executes these actions:
/// - `PushState`: deliver a settled state to the hub's push callback
/// - `SendCommand`: dispatch the control command for the given direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerAction {
    /// Push this settled state to the hub.
    PushState(DoorState),

    /// Dispatch the control command for this direction.
    SendCommand(DoorTarget),
}

/// Reconciler configuration.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Grace period during which a position/target mismatch is attributed to
    /// an in-flight commanded motion rather than an external change.
    pub tolerance: Duration,
    /// Period of the evaluation timer. Consumed by the polling driver, not
    /// by the state machine itself.
    pub update_frequency: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            tolerance: Duration::from_secs(10),
            update_frequency: Duration::from_secs(10),
        }
    }
}

/// Door reconciliation state machine.
///
/// Owns the commanded target and the inconsistency window for a single
/// accessory instance. The reported [`DoorState`] is never stored; it is
/// recomputed on every evaluation.
///
/// This is a pure state machine - no I/O, no stored clock. Time is passed
/// as parameters to the methods that need it. Callers are responsible for
/// serializing access: [`Reconciler::observe`] and
/// [`Reconciler::set_target`] both mutate shared state and must not
/// interleave.
#[derive(Debug, Clone)]
pub struct Reconciler {
    /// Configuration
    config: ReconcilerConfig,
    /// Last commanded intent
    target: DoorTarget,
    /// When the observed position first diverged from the target
    diverged_since: Option<Instant>,
}

impl Reconciler {
    /// Create a reconciler from the first probe result.
    ///
    /// The initial target is `Closed` only when the first probe reads
    /// `closed`; any other reading (including `Unknown`) starts as `Open`.
    #[must_use]
    pub fn new(initial: DoorPosition, config: ReconcilerConfig) -> Self {
        Self {
            config,
            target: DoorTarget::from_initial(initial),
            diverged_since: None,
        }
    }

    /// Get the commanded target. No probing, no side effects.
    #[must_use]
    pub fn target(&self) -> DoorTarget {
        self.target
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// When the observed position first diverged from the target, if it
    /// still diverges.
    #[must_use]
    pub fn diverged_since(&self) -> Option<Instant> {
        self.diverged_since
    }

    /// Evaluate one observation and derive the reported state.
    ///
    /// - A position matching the target clears the inconsistency window and
    ///   reports the settled state.
    /// - A mismatch opens the window (or leaves it running) and reports the
    ///   transitional state for the target's direction.
    /// - A *definite* mismatch older than the tolerance means an
    ///   externally-triggered change: the observed position is adopted as
    ///   the new target and the settled state for it is reported
    ///   immediately. The window itself is cleared on the next evaluation,
    ///   once the position confirms the adopted target.
    ///
    /// Known approximation, kept deliberately: when the position is
    /// `Unknown` and the target is `Open`, the report is `Opening` even
    /// though the true motion might be closing. There is no information to
    /// do better.
    pub fn observe(&mut self, position: DoorPosition, now: Instant) -> DoorState {
        if position.matches(self.target) {
            self.diverged_since = None;
            return self.target.settled();
        }

        match self.diverged_since {
            None => {
                debug!(%position, target = %self.target, "position diverged from target");
                self.diverged_since = Some(now);
            }
            Some(since) if now.duration_since(since) > self.config.tolerance => {
                if let Ok(adopted) = DoorTarget::try_from(position) {
                    debug!(target = %adopted, "adopting externally triggered state change");
                    self.target = adopted;
                    // Window stays set until the next observation confirms
                    // the adopted target.
                    return adopted.settled();
                }
            }
            Some(_) => {}
        }

        self.target.transitional()
    }

    /// Periodic evaluation - the timer-driven path.
    ///
    /// Runs [`Reconciler::observe`] and emits a push action only when the
    /// result is settled. Transitional states are never pushed proactively;
    /// the hub sees them only in direct response to a read.
    pub fn tick(&mut self, position: DoorPosition, now: Instant) -> Vec<ReconcilerAction> {
        let state = self.observe(position, now);
        if state.is_settled() {
            vec![ReconcilerAction::PushState(state)]
        } else {
            Vec::new()
        }
    }

    /// Record a commanded intent and emit the control action.
    ///
    /// Actuation is neither awaited nor verified here, and the
    /// inconsistency window is left untouched: the next evaluation observes
    /// consistency once the physical door catches up, or re-extends the
    /// window if it does not.
    pub fn set_target(&mut self, target: DoorTarget) -> Vec<ReconcilerAction> {
        self.target = target;
        vec![ReconcilerAction::SendCommand(target)]
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const TOLERANCE: Duration = Duration::from_secs(10);

    fn reconciler(initial: DoorPosition) -> Reconciler {
        Reconciler::new(
            initial,
            ReconcilerConfig { tolerance: TOLERANCE, ..ReconcilerConfig::default() },
        )
    }

    #[test]
    fn initial_probe_closed_reports_closed() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        assert_eq!(r.target(), DoorTarget::Closed);
        assert_eq!(r.observe(DoorPosition::Closed, t0), DoorState::Closed);
        assert!(r.diverged_since().is_none());
    }

    #[test]
    fn matching_position_clears_window() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        // Diverge, then come back within tolerance.
        assert_eq!(r.observe(DoorPosition::Open, t0), DoorState::Closing);
        assert!(r.diverged_since().is_some());

        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(r.observe(DoorPosition::Closed, t1), DoorState::Closed);
        assert!(r.diverged_since().is_none());
    }

    #[test]
    fn mismatch_within_tolerance_reports_transitional() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        assert_eq!(r.observe(DoorPosition::Open, t0), DoorState::Closing);

        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(r.observe(DoorPosition::Open, t1), DoorState::Closing);
        assert_eq!(r.target(), DoorTarget::Closed);
    }

    #[test]
    fn external_change_adopted_after_tolerance() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        // Somebody opens the door with the wall button at t0.
        assert_eq!(r.observe(DoorPosition::Open, t0), DoorState::Closing);

        // Still inside the window: attributed to in-flight motion.
        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(r.observe(DoorPosition::Open, t1), DoorState::Closing);

        // Outlived the window: adopt the observed position, report settled.
        let t2 = t0 + Duration::from_secs(15);
        assert_eq!(r.observe(DoorPosition::Open, t2), DoorState::Open);
        assert_eq!(r.target(), DoorTarget::Open);

        // Window clears on the next evaluation that confirms the target.
        assert!(r.diverged_since().is_some());
        let t3 = t0 + Duration::from_secs(16);
        assert_eq!(r.observe(DoorPosition::Open, t3), DoorState::Open);
        assert!(r.diverged_since().is_none());
    }

    #[test]
    fn adoption_requires_strictly_exceeding_tolerance() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        r.observe(DoorPosition::Open, t0);

        // Exactly at the tolerance boundary: not yet an external change.
        let t1 = t0 + TOLERANCE;
        assert_eq!(r.observe(DoorPosition::Open, t1), DoorState::Closing);
        assert_eq!(r.target(), DoorTarget::Closed);
    }

    #[test]
    fn unknown_position_is_never_adopted() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Open);
        assert_eq!(r.target(), DoorTarget::Open);

        // Probe fails repeatedly for well past the tolerance.
        let mut now = t0;
        for _ in 0..10 {
            now += Duration::from_secs(10);
            assert_eq!(r.observe(DoorPosition::Unknown, now), DoorState::Opening);
        }
        assert_eq!(r.target(), DoorTarget::Open);
        assert!(r.diverged_since().is_some());
    }

    #[test]
    fn unknown_with_closed_target_reports_closing() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        assert_eq!(r.observe(DoorPosition::Unknown, t0), DoorState::Closing);
    }

    #[test]
    fn tick_pushes_only_settled_states() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        assert_eq!(
            r.tick(DoorPosition::Closed, t0),
            vec![ReconcilerAction::PushState(DoorState::Closed)]
        );

        // Transitional: nothing is pushed.
        let t1 = t0 + Duration::from_secs(5);
        assert!(r.tick(DoorPosition::Open, t1).is_empty());
        assert!(r.tick(DoorPosition::Unknown, t1 + Duration::from_secs(1)).is_empty());

        // Adoption settles and resumes pushing.
        let t2 = t1 + TOLERANCE + Duration::from_secs(1);
        assert_eq!(
            r.tick(DoorPosition::Open, t2),
            vec![ReconcilerAction::PushState(DoorState::Open)]
        );
    }

    #[test]
    fn set_target_emits_command_and_reports_transitional() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);
        assert_eq!(r.observe(DoorPosition::Closed, t0), DoorState::Closed);

        let actions = r.set_target(DoorTarget::Open);
        assert_eq!(actions, vec![ReconcilerAction::SendCommand(DoorTarget::Open)]);
        assert_eq!(r.target(), DoorTarget::Open);

        // Door has not moved yet: immediate read is transitional.
        let t1 = t0 + Duration::from_secs(1);
        assert_eq!(r.observe(DoorPosition::Closed, t1), DoorState::Opening);
    }

    #[test]
    fn set_target_does_not_reset_window() {
        let t0 = Instant::now();
        let mut r = reconciler(DoorPosition::Closed);

        // Window opens at t0 against the Closed target.
        r.observe(DoorPosition::Open, t0);
        let since = r.diverged_since();
        assert!(since.is_some());

        // Commanding a target leaves the window alone; the next matching
        // observation clears it naturally.
        r.set_target(DoorTarget::Closed);
        assert_eq!(r.diverged_since(), since);

        let t1 = t0 + Duration::from_secs(3);
        assert_eq!(r.observe(DoorPosition::Closed, t1), DoorState::Closed);
        assert!(r.diverged_since().is_none());
    }

    fn position_strategy() -> impl Strategy<Value = DoorPosition> {
        prop_oneof![
            Just(DoorPosition::Open),
            Just(DoorPosition::Closed),
            Just(DoorPosition::Unknown),
        ]
    }

    proptest! {
        /// For any observation sequence, a settled report means the
        /// observed position matches the (possibly adopted) target, and a
        /// transitional report matches the target's direction.
        #[test]
        fn reports_are_consistent_with_target(
            initial in position_strategy(),
            steps in prop::collection::vec((position_strategy(), 0u64..30), 1..60),
        ) {
            let mut now = Instant::now();
            let mut r = reconciler(initial);

            for (position, advance) in steps {
                now += Duration::from_secs(advance);
                let state = r.observe(position, now);

                if state.is_settled() {
                    prop_assert_eq!(state, r.target().settled());
                    prop_assert!(position.matches(r.target()));
                } else {
                    prop_assert_eq!(state, r.target().transitional());
                    prop_assert!(!position.matches(r.target()));
                }
            }
        }

        /// The periodic path never pushes a transitional state.
        #[test]
        fn ticks_never_push_transitional(
            steps in prop::collection::vec((position_strategy(), 0u64..30), 1..60),
        ) {
            let mut now = Instant::now();
            let mut r = reconciler(DoorPosition::Closed);

            for (position, advance) in steps {
                now += Duration::from_secs(advance);
                for action in r.tick(position, now) {
                    match action {
                        ReconcilerAction::PushState(state) => prop_assert!(state.is_settled()),
                        ReconcilerAction::SendCommand(_) => prop_assert!(false, "tick never commands"),
                    }
                }
            }
        }
    }
}
