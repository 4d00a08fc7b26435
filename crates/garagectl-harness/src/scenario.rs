//! Scenario builder API.
//!
//! Provides a declarative API for reconciliation flow tests that enforces
//! the Oracle Pattern: a scenario cannot run without a verification
//! function. Steps are timed relative to a common epoch, so scenarios read
//! like the timelines in bug reports ("probe flips at t=0, read at t=5,
//! read at t=15").

use std::time::{Duration, Instant};

use garagectl_core::reconciler::{Reconciler, ReconcilerAction, ReconcilerConfig};
use garagectl_core::state::{DoorPosition, DoorState, DoorTarget};

/// Oracle verifying the final world state.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;

enum Step {
    /// Hub-initiated read: evaluate and record the reported state.
    Read { at: Duration, position: DoorPosition },
    /// Timer-driven evaluation: record pushed states only.
    Tick { at: Duration, position: DoorPosition },
    /// Hub-initiated target write.
    Command { target: DoorTarget },
}

/// Scenario builder.
///
/// Construct a scenario from an initial probe result and a sequence of
/// timed steps. Must call [`Scenario::oracle`] to get a
/// [`RunnableScenario`] that can be executed.
pub struct Scenario {
    name: String,
    config: ReconcilerConfig,
    initial: DoorPosition,
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a new scenario with the given name.
    ///
    /// Defaults: unknown initial position (optimistic `Open` target) and
    /// the default reconciler configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: ReconcilerConfig::default(),
            initial: DoorPosition::Unknown,
            steps: Vec::new(),
        }
    }

    /// Set the first probe result seen at startup.
    #[must_use]
    pub fn initial(mut self, position: DoorPosition) -> Self {
        self.initial = position;
        self
    }

    /// Override the reconciler configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a hub read at `at` seconds after the epoch, with the probe
    /// observing `position`.
    #[must_use]
    pub fn read_at(mut self, at: u64, position: DoorPosition) -> Self {
        self.steps.push(Step::Read { at: Duration::from_secs(at), position });
        self
    }

    /// Add a timer evaluation at `at` seconds after the epoch, with the
    /// probe observing `position`.
    #[must_use]
    pub fn tick_at(mut self, at: u64, position: DoorPosition) -> Self {
        self.steps.push(Step::Tick { at: Duration::from_secs(at), position });
        self
    }

    /// Add a hub target write.
    #[must_use]
    pub fn command(mut self, target: DoorTarget) -> Self {
        self.steps.push(Step::Command { target });
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario steps in order, then run the oracle against
    /// the final world state.
    pub fn run(self) -> Result<(), String> {
        let epoch = Instant::now();
        let mut world = World {
            reconciler: Reconciler::new(self.scenario.initial, self.scenario.config),
            reads: Vec::new(),
            pushes: Vec::new(),
            commands: Vec::new(),
        };

        for step in self.scenario.steps {
            match step {
                Step::Read { at, position } => {
                    let state = world.reconciler.observe(position, epoch + at);
                    world.reads.push(state);
                }
                Step::Tick { at, position } => {
                    let actions = world.reconciler.tick(position, epoch + at);
                    world.record(&actions);
                }
                Step::Command { target } => {
                    let actions = world.reconciler.set_target(target);
                    world.record(&actions);
                }
            }
        }

        (self.oracle)(&world).map_err(|e| format!("scenario '{}': {e}", self.scenario.name))
    }
}

/// World state after scenario execution, inspected by oracles.
pub struct World {
    reconciler: Reconciler,
    reads: Vec<DoorState>,
    pushes: Vec<DoorState>,
    commands: Vec<DoorTarget>,
}

impl World {
    /// Final commanded target.
    #[must_use]
    pub fn target(&self) -> DoorTarget {
        self.reconciler.target()
    }

    /// Whether the inconsistency window is currently open.
    #[must_use]
    pub fn diverged(&self) -> bool {
        self.reconciler.diverged_since().is_some()
    }

    /// States returned to hub reads, in order.
    #[must_use]
    pub fn reads(&self) -> &[DoorState] {
        &self.reads
    }

    /// The state returned to the most recent hub read.
    #[must_use]
    pub fn last_read(&self) -> Option<DoorState> {
        self.reads.last().copied()
    }

    /// States pushed by timer evaluations, in order.
    #[must_use]
    pub fn pushes(&self) -> &[DoorState] {
        &self.pushes
    }

    /// Control commands dispatched, in order.
    #[must_use]
    pub fn commands(&self) -> &[DoorTarget] {
        &self.commands
    }

    fn record(&mut self, actions: &[ReconcilerAction]) {
        for action in actions {
            match action {
                ReconcilerAction::PushState(state) => self.pushes.push(*state),
                ReconcilerAction::SendCommand(target) => self.commands.push(*target),
            }
        }
    }
}
