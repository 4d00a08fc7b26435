//! Deterministic test harness for garagectl.
//!
//! Scripted implementations of the transport and hub interfaces for
//! reproducible testing, plus a scenario builder that drives the pure
//! reconciler through timed observation sequences and enforces the Oracle
//! Pattern: a scenario cannot run without a verification function.

pub mod hub;
pub mod scenario;
pub mod scripted;

pub use hub::RecordingHub;
pub use scenario::{OracleFn, RunnableScenario, Scenario, World};
pub use scripted::{FixedTransport, ScriptedTransport};
