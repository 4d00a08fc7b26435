//! Garagectl core logic
//!
//! Pure reconciliation logic for a garage-door accessory, completely
//! decoupled from I/O. This enables deterministic testing of the policy that
//! matters: telling a door that is physically moving apart from a status
//! source that is stale, inconsistent, or unreachable.
//!
//! # Architecture
//!
//! The reconciler is a deterministic state machine isolated from I/O, time,
//! and scheduling. All external effects are supplied explicitly by the
//! caller: the current time arrives as an [`std::time::Instant`] parameter
//! and the observed door position arrives already normalized into an enum.
//!
//! State transitions produce declarative actions that describe intended
//! effects (push a state to the hub, dispatch a control command) rather than
//! executing them directly. A runtime or test harness is responsible for
//! interpreting and executing these actions.
//!
//! This separation keeps the reconciliation policy independent of execution
//! concerns and allows the same code to be reused across the production
//! runtime, deterministic unit tests, and scripted scenario tests.
//!
//! # Components
//!
//! - [`reconciler`]: Reconciliation state machine (target, tolerance window)
//! - [`state`]: Door position, target, and reported-state types
//! - [`probe`]: Status probe (normalizes remote output, dispatches commands)
//! - [`transport`]: Remote command transport abstraction
//! - [`error`]: Transport error types

pub mod error;
pub mod probe;
pub mod reconciler;
pub mod state;
pub mod transport;
