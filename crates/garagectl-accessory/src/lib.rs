//! Accessory runtime for garagectl
//!
//! Owns a [`garagectl_core::reconciler::Reconciler`] behind a mutex, runs
//! the fixed-interval evaluation timer, executes reconciler actions, and
//! exposes the four operations the home-automation hub layer calls:
//! current-state read, target read, target write, and the settled-state
//! push hook.
//!
//! # Components
//!
//! - [`DoorAccessory`]: per-accessory runtime with start/shutdown lifecycle
//! - [`HubSink`]: push interface implemented by the hub bridge

mod accessory;
mod hub;

pub use accessory::DoorAccessory;
pub use hub::HubSink;
