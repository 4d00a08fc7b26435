//! Commanded target-change scenarios.
//!
//! Hub target writes dispatch the control command immediately, report
//! transitional states while the door moves, and settle once the probe
//! confirms the commanded position.

use garagectl_core::state::{DoorPosition, DoorState, DoorTarget};
use garagectl_harness::Scenario;

#[test]
fn commanded_open_reports_opening_until_confirmed() {
    Scenario::new("commanded open")
        .initial(DoorPosition::Closed)
        .command(DoorTarget::Open)
        .read_at(1, DoorPosition::Closed)
        .read_at(8, DoorPosition::Open)
        .oracle(Box::new(|world| {
            if world.commands() != [DoorTarget::Open] {
                return Err(format!("expected one open command, got {:?}", world.commands()));
            }
            if world.reads() != [DoorState::Opening, DoorState::Open] {
                return Err(format!("unexpected read sequence: {:?}", world.reads()));
            }
            Ok(())
        }))
        .run()
        .expect("commanded open scenario should pass");
}

#[test]
fn commanded_close_dispatches_close_direction() {
    Scenario::new("commanded close")
        .initial(DoorPosition::Open)
        .command(DoorTarget::Closed)
        .read_at(1, DoorPosition::Open)
        .oracle(Box::new(|world| {
            if world.commands() != [DoorTarget::Closed] {
                return Err(format!("expected one close command, got {:?}", world.commands()));
            }
            if world.last_read() != Some(DoorState::Closing) {
                return Err(format!("read should be closing, got {:?}", world.last_read()));
            }
            Ok(())
        }))
        .run()
        .expect("commanded close scenario should pass");
}

#[test]
fn slow_door_gets_adopted_back() {
    // The command is dispatched but the door never moves (dead motor).
    // Past the tolerance window the definite observed position wins, and
    // the target falls back to reality.
    Scenario::new("dead motor")
        .initial(DoorPosition::Closed)
        .command(DoorTarget::Open)
        .read_at(1, DoorPosition::Closed)
        .read_at(5, DoorPosition::Closed)
        .read_at(20, DoorPosition::Closed)
        .oracle(Box::new(|world| {
            if world.reads() != [DoorState::Opening, DoorState::Opening, DoorState::Closed] {
                return Err(format!("unexpected read sequence: {:?}", world.reads()));
            }
            if world.target() != DoorTarget::Closed {
                return Err("target should fall back to the observed position".to_string());
            }
            Ok(())
        }))
        .run()
        .expect("dead motor scenario should pass");
}

#[test]
fn reissuing_the_same_target_is_idempotent() {
    Scenario::new("repeat command")
        .initial(DoorPosition::Closed)
        .command(DoorTarget::Closed)
        .command(DoorTarget::Closed)
        .read_at(1, DoorPosition::Closed)
        .oracle(Box::new(|world| {
            if world.commands() != [DoorTarget::Closed, DoorTarget::Closed] {
                return Err(format!("both commands dispatch, got {:?}", world.commands()));
            }
            if world.last_read() != Some(DoorState::Closed) {
                return Err("state remains settled".to_string());
            }
            Ok(())
        }))
        .run()
        .expect("repeat command scenario should pass");
}
