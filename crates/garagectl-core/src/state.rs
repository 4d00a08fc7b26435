//! Door state types.
//!
//! Three small enums with one-way relationships between them:
//!
//! - [`DoorPosition`] is what the remote status source claims, including the
//!   case where it claims nothing useful (`Unknown`).
//! - [`DoorTarget`] is the last commanded intent. It is always definite; an
//!   `Unknown` observation can never become a target.
//! - [`DoorState`] is what the hub sees, derived on every evaluation from
//!   position and target. It is never stored.
//!
//! Raw status text is parsed here, once, at the boundary. Strings never
//! reach the reconciler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized result of a single remote status probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPosition {
    /// The status source reported the door as open.
    Open,
    /// The status source reported the door as closed.
    Closed,
    /// The status source failed or produced unclassifiable output.
    ///
    /// Treated conservatively: it extends the inconsistency window but is
    /// never trusted as a state flip.
    Unknown,
}

impl DoorPosition {
    /// Normalize the textual report of the remote status command.
    ///
    /// The report is trimmed and matched case-insensitively: `"closed"` maps
    /// to [`DoorPosition::Closed`], `"open"` to [`DoorPosition::Open`], and
    /// anything else to [`DoorPosition::Unknown`].
    #[must_use]
    pub fn from_report(report: &str) -> Self {
        match report.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::Unknown,
        }
    }

    /// Whether this observation confirms the given target.
    ///
    /// `Unknown` confirms nothing.
    #[must_use]
    pub fn matches(self, target: DoorTarget) -> bool {
        matches!(
            (self, target),
            (Self::Open, DoorTarget::Open) | (Self::Closed, DoorTarget::Closed)
        )
    }
}

impl fmt::Display for DoorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Last commanded intent for the door.
///
/// Set only by an explicit set-target operation or by the reconciler's
/// tolerance fallback when an external change is detected. By construction
/// there is no `Unknown` variant: a commanded intent is always definite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorTarget {
    /// The door should be (or become) open.
    Open,
    /// The door should be (or become) closed.
    Closed,
}

impl DoorTarget {
    /// Derive the startup target from the first probe result.
    ///
    /// Anything other than a confirmed `closed` reading starts as `Open`,
    /// matching the accessory's optimistic boot behavior.
    #[must_use]
    pub fn from_initial(position: DoorPosition) -> Self {
        if position == DoorPosition::Closed { Self::Closed } else { Self::Open }
    }

    /// The settled reported state for this target.
    #[must_use]
    pub fn settled(self) -> DoorState {
        match self {
            Self::Open => DoorState::Open,
            Self::Closed => DoorState::Closed,
        }
    }

    /// The transitional reported state while the door has not yet confirmed
    /// this target.
    #[must_use]
    pub fn transitional(self) -> DoorState {
        match self {
            Self::Open => DoorState::Opening,
            Self::Closed => DoorState::Closing,
        }
    }

    /// The direction word substituted into the control command template.
    #[must_use]
    pub fn direction(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "close",
        }
    }
}

impl fmt::Display for DoorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Error returned when converting an indefinite position into a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("an unknown door position cannot become a commanded target")]
pub struct IndefinitePosition;

impl TryFrom<DoorPosition> for DoorTarget {
    type Error = IndefinitePosition;

    fn try_from(position: DoorPosition) -> Result<Self, Self::Error> {
        match position {
            DoorPosition::Open => Ok(Self::Open),
            DoorPosition::Closed => Ok(Self::Closed),
            DoorPosition::Unknown => Err(IndefinitePosition),
        }
    }
}

/// Door state surfaced to the hub.
///
/// Derived on each evaluation from (position, target, elapsed inconsistency
/// time); settled states mean the observed position matches the target,
/// transitional states mean it does not yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    /// Door confirmed open.
    Open,
    /// Door confirmed closed.
    Closed,
    /// Position has not yet confirmed an `Open` target.
    Opening,
    /// Position has not yet confirmed a `Closed` target.
    Closing,
}

impl DoorState {
    /// Whether this is a settled state (`Open` or `Closed`).
    ///
    /// Only settled states are pushed proactively to the hub; transitional
    /// states are surfaced on demand.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Opening => write!(f, "opening"),
            Self::Closing => write!(f, "closing"),
        }
    }
}
