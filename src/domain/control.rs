// Toggle control domain model
use std::fmt;

use super::snapshot::Snapshot;

/// A user-actuatable binary function of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlId {
    Relay(usize),
    Output(usize),
    Exhaust,
    Run,
    Enable,
}

impl ControlId {
    /// The authoritative value of this control in `snapshot`, if the snapshot carries it.
    pub fn read(&self, snapshot: &Snapshot) -> Option<bool> {
        let switches = &snapshot.fuel_cell.switches;
        match *self {
            Self::Relay(index) => snapshot.relay(index),
            Self::Output(index) => snapshot.output(index),
            Self::Exhaust => Some(switches.exhaust_open),
            Self::Run => Some(switches.start_engaged),
            Self::Enable => Some(switches.control_enabled),
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relay(index) => write!(f, "relay {}", index),
            Self::Output(index) => write!(f, "output {}", index),
            Self::Exhaust => f.write_str("exhaust"),
            Self::Run => f.write_str("run"),
            Self::Enable => f.write_str("enable"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Off,
    On,
    Pending,
}

impl ToggleState {
    pub fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}
