// Outbound command port for the device's REST surface
use async_trait::async_trait;
use std::fmt;

/// Target power range accepted by the device UI, in kW.
pub const TARGET_POWER_RANGE: (f64, f64) = (0.0, 10.0);
/// Battery setpoint range accepted by the device UI, in volts.
pub const BATTERY_SETPOINT_RANGE: (f64, f64) = (35.0, 70.0);

/// A discrete request to the device. Every variant is idempotent on the device side.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetRelay { index: usize, on: bool },
    SetOutput { index: usize, on: bool },
    Start,
    Stop,
    Enable,
    Disable,
    OpenExhaust,
    CloseExhaust,
    TargetPower(f64),
    TargetBatteryHigh(f64),
    TargetBatteryLow(f64),
}

impl Command {
    /// Request path relative to the device origin.
    pub fn path(&self) -> String {
        match self {
            Self::SetRelay { index, on } => format!("/setRelay/{}/{}", index, on_off(*on)),
            Self::SetOutput { index, on } => format!("/setOutput/{}/{}", index, on_off(*on)),
            Self::Start => "/setFuelCell/Start".to_string(),
            Self::Stop => "/setFuelCell/Stop".to_string(),
            Self::Enable => "/setFuelCell/Enable".to_string(),
            Self::Disable => "/setFuelCell/Disable".to_string(),
            Self::OpenExhaust => "/setFuelCell/ExhaustOpen".to_string(),
            Self::CloseExhaust => "/setFuelCell/ExhaustClose".to_string(),
            Self::TargetPower(kw) => setpoint_path("TargetPower", *kw),
            Self::TargetBatteryHigh(volts) => setpoint_path("TargetBattHigh", *volts),
            Self::TargetBatteryLow(volts) => setpoint_path("TargetBattLow", *volts),
        }
    }

    /// Build a setpoint command, rejecting values outside what the device accepts.
    pub fn setpoint(kind: SetpointKind, value: f64) -> Result<Self, SetpointError> {
        let (min, max) = kind.range();
        if !value.is_finite() || value < min || value > max {
            return Err(SetpointError { kind, value, min, max });
        }
        Ok(match kind {
            SetpointKind::TargetPower => Self::TargetPower(value),
            SetpointKind::BatteryHigh => Self::TargetBatteryHigh(value),
            SetpointKind::BatteryLow => Self::TargetBatteryLow(value),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetRelay { index, on } => write!(f, "set relay {} {}", index, on_off(*on)),
            Self::SetOutput { index, on } => write!(f, "set output {} {}", index, on_off(*on)),
            Self::Start => f.write_str("start fuel cell"),
            Self::Stop => f.write_str("stop fuel cell"),
            Self::Enable => f.write_str("enable fuel cell"),
            Self::Disable => f.write_str("disable fuel cell"),
            Self::OpenExhaust => f.write_str("open exhaust"),
            Self::CloseExhaust => f.write_str("close exhaust"),
            Self::TargetPower(kw) => write!(f, "set target power {:.1} kW", kw),
            Self::TargetBatteryHigh(v) => write!(f, "set battery high {:.1} V", v),
            Self::TargetBatteryLow(v) => write!(f, "set battery low {:.1} V", v),
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn setpoint_path(name: &str, value: f64) -> String {
    let value = format!("{:.1}", value);
    format!("/setFuelCell/{}/{}", name, urlencoding::encode(&value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointKind {
    TargetPower,
    BatteryHigh,
    BatteryLow,
}

impl SetpointKind {
    fn range(self) -> (f64, f64) {
        match self {
            Self::TargetPower => TARGET_POWER_RANGE,
            Self::BatteryHigh | Self::BatteryLow => BATTERY_SETPOINT_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind:?} setpoint {value} outside {min}..={max}")]
pub struct SetpointError {
    pub kind: SetpointKind,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("device answered {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait CommandGateway: Send + Sync {
    /// Deliver one command. Only transport-level success is reported; the
    /// response body never feeds back into control state.
    async fn send(&self, command: &Command) -> Result<(), CommandError>;
}
