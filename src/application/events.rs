// Renderer-facing events and renderer-originated intents
use crate::application::command_gateway::SetpointKind;
use crate::domain::connection::ConnectionState;
use crate::domain::control::{ControlId, ToggleState};
use crate::domain::settings::DeviceSettings;
use crate::domain::snapshot::Snapshot;
use std::sync::Arc;

/// Everything the renderer is told, as plain data.
#[derive(Debug, Clone)]
pub enum RenderEvent {
    Connection(ConnectionState),
    Snapshot(Arc<Snapshot>),
    Controls(Vec<(ControlId, ToggleState)>),
    Settings(DeviceSettings),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    ConnectionLost,
    ConnectionRestored,
    ChannelClosed { reason: Option<String> },
    DecodeFailed(String),
    ControlDisabled(ControlId),
    UnknownControl(ControlId),
    InvalidSetpoint(String),
    CommandFailed { command: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    Toggle(ControlId),
    Setpoint(SetpointKind, f64),
}
