// Toggle controller - Optimistic control state reconciled by snapshots
use crate::application::command_gateway::Command;
use crate::domain::control::{ControlId, ToggleState};
use crate::domain::snapshot::Snapshot;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    #[error("{0} is disabled: fuel cell control is not enabled")]
    ControlDisabled(ControlId),
    #[error("{0} is not reported by the device")]
    UnknownControl(ControlId),
}

#[derive(Debug, Clone, Copy, Default)]
struct Control {
    state: ToggleState,
    /// Last value asserted by a snapshot.
    authoritative: bool,
}

/// Per-control state machine: `Off`/`On` come only from snapshots, `Pending`
/// only from user intent.
#[derive(Debug, Clone)]
pub struct ToggleController {
    controls: BTreeMap<ControlId, Control>,
    gate_open: bool,
}

impl Default for ToggleController {
    fn default() -> Self {
        Self::new()
    }
}

impl ToggleController {
    pub fn new() -> Self {
        let controls = [ControlId::Exhaust, ControlId::Run, ControlId::Enable]
            .into_iter()
            .map(|id| (id, Control::default()))
            .collect();
        Self {
            controls,
            gate_open: false,
        }
    }

    pub fn states(&self) -> Vec<(ControlId, ToggleState)> {
        self.controls.iter().map(|(id, c)| (*id, c.state)).collect()
    }

    /// Handle a user click. On success the control is `Pending` and the caller
    /// must issue the returned command exactly once.
    ///
    /// The command inverts the last authoritative value, not the displayed one,
    /// so repeated clicks while `Pending` keep asking for the same thing.
    pub fn on_user_toggle(&mut self, id: ControlId) -> Result<Command, ToggleError> {
        if !self.gate_open {
            return Err(ToggleError::ControlDisabled(id));
        }
        let Some(control) = self.controls.get_mut(&id) else {
            return Err(ToggleError::UnknownControl(id));
        };

        let target = !control.authoritative;
        control.state = ToggleState::Pending;

        tracing::debug!(control = %id, target, "control pending");
        Ok(command_for(id, target))
    }

    /// Apply an authoritative snapshot. Every control leaves this in `On` or
    /// `Off`, whatever the user last asked for. Relays and outputs the
    /// snapshot no longer carries are dropped.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.controls.retain(|id, _| id.read(snapshot).is_some());
        for relay in &snapshot.relays {
            self.controls.entry(ControlId::Relay(relay.index)).or_default();
        }
        for output in &snapshot.outputs {
            self.controls
                .entry(ControlId::Output(output.index))
                .or_default();
        }

        for (id, control) in self.controls.iter_mut() {
            let on = id.read(snapshot).unwrap_or_default();
            if control.state == ToggleState::Pending && on == control.authoritative {
                tracing::info!(control = %id, on, "pending toggle not confirmed");
            }
            control.authoritative = on;
            control.state = ToggleState::from_bool(on);
        }

        self.gate_open = snapshot.control_enabled();
    }
}

fn command_for(id: ControlId, on: bool) -> Command {
    match id {
        ControlId::Relay(index) => Command::SetRelay { index, on },
        ControlId::Output(index) => Command::SetOutput { index, on },
        ControlId::Exhaust if on => Command::OpenExhaust,
        ControlId::Exhaust => Command::CloseExhaust,
        ControlId::Run if on => Command::Start,
        ControlId::Run => Command::Stop,
        ControlId::Enable if on => Command::Enable,
        ControlId::Enable => Command::Disable,
    }
}
