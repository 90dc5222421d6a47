// Console front-end - Prints render events and turns stdin lines into user intents
use crate::application::command_gateway::SetpointKind;
use crate::application::events::{Notice, RenderEvent, UserIntent};
use crate::domain::control::ControlId;
use crate::domain::snapshot::Snapshot;
use crate::presentation::view;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Intent(UserIntent),
    Quit,
}

pub const HELP: &str = "commands: relay <n> | output <n> | exhaust | run | enable | \
                        power <kW> | high <V> | low <V> | quit";

pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let index = |arg: Option<&str>| -> Result<usize, String> {
        arg.ok_or_else(|| format!("{} needs a channel number", verb))?
            .parse::<usize>()
            .map_err(|e| format!("bad channel number: {}", e))
    };
    let value = |arg: Option<&str>| -> Result<f64, String> {
        arg.ok_or_else(|| format!("{} needs a value", verb))?
            .parse::<f64>()
            .map_err(|e| format!("bad value: {}", e))
    };

    type Parsed = Result<Option<ConsoleInput>, String>;
    let toggle = |id: ControlId| -> Parsed { Ok(Some(ConsoleInput::Intent(UserIntent::Toggle(id)))) };
    let setpoint = |kind: SetpointKind, v: f64| -> Parsed {
        Ok(Some(ConsoleInput::Intent(UserIntent::Setpoint(kind, v))))
    };

    match verb.to_ascii_lowercase().as_str() {
        "relay" => toggle(ControlId::Relay(index(arg)?)),
        "output" => toggle(ControlId::Output(index(arg)?)),
        "exhaust" => toggle(ControlId::Exhaust),
        "run" => toggle(ControlId::Run),
        "enable" => toggle(ControlId::Enable),
        "power" => setpoint(SetpointKind::TargetPower, value(arg)?),
        "high" => setpoint(SetpointKind::BatteryHigh, value(arg)?),
        "low" => setpoint(SetpointKind::BatteryLow, value(arg)?),
        "quit" | "exit" => Ok(Some(ConsoleInput::Quit)),
        other => Err(format!("unknown command {}; {}", other, HELP)),
    }
}

/// Forward stdin intents until EOF or `quit`. Returning drops `intents`, which ends the session.
pub async fn read_intents(intents: mpsc::Sender<UserIntent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(error = %err, "stdin read failed");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(ConsoleInput::Intent(intent))) => {
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(Some(ConsoleInput::Quit)) => break,
            Ok(None) => {}
            Err(message) => println!("{}", message),
        }
    }
}

#[derive(Default)]
struct ConsoleRenderer {
    latest: Option<Arc<Snapshot>>,
    received_at: Option<DateTime<Local>>,
}

impl ConsoleRenderer {
    fn render(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Connection(state) => println!("[connection] {}", state),
            RenderEvent::Snapshot(snapshot) => {
                for line in view::snapshot_lines(&snapshot) {
                    println!("  {}", line);
                }
                self.latest = Some(snapshot);
                self.received_at = Some(Local::now());
            }
            RenderEvent::Controls(states) => {
                println!("[controls] {}", view::controls_line(&states, self.latest.as_deref()));
            }
            RenderEvent::Settings(settings) => {
                let relays: Vec<_> = settings.relays.iter().map(|r| r.name.as_str()).collect();
                println!("[settings] {} relays: {}", settings.name, relays.join(", "));
            }
            RenderEvent::Notice(notice) => println!("[notice] {}", self.describe(&notice)),
        }
    }

    fn describe(&self, notice: &Notice) -> String {
        match notice {
            Notice::ConnectionLost => match self.received_at {
                Some(at) => format!(
                    "connection lost, last telemetry at {}",
                    at.format("%H:%M:%S")
                ),
                None => "connection lost, no telemetry received yet".to_string(),
            },
            Notice::ConnectionRestored => "connection restored".to_string(),
            Notice::ChannelClosed { reason: Some(reason) } => {
                format!("channel closed ({}), reconnecting", reason)
            }
            Notice::ChannelClosed { reason: None } => "channel closed, reconnecting".to_string(),
            Notice::DecodeFailed(error) => format!("bad telemetry: {}", error),
            Notice::ControlDisabled(id) => format!(
                "{} is disabled until fuel cell control is enabled",
                view::control_name(*id, self.latest.as_deref())
            ),
            Notice::UnknownControl(id) => format!("{} is not reported by the device", id),
            Notice::InvalidSetpoint(error) => format!("setpoint not sent: {}", error),
            Notice::CommandFailed { command, reason } => {
                format!("could not {}: {}", command, reason)
            }
        }
    }
}

pub async fn render_events(mut events: mpsc::UnboundedReceiver<RenderEvent>) {
    let mut renderer = ConsoleRenderer::default();
    while let Some(event) = events.recv().await {
        renderer.render(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::snapshot_decoder::tests::sample_snapshot;

    #[test]
    fn test_parse_toggles() {
        assert_eq!(
            parse_line("relay 2"),
            Ok(Some(ConsoleInput::Intent(UserIntent::Toggle(ControlId::Relay(2)))))
        );
        assert_eq!(
            parse_line("  Output 5 "),
            Ok(Some(ConsoleInput::Intent(UserIntent::Toggle(ControlId::Output(5)))))
        );
        assert_eq!(
            parse_line("exhaust"),
            Ok(Some(ConsoleInput::Intent(UserIntent::Toggle(ControlId::Exhaust))))
        );
        assert_eq!(parse_line("quit"), Ok(Some(ConsoleInput::Quit)));
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn test_parse_setpoints() {
        assert_eq!(
            parse_line("power 3.5"),
            Ok(Some(ConsoleInput::Intent(UserIntent::Setpoint(
                SetpointKind::TargetPower,
                3.5
            ))))
        );
        assert_eq!(
            parse_line("low 48"),
            Ok(Some(ConsoleInput::Intent(UserIntent::Setpoint(
                SetpointKind::BatteryLow,
                48.0
            ))))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("relay").is_err());
        assert!(parse_line("relay two").is_err());
        assert!(parse_line("power lots").is_err());
        assert!(parse_line("reboot").is_err());
    }

    #[test]
    fn test_describe_uses_channel_names() {
        let mut renderer = ConsoleRenderer::default();
        assert_eq!(
            renderer.describe(&Notice::ConnectionLost),
            "connection lost, no telemetry received yet"
        );

        renderer.render(RenderEvent::Snapshot(Arc::new(sample_snapshot(&[false], false))));
        assert_eq!(
            renderer.describe(&Notice::ControlDisabled(ControlId::Relay(0))),
            "relay 0 (relay-0) is disabled until fuel cell control is enabled"
        );
        assert_eq!(
            renderer.describe(&Notice::UnknownControl(ControlId::Relay(99))),
            "relay 99 is not reported by the device"
        );
        assert!(
            renderer
                .describe(&Notice::ConnectionLost)
                .starts_with("connection lost, last telemetry at ")
        );
    }
}
