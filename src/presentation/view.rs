// Pure view functions - Everything shown is derived from control state and the latest snapshot
use crate::domain::control::{ControlId, ToggleState};
use crate::domain::snapshot::{AcMeasurement, DcMeasurement, MeasurementStatus, Snapshot};

/// Fixed-point rounding happens here, never in the decoder.
pub fn fixed(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value)
}

pub fn toggle_label(state: ToggleState) -> &'static str {
    match state {
        ToggleState::On => "on",
        ToggleState::Off => "off",
        ToggleState::Pending => "changing",
    }
}

/// Channel name from the snapshot, falling back to the control's own label.
pub fn control_name(id: ControlId, snapshot: Option<&Snapshot>) -> String {
    let named = snapshot.and_then(|s| match id {
        ControlId::Relay(index) => s.relays.get(index).map(|r| r.name.clone()),
        ControlId::Output(index) => s.outputs.get(index).map(|o| o.name.clone()),
        _ => None,
    });
    match named {
        Some(name) if !name.is_empty() => format!("{} ({})", id, name),
        _ => id.to_string(),
    }
}

pub fn controls_line(states: &[(ControlId, ToggleState)], snapshot: Option<&Snapshot>) -> String {
    states
        .iter()
        .map(|(id, state)| format!("{}={}", control_name(*id, snapshot), toggle_label(*state)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn ac_line(m: &AcMeasurement) -> String {
    match &m.status {
        MeasurementStatus::Valid => format!(
            "AC {} [{}]: {} V {} A {} W {} Wh {} Hz pf {}",
            m.index,
            m.name,
            fixed(m.volts, 1),
            fixed(m.amps, 2),
            fixed(m.power, 1),
            fixed(m.watt_hours, 0),
            fixed(m.frequency, 1),
            fixed(m.power_factor, 2)
        ),
        MeasurementStatus::Faulted(error) => {
            format!("AC {} [{}]: ERROR {}", m.index, m.name, error)
        }
    }
}

pub fn dc_line(m: &DcMeasurement) -> String {
    match &m.status {
        MeasurementStatus::Valid => format!(
            "DC {} [{}]: {} V {} A {} W",
            m.index,
            m.name,
            fixed(m.volts, 1),
            fixed(m.amps, 2),
            fixed(m.power, 1)
        ),
        MeasurementStatus::Faulted(error) => {
            format!("DC {} [{}]: ERROR {}", m.index, m.name, error)
        }
    }
}

pub fn dc_output_line(status: &str, fault_code: &str) -> String {
    if fault_code.is_empty() {
        format!("dc output {}", status)
    } else {
        format!("dc output {} (fault {})", status, fault_code)
    }
}

pub fn snapshot_lines(snapshot: &Snapshot) -> Vec<String> {
    let fc = &snapshot.fuel_cell;
    let mut lines = vec![format!("{} v{}", snapshot.system, snapshot.version)];

    let switches = |readings: &[crate::domain::snapshot::SwitchReading]| {
        readings
            .iter()
            .map(|r| format!("{}:{}", r.name, if r.on { "1" } else { "0" }))
            .collect::<Vec<_>>()
            .join(" ")
    };
    lines.push(format!("relays  {}", switches(&snapshot.relays)));
    lines.push(format!("inputs  {}", switches(&snapshot.inputs)));
    lines.push(format!("outputs {}", switches(&snapshot.outputs)));

    for a in &snapshot.analog {
        lines.push(format!("analog {} [{}]: {} (raw {})", a.index, a.name, fixed(a.value, 2), a.raw));
    }
    lines.extend(snapshot.ac_measurements.iter().map(ac_line));
    lines.extend(snapshot.dc_measurements.iter().map(dc_line));

    let marker = if fc.run_status.is_fault() { "!! " } else { "" };
    lines.push(format!(
        "{}fuel cell {}: stack {} V {} A {} W, dc out {} V {} A",
        marker,
        fc.run_status.label(),
        fixed(fc.stack.volts, 1),
        fixed(fc.stack.amps, 1),
        fixed(fc.stack.power.unwrap_or_default(), 1),
        fixed(fc.dc_out.volts, 1),
        fixed(fc.dc_out.amps, 1)
    ));
    lines.push(format!(
        "pressures H2 {} air {} coolant {} diff {} mbar",
        fixed(fc.pressures.h2, 1),
        fixed(fc.pressures.air, 1),
        fixed(fc.pressures.coolant, 1),
        fixed(fc.pressures.h2_air_diff, 1)
    ));
    lines.push(format!(
        "temps inlet {} outlet {} air {} ambient {} C",
        fixed(fc.temperatures.coolant_inlet, 1),
        fixed(fc.temperatures.coolant_outlet, 1),
        fixed(fc.temperatures.air, 1),
        fixed(fc.temperatures.ambient, 1)
    ));
    lines.push(format!(
        "bms target {} kW, {}..{} V",
        fixed(fc.battery.target_power, 1),
        fixed(fc.battery.target_low, 1),
        fixed(fc.battery.target_high, 1)
    ));
    if !fc.dc_output_status.is_empty() {
        lines.push(dc_output_line(&fc.dc_output_status, &fc.dc_output_fault_code));
    }
    for alarm in &fc.alarms {
        lines.push(format!("ALARM {}", alarm));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::RunStatus;
    use crate::infrastructure::snapshot_decoder::tests::sample_snapshot;

    #[test]
    fn test_fixed_rounds_at_render_time() {
        assert_eq!(fixed(12.3456789, 2), "12.35");
        assert_eq!(fixed(48.125, 1), "48.1");
        assert_eq!(fixed(3.0, 0), "3");
    }

    #[test]
    fn test_measurement_lines_flag_errors() {
        let valid = AcMeasurement {
            index: 1,
            name: "grid".to_string(),
            volts: 230.44,
            amps: 1.254,
            power: 288.0,
            watt_hours: 1520.0,
            frequency: 50.0,
            power_factor: 0.98,
            status: MeasurementStatus::Valid,
        };
        let faulted = AcMeasurement {
            index: 0,
            name: "inverter".to_string(),
            status: MeasurementStatus::Faulted("sensor fault".to_string()),
            ..valid.clone()
        };

        assert_eq!(
            ac_line(&valid),
            "AC 1 [grid]: 230.4 V 1.25 A 288.0 W 1520 Wh 50.0 Hz pf 0.98"
        );
        assert_eq!(ac_line(&faulted), "AC 0 [inverter]: ERROR sensor fault");
    }

    #[test]
    fn test_controls_line_uses_channel_names() {
        let snapshot = sample_snapshot(&[true, false], true);
        let states = vec![
            (ControlId::Relay(0), ToggleState::On),
            (ControlId::Relay(1), ToggleState::Pending),
            (ControlId::Run, ToggleState::Off),
        ];

        assert_eq!(
            controls_line(&states, Some(&snapshot)),
            "relay 0 (relay-0)=on, relay 1 (relay-1)=changing, run=off"
        );
        assert_eq!(
            controls_line(&states[2..], None),
            "run=off"
        );
    }

    #[test]
    fn test_snapshot_lines_round_values() {
        let snapshot = sample_snapshot(&[false], true);
        let lines = snapshot_lines(&snapshot);

        assert_eq!(lines[0], "FireflyIO v1.2.3");
        assert!(lines.contains(&"analog 0 [tank]: 12.35 (raw 512)".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("fuel cell Standby: stack 48.1 V")));
        assert!(lines.contains(&"dc output Fault (fault 0x21)".to_string()));
    }

    #[test]
    fn test_fault_run_status_is_marked() {
        let mut snapshot = sample_snapshot(&[false], true);
        snapshot.fuel_cell.run_status = RunStatus::EmergencyStop;

        let lines = snapshot_lines(&snapshot);

        assert!(lines.iter().any(|l| l.starts_with("!! fuel cell emergency stop:")));
    }

    #[test]
    fn test_dc_output_line_without_fault_code() {
        assert_eq!(dc_output_line("On", ""), "dc output On");
    }
}
