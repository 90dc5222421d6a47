// Decoder for the telemetry frames pushed over the websocket
use crate::domain::snapshot::{
    AcMeasurement, AnalogReading, BatteryManagement, DcMeasurement, ElectricalReading,
    FuelCellStatus, Insulation, MeasurementStatus, Pressures, RunStatus, Snapshot, SubSwitches,
    SwitchReading, Temperatures,
};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty telemetry frame")]
    Empty,
    #[error("malformed telemetry frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireMessage {
    system: String,
    #[serde(default)]
    version: String,
    relays: WireRelays,
    digital_in: WireDigitalIn,
    digital_out: WireDigitalOut,
    analog: WireAnalog,
    #[serde(rename = "ACMeasurement", default)]
    ac_measurement: Option<Vec<WireAcMeasurement>>,
    #[serde(rename = "DCMeasurement", default)]
    dc_measurement: Option<Vec<WireDcMeasurement>>,
    pan_fuel_cell_status: WireFuelCellStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireRelays {
    relays: Vec<WireRelay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireRelay {
    #[serde(default)]
    name: String,
    on: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDigitalIn {
    inputs: Vec<WirePin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDigitalOut {
    outputs: Vec<WirePin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WirePin {
    #[serde(default)]
    name: String,
    pin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAnalog {
    inputs: Vec<WireAnalogInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAnalogInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    raw: u32,
    value: f64,
}

// Readings are omitted by the device while a meter reports an error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct WireAcMeasurement {
    name: String,
    volts: f64,
    amps: f64,
    power: f64,
    watt_hours: f64,
    frequency: f64,
    power_factor: f64,
    error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct WireDcMeasurement {
    name: String,
    volts: f64,
    amps: f64,
    power: f64,
    error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct WireFuelCellStatus {
    run_time_hours: u32,
    run_time_minutes: u32,
    h2_pressure: f64,
    air_pressure: f64,
    coolant_pressure: f64,
    h2_air_pressure_diff: f64,
    coolant_inlet_temp: f64,
    coolant_outlet_temp: f64,
    air_temp: f64,
    ambient_temp: f64,
    air_flow: f64,
    stack_volts: f64,
    stack_current: f64,
    stack_power: f64,
    #[serde(rename = "DCInVolts")]
    dc_in_volts: f64,
    #[serde(rename = "DCInAmps")]
    dc_in_amps: f64,
    #[serde(rename = "DCOutVolts")]
    dc_out_volts: f64,
    #[serde(rename = "DCOutAmps")]
    dc_out_amps: f64,
    #[serde(rename = "BMSPower")]
    bms_power: f64,
    #[serde(rename = "BMSHigh")]
    bms_high: f64,
    #[serde(rename = "BMSLow")]
    bms_low: f64,
    #[serde(rename = "BMSCurrentPower")]
    bms_current_power: f64,
    #[serde(rename = "BMSTargetPower")]
    bms_target_power: f64,
    #[serde(rename = "BMSTargetHigh")]
    bms_target_high: f64,
    #[serde(rename = "BMSTargetLow")]
    bms_target_low: f64,
    run_status: String,
    // Go marshals an empty alarm slice as null
    alarms: Option<Vec<String>>,
    #[serde(rename = "DCOutputStatus")]
    dc_output_status: String,
    #[serde(rename = "DCOutputFaultCode")]
    dc_output_fault_code: String,
    start: bool,
    exhaust_open: bool,
    enable: bool,
    insulation_resistance: u32,
    insulation_status: String,
    insulation_fault: String,
    water_pump_speed: u32,
    water_pump_active: bool,
    cooling_fan_speed: u32,
}

/// Parse one inbound frame into a [`Snapshot`].
///
/// Values are carried through at full precision; rounding is left to the renderer.
/// Channel arrays keep their wire order, so element `i` is physical channel `i`.
pub fn decode(raw: &str) -> Result<Snapshot, DecodeError> {
    if raw.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    let message: WireMessage = serde_json::from_str(raw)?;
    Ok(message_to_snapshot(message))
}

fn message_to_snapshot(message: WireMessage) -> Snapshot {
    let relays = message
        .relays
        .relays
        .into_iter()
        .enumerate()
        .map(|(index, r)| SwitchReading {
            index,
            name: r.name,
            on: r.on,
        })
        .collect();

    let ac_measurements = message
        .ac_measurement
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, m)| AcMeasurement {
            index,
            name: m.name,
            volts: m.volts,
            amps: m.amps,
            power: m.power,
            watt_hours: m.watt_hours,
            frequency: m.frequency,
            power_factor: m.power_factor,
            status: MeasurementStatus::from_error(m.error),
        })
        .collect();

    let dc_measurements = message
        .dc_measurement
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, m)| DcMeasurement {
            index,
            name: m.name,
            volts: m.volts,
            amps: m.amps,
            power: m.power,
            status: MeasurementStatus::from_error(m.error),
        })
        .collect();

    Snapshot {
        system: message.system,
        version: message.version,
        relays,
        inputs: pins_to_readings(message.digital_in.inputs),
        outputs: pins_to_readings(message.digital_out.outputs),
        analog: message
            .analog
            .inputs
            .into_iter()
            .enumerate()
            .map(|(index, a)| AnalogReading {
                index,
                name: a.name,
                raw: a.raw,
                value: a.value,
            })
            .collect(),
        ac_measurements,
        dc_measurements,
        fuel_cell: fuel_cell_to_domain(message.pan_fuel_cell_status),
    }
}

fn pins_to_readings(pins: Vec<WirePin>) -> Vec<SwitchReading> {
    pins.into_iter()
        .enumerate()
        .map(|(index, p)| SwitchReading {
            index,
            name: p.name,
            on: p.pin,
        })
        .collect()
}

fn fuel_cell_to_domain(status: WireFuelCellStatus) -> FuelCellStatus {
    FuelCellStatus {
        pressures: Pressures {
            h2: status.h2_pressure,
            air: status.air_pressure,
            coolant: status.coolant_pressure,
            h2_air_diff: status.h2_air_pressure_diff,
        },
        temperatures: Temperatures {
            coolant_inlet: status.coolant_inlet_temp,
            coolant_outlet: status.coolant_outlet_temp,
            air: status.air_temp,
            ambient: status.ambient_temp,
        },
        stack: ElectricalReading {
            volts: status.stack_volts,
            amps: status.stack_current,
            power: Some(status.stack_power),
        },
        dc_in: ElectricalReading {
            volts: status.dc_in_volts,
            amps: status.dc_in_amps,
            power: None,
        },
        dc_out: ElectricalReading {
            volts: status.dc_out_volts,
            amps: status.dc_out_amps,
            power: None,
        },
        air_flow: status.air_flow,
        battery: BatteryManagement {
            power: status.bms_power,
            high: status.bms_high,
            low: status.bms_low,
            current_power: status.bms_current_power,
            target_power: status.bms_target_power,
            target_high: status.bms_target_high,
            target_low: status.bms_target_low,
        },
        run_status: RunStatus::from(status.run_status.as_str()),
        alarms: status.alarms.unwrap_or_default(),
        dc_output_status: status.dc_output_status,
        dc_output_fault_code: status.dc_output_fault_code,
        run_time_hours: status.run_time_hours,
        run_time_minutes: status.run_time_minutes,
        insulation: Insulation {
            resistance: status.insulation_resistance,
            status: status.insulation_status,
            fault: status.insulation_fault,
        },
        water_pump_speed: status.water_pump_speed,
        water_pump_active: status.water_pump_active,
        cooling_fan_speed: status.cooling_fan_speed,
        switches: SubSwitches {
            exhaust_open: status.exhaust_open,
            start_engaged: status.start,
            control_enabled: status.enable,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A frame shaped like the controller's status broadcast.
    pub(crate) fn sample_frame(relays: &[bool], enabled: bool) -> serde_json::Value {
        let relays: Vec<_> = relays
            .iter()
            .enumerate()
            .map(|(i, on)| json!({ "Name": format!("relay-{}", i), "On": on }))
            .collect();
        json!({
            "System": "FireflyIO",
            "Version": "1.2.3",
            "Relays": { "Relays": relays },
            "DigitalIn": { "Inputs": [
                { "Name": "door", "Pin": true },
                { "Name": "estop", "Pin": false }
            ]},
            "DigitalOut": { "Outputs": [
                { "Name": "output-0", "Pin": false },
                { "Name": "output-1", "Pin": true }
            ]},
            "Analog": { "Inputs": [
                { "Name": "tank", "Raw": 512, "Value": 12.3456789 }
            ]},
            "PanFuelCellStatus": {
                "H2Pressure": 612.25,
                "StackVolts": 48.125,
                "StackPower": 2400.0,
                "DCOutVolts": 54.1,
                "BMSTargetPower": 2.5,
                "RunStatus": "Standby",
                "Alarms": null,
                "DCOutputStatus": "Fault",
                "DCOutputFaultCode": "0x21",
                "Start": false,
                "ExhaustOpen": true,
                "Enable": enabled
            }
        })
    }

    pub(crate) fn sample_snapshot(relays: &[bool], enabled: bool) -> Snapshot {
        decode(&sample_frame(relays, enabled).to_string()).unwrap()
    }

    #[test]
    fn test_decode_full_frame() {
        let snapshot = sample_snapshot(&[false, true, false], true);

        assert_eq!(snapshot.system, "FireflyIO");
        assert_eq!(snapshot.version, "1.2.3");
        assert_eq!(snapshot.relays.len(), 3);
        assert_eq!(snapshot.relay(1), Some(true));
        assert_eq!(snapshot.relays[2].name, "relay-2");
        assert_eq!(snapshot.inputs[0].name, "door");
        assert!(snapshot.inputs[0].on);
        assert_eq!(snapshot.output(1), Some(true));
        assert_eq!(snapshot.fuel_cell.run_status, RunStatus::Standby);
        assert!(snapshot.fuel_cell.alarms.is_empty());
        assert!(snapshot.fuel_cell.switches.exhaust_open);
        assert!(!snapshot.fuel_cell.switches.start_engaged);
        assert!(snapshot.control_enabled());
        assert_eq!(snapshot.fuel_cell.stack.power, Some(2400.0));
        assert_eq!(snapshot.fuel_cell.dc_out.volts, 54.1);
        assert_eq!(snapshot.fuel_cell.dc_output_status, "Fault");
        assert_eq!(snapshot.fuel_cell.dc_output_fault_code, "0x21");
        assert!(snapshot.ac_measurements.is_empty());
    }

    #[test]
    fn test_decode_preserves_precision() {
        let snapshot = sample_snapshot(&[false], false);
        assert_eq!(snapshot.analog[0].value, 12.3456789);
        assert_eq!(snapshot.analog[0].raw, 512);
        assert_eq!(snapshot.fuel_cell.pressures.h2, 612.25);
        assert_eq!(snapshot.fuel_cell.stack.volts, 48.125);
    }

    #[test]
    fn test_decode_keeps_channel_positions() {
        let mut frame = sample_frame(&[false], false);
        frame["Relays"]["Relays"] = json!([
            { "Name": "zeta", "On": true },
            { "Name": "alpha", "On": false }
        ]);
        let snapshot = decode(&frame.to_string()).unwrap();

        assert_eq!(snapshot.relays[0].name, "zeta");
        assert_eq!(snapshot.relays[0].index, 0);
        assert_eq!(snapshot.relays[1].name, "alpha");
        assert_eq!(snapshot.relays[1].index, 1);
    }

    #[test]
    fn test_decode_flags_measurement_errors_independent_of_position() {
        let mut frame = sample_frame(&[false], false);
        frame["ACMeasurement"] = json!([
            { "Name": "meter-a", "Error": "sensor fault" },
            { "Name": "meter-b", "Volts": 230.4, "Amps": 1.25, "Power": 288.0, "Error": "" }
        ]);
        frame["DCMeasurement"] = json!([
            { "Name": "battery", "Volts": 52.1, "Amps": -3.5, "Power": -182.35, "Error": "" }
        ]);
        let snapshot = decode(&frame.to_string()).unwrap();

        let faulted = &snapshot.ac_measurements[0];
        assert_eq!(
            faulted.status,
            MeasurementStatus::Faulted("sensor fault".to_string())
        );
        let valid = &snapshot.ac_measurements[1];
        assert_eq!(valid.status, MeasurementStatus::Valid);
        assert_eq!(valid.volts, 230.4);
        assert_eq!(snapshot.dc_measurements[0].status, MeasurementStatus::Valid);
        assert_eq!(snapshot.dc_measurements[0].amps, -3.5);
    }

    #[test]
    fn test_decode_rejects_missing_required_fields() {
        for field in [
            "System",
            "Relays",
            "DigitalIn",
            "DigitalOut",
            "Analog",
            "PanFuelCellStatus",
        ] {
            let mut frame = sample_frame(&[true], true);
            frame.as_object_mut().unwrap().remove(field);
            let result = decode(&frame.to_string());
            assert!(
                matches!(result, Err(DecodeError::Malformed(_))),
                "missing {} should not decode",
                field
            );
        }
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        let mut frame = sample_frame(&[true], true);
        frame["Relays"] = json!(true);
        assert!(decode(&frame.to_string()).is_err());

        let mut frame = sample_frame(&[true], true);
        frame["PanFuelCellStatus"]["Enable"] = json!("yes");
        assert!(decode(&frame.to_string()).is_err());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(matches!(decode("   "), Err(DecodeError::Empty)));
        assert!(matches!(
            decode("<html>bad gateway</html>"),
            Err(DecodeError::Malformed(_))
        ));
    }
}
