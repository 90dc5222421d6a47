// Telemetry snapshot domain models

/// One decoded telemetry payload. Replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub system: String,
    pub version: String,
    pub relays: Vec<SwitchReading>,
    pub inputs: Vec<SwitchReading>,
    pub outputs: Vec<SwitchReading>,
    pub analog: Vec<AnalogReading>,
    pub ac_measurements: Vec<AcMeasurement>,
    pub dc_measurements: Vec<DcMeasurement>,
    pub fuel_cell: FuelCellStatus,
}

impl Snapshot {
    pub fn relay(&self, index: usize) -> Option<bool> {
        self.relays.get(index).map(|r| r.on)
    }

    pub fn output(&self, index: usize) -> Option<bool> {
        self.outputs.get(index).map(|o| o.on)
    }

    /// The enabling gate for user-issued toggles.
    pub fn control_enabled(&self) -> bool {
        self.fuel_cell.switches.control_enabled
    }
}

/// A binary channel: relay, digital input or digital output.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchReading {
    pub index: usize,
    pub name: String,
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalogReading {
    pub index: usize,
    pub name: String,
    pub raw: u32,
    pub value: f64,
}

/// Health of a measurement device; an empty error string on the wire means healthy.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementStatus {
    Valid,
    Faulted(String),
}

impl MeasurementStatus {
    pub fn from_error(error: String) -> Self {
        if error.is_empty() {
            Self::Valid
        } else {
            Self::Faulted(error)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcMeasurement {
    pub index: usize,
    pub name: String,
    pub volts: f64,
    pub amps: f64,
    pub power: f64,
    pub watt_hours: f64,
    pub frequency: f64,
    pub power_factor: f64,
    pub status: MeasurementStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DcMeasurement {
    pub index: usize,
    pub name: String,
    pub volts: f64,
    pub amps: f64,
    pub power: f64,
    pub status: MeasurementStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelCellStatus {
    pub pressures: Pressures,
    pub temperatures: Temperatures,
    pub stack: ElectricalReading,
    pub dc_in: ElectricalReading,
    pub dc_out: ElectricalReading,
    pub air_flow: f64,
    pub battery: BatteryManagement,
    pub run_status: RunStatus,
    pub alarms: Vec<String>,
    pub dc_output_status: String,
    pub dc_output_fault_code: String,
    pub run_time_hours: u32,
    pub run_time_minutes: u32,
    pub insulation: Insulation,
    pub water_pump_speed: u32,
    pub water_pump_active: bool,
    pub cooling_fan_speed: u32,
    pub switches: SubSwitches,
}

/// Pressures in mbar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pressures {
    pub h2: f64,
    pub air: f64,
    pub coolant: f64,
    pub h2_air_diff: f64,
}

/// Temperatures in degrees Celsius.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Temperatures {
    pub coolant_inlet: f64,
    pub coolant_outlet: f64,
    pub air: f64,
    pub ambient: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectricalReading {
    pub volts: f64,
    pub amps: f64,
    /// Only reported for the stack.
    pub power: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryManagement {
    pub power: f64,
    pub high: f64,
    pub low: f64,
    pub current_power: f64,
    pub target_power: f64,
    pub target_high: f64,
    pub target_low: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insulation {
    pub resistance: u32,
    pub status: String,
    pub fault: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubSwitches {
    pub exhaust_open: bool,
    pub start_engaged: bool,
    pub control_enabled: bool,
}

/// Power-mode state reported by the fuel cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Off,
    Standby,
    HydrogenIntake,
    Start,
    AirPurge,
    HydrogenLeakCheck,
    Manual,
    EmergencyStop,
    Fault,
    Shutdown,
    Unknown(String),
}

impl From<&str> for RunStatus {
    fn from(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "off" => Self::Off,
            "standby" => Self::Standby,
            "hydrogen intake" => Self::HydrogenIntake,
            "start" => Self::Start,
            "airpurge" | "air purge" => Self::AirPurge,
            "hydrogen leak check" => Self::HydrogenLeakCheck,
            "manual" => Self::Manual,
            "emergency stop" => Self::EmergencyStop,
            "fault" => Self::Fault,
            "shutdown" => Self::Shutdown,
            _ => Self::Unknown(text.to_string()),
        }
    }
}

impl RunStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Off => "Off",
            Self::Standby => "Standby",
            Self::HydrogenIntake => "Hydrogen intake",
            Self::Start => "Start",
            Self::AirPurge => "AirPurge",
            Self::HydrogenLeakCheck => "Hydrogen leak check",
            Self::Manual => "manual",
            Self::EmergencyStop => "emergency stop",
            Self::Fault => "fault",
            Self::Shutdown => "shutdown",
            Self::Unknown(text) => text,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::EmergencyStop | Self::Fault)
    }
}
