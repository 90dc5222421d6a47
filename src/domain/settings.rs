// Static device configuration as served by /getSettings
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeviceSettings {
    pub name: String,
    pub analog_channels: Vec<AnalogChannelSettings>,
    pub digital_inputs: Vec<PortName>,
    pub digital_outputs: Vec<PortName>,
    pub relays: Vec<PortName>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct PortName {
    pub name: String,
    pub port: u8,
}

/// Two-point calibration mapping A/D counts to engineering units.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnalogChannelSettings {
    pub name: String,
    pub port: u8,
    pub lower_calibration_actual: f64,
    #[serde(rename = "LowerCalibrationAtoD")]
    pub lower_calibration_a_to_d: u16,
    pub upper_calibration_actual: f64,
    #[serde(rename = "UpperCalibrationAtoD")]
    pub upper_calibration_a_to_d: u16,
}
