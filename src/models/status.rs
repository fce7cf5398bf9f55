//! Device status models

use serde::{Deserialize, Serialize};

/// Current thermostat, power, gas and device state of one display
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    pub thermostat_states: ThermostatStates,
    pub thermostat_info: ThermostatInfo,
    pub smoke_detectors: SmokeDetectors,
    pub device_config_info: DeviceConfigInfo,
    pub device_status_info: DeviceStatusInfo,
    pub power_usage: PowerUsage,
    pub gas_usage: GasUsage,
    pub last_update_from_display: i64,
    pub server_time: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatStates {
    #[serde(rename = "state")]
    pub states: Vec<ThermostatState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThermostatState {
    pub id: i64,
    pub temp_value: i64,
    pub dhw: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThermostatInfo {
    pub current_setpoint: i64,
    pub current_display_temp: i64,
    pub program_state: i64,
    pub active_state: i64,
    pub next_program: i64,
    pub next_state: i64,
    pub next_time: i64,
    pub next_setpoint: i64,
    pub error_found: i64,
    pub boiler_module_connected: i64,
    pub real_setpoint: i64,
    pub burner_info: String,
    pub ot_comm_error: String,
    pub current_modulation_level: i64,
    #[serde(rename = "haveOTBoiler")]
    pub have_ot_boiler: i64,
}

/// Smoke detector payloads are undocumented, so they are kept as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeDetectors {
    #[serde(rename = "device")]
    pub devices: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfigInfo {
    #[serde(rename = "device")]
    pub configs: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfig {
    #[serde(rename = "devUUID")]
    pub dev_uuid: String,
    pub dev_type: String,
    pub name: String,
    #[serde(rename = "flowGraphUuid")]
    pub flow_graph_uuid: String,
    #[serde(rename = "quantityGraphUuid")]
    pub quantity_graph_uuid: String,
    pub position: i64,
    pub in_switch_all: i64,
    pub in_switch_schedule: i64,
    pub switch_locked: String,
    pub usage_capable: String,
    pub current_state: String,
    pub rgb_color: String,
    pub zwuuid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatusInfo {
    #[serde(rename = "device")]
    pub status: Vec<DeviceStatus>,
    pub in_switch_all_total: InSwitchAllTotal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatus {
    #[serde(rename = "devUUID")]
    pub dev_uuid: String,
    pub name: String,
    pub current_usage: f64,
    pub day_usage: f64,
    pub avg_usage: f64,
    pub current_state: i64,
    pub is_connected: i64,
    pub network_health_state: serde_json::Value,
    pub rgb_color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InSwitchAllTotal {
    pub current_state: i64,
    pub current_usage: f64,
    pub day_usage: f64,
    pub avg_usage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerUsage {
    pub value: f64,
    pub day_cost: f64,
    pub value_produced: f64,
    pub day_cost_produced: f64,
    pub value_solar: f64,
    pub max_solar: f64,
    pub day_cost_solar: f64,
    pub avg_solar_value: f64,
    pub avg_value: f64,
    pub avg_day_value: f64,
    pub avg_produ_value: f64,
    pub avg_day_produ_value: f64,
    pub meter_reading: f64,
    pub meter_reading_low: f64,
    pub meter_reading_produ: f64,
    pub meter_reading_low_produ: f64,
    pub day_usage: f64,
    pub day_low_usage: f64,
    pub today_lowest_usage: f64,
    pub is_smart: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GasUsage {
    pub value: f64,
    pub day_cost: f64,
    pub avg_value: f64,
    pub meter_reading: f64,
    pub avg_day_value: f64,
    pub day_usage: f64,
    pub is_smart: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_partial_payload() {
        let json = r#"{
            "thermostatInfo": {"currentSetpoint": 2050, "currentDisplayTemp": 1987, "burnerInfo": "0"},
            "thermostatStates": {"state": [{"id": 0, "tempValue": 2000, "dhw": 1}]},
            "deviceConfigInfo": {"device": [{"devUUID": "abc", "name": "Plug"}]},
            "gasUsage": {"value": 12, "dayCost": 1.5, "isSmart": 1},
            "serverTime": 1571226000000
        }"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert_eq!(status.thermostat_info.current_setpoint, 2050);
        assert_eq!(status.thermostat_info.burner_info, "0");
        assert_eq!(status.thermostat_states.states.len(), 1);
        assert_eq!(status.thermostat_states.states[0].dhw, 1);
        assert_eq!(status.device_config_info.configs[0].dev_uuid, "abc");
        assert_eq!(status.gas_usage.is_smart, 1);
        assert_eq!(status.server_time, 1571226000000);
        assert!(status.smoke_detectors.devices.is_empty());
    }
}
