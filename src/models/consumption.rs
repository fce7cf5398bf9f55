//! Consumption flow and graph models

use serde::{Deserialize, Serialize};

/// Consumption values bucketed per interval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowData {
    pub hours: Vec<FlowDataValue>,
    pub days: Vec<FlowDataValue>,
    pub weeks: Vec<FlowDataValue>,
    pub months: Vec<FlowDataValue>,
    pub years: Vec<FlowDataValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowDataValue {
    pub timestamp: i64,
    pub unit: String,
    pub value: f64,
}

/// Electricity graph data, split into peak and off-peak tariffs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricityGraphData {
    pub hours: Vec<GraphData>,
    pub days: Vec<GraphData>,
    pub weeks: Vec<GraphData>,
    pub months: Vec<GraphData>,
    pub years: Vec<GraphData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphData {
    pub timestamp: i64,
    pub unit: String,
    pub peak: f64,
    pub off_peak: f64,
}
