//! Gas, electricity and district heat consumption
//!
//! Flows are 5-minute samples; graph data is bucketed by [`Interval`].
//! Without a time range the server returns the last 24 hours.

use crate::error::ApiError;
use crate::models::{ElectricityGraphData, FlowData};

use super::client::ToonClient;
use super::endpoints::{
    time_params, Interval, TimeRange, DISTRICT_HEAT_DATA, ELECTRICITY_DATA, ELECTRICITY_FLOWS,
    GAS_DATA, GAS_FLOWS,
};

impl ToonClient {
    pub async fn get_gas_flow_data(
        &self,
        agreement_id: &str,
        range: TimeRange,
    ) -> Result<FlowData, ApiError> {
        let params = time_params(range, Interval::None);
        self.get(&self.url(GAS_FLOWS, &params, Some(agreement_id)))
            .await
    }

    pub async fn get_gas_graph_data(
        &self,
        agreement_id: &str,
        range: TimeRange,
        interval: Interval,
    ) -> Result<FlowData, ApiError> {
        let params = time_params(range, interval);
        self.get(&self.url(GAS_DATA, &params, Some(agreement_id)))
            .await
    }

    /// Electricity flows come back under `hours`.
    pub async fn get_electricity_flow_data(
        &self,
        agreement_id: &str,
        range: TimeRange,
    ) -> Result<FlowData, ApiError> {
        let params = time_params(range, Interval::None);
        self.get(&self.url(ELECTRICITY_FLOWS, &params, Some(agreement_id)))
            .await
    }

    pub async fn get_electricity_graph_data(
        &self,
        agreement_id: &str,
        range: TimeRange,
        interval: Interval,
    ) -> Result<ElectricityGraphData, ApiError> {
        let params = time_params(range, interval);
        self.get(&self.url(ELECTRICITY_DATA, &params, Some(agreement_id)))
            .await
    }

    pub async fn get_district_heat_graph_data(
        &self,
        agreement_id: &str,
        range: TimeRange,
        interval: Interval,
    ) -> Result<FlowData, ApiError> {
        let params = time_params(range, interval);
        self.get(&self.url(DISTRICT_HEAT_DATA, &params, Some(agreement_id)))
            .await
    }
}
