//! Agreements and device status

use crate::error::ApiError;
use crate::models::{Agreement, Status};

use super::client::ToonClient;
use super::endpoints::{AGREEMENTS, STATUS};

impl ToonClient {
    /// Agreements (one per display) associated with the logged-in customer.
    /// The agreement id scopes every other call.
    pub async fn get_agreements(&self) -> Result<Vec<Agreement>, ApiError> {
        self.get(&self.url(AGREEMENTS, &[], None)).await
    }

    /// Current power and gas usage, thermostat state and programs, and connected devices.
    pub async fn get_status(&self, agreement_id: &str) -> Result<Status, ApiError> {
        self.get(&self.url(STATUS, &[], Some(agreement_id))).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::api::client::{ApiSettings, ToonClient};
    use crate::auth::Authenticator;
    use crate::test_support::{auth_config, MockToon};

    #[tokio::test]
    async fn test_status_decodes() {
        let mock = MockToon::spawn().await;
        mock.state.push_resource(
            200,
            r#"{"thermostatInfo":{"currentSetpoint":1950},"powerUsage":{"value":412,"isSmart":1}}"#,
        );
        let auth = Authenticator::new(auth_config(&mock.base)).unwrap();
        let client = ToonClient::new(
            auth,
            ApiSettings {
                base: mock.api_base(),
                timeout: Duration::from_secs(5),
                gate_ceiling: Duration::from_secs(1),
            },
        )
        .unwrap();

        let status = client.get_status("A-1").await.unwrap();
        assert_eq!(status.thermostat_info.current_setpoint, 1950);
        assert_eq!(status.power_usage.value, 412.0);
        assert_eq!(mock.state.resource_requests()[0].0, "/toon/v3/A-1/status");
    }
}
