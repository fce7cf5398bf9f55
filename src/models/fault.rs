//! Vendor error envelope

use serde::{Deserialize, Serialize};

/// Body of every non-200 response from the resource API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub fault: Fault,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(default)]
    pub faultstring: String,
    #[serde(default)]
    pub detail: FaultDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultDetail {
    #[serde(default)]
    pub errorcode: String,
}
