//! Agreement models

use serde::{Deserialize, Serialize};

/// General information about one Toon display linked to the account.
///
/// The `agreement_id` is what every per-device call is scoped to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Agreement {
    pub agreement_id: String,
    pub agreement_id_checksum: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub heating_type: String,
    pub display_common_name: String,
    pub display_hardware_version: String,
    pub display_software_version: String,
    pub is_toon_solar: bool,
    pub is_toonly: bool,
}
