use serde::{Deserialize, Serialize};

/// One row per successful activation call, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub id: i64,
    pub license_key: String,
    pub fingerprint: String,
    pub activated_at: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One row per validation call, success or failure, append-only.
///
/// The license key is recorded verbatim even when no such license exists,
/// so failed lookups leave a trail too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub id: i64,
    pub license_key: String,
    pub fingerprint: String,
    pub validated_at: i64,
    pub ip_address: Option<String>,
    /// Outcome tag: `valid`, `invalid_key`, `inactive`, `expired`,
    /// `fingerprint_mismatch`.
    pub outcome: String,
}
