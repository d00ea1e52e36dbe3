use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Inactive,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for LicenseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LicenseStatus::Active),
            "inactive" => Ok(LicenseStatus::Inactive),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub license_key: String,
    /// Device the license is bound to. None until the first successful
    /// activation, immutable afterwards.
    pub fingerprint: Option<String>,
    pub status: LicenseStatus,
    pub created_at: i64,
    /// Unix timestamp; None = never expires.
    pub expires_at: Option<i64>,
    pub activation_count: i32,
    pub max_activations: i32,
    /// Open key-value attributes (e.g. `isTrial: true`).
    pub metadata: serde_json::Value,
}

impl License {
    /// Read the trial flag out of the metadata map.
    pub fn is_trial(&self) -> bool {
        self.metadata
            .get("isTrial")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLicense {
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub max_activations: Option<i32>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
