//! License lifecycle decision logic.
//!
//! Pure functions: given a loaded license (or its absence) and the request
//! fingerprint, decide the outcome. The caller applies the store mutation
//! and audit write; nothing here touches the database.
//!
//! Check order matters: status and expiry are evaluated before the
//! fingerprint checks, so an inactive or expired license never reports a
//! device mismatch even when one also exists.

use crate::models::{License, LicenseStatus};

/// Outcome of an activation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    /// First binding: set the fingerprint, increment activation_count,
    /// record an activation row.
    Activated,
    /// Same fingerprint already bound. Success, no license mutation.
    AlreadyActivated,
    InvalidKey,
    NotActive,
    Expired,
    DeviceMismatch,
    LimitExceeded,
}

impl ActivationDecision {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ActivationDecision::Activated | ActivationDecision::AlreadyActivated
        )
    }

    /// User-facing message for the activation response.
    pub fn message(&self) -> &'static str {
        match self {
            ActivationDecision::Activated | ActivationDecision::AlreadyActivated => {
                "License activated successfully."
            }
            ActivationDecision::InvalidKey => "Invalid license key.",
            ActivationDecision::NotActive => "License is not active.",
            ActivationDecision::Expired => "License has expired.",
            ActivationDecision::DeviceMismatch => {
                "License is already activated on another device."
            }
            ActivationDecision::LimitExceeded => "License activation limit exceeded.",
        }
    }
}

/// Outcome of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationDecision {
    Valid,
    InvalidKey,
    Inactive,
    Expired,
    FingerprintMismatch,
}

impl ValidationDecision {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationDecision::Valid)
    }

    /// Outcome tag written to the validations audit table.
    pub fn outcome(&self) -> &'static str {
        match self {
            ValidationDecision::Valid => "valid",
            ValidationDecision::InvalidKey => "invalid_key",
            ValidationDecision::Inactive => "inactive",
            ValidationDecision::Expired => "expired",
            ValidationDecision::FingerprintMismatch => "fingerprint_mismatch",
        }
    }

    /// Machine-readable reason for the validation response. None when valid.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            ValidationDecision::Valid => None,
            ValidationDecision::InvalidKey => Some("invalid_license_key"),
            ValidationDecision::Inactive => Some("license_inactive"),
            ValidationDecision::Expired => Some("license_expired"),
            ValidationDecision::FingerprintMismatch => Some("hardware_mismatch"),
        }
    }
}

/// Strictly greater: a license expiring at exactly `now` is still valid.
fn is_expired(expires_at: Option<i64>, now: i64) -> bool {
    matches!(expires_at, Some(t) if now > t)
}

/// Decide the outcome of an activation request. First match wins.
pub fn evaluate_activation(
    license: Option<&License>,
    fingerprint: &str,
    now: i64,
) -> ActivationDecision {
    let Some(license) = license else {
        return ActivationDecision::InvalidKey;
    };

    if license.status != LicenseStatus::Active {
        return ActivationDecision::NotActive;
    }

    if is_expired(license.expires_at, now) {
        return ActivationDecision::Expired;
    }

    match &license.fingerprint {
        Some(bound) if bound != fingerprint => ActivationDecision::DeviceMismatch,
        Some(_) => ActivationDecision::AlreadyActivated,
        None if license.activation_count >= license.max_activations => {
            ActivationDecision::LimitExceeded
        }
        None => ActivationDecision::Activated,
    }
}

/// Decide the outcome of a validation request. First match wins.
/// Validation never mutates the license; every call is audited by the caller.
pub fn evaluate_validation(
    license: Option<&License>,
    fingerprint: &str,
    now: i64,
) -> ValidationDecision {
    let Some(license) = license else {
        return ValidationDecision::InvalidKey;
    };

    if license.status != LicenseStatus::Active {
        return ValidationDecision::Inactive;
    }

    if is_expired(license.expires_at, now) {
        return ValidationDecision::Expired;
    }

    match &license.fingerprint {
        Some(bound) if bound != fingerprint => ValidationDecision::FingerprintMismatch,
        _ => ValidationDecision::Valid,
    }
}
