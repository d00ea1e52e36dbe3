//! License validation handler.
//!
//! Validation is a read-only eligibility check. It never mutates the license
//! and every call, success or failure, leaves exactly one audit row.

use axum::{extract::State, http::HeaderMap, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::db::{queries, AppState};
use crate::error::Result;
use crate::extractors::Json;
use crate::lifecycle::evaluate_validation;
use crate::util::extract_request_info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub license_key: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// POST /validate
pub async fn validate_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ValidateRequest>,
) -> Result<(StatusCode, Json<ValidateResponse>)> {
    let (Some(license_key), Some(fingerprint)) = (&body.license_key, &body.fingerprint) else {
        // Client input error: no store access, no audit row.
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ValidateResponse {
                valid: false,
                reason: Some("missing_parameters"),
                expires: None,
                metadata: None,
            }),
        ));
    };

    let conn = state.db.get()?;
    let (ip_address, _) = extract_request_info(&headers);
    let now = Utc::now().timestamp();

    let license = queries::find_license(&conn, license_key)?;
    let decision = evaluate_validation(license.as_ref(), fingerprint, now);

    // Audited on every branch, even when the key does not exist.
    audit::record_validation(
        &conn,
        license_key,
        fingerprint,
        ip_address.as_deref(),
        decision.outcome(),
    );

    if decision.is_valid() {
        let license = license
            .ok_or_else(|| crate::error::AppError::Internal("license vanished during validation".into()))?;
        return Ok((
            StatusCode::OK,
            Json(ValidateResponse {
                valid: true,
                reason: None,
                expires: license.expires_at,
                metadata: Some(license.metadata),
            }),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(ValidateResponse {
            valid: false,
            reason: decision.reason(),
            expires: None,
            metadata: None,
        }),
    ))
}
