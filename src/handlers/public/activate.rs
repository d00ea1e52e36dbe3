//! License activation handler.
//!
//! Activation binds a license to a device fingerprint. The first successful
//! call sets the fingerprint and counts the activation; repeat calls from the
//! same device succeed idempotently without mutating the license.

use axum::{extract::State, http::HeaderMap, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::lifecycle::{evaluate_activation, ActivationDecision};
use crate::util::extract_request_info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub license_key: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trial: Option<bool>,
}

impl ActivateResponse {
    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            expires: None,
            is_trial: None,
        }
    }
}

/// POST /activate
///
/// Lifecycle rejections are normal 200 responses with `success: false`;
/// only missing input (400) and store faults (500) use error statuses.
pub async fn activate_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivateRequest>,
) -> Result<(StatusCode, Json<ActivateResponse>)> {
    let (Some(license_key), Some(fingerprint)) = (&body.license_key, &body.fingerprint) else {
        // Client input error: no store access, no audit row.
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ActivateResponse::rejected(
                "License key and fingerprint are required.",
            )),
        ));
    };

    let conn = state.db.get()?;
    let (ip_address, user_agent) = extract_request_info(&headers);
    let now = Utc::now().timestamp();

    let mut license = queries::find_license(&conn, license_key)?;
    let mut decision = evaluate_activation(license.as_ref(), fingerprint, now);

    if decision == ActivationDecision::Activated {
        let affected = queries::bind_fingerprint(&conn, license_key, fingerprint)?;
        if affected == 0 {
            // Lost the first-binding race. The winner may have bound the same
            // fingerprint, so re-read and re-evaluate instead of failing.
            license = queries::find_license(&conn, license_key)?;
            decision = evaluate_activation(license.as_ref(), fingerprint, now);
            if decision == ActivationDecision::Activated {
                return Err(AppError::Internal(
                    "fingerprint binding did not settle after conflict".into(),
                ));
            }
        }
    }

    if decision.is_success() {
        audit::record_activation(
            &conn,
            license_key,
            fingerprint,
            ip_address.as_deref(),
            user_agent.as_deref(),
        );

        let license = license
            .ok_or_else(|| AppError::Internal("license vanished during activation".into()))?;
        return Ok((
            StatusCode::OK,
            Json(ActivateResponse {
                success: true,
                message: decision.message().to_string(),
                expires: license.expires_at,
                is_trial: Some(license.is_trial()),
            }),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(ActivateResponse::rejected(decision.message())),
    ))
}
