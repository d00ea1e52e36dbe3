//! Admin license management handlers.
//!
//! All routes sit behind the `admin_auth` middleware; by the time these run
//! the caller has already presented the admin key.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{Activation, CreateLicense, License};

/// Attempts at generating a non-colliding key before giving up. With 36^16
/// keys a second collision in a row already means something is badly wrong.
const KEY_GENERATION_ATTEMPTS: u32 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLicenseResponse {
    pub success: bool,
    pub license_key: String,
    pub expires_at: Option<i64>,
    pub max_activations: i32,
    pub metadata: serde_json::Value,
}

/// POST /admin/licenses
pub async fn create_license(
    State(state): State<AppState>,
    Json(input): Json<CreateLicense>,
) -> Result<Json<CreateLicenseResponse>> {
    let conn = state.db.get()?;

    for attempt in 0..KEY_GENERATION_ATTEMPTS {
        match queries::create_license(&conn, &input) {
            Ok(license) => {
                return Ok(Json(CreateLicenseResponse {
                    success: true,
                    license_key: license.license_key,
                    expires_at: license.expires_at,
                    max_activations: license.max_activations,
                    metadata: license.metadata,
                }))
            }
            Err(AppError::Conflict(_)) => {
                tracing::debug!(attempt, "License key collision, regenerating");
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::Internal(
        "could not generate a unique license key".into(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListLicensesQuery {
    /// Max results to return (default 50, max 200)
    pub limit: Option<i64>,
}

impl ListLicensesQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }
}

#[derive(Debug, Serialize)]
pub struct ListLicensesResponse {
    pub success: bool,
    pub licenses: Vec<License>,
}

/// GET /admin/licenses — newest first.
pub async fn list_licenses(
    State(state): State<AppState>,
    Query(query): Query<ListLicensesQuery>,
) -> Result<Json<ListLicensesResponse>> {
    let conn = state.db.get()?;
    let licenses = queries::list_licenses(&conn, query.limit())?;

    Ok(Json(ListLicensesResponse {
        success: true,
        licenses,
    }))
}

#[derive(Debug, Serialize)]
pub struct LicenseDetailResponse {
    pub success: bool,
    pub license: License,
    /// Most recent activations, newest first.
    pub activations: Vec<Activation>,
}

/// GET /admin/license/{license_key}
pub async fn get_license(
    State(state): State<AppState>,
    Path(license_key): Path<String>,
) -> Result<Json<LicenseDetailResponse>> {
    let conn = state.db.get()?;

    let license = queries::find_license(&conn, &license_key)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;
    let activations = queries::list_activations(&conn, &license_key, 10)?;

    Ok(Json(LicenseDetailResponse {
        success: true,
        license,
        activations,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /admin/deactivate/{license_key}
///
/// Terminal for `status`; the license record is retained, not deleted.
pub async fn deactivate_license(
    State(state): State<AppState>,
    Path(license_key): Path<String>,
) -> Result<Json<DeactivateResponse>> {
    let conn = state.db.get()?;

    let affected = queries::deactivate_license(&conn, &license_key)?;
    if affected == 0 {
        return Err(AppError::NotFound("License not found".into()));
    }

    Ok(Json(DeactivateResponse {
        success: true,
        message: "License deactivated.",
    }))
}
