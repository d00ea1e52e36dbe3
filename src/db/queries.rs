use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};

use crate::error::{AppError, Result};
use crate::keygen;
use crate::models::{Activation, CreateLicense, License, LicenseStatus, Validation};

use super::from_row::{query_all, query_one, ACTIVATION_COLS, LICENSE_COLS, VALIDATION_COLS};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Map a UNIQUE constraint violation to `AppError::Conflict` so callers can
/// distinguish a key collision from other database faults.
fn map_conflict(err: rusqlite::Error, what: &str) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            AppError::Conflict(format!("{} already exists", what))
        }
        _ => AppError::Database(err),
    }
}

// ============ Licenses ============

/// Create a license with a freshly generated key.
///
/// Fails with `AppError::Conflict` if the generated key collides with an
/// existing one; the caller retries with a new key.
pub fn create_license(conn: &Connection, input: &CreateLicense) -> Result<License> {
    let max_activations = input.max_activations.unwrap_or(1);
    if max_activations < 1 {
        return Err(AppError::BadRequest(
            "maxActivations must be at least 1".into(),
        ));
    }

    let license_key = keygen::generate();
    let metadata = input
        .metadata
        .clone()
        .unwrap_or(serde_json::Value::Object(Default::default()));
    let created_at = now();

    conn.execute(
        "INSERT INTO licenses (license_key, status, created_at, expires_at, activation_count, max_activations, metadata)
         VALUES (?1, 'active', ?2, ?3, 0, ?4, ?5)",
        params![
            &license_key,
            created_at,
            input.expires_at,
            max_activations,
            serde_json::to_string(&metadata)?,
        ],
    )
    .map_err(|e| map_conflict(e, "license key"))?;

    Ok(License {
        license_key,
        fingerprint: None,
        status: LicenseStatus::Active,
        created_at,
        expires_at: input.expires_at,
        activation_count: 0,
        max_activations,
        metadata,
    })
}

pub fn find_license(conn: &Connection, license_key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM licenses WHERE license_key = ?1",
            LICENSE_COLS
        ),
        &[&license_key],
    )
}

/// Bind a fingerprint to a license and count the activation.
///
/// Conditional on `fingerprint IS NULL` so two concurrent first activations
/// serialize: exactly one caller sees 1 affected row, the loser sees 0 and
/// must re-read the license and re-evaluate.
pub fn bind_fingerprint(conn: &Connection, license_key: &str, fingerprint: &str) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE licenses SET fingerprint = ?1, activation_count = activation_count + 1
         WHERE license_key = ?2 AND fingerprint IS NULL",
        params![fingerprint, license_key],
    )?;
    Ok(affected)
}

/// Set a license inactive. The record is retained, not deleted.
pub fn deactivate_license(conn: &Connection, license_key: &str) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE licenses SET status = 'inactive' WHERE license_key = ?1",
        params![license_key],
    )?;
    Ok(affected)
}

pub fn list_licenses(conn: &Connection, limit: i64) -> Result<Vec<License>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses ORDER BY created_at DESC, license_key DESC LIMIT ?1",
            LICENSE_COLS
        ),
        &[&limit],
    )
}

// ============ Audit rows ============

pub fn record_activation(
    conn: &Connection,
    license_key: &str,
    fingerprint: &str,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO activations (license_key, fingerprint, activated_at, ip_address, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![license_key, fingerprint, now(), ip_address, user_agent],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Record a validation attempt. The key is stored verbatim, whether or not
/// a license with that key exists.
pub fn record_validation(
    conn: &Connection,
    license_key: &str,
    fingerprint: &str,
    ip_address: Option<&str>,
    outcome: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO validations (license_key, fingerprint, validated_at, ip_address, outcome)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![license_key, fingerprint, now(), ip_address, outcome],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_activations(
    conn: &Connection,
    license_key: &str,
    limit: i64,
) -> Result<Vec<Activation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_key = ?1 ORDER BY activated_at DESC, id DESC LIMIT ?2",
            ACTIVATION_COLS
        ),
        &[&license_key, &limit],
    )
}

pub fn list_validations(
    conn: &Connection,
    license_key: &str,
    limit: i64,
) -> Result<Vec<Validation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM validations WHERE license_key = ?1 ORDER BY validated_at DESC, id DESC LIMIT ?2",
            VALIDATION_COLS
        ),
        &[&license_key, &limit],
    )
}

pub fn count_validations(conn: &Connection, license_key: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM validations WHERE license_key = ?1",
        params![license_key],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn count_activations(conn: &Connection, license_key: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM activations WHERE license_key = ?1",
        params![license_key],
        |row| row.get(0),
    )
    .map_err(Into::into)
}
