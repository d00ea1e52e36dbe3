//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::{Activation, License, LicenseStatus, Validation};

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const LICENSE_COLS: &str = "license_key, fingerprint, status, created_at, expires_at, activation_count, max_activations, metadata";

pub const ACTIVATION_COLS: &str =
    "id, license_key, fingerprint, activated_at, ip_address, user_agent";

pub const VALIDATION_COLS: &str =
    "id, license_key, fingerprint, validated_at, ip_address, outcome";

// ============ FromRow Implementations ============

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: LicenseStatus = row.get::<_, String>(2)?.parse().map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                2,
                "status".to_string(),
                rusqlite::types::Type::Text,
            )
        })?;
        let metadata_str: String = row.get(7)?;
        Ok(License {
            license_key: row.get(0)?,
            fingerprint: row.get(1)?,
            status,
            created_at: row.get(3)?,
            expires_at: row.get(4)?,
            activation_count: row.get(5)?,
            max_activations: row.get(6)?,
            metadata: serde_json::from_str(&metadata_str)
                .unwrap_or(serde_json::Value::Object(Default::default())),
        })
    }
}

impl FromRow for Activation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activation {
            id: row.get(0)?,
            license_key: row.get(1)?,
            fingerprint: row.get(2)?,
            activated_at: row.get(3)?,
            ip_address: row.get(4)?,
            user_agent: row.get(5)?,
        })
    }
}

impl FromRow for Validation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Validation {
            id: row.get(0)?,
            license_key: row.get(1)?,
            fingerprint: row.get(2)?,
            validated_at: row.get(3)?,
            ip_address: row.get(4)?,
            outcome: row.get(5)?,
        })
    }
}
