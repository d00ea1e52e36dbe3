//! Audit trail writes.
//!
//! Every validation attempt and every successful activation call produce
//! exactly one durable row. The write happens after the lifecycle decision;
//! if it fails, the request still reports its decision and the failure goes
//! to operational logging only.

use rusqlite::Connection;

use crate::db::queries;

pub fn record_activation(
    conn: &Connection,
    license_key: &str,
    fingerprint: &str,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) {
    if let Err(e) = queries::record_activation(conn, license_key, fingerprint, ip_address, user_agent)
    {
        tracing::warn!(license_key, "Failed to write activation audit row: {}", e);
    }
}

pub fn record_validation(
    conn: &Connection,
    license_key: &str,
    fingerprint: &str,
    ip_address: Option<&str>,
    outcome: &str,
) {
    if let Err(e) = queries::record_validation(conn, license_key, fingerprint, ip_address, outcome)
    {
        tracing::warn!(license_key, outcome, "Failed to write validation audit row: {}", e);
    }
}
