//! License store operation tests

#[path = "common/mod.rs"]
mod common;
use common::*;

use keymint::error::AppError;

// ============ Creation & lookup ============

#[test]
fn test_create_license_defaults() {
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    assert_eq!(license.status, LicenseStatus::Active);
    assert_eq!(license.activation_count, 0);
    assert_eq!(license.max_activations, 1);
    assert!(license.fingerprint.is_none());
    assert!(license.expires_at.is_none());
    assert!(license.metadata.as_object().unwrap().is_empty());
}

#[test]
fn test_create_license_rejects_zero_max_activations() {
    let conn = setup_test_db();
    let input = CreateLicense {
        expires_at: None,
        max_activations: Some(0),
        metadata: None,
    };

    let err = queries::create_license(&conn, &input).unwrap_err();
    assert!(
        matches!(err, AppError::BadRequest(_)),
        "maxActivations below 1 should be a bad request, got {:?}",
        err
    );
}

#[test]
fn test_find_license_roundtrip() {
    let conn = setup_test_db();
    let created = create_test_license_with_metadata(
        &conn,
        Some(future_timestamp(30)),
        3,
        serde_json::json!({ "isTrial": true, "plan": "pro" }),
    );

    let found = queries::find_license(&conn, &created.license_key)
        .expect("Query failed")
        .expect("License should exist");

    assert_eq!(found.license_key, created.license_key);
    assert_eq!(found.expires_at, created.expires_at);
    assert_eq!(found.max_activations, 3);
    assert_eq!(found.metadata["isTrial"], serde_json::json!(true));
    assert!(found.is_trial());
}

#[test]
fn test_find_unknown_license_is_absent() {
    let conn = setup_test_db();
    let found = queries::find_license(&conn, "NOPE-NOPE-NOPE-NOPE").expect("Query failed");
    assert!(found.is_none());
}

#[test]
fn test_duplicate_key_is_conflict() {
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    // Force a collision by inserting the same key directly.
    let err = conn
        .execute(
            "INSERT INTO licenses (license_key, status, created_at, activation_count, max_activations, metadata)
             VALUES (?1, 'active', 0, 0, 1, '{}')",
            rusqlite::params![&license.license_key],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    ));
}

// ============ Fingerprint binding ============

#[test]
fn test_bind_fingerprint_sets_and_counts() {
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    let affected = queries::bind_fingerprint(&conn, &license.license_key, "abc").unwrap();
    assert_eq!(affected, 1, "first binding should affect one row");

    let bound = queries::find_license(&conn, &license.license_key)
        .unwrap()
        .unwrap();
    assert_eq!(bound.fingerprint.as_deref(), Some("abc"));
    assert_eq!(bound.activation_count, 1, "binding counts exactly once");
}

#[test]
fn test_bind_fingerprint_race_exactly_one_winner() {
    // The classic race: two callers both saw fingerprint unset. The
    // conditional update serializes them; the loser must re-read and
    // re-evaluate rather than assume failure.
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    let first = queries::bind_fingerprint(&conn, &license.license_key, "abc").unwrap();
    let second = queries::bind_fingerprint(&conn, &license.license_key, "xyz").unwrap();

    assert_eq!(first, 1, "winner binds");
    assert_eq!(second, 0, "loser affects zero rows");

    let after = queries::find_license(&conn, &license.license_key)
        .unwrap()
        .unwrap();
    assert_eq!(after.fingerprint.as_deref(), Some("abc"));
    assert_eq!(after.activation_count, 1, "count ends at 1, not 2");

    // Loser with a different fingerprint re-evaluates to DeviceMismatch...
    assert_eq!(
        evaluate_activation(Some(&after), "xyz", now()),
        ActivationDecision::DeviceMismatch
    );
    // ...but a loser with the winner's fingerprint gets idempotent success.
    assert_eq!(
        evaluate_activation(Some(&after), "abc", now()),
        ActivationDecision::AlreadyActivated
    );
}

// ============ Deactivation ============

#[test]
fn test_deactivate_license_keeps_record() {
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    let affected = queries::deactivate_license(&conn, &license.license_key).unwrap();
    assert_eq!(affected, 1);

    let after = queries::find_license(&conn, &license.license_key)
        .unwrap()
        .expect("deactivation retains the record");
    assert_eq!(after.status, LicenseStatus::Inactive);
}

#[test]
fn test_deactivate_unknown_license_affects_nothing() {
    let conn = setup_test_db();
    let affected = queries::deactivate_license(&conn, "NOPE-NOPE-NOPE-NOPE").unwrap();
    assert_eq!(affected, 0);
}

// ============ Listing ============

#[test]
fn test_list_licenses_newest_first() {
    let conn = setup_test_db();
    let a = create_test_license(&conn, None, 1);
    let b = create_test_license(&conn, None, 1);
    let c = create_test_license(&conn, None, 1);

    // All three share a created_at second; make the ordering observable.
    conn.execute(
        "UPDATE licenses SET created_at = created_at - 20 WHERE license_key = ?1",
        rusqlite::params![&a.license_key],
    )
    .unwrap();
    conn.execute(
        "UPDATE licenses SET created_at = created_at - 10 WHERE license_key = ?1",
        rusqlite::params![&b.license_key],
    )
    .unwrap();

    let listed = queries::list_licenses(&conn, 50).unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].license_key, c.license_key);
    assert_eq!(listed[1].license_key, b.license_key);
    assert_eq!(listed[2].license_key, a.license_key);
}

#[test]
fn test_list_licenses_respects_limit() {
    let conn = setup_test_db();
    for _ in 0..5 {
        create_test_license(&conn, None, 1);
    }

    let listed = queries::list_licenses(&conn, 2).unwrap();
    assert_eq!(listed.len(), 2);
}

// ============ Audit rows ============

#[test]
fn test_record_activation_roundtrip() {
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    let id = queries::record_activation(
        &conn,
        &license.license_key,
        "abc",
        Some("203.0.113.7"),
        Some("keymint-test/1.0"),
    )
    .unwrap();
    assert!(id > 0);

    let rows = queries::list_activations(&conn, &license.license_key, 10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fingerprint, "abc");
    assert_eq!(rows[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(rows[0].user_agent.as_deref(), Some("keymint-test/1.0"));
}

#[test]
fn test_list_activations_newest_first_with_limit() {
    let conn = setup_test_db();
    let license = create_test_license(&conn, None, 1);

    for i in 0..4 {
        queries::record_activation(&conn, &license.license_key, "abc", None, None).unwrap();
        conn.execute(
            "UPDATE activations SET activated_at = ?1 WHERE id = (SELECT MAX(id) FROM activations)",
            rusqlite::params![1000 + i],
        )
        .unwrap();
    }

    let rows = queries::list_activations(&conn, &license.license_key, 3).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].activated_at, 1003, "newest first");
    assert_eq!(rows[2].activated_at, 1001);
}

#[test]
fn test_record_validation_tolerates_unknown_key() {
    // Failed lookups are audited too; the key may not exist as a license.
    let conn = setup_test_db();

    let id = queries::record_validation(
        &conn,
        "GONE-GONE-GONE-GONE",
        "abc",
        None,
        "invalid_key",
    )
    .unwrap();
    assert!(id > 0);

    let rows = queries::list_validations(&conn, "GONE-GONE-GONE-GONE", 10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].outcome, "invalid_key");
}
