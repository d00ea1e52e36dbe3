use rusqlite::Connection;

/// Initialize the database schema.
///
/// Idempotent (CREATE IF NOT EXISTS throughout) and safe to run concurrently
/// from multiple instances.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;

        -- Licenses. The key itself is the identity; fingerprint is NULL
        -- until the first successful activation binds a device.
        CREATE TABLE IF NOT EXISTS licenses (
            license_key TEXT PRIMARY KEY,
            fingerprint TEXT,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            activation_count INTEGER NOT NULL DEFAULT 0,
            max_activations INTEGER NOT NULL DEFAULT 1,
            metadata TEXT NOT NULL DEFAULT '{}'
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_created ON licenses(created_at DESC);

        -- Activations (append-only): one row per successful activation call.
        CREATE TABLE IF NOT EXISTS activations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            license_key TEXT NOT NULL REFERENCES licenses(license_key),
            fingerprint TEXT NOT NULL,
            activated_at INTEGER NOT NULL,
            ip_address TEXT,
            user_agent TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_activations_key_time ON activations(license_key, activated_at DESC);

        -- Validations (append-only): one row per validation call, including
        -- lookups of keys that do not exist. No FK on license_key for that
        -- reason.
        CREATE TABLE IF NOT EXISTS validations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            license_key TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            validated_at INTEGER NOT NULL,
            ip_address TEXT,
            outcome TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_validations_key_time ON validations(license_key, validated_at DESC);
        "#,
    )?;
    Ok(())
}
