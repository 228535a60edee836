use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::version::error::CacheError;

/// Time-bounded storage for the latest release payload.
///
/// Entries hold the raw response body exactly as it was received. A missing
/// entry and an expired entry are indistinguishable to callers.
#[cfg_attr(test, automock)]
pub trait ReleaseStorer: Send + Sync {
    /// Returns the payload stored under `key` if it has not expired
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `payload` under `key`, replacing any existing entry and
    /// resetting its expiry to now + `ttl_ms`
    fn put(&self, key: &str, payload: &str, ttl_ms: i64) -> Result<(), CacheError>;

    /// Removes the entry under `key` regardless of its expiry
    fn purge(&self, key: &str) -> Result<(), CacheError>;
}

/// SQLite-backed release cache. A file database can be shared by several
/// processes; concurrent writers simply overwrite each other.
pub struct Cache {
    conn: Mutex<Connection>,
}

impl Cache {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");
        Self::with_connection(conn)
    }

    /// Cache that lives only as long as this process
    pub fn in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        let cache = Self {
            conn: Mutex::new(conn),
        };

        cache.create_schema()?;
        info!("Cache initialized successfully");

        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS releases (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }
}

impl ReleaseStorer for Cache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;

        let removed = conn.execute(
            "DELETE FROM releases WHERE cache_key = ?1 AND expires_at <= ?2",
            (key, now),
        )?;
        if removed > 0 {
            debug!("Cache entry {} expired", key);
        }

        let payload = conn
            .query_row(
                "SELECT payload FROM releases WHERE cache_key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(payload)
    }

    fn put(&self, key: &str, payload: &str, ttl_ms: i64) -> Result<(), CacheError> {
        let now = Self::current_timestamp_ms();
        let expires_at = now.saturating_add(ttl_ms.max(0));

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO releases (cache_key, payload, expires_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
            (key, payload, expires_at, now),
        )?;

        debug!("Cached {} bytes under {} for {}ms", payload.len(), key, ttl_ms);
        Ok(())
    }

    fn purge(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM releases WHERE cache_key = ?1", [key])?;

        info!("Purged cache entry {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const KEY: &str = "rm-github-plugin_updater";
    const PAYLOAD: &str = r#"{"tag_name":"v2.2.0","body":"Fixes"}"#;
    const ONE_HOUR_MS: i64 = 60 * 60 * 1000;

    fn create_cache() -> (TempDir, Cache) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let cache = Cache::new(&db_path).unwrap();
        (temp_dir, cache)
    }

    #[test]
    fn get_returns_none_for_missing_entry() {
        let (_temp_dir, cache) = create_cache();

        assert_eq!(cache.get(KEY).unwrap(), None);
    }

    #[test]
    fn put_then_get_returns_identical_payload() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, ONE_HOUR_MS).unwrap();

        assert_eq!(cache.get(KEY).unwrap(), Some(PAYLOAD.to_string()));
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, ONE_HOUR_MS).unwrap();
        cache.put(KEY, r#"{"tag_name":"v3.0.0"}"#, ONE_HOUR_MS).unwrap();

        assert_eq!(
            cache.get(KEY).unwrap(),
            Some(r#"{"tag_name":"v3.0.0"}"#.to_string())
        );
    }

    #[test]
    fn put_resets_expiry_of_existing_entry() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, 0).unwrap();
        cache.put(KEY, PAYLOAD, ONE_HOUR_MS).unwrap();

        assert_eq!(cache.get(KEY).unwrap(), Some(PAYLOAD.to_string()));
    }

    #[test]
    fn get_treats_expired_entry_as_missing() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, 0).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.get(KEY).unwrap(), None);
    }

    #[test]
    fn get_returns_entry_before_ttl_elapses_and_none_after() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, 100).unwrap();
        assert!(cache.get(KEY).unwrap().is_some());

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(cache.get(KEY).unwrap(), None);
    }

    #[test]
    fn purge_removes_unexpired_entry() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, ONE_HOUR_MS).unwrap();
        cache.purge(KEY).unwrap();

        assert_eq!(cache.get(KEY).unwrap(), None);
    }

    #[test]
    fn purge_of_missing_entry_is_ok() {
        let (_temp_dir, cache) = create_cache();

        assert!(cache.purge(KEY).is_ok());
    }

    #[test]
    fn entries_are_isolated_by_key() {
        let (_temp_dir, cache) = create_cache();

        cache.put(KEY, PAYLOAD, ONE_HOUR_MS).unwrap();
        cache.purge("other_updater").unwrap();

        assert_eq!(cache.get("other_updater").unwrap(), None);
        assert_eq!(cache.get(KEY).unwrap(), Some(PAYLOAD.to_string()));
    }

    #[test]
    fn entry_survives_reopening_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        Cache::new(&db_path)
            .unwrap()
            .put(KEY, PAYLOAD, ONE_HOUR_MS)
            .unwrap();

        let reopened = Cache::new(&db_path).unwrap();
        assert_eq!(reopened.get(KEY).unwrap(), Some(PAYLOAD.to_string()));
    }

    #[test]
    fn in_memory_cache_round_trips() {
        let cache = Cache::in_memory().unwrap();

        cache.put(KEY, PAYLOAD, ONE_HOUR_MS).unwrap();

        assert_eq!(cache.get(KEY).unwrap(), Some(PAYLOAD.to_string()));
    }
}
