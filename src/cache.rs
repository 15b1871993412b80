use crate::calendar::YearWindow;
use crate::error::{GhactError, Result};
use crate::model::ContributionsCollection;
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bumped whenever the `collections` layout changes; older files are rebuilt.
const CACHE_SCHEMA_VERSION: i64 = 2;

/// Which API and which credential a cached answer came from. Contribution
/// totals depend on both: another endpoint is another set of accounts, and
/// a token's scopes decide whether private work is counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheScope {
    pub endpoint: String,
    /// SHA-256 of the token; the token itself is never written to disk.
    pub credential: String,
}

impl CacheScope {
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_lowercase(),
            credential: token_fingerprint(token),
        }
    }
}

fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SQLite store of contribution collections for windows that can no longer change.
pub struct Cache {
    conn: Connection,
    scope: CacheScope,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_dir: P, scope: CacheScope) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        std::fs::create_dir_all(cache_dir)?;
        let conn = Connection::open(cache_dir.join("cache.db"))?;
        let mut cache = Self { conn, scope };
        cache.initialize()?;
        Ok(cache)
    }

    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("ghact"))
    }

    fn initialize(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version > CACHE_SCHEMA_VERSION {
            return Err(GhactError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                CACHE_SCHEMA_VERSION, user_version
            )));
        }
        if user_version != 0 && user_version < CACHE_SCHEMA_VERSION {
            debug!(from = user_version, to = CACHE_SCHEMA_VERSION, "rebuilding response cache");
            self.conn.execute_batch("DROP TABLE IF EXISTS collections;")?;
        }

        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS collections (
                endpoint TEXT NOT NULL,
                credential TEXT NOT NULL,
                login TEXT NOT NULL,
                range_from INTEGER NOT NULL,
                range_to INTEGER NOT NULL,
                payload TEXT NOT NULL,
                fetched_at INTEGER NOT NULL,
                PRIMARY KEY (endpoint, credential, login, range_from, range_to)
            );
            CREATE INDEX IF NOT EXISTS idx_collections_login ON collections(login);
            ",
        )?;
        self.conn
            .execute_batch(&format!("PRAGMA user_version = {CACHE_SCHEMA_VERSION};"))?;
        Ok(())
    }

    pub fn get_collection(&self, login: &str, window: &YearWindow) -> Result<Option<ContributionsCollection>> {
        let result = self.conn.query_row(
            "SELECT payload FROM collections
             WHERE endpoint = ? AND credential = ? AND login = ? AND range_from = ? AND range_to = ?",
            params![
                self.scope.endpoint,
                self.scope.credential,
                login.to_lowercase(),
                window.from.timestamp(),
                window.to.timestamp()
            ],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store_collection(
        &self,
        login: &str,
        window: &YearWindow,
        collection: &ContributionsCollection,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO collections
                (endpoint, credential, login, range_from, range_to, payload, fetched_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                self.scope.endpoint,
                self.scope.credential,
                login.to_lowercase(),
                window.from.timestamp(),
                window.to.timestamp(),
                serde_json::to_string(collection)?,
                Utc::now().timestamp()
            ],
        )?;
        Ok(())
    }

    /// Forget everything cached for `login` under any endpoint or token;
    /// returns the number of rows removed.
    pub fn clear_login(&self, login: &str) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM collections WHERE login = ?",
            params![login.to_lowercase()],
        )?;
        Ok(removed)
    }
}
