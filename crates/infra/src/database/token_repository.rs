//! SQLite-backed token store.
//!
//! Implements the `TokenStore` trait over the singleton `token_record` row.
//! The connection pool behind the store is opened lazily on first use and
//! reused for the lifetime of the process; all SQL runs in `spawn_blocking`
//! to avoid blocking the async runtime.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use leadlink_common::auth::{TokenPatch, TokenRecord, TokenStore};
use leadlink_domain::{DatabaseConfig, LeadLinkError, Result as DomainResult};
use rusqlite::{params, Connection};
use tokio::sync::OnceCell;
use tokio::task;
use tracing::debug;

use super::manager::DbManager;

/// SQLite-backed store for the single OAuth token record.
///
/// Connecting is idempotent: the first caller builds the pool and runs
/// migrations, every later call reuses the same live handle. Across
/// processes sharing one database file there is no coordination beyond
/// SQLite's own write serialization; `save` is last-write-wins, so a
/// delayed refresh from another process can overwrite a newer token.
pub struct SqliteTokenStore {
    config: DatabaseConfig,
    db: OnceCell<Arc<DbManager>>,
}

impl SqliteTokenStore {
    /// Create a store for the configured database.
    ///
    /// No connection is opened until first use.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config, db: OnceCell::new() }
    }

    /// Open (or reuse) the underlying connection pool.
    pub async fn connect(&self) -> DomainResult<Arc<DbManager>> {
        self.db
            .get_or_try_init(|| async {
                let config = self.config.clone();
                let manager = task::spawn_blocking(move || -> DomainResult<DbManager> {
                    let manager = DbManager::new(&config.path, config.pool_size)?;
                    manager.run_migrations()?;
                    Ok(manager)
                })
                .await
                .map_err(map_join_error)??;

                debug!(db_path = %self.config.path, "token store connected");
                Ok(Arc::new(manager))
            })
            .await
            .cloned()
    }

    async fn load_record(&self) -> DomainResult<Option<TokenRecord>> {
        let db = self.connect().await?;

        task::spawn_blocking(move || -> DomainResult<Option<TokenRecord>> {
            let conn = db.get_connection()?;
            query_record(&conn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_patch(&self, patch: TokenPatch) -> DomainResult<()> {
        let db = self.connect().await?;

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_record(&conn, &patch)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, String> {
        self.load_record().await.map_err(|e| e.to_string())
    }

    async fn save(&self, patch: &TokenPatch) -> Result<(), String> {
        self.save_patch(patch.clone()).await.map_err(|e| e.to_string())
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

/// Read the singleton record. Returns `None` when no row has been written.
fn query_record(conn: &Connection) -> DomainResult<Option<TokenRecord>> {
    let row = conn.query_row(
        "SELECT access_token, refresh_token, expires_at FROM token_record WHERE id = 1",
        params![],
        |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        },
    );

    match row {
        Ok((access_token, refresh_token, expires_at)) => Ok(Some(TokenRecord {
            access_token,
            refresh_token,
            expires_at: expires_at.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(LeadLinkError::Database(e.to_string())),
    }
}

/// Apply the patch as a single upsert.
///
/// `None` fields keep their stored value via COALESCE; the whole patch lands
/// in one statement, so a record never mixes fields from two refresh cycles.
fn upsert_record(conn: &Connection, patch: &TokenPatch) -> DomainResult<()> {
    let now = Utc::now().timestamp();

    conn.execute(
        "INSERT INTO token_record (id, access_token, refresh_token, expires_at, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            access_token  = COALESCE(excluded.access_token, token_record.access_token),
            refresh_token = COALESCE(excluded.refresh_token, token_record.refresh_token),
            expires_at    = COALESCE(excluded.expires_at, token_record.expires_at),
            updated_at    = excluded.updated_at",
        params![
            patch.access_token,
            patch.refresh_token,
            patch.expires_at.map(|dt| dt.timestamp()),
            now
        ],
    )
    .map_err(|e| LeadLinkError::Database(e.to_string()))?;

    Ok(())
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map JoinError from spawn_blocking to LeadLinkError.
fn map_join_error(err: task::JoinError) -> LeadLinkError {
    if err.is_cancelled() {
        LeadLinkError::Internal("blocking task cancelled".into())
    } else {
        LeadLinkError::Internal(format!("blocking task failed: {err}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
