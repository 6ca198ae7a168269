//! SQLite store backed by sqlx.

use crate::error::{ReplaceError, StoreError};
use crate::records::{ClaimRecord, CredentialRecord, Upsert};
use crate::{ClaimStore, CredentialStore, check_ownership};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct CredentialRow {
    username: String,
    clientid: String,
    timestamp: i64,
}

impl TryFrom<CredentialRow> for CredentialRecord {
    type Error = StoreError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(CredentialRecord {
            username: row.username,
            client_id: parse_client_id(&row.clientid)?,
            timestamp: row.timestamp,
        })
    }
}

#[derive(Debug, FromRow)]
struct ClaimRow {
    clientid: String,
    endpoint: String,
    method: String,
}

impl TryFrom<ClaimRow> for ClaimRecord {
    type Error = StoreError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(ClaimRecord {
            client_id: parse_client_id(&row.clientid)?,
            endpoint: row.endpoint,
            method: row.method,
        })
    }
}

fn parse_client_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Corrupt(format!("clientid {raw:?}: {e}")))
}

/// Credential and claim store in a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path` and migrate it.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        ensure_parent_dir(path)?;
        let options = SqliteConnectOptions::from_str(&sqlite_url(path))?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        tracing::info!(path, "opened credential database");
        Self::from_pool(pool).await
    }

    /// A private in-memory database. It lives exactly as long as its single
    /// connection, so that connection is never recycled.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_client_id(
        &self,
        client_id: Uuid,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        sqlx::query_as::<_, CredentialRow>(
            "SELECT username, clientid, timestamp FROM credentials WHERE clientid = ?",
        )
        .bind(client_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(CredentialRecord::try_from)
        .transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        sqlx::query_as::<_, CredentialRow>(
            "SELECT username, clientid, timestamp FROM credentials WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(CredentialRecord::try_from)
        .transpose()
    }

    async fn upsert(&self, record: CredentialRecord) -> Result<Upsert, StoreError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<(String,)> =
            sqlx::query_as("SELECT clientid FROM credentials WHERE username = ?")
                .bind(&record.username)
                .fetch_optional(&mut *tx)
                .await?;

        let written = match &previous {
            Some(_) => {
                sqlx::query("UPDATE credentials SET clientid = ?, timestamp = ? WHERE username = ?")
                    .bind(record.client_id.to_string())
                    .bind(record.timestamp)
                    .bind(&record.username)
                    .execute(&mut *tx)
                    .await
            }
            None => {
                sqlx::query(
                    "INSERT INTO credentials (username, clientid, timestamp) VALUES (?, ?, ?)",
                )
                .bind(&record.username)
                .bind(record.client_id.to_string())
                .bind(record.timestamp)
                .execute(&mut *tx)
                .await
            }
        };
        written.map_err(constraint_or_database)?;
        tx.commit().await?;

        match previous {
            Some((raw,)) => Ok(Upsert::Replaced {
                previous: parse_client_id(&raw)?,
            }),
            None => Ok(Upsert::Created),
        }
    }
}

#[async_trait]
impl ClaimStore for SqliteStore {
    async fn find_claims(&self, client_id: Uuid) -> Result<Vec<ClaimRecord>, StoreError> {
        sqlx::query_as::<_, ClaimRow>(
            "SELECT clientid, endpoint, method FROM endpoints WHERE clientid = ? ORDER BY position",
        )
        .bind(client_id.to_string())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ClaimRecord::try_from)
        .collect()
    }

    async fn replace_claims(
        &self,
        client_id: Uuid,
        claims: Vec<ClaimRecord>,
    ) -> Result<(), ReplaceError> {
        check_ownership(client_id, &claims).map_err(ReplaceError::Create)?;

        // Dropping `tx` on any early return rolls the delete back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ReplaceError::Delete(e.into()))?;

        sqlx::query("DELETE FROM endpoints WHERE clientid = ?")
            .bind(client_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| ReplaceError::Delete(e.into()))?;

        for (position, claim) in claims.iter().enumerate() {
            sqlx::query(
                "INSERT INTO endpoints (clientid, position, endpoint, method) VALUES (?, ?, ?, ?)",
            )
            .bind(client_id.to_string())
            .bind(position as i64)
            .bind(&claim.endpoint)
            .bind(&claim.method)
            .execute(&mut *tx)
            .await
            .map_err(|e| ReplaceError::Create(constraint_or_database(e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| ReplaceError::Create(e.into()))?;
        tracing::debug!(%client_id, claims = claims.len(), "replaced claims");
        Ok(())
    }
}

fn constraint_or_database(e: sqlx::Error) -> StoreError {
    let violation = e
        .as_database_error()
        .filter(|db| db.is_unique_violation() || db.is_check_violation())
        .map(|db| db.message().to_string());
    match violation {
        Some(message) => StoreError::Constraint(message),
        None => StoreError::Database(e),
    }
}

fn sqlite_url(path: &str) -> String {
    // sqlx sqlite URL format: sqlite://relative/path.db (or sqlite:/abs/path.db)
    if Path::new(path).is_absolute() {
        format!("sqlite:{}", path)
    } else {
        format!("sqlite://{}", path)
    }
}

fn ensure_parent_dir(file_path: &str) -> Result<(), StoreError> {
    let p = Path::new(file_path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
