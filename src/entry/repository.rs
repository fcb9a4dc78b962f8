use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{same_local_day, EntryModel};
use crate::shared::AppError;

/// Result of the conditional daily insert
#[derive(Debug, Clone)]
pub enum DailyInsert {
    /// No same-day entry existed; the row was written
    Inserted(EntryModel),
    /// The user already has an entry on that calendar day; nothing written
    DuplicateDay,
}

/// Trait for entry storage operations
#[async_trait]
pub trait EntryRepository {
    async fn find_latest_entry(&self, user_id: &str) -> Result<Option<EntryModel>, AppError>;

    /// Atomically inserts the entry unless the user already has one on the
    /// same calendar day. This is the write-side guard against duplicate
    /// event delivery; a plain read-then-insert would race.
    async fn insert_if_new_day(&self, entry: EntryModel) -> Result<DailyInsert, AppError>;

    async fn list_all_entries(&self) -> Result<Vec<EntryModel>, AppError>;
    async fn list_entries_for_user(&self, user_id: &str) -> Result<Vec<EntryModel>, AppError>;
}

/// In-memory implementation of EntryRepository for development and testing
///
/// Entries are kept in discovery order; data is lost on restart.
pub struct InMemoryEntryRepository {
    entries: Mutex<Vec<EntryModel>>,
}

impl Default for InMemoryEntryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEntryRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current number of stored entries
    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    #[instrument(skip(self))]
    async fn find_latest_entry(&self, user_id: &str) -> Result<Option<EntryModel>, AppError> {
        let entries = self.entries.lock().unwrap();
        let latest = entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .max_by_key(|entry| entry.created_at)
            .cloned();

        debug!(user_id = %user_id, found = latest.is_some(), "Latest entry lookup");
        Ok(latest)
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id))]
    async fn insert_if_new_day(&self, entry: EntryModel) -> Result<DailyInsert, AppError> {
        let mut entries = self.entries.lock().unwrap();

        let duplicate = entries.iter().any(|existing| {
            existing.user_id == entry.user_id
                && same_local_day(existing.created_at, entry.created_at)
        });

        if duplicate {
            debug!(user_id = %entry.user_id, "Same-day entry already exists, not inserting");
            return Ok(DailyInsert::DuplicateDay);
        }

        debug!(entry_id = %entry.id, score = entry.score, "Entry inserted in memory");
        entries.push(entry.clone());
        Ok(DailyInsert::Inserted(entry))
    }

    #[instrument(skip(self))]
    async fn list_all_entries(&self) -> Result<Vec<EntryModel>, AppError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.clone())
    }

    #[instrument(skip(self))]
    async fn list_entries_for_user(&self, user_id: &str) -> Result<Vec<EntryModel>, AppError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// PostgreSQL implementation of the entry repository
///
/// The same-day guard runs inside a single conditional INSERT, so concurrent
/// submissions collapse to one row even across processes. The date
/// comparison uses the database session time zone; deployments run the
/// session in the bot's local zone.
pub struct PostgresEntryRepository {
    pool: PgPool,
}

impl PostgresEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: sqlx::postgres::PgRow) -> EntryModel {
        EntryModel {
            id: row.get("id"),
            user_id: row.get("user_id"),
            raw_text: row.get("raw_text"),
            score: row.get("score"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl EntryRepository for PostgresEntryRepository {
    #[instrument(skip(self))]
    async fn find_latest_entry(&self, user_id: &str) -> Result<Option<EntryModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, raw_text, score, created_at FROM entries \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch latest entry");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(Self::row_to_entry))
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id))]
    async fn insert_if_new_day(&self, entry: EntryModel) -> Result<DailyInsert, AppError> {
        let result = sqlx::query(
            "INSERT INTO entries (id, user_id, raw_text, score, created_at) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM entries \
                 WHERE user_id = $2 AND created_at::date = ($5::timestamptz)::date \
             )",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.raw_text)
        .bind(entry.score)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert entry in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            debug!(user_id = %entry.user_id, "Same-day entry already exists in database");
            return Ok(DailyInsert::DuplicateDay);
        }

        Ok(DailyInsert::Inserted(entry))
    }

    #[instrument(skip(self))]
    async fn list_all_entries(&self) -> Result<Vec<EntryModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, raw_text, score, created_at FROM entries ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list entries from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Self::row_to_entry).collect())
    }

    #[instrument(skip(self))]
    async fn list_entries_for_user(&self, user_id: &str) -> Result<Vec<EntryModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, raw_text, score, created_at FROM entries \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to list entries for user");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Self::row_to_entry).collect())
    }
}
