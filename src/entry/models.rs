use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the entries table
///
/// Entries are append-only: one row per accepted daily submission, never
/// updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EntryModel {
    pub id: String, // Surrogate key
    pub user_id: String,
    pub raw_text: String,
    pub score: i32, // 0..=6, 0 = failed to solve
    pub created_at: DateTime<Utc>,
}

impl EntryModel {
    /// Creates a new entry model with a generated surrogate id
    pub fn new(user_id: String, raw_text: String, score: i32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            raw_text,
            score,
            created_at,
        }
    }
}

/// Calendar-day equality in the registry's local time zone.
///
/// Year/month/day comparison, not a rolling 24-hour window: two submissions
/// less than 24h apart that straddle midnight land on different days.
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.with_timezone(&Local).date_naive() == b.with_timezone(&Local).date_naive()
}
