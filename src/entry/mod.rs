pub mod handlers;
pub mod models;
pub mod parser;
pub mod repository;
pub mod service;

pub use models::EntryModel;
pub use repository::{DailyInsert, EntryRepository, InMemoryEntryRepository, PostgresEntryRepository};
pub use service::{EntryService, RegisterEntryOutcome};

/// Highest number of guesses a puzzle allows; 0 below this range means
/// "failed to solve".
pub const MAX_SCORE: i32 = 6;
