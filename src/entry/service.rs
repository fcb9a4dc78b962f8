use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::{same_local_day, EntryModel};
use super::parser;
use super::repository::{DailyInsert, EntryRepository};
use super::MAX_SCORE;
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Outcome of a submission attempt, as a closed set of tagged results.
/// Expected business conditions are values, never errors.
#[derive(Debug, Clone)]
pub enum RegisterEntryOutcome {
    /// Entry validated and persisted
    Success(EntryModel),
    /// Unknown user identity; nothing persisted
    UserNotRegistered,
    /// The user already has an entry on this calendar day
    AlreadyEnteredToday,
    /// Result token parsed but lies outside 0..=6
    InvalidScore,
    /// The message does not look like a puzzle result; callers stay silent
    NotASubmission,
}

/// The entry registry: one validated entry per user per local calendar day
pub struct EntryService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    entry_repository: Arc<dyn EntryRepository + Send + Sync>,
    user_locks: RwLock<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl EntryService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        entry_repository: Arc<dyn EntryRepository + Send + Sync>,
    ) -> Self {
        Self {
            user_repository,
            entry_repository,
            user_locks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a daily entry from raw submission text.
    ///
    /// Check order matters: unknown user, then same-day duplicate, then
    /// parse, then score range. Everything before the final insert is
    /// side-effect free.
    ///
    /// Registration is serialized per user: the lock map covers in-process
    /// races, and the repository's conditional insert covers redelivered
    /// events that bypass this process entirely. Different users never
    /// contend.
    #[instrument(skip(self, raw_text))]
    pub async fn register_entry(
        &self,
        user_id: &str,
        raw_text: &str,
        now: DateTime<Utc>,
    ) -> Result<RegisterEntryOutcome, AppError> {
        let user_lock = self.user_lock(user_id).await;
        let _guard = user_lock.lock().await;

        if self.user_repository.find_user(user_id).await?.is_none() {
            debug!(user_id = %user_id, "Submission from unregistered user");
            return Ok(RegisterEntryOutcome::UserNotRegistered);
        }

        if let Some(latest) = self.entry_repository.find_latest_entry(user_id).await? {
            if same_local_day(latest.created_at, now) {
                debug!(user_id = %user_id, "User already entered today");
                return Ok(RegisterEntryOutcome::AlreadyEnteredToday);
            }
        }

        let score = match parser::parse_score(raw_text) {
            Ok(score) => score,
            Err(_) => {
                debug!(user_id = %user_id, "Message is not a submission, ignoring");
                return Ok(RegisterEntryOutcome::NotASubmission);
            }
        };

        if !(0..=MAX_SCORE).contains(&score) {
            warn!(user_id = %user_id, score, "Submission with out-of-range score rejected");
            return Ok(RegisterEntryOutcome::InvalidScore);
        }

        let entry = EntryModel::new(user_id.to_string(), raw_text.to_string(), score, now);

        match self.entry_repository.insert_if_new_day(entry).await? {
            DailyInsert::Inserted(entry) => {
                info!(
                    user_id = %user_id,
                    entry_id = %entry.id,
                    score = entry.score,
                    "Entry registered"
                );
                Ok(RegisterEntryOutcome::Success(entry))
            }
            // Lost a race against a concurrent delivery of the same result
            DailyInsert::DuplicateDay => {
                debug!(user_id = %user_id, "Concurrent same-day insert detected");
                Ok(RegisterEntryOutcome::AlreadyEnteredToday)
            }
        }
    }

    async fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.user_locks.read().await;
            if let Some(lock) = guard.get(user_id) {
                return lock.clone();
            }
        }

        let mut guard = self.user_locks.write().await;
        guard
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::repository::InMemoryEntryRepository;
    use crate::user::models::UserModel;
    use crate::user::repository::InMemoryUserRepository;
    use chrono::Duration;

    fn service_with_user(user_id: &str) -> (Arc<EntryService>, Arc<InMemoryEntryRepository>) {
        let users = Arc::new(InMemoryUserRepository::with_users(vec![UserModel::new(
            user_id.to_string(),
            "player".to_string(),
        )]));
        let entries = Arc::new(InMemoryEntryRepository::new());
        (
            Arc::new(EntryService::new(users, entries.clone())),
            entries,
        )
    }

    #[tokio::test]
    async fn valid_submission_succeeds_and_persists() {
        let (service, entries) = service_with_user("U1");

        let outcome = service
            .register_entry("U1", "Wordle 742 3/6", Utc::now())
            .await
            .unwrap();

        match outcome {
            RegisterEntryOutcome::Success(entry) => {
                assert_eq!(entry.score, 3);
                assert_eq!(entry.user_id, "U1");
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(entries.entry_count(), 1);
    }

    #[tokio::test]
    async fn unregistered_user_is_rejected_without_side_effects() {
        let users = Arc::new(InMemoryUserRepository::new());
        let entries = Arc::new(InMemoryEntryRepository::new());
        let service = EntryService::new(users, entries.clone());

        let outcome = service
            .register_entry("ghost", "Wordle 742 3/6", Utc::now())
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterEntryOutcome::UserNotRegistered));
        assert_eq!(entries.entry_count(), 0);
    }

    #[tokio::test]
    async fn second_submission_same_day_is_rejected() {
        let (service, entries) = service_with_user("U1");
        let now = Utc::now();

        service
            .register_entry("U1", "Wordle 742 3/6", now)
            .await
            .unwrap();
        let outcome = service
            .register_entry("U1", "Wordle 742 4/6", now)
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterEntryOutcome::AlreadyEnteredToday));
        assert_eq!(entries.entry_count(), 1);
    }

    #[tokio::test]
    async fn next_day_submission_succeeds() {
        let (service, entries) = service_with_user("U1");
        let day_one = Utc::now();

        service
            .register_entry("U1", "Wordle 742 3/6", day_one)
            .await
            .unwrap();
        let outcome = service
            .register_entry("U1", "Wordle 743 X/6", day_one + Duration::days(1))
            .await
            .unwrap();

        match outcome {
            RegisterEntryOutcome::Success(entry) => assert_eq!(entry.score, 0),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(entries.entry_count(), 2);
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected_without_side_effects() {
        let (service, entries) = service_with_user("U1");

        let outcome = service
            .register_entry("U1", "Wordle 742 9/6", Utc::now())
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterEntryOutcome::InvalidScore));
        assert_eq!(entries.entry_count(), 0);
    }

    #[tokio::test]
    async fn chatter_is_silently_ignored() {
        let (service, entries) = service_with_user("U1");

        let outcome = service
            .register_entry("U1", "good morning everyone", Utc::now())
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterEntryOutcome::NotASubmission));
        assert_eq!(entries.entry_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_submissions_from_one_user_succeed_exactly_once() {
        let (service, entries) = service_with_user("U1");
        let now = Utc::now();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.register_entry("U1", "Wordle 742 3/6", now).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if let RegisterEntryOutcome::Success(_) = handle.await.unwrap().unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(entries.entry_count(), 1);
    }
}
