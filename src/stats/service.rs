use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::models::{DistributionBucket, LeaderboardReport, ScoreDistribution, UserStanding};
use super::{FAILURE_PENALTY, LEADERBOARD_SIZE};
use crate::entry::repository::EntryRepository;
use crate::entry::MAX_SCORE;
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Aggregates stored entries into leaderboard and distribution reports.
/// Read-only over the stores; may lag an in-flight registration slightly.
pub struct StatsService {
    entry_repository: Arc<dyn EntryRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl StatsService {
    pub fn new(
        entry_repository: Arc<dyn EntryRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            entry_repository,
            user_repository,
        }
    }

    /// Computes the top-10 leaderboard, ranked ascending by average
    /// normalized score (failures count as the penalty value).
    ///
    /// Ties break on more games played first, then display name, so the
    /// ordering never depends on store iteration order.
    #[instrument(skip(self))]
    pub async fn compute_leaderboard(&self) -> Result<LeaderboardReport, AppError> {
        let entries = self.entry_repository.list_all_entries().await?;
        let names: HashMap<String, String> = self
            .user_repository
            .list_users()
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect();

        let mut scores_by_user: HashMap<String, Vec<i32>> = HashMap::new();
        for entry in &entries {
            scores_by_user
                .entry(entry.user_id.clone())
                .or_default()
                .push(entry.score);
        }

        let mut standings: Vec<UserStanding> = scores_by_user
            .into_iter()
            .map(|(user_id, scores)| {
                let played = scores.len();
                let wins = scores.iter().filter(|score| **score > 0).count();

                let normalized_sum: i64 = scores
                    .iter()
                    .map(|score| {
                        if *score == 0 {
                            FAILURE_PENALTY
                        } else {
                            i64::from(*score)
                        }
                    })
                    .sum();
                let average_solved_at =
                    (normalized_sum as f64 / played as f64).round() as i64;

                let name = names.get(&user_id).cloned().unwrap_or(user_id.clone());

                UserStanding {
                    user_id,
                    name,
                    played,
                    wins,
                    average_solved_at,
                }
            })
            .collect();

        standings.sort_by(|a, b| {
            a.average_solved_at
                .cmp(&b.average_solved_at)
                .then(b.played.cmp(&a.played))
                .then(a.name.cmp(&b.name))
        });
        standings.truncate(LEADERBOARD_SIZE);

        info!(standings = standings.len(), "Leaderboard computed");

        Ok(LeaderboardReport { standings })
    }

    /// Buckets one user's entries by score value. Returns `None` for an
    /// unknown user so callers can reply with a registration hint.
    #[instrument(skip(self))]
    pub async fn compute_user_distribution(
        &self,
        user_id: &str,
    ) -> Result<Option<ScoreDistribution>, AppError> {
        let Some(user) = self.user_repository.find_user(user_id).await? else {
            debug!(user_id = %user_id, "Stats requested for unknown user");
            return Ok(None);
        };

        let entries = self.entry_repository.list_entries_for_user(user_id).await?;

        let mut counts = [0usize; (MAX_SCORE + 1) as usize];
        for entry in &entries {
            if (0..=MAX_SCORE).contains(&entry.score) {
                counts[entry.score as usize] += 1;
            }
        }

        // Display order: guess counts first, the failure bucket last
        let buckets = (1..=MAX_SCORE)
            .chain(std::iter::once(0))
            .map(|score| DistributionBucket {
                score,
                count: counts[score as usize],
            })
            .collect();

        Ok(Some(ScoreDistribution {
            user_id: user.id,
            name: user.name,
            buckets,
        }))
    }
}
