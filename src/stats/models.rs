use serde::Serialize;

/// Width of the distribution bar chart, in blocks
pub const BAR_WIDTH: usize = 20;

/// One user's aggregated line on the leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct UserStanding {
    pub user_id: String,
    pub name: String,
    pub played: usize,
    pub wins: usize,
    /// Mean of the normalized score (failures counted as the penalty value),
    /// rounded for display. Lower is better.
    pub average_solved_at: i64,
}

impl UserStanding {
    pub fn losses(&self) -> usize {
        self.played - self.wins
    }
}

/// Ranked top-N leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardReport {
    pub standings: Vec<UserStanding>,
}

/// Entry count for one score value
#[derive(Debug, Clone, Serialize)]
pub struct DistributionBucket {
    pub score: i32,
    pub count: usize,
}

/// Per-user score distribution, buckets in display order (1..=6, then 0)
#[derive(Debug, Clone, Serialize)]
pub struct ScoreDistribution {
    pub user_id: String,
    pub name: String,
    pub buckets: Vec<DistributionBucket>,
}

impl ScoreDistribution {
    /// Largest bucket count; the bar scale reference
    pub fn max_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.count)
            .max()
            .unwrap_or(0)
    }
}

/// Renders a count as a fixed-width bar proportional to the largest bucket.
/// A zero count renders as an empty bar.
pub fn render_bar(count: usize, max: usize) -> String {
    let max = max.max(1);
    // Integer round-to-nearest of BAR_WIDTH * count / max
    let filled = ((BAR_WIDTH * count + max / 2) / max).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "▁".repeat(BAR_WIDTH - filled))
}
