pub mod handlers;
pub mod models;
pub mod service;

pub use models::{DistributionBucket, LeaderboardReport, ScoreDistribution, UserStanding};
pub use service::StatsService;

/// Normalized cost of a failed puzzle when averaging. A failure must rank
/// below the worst successful outcome (6), so it costs 6 + 2.
pub const FAILURE_PENALTY: i64 = 8;

/// Number of standings shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;
