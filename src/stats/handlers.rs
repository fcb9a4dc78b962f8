use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use super::models::{render_bar, LeaderboardReport, ScoreDistribution};
use super::service::StatsService;
use crate::shared::{AppError, AppState, BotReply};

/// `/wordle-stats` command payload; `target_user_id` defaults to the caller
#[derive(Debug, Deserialize)]
pub struct StatsCommand {
    pub user_id: String,
    #[serde(default)]
    pub target_user_id: Option<String>,
}

/// HTTP handler for the leaderboard command
///
/// POST /commands/leaderboard
/// Renders the top-10 ranking.
#[instrument(name = "leaderboard_command", skip(state))]
pub async fn leaderboard_command(
    State(state): State<AppState>,
) -> Result<Json<BotReply>, AppError> {
    let service = StatsService::new(
        Arc::clone(&state.entry_repository),
        Arc::clone(&state.user_repository),
    );
    let report = service.compute_leaderboard().await?;

    Ok(Json(BotReply::say(render_leaderboard(&report))))
}

/// HTTP handler for the per-user stats command
///
/// POST /commands/stats
/// Renders the score distribution bar chart for the target user.
#[instrument(name = "stats_command", skip(state, command))]
pub async fn stats_command(
    State(state): State<AppState>,
    Json(command): Json<StatsCommand>,
) -> Result<Json<BotReply>, AppError> {
    let service = StatsService::new(
        Arc::clone(&state.entry_repository),
        Arc::clone(&state.user_repository),
    );

    let target = command
        .target_user_id
        .as_deref()
        .unwrap_or(&command.user_id);

    let reply = match service.compute_user_distribution(target).await? {
        Some(distribution) => render_distribution(&distribution),
        None if command.target_user_id.is_some() => {
            "That user is not registered for the Wordle battle royale! \
             Ask them to register using `/wordle-register yournamehere`"
                .to_string()
        }
        None => "You are not yet registered for the Wordle leaderboards. \
                 Please register using `/wordle-register yournamehere`"
            .to_string(),
    };

    Ok(Json(BotReply::say(reply)))
}

fn render_leaderboard(report: &LeaderboardReport) -> String {
    let mut lines = vec!["🧠 *Wordle Leaderboard* 🧠".to_string(), String::new()];

    for (index, standing) in report.standings.iter().enumerate() {
        lines.push(format!(
            "{}. _{}_ | Average solve score `{}` | Played `{}` | Lost `{}`",
            index + 1,
            standing.name,
            standing.average_solved_at,
            standing.played,
            standing.losses(),
        ));
    }

    lines.join("\n")
}

fn render_distribution(distribution: &ScoreDistribution) -> String {
    let max = distribution.max_count();

    let mut lines = vec![
        format!("*Stats for {}*", distribution.name),
        String::new(),
    ];
    for bucket in &distribution.buckets {
        lines.push(format!(
            "{}: {} ({})",
            score_label(bucket.score),
            render_bar(bucket.count, max),
            bucket.count,
        ));
    }

    lines.join("\n")
}

fn score_label(score: i32) -> &'static str {
    match score {
        1 => "1️⃣",
        2 => "2️⃣",
        3 => "3️⃣",
        4 => "4️⃣",
        5 => "5️⃣",
        6 => "6️⃣",
        _ => "❌",
    }
}
