use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::service::RegisterEntryOutcome;
use crate::channel::MembershipService;
use crate::shared::{AppError, AppState, BotReply};

/// A message posted somewhere the bot can see, as decoded by the platform
/// transport
#[derive(Debug, Deserialize)]
pub struct MessageEvent {
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
}

/// HTTP handler for inbound channel messages
///
/// POST /events/message
/// Registers a daily entry when the message is a puzzle result posted in the
/// submissions channel; on success the user is granted access to the results
/// channel. Everything else stays silent.
#[instrument(name = "message_event", skip(state, event))]
pub async fn message_event(
    State(state): State<AppState>,
    Json(event): Json<MessageEvent>,
) -> Result<Json<BotReply>, AppError> {
    let channel_name = state.chat_client.get_channel_name(&event.channel_id).await?;
    if channel_name.as_deref() != Some(state.config.submissions_channel.as_str()) {
        debug!(
            channel_id = %event.channel_id,
            "Message is not from the submissions channel, ignoring"
        );
        return Ok(Json(BotReply::silent()));
    }

    let outcome = state
        .entry_service
        .register_entry(&event.user_id, &event.text, Utc::now())
        .await?;

    let reply = match outcome {
        RegisterEntryOutcome::Success(entry) => {
            info!(entry_id = %entry.id, score = entry.score, "Entry accepted, granting access");

            let membership = MembershipService::new(
                Arc::clone(&state.chat_client),
                state.config.channel_scope,
            );
            membership
                .grant_access(&event.user_id, &state.config.results_channel)
                .await?;

            BotReply::say("Your Wordle entry was successfully submitted! 🎉")
        }
        RegisterEntryOutcome::UserNotRegistered => BotReply::say(
            "You are not yet registered for the Wordle leaderboards. \
             Please register using `/wordle-register yournamehere`",
        ),
        RegisterEntryOutcome::AlreadyEnteredToday => BotReply::say(
            "You already registered an entry today. You can post your new results tomorrow.",
        ),
        RegisterEntryOutcome::InvalidScore => BotReply::say(
            "That score is not 1, 2, 3, 4, 5, 6 or X. Stop trying to cheat the system.",
        ),
        RegisterEntryOutcome::NotASubmission => BotReply::silent(),
    };

    Ok(Json(reply))
}
