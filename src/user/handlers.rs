use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use super::service::{RegisterUserOutcome, UserDirectory};
use crate::shared::{AppError, AppState, BotReply};

/// `/wordle-register` command payload
#[derive(Debug, Deserialize)]
pub struct RegisterCommand {
    pub user_id: String,
    pub name: String,
}

/// HTTP handler for the register command
///
/// POST /commands/register
/// Registers the caller under the requested display name, or renames them if
/// already registered.
#[instrument(name = "register_command", skip(state, command))]
pub async fn register_command(
    State(state): State<AppState>,
    Json(command): Json<RegisterCommand>,
) -> Result<Json<BotReply>, AppError> {
    let directory = UserDirectory::new(Arc::clone(&state.user_repository));
    let outcome = directory
        .register_or_rename(&command.user_id, &command.name)
        .await?;

    let reply = match outcome {
        RegisterUserOutcome::NewUser { name } => format!(
            "You successfully registered for the Wordle battle royale as `{}`.",
            name
        ),
        RegisterUserOutcome::NameChange { name, previous } => {
            format!("`{}` was renamed to `{}`", previous, name)
        }
    };

    Ok(Json(BotReply::say(reply)))
}
