use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::channel::{ChannelScope, ChatClient};
use crate::entry::repository::EntryRepository;
use crate::entry::service::EntryService;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub entry_repository: Arc<dyn EntryRepository + Send + Sync>,
    pub chat_client: Arc<dyn ChatClient>,
    pub entry_service: Arc<EntryService>,
    pub config: BotConfig,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        entry_repository: Arc<dyn EntryRepository + Send + Sync>,
        chat_client: Arc<dyn ChatClient>,
        config: BotConfig,
    ) -> Self {
        // The registry carries per-user locks, so it must be shared rather
        // than rebuilt per request like the stateless services.
        let entry_service = Arc::new(EntryService::new(
            Arc::clone(&user_repository),
            Arc::clone(&entry_repository),
        ));

        Self {
            user_repository,
            entry_repository,
            chat_client,
            entry_service,
            config,
        }
    }
}

/// Bot configuration resolved from the environment with sensible defaults
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Channel monitored for incoming result messages
    pub submissions_channel: String,
    /// Restricted channel granted only to users who submitted today's result
    pub results_channel: String,
    /// Visibility scope used when resolving channels by name
    pub channel_scope: ChannelScope,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            submissions_channel: "wordle".to_string(),
            results_channel: "wordle-answers".to_string(),
            channel_scope: ChannelScope::Private,
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let channel_scope = std::env::var("CHANNEL_SCOPE")
            .ok()
            .and_then(|raw| match ChannelScope::from_str(&raw) {
                Ok(scope) => Some(scope),
                Err(_) => {
                    warn!(value = %raw, "Unrecognized CHANNEL_SCOPE, using default");
                    None
                }
            })
            .unwrap_or(defaults.channel_scope);

        Self {
            submissions_channel: std::env::var("SUBMISSIONS_CHANNEL")
                .unwrap_or(defaults.submissions_channel),
            results_channel: std::env::var("RESULTS_CHANNEL").unwrap_or(defaults.results_channel),
            channel_scope,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Chat client error: {0}")]
    ChatClient(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Store and chat-client failures are availability problems worth a
    /// retry; the rest are terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::ChatClient(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            // Infrastructure detail stays in the logs, not in the reply.
            AppError::DatabaseError(msg) | AppError::ChatClient(msg) => {
                warn!(detail = %msg, "Request failed on an external dependency");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again later".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Reply payload handed back to the platform transport.
/// `reply: null` means the event produced no user-facing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotReply {
    pub reply: Option<String>,
}

impl BotReply {
    pub fn say(message: impl Into<String>) -> Self {
        Self {
            reply: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self { reply: None }
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::channel::client::InMemoryChatClient;
    use crate::entry::repository::InMemoryEntryRepository;
    use crate::user::repository::InMemoryUserRepository;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        entry_repository: Option<Arc<dyn EntryRepository + Send + Sync>>,
        chat_client: Option<Arc<dyn ChatClient>>,
        config: BotConfig,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                entry_repository: None,
                chat_client: None,
                config: BotConfig::default(),
            }
        }

        pub fn with_user_repository(
            mut self,
            repo: Arc<dyn UserRepository + Send + Sync>,
        ) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_entry_repository(
            mut self,
            repo: Arc<dyn EntryRepository + Send + Sync>,
        ) -> Self {
            self.entry_repository = Some(repo);
            self
        }

        pub fn with_chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
            self.chat_client = Some(client);
            self
        }

        pub fn with_config(mut self, config: BotConfig) -> Self {
            self.config = config;
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.user_repository
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                self.entry_repository
                    .unwrap_or_else(|| Arc::new(InMemoryEntryRepository::new())),
                self.chat_client
                    .unwrap_or_else(|| Arc::new(InMemoryChatClient::new("bot-user"))),
                self.config,
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
