use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use super::models::{ChannelModel, ChannelScope};
use crate::shared::AppError;

/// Attempts made against the chat platform before a transient failure is
/// surfaced to the caller
pub const RETRY_ATTEMPTS: u32 = 3;

/// Core-facing surface of the messaging platform.
///
/// Contract notes for implementations:
/// - `invite_member` for a user who is already a member must succeed as a
///   no-op, not fail.
/// - `find_channel_by_name` matches the exact name within the given scope.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn get_channel_name(&self, channel_id: &str) -> Result<Option<String>, AppError>;
    async fn find_channel_by_name(
        &self,
        name: &str,
        scope: ChannelScope,
    ) -> Result<Option<ChannelModel>, AppError>;
    async fn create_channel(&self, name: &str, private: bool) -> Result<ChannelModel, AppError>;
    async fn unarchive_channel(&self, channel_id: &str) -> Result<(), AppError>;
    async fn invite_member(&self, channel_id: &str, user_id: &str) -> Result<(), AppError>;
    async fn list_members(&self, channel_id: &str) -> Result<Vec<String>, AppError>;
    async fn kick_member(&self, channel_id: &str, user_id: &str) -> Result<(), AppError>;
    /// The bot's own account id, exempt from membership revocation
    async fn service_identity(&self) -> Result<String, AppError>;
}

/// Retries a chat-platform call with exponential backoff while the failure
/// is transient. Terminal errors propagate immediately.
pub async fn with_retries<T, F, Fut>(
    label: &'static str,
    attempts: u32,
    mut op: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut delay = Duration::from_millis(250);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                warn!(op = label, attempt, error = %err, "Transient failure, retrying");
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

struct ChannelState {
    model: ChannelModel,
    members: HashSet<String>,
}

/// In-memory implementation of ChatClient for development and testing
///
/// A platform-backed implementation (the real chat API) plugs in behind the
/// same trait in production.
pub struct InMemoryChatClient {
    channels: Mutex<HashMap<String, ChannelState>>,
    next_id: AtomicU64,
    bot_user_id: String,
}

impl InMemoryChatClient {
    pub fn new(bot_user_id: &str) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            bot_user_id: bot_user_id.to_string(),
        }
    }

    fn generate_id(&self) -> String {
        format!("C{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a channel directly, bypassing create semantics (test and
    /// bootstrap helper)
    pub fn seed_channel(&self, name: &str, private: bool) -> ChannelModel {
        let model = ChannelModel {
            id: self.generate_id(),
            name: name.to_string(),
            is_archived: false,
            is_private: private,
        };

        let mut channels = self.channels.lock().unwrap();
        channels.insert(
            model.id.clone(),
            ChannelState {
                model: model.clone(),
                members: HashSet::new(),
            },
        );
        model
    }

    /// Marks a channel archived, simulating external archival
    pub fn archive_channel(&self, channel_id: &str) {
        let mut channels = self.channels.lock().unwrap();
        if let Some(state) = channels.get_mut(channel_id) {
            state.model.is_archived = true;
        }
    }

    /// Current member set of a channel (assertion helper)
    pub fn members_of(&self, channel_id: &str) -> HashSet<String> {
        let channels = self.channels.lock().unwrap();
        channels
            .get(channel_id)
            .map(|state| state.members.clone())
            .unwrap_or_default()
    }

    /// Number of channels carrying the given name, across all scopes
    pub fn channels_named(&self, name: &str) -> usize {
        let channels = self.channels.lock().unwrap();
        channels
            .values()
            .filter(|state| state.model.name == name)
            .count()
    }
}

#[async_trait]
impl ChatClient for InMemoryChatClient {
    #[instrument(skip(self))]
    async fn get_channel_name(&self, channel_id: &str) -> Result<Option<String>, AppError> {
        let channels = self.channels.lock().unwrap();
        Ok(channels
            .get(channel_id)
            .map(|state| state.model.name.clone()))
    }

    #[instrument(skip(self))]
    async fn find_channel_by_name(
        &self,
        name: &str,
        scope: ChannelScope,
    ) -> Result<Option<ChannelModel>, AppError> {
        let channels = self.channels.lock().unwrap();
        let found = channels
            .values()
            .map(|state| &state.model)
            .find(|model| model.name == name && scope.includes(model))
            .cloned();

        debug!(name = %name, found = found.is_some(), "Channel lookup by name");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn create_channel(&self, name: &str, private: bool) -> Result<ChannelModel, AppError> {
        let model = ChannelModel {
            id: self.generate_id(),
            name: name.to_string(),
            is_archived: false,
            is_private: private,
        };

        let mut channels = self.channels.lock().unwrap();
        channels.insert(
            model.id.clone(),
            ChannelState {
                model: model.clone(),
                members: HashSet::new(),
            },
        );

        debug!(channel_id = %model.id, name = %name, "Channel created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn unarchive_channel(&self, channel_id: &str) -> Result<(), AppError> {
        let mut channels = self.channels.lock().unwrap();
        match channels.get_mut(channel_id) {
            Some(state) => {
                state.model.is_archived = false;
                Ok(())
            }
            None => Err(AppError::NotFound("Channel not found".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn invite_member(&self, channel_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut channels = self.channels.lock().unwrap();
        match channels.get_mut(channel_id) {
            Some(state) => {
                // Re-inviting an existing member is a no-op
                state.members.insert(user_id.to_string());
                Ok(())
            }
            None => Err(AppError::NotFound("Channel not found".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn list_members(&self, channel_id: &str) -> Result<Vec<String>, AppError> {
        let channels = self.channels.lock().unwrap();
        match channels.get(channel_id) {
            Some(state) => Ok(state.members.iter().cloned().collect()),
            None => Err(AppError::NotFound("Channel not found".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn kick_member(&self, channel_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut channels = self.channels.lock().unwrap();
        match channels.get_mut(channel_id) {
            Some(state) => {
                if !state.members.remove(user_id) {
                    warn!(channel_id = %channel_id, user_id = %user_id, "Kicked user was not a member");
                }
                Ok(())
            }
            None => Err(AppError::NotFound("Channel not found".to_string())),
        }
    }

    async fn service_identity(&self) -> Result<String, AppError> {
        Ok(self.bot_user_id.clone())
    }
}
