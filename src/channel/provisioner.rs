use std::sync::Arc;
use tracing::{info, instrument};

use super::client::ChatClient;
use super::models::{ChannelModel, ChannelScope};
use crate::shared::AppError;

/// Resolves a channel name to an active channel, creating or unarchiving as
/// needed. Idempotent: repeated calls converge to one channel.
pub struct ChannelProvisioner {
    client: Arc<dyn ChatClient>,
    scope: ChannelScope,
}

impl ChannelProvisioner {
    pub fn new(client: Arc<dyn ChatClient>, scope: ChannelScope) -> Self {
        Self { client, scope }
    }

    pub fn scope(&self) -> ChannelScope {
        self.scope
    }

    /// Returns the active channel with the given name, unarchiving a found
    /// channel or creating a fresh private one when absent.
    #[instrument(skip(self))]
    pub async fn ensure_active_channel(&self, name: &str) -> Result<ChannelModel, AppError> {
        if let Some(channel) = self.client.find_channel_by_name(name, self.scope).await? {
            if channel.is_archived {
                info!(channel_id = %channel.id, name = %name, "Channel is archived, unarchiving");
                self.client.unarchive_channel(&channel.id).await?;
            }

            return Ok(ChannelModel {
                is_archived: false,
                ..channel
            });
        }

        info!(name = %name, "Channel does not exist yet, creating");
        self.client.create_channel(name, true).await
    }
}
