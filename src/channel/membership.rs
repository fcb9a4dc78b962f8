use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::client::{with_retries, ChatClient, RETRY_ATTEMPTS};
use super::models::ChannelScope;
use super::provisioner::ChannelProvisioner;
use crate::shared::AppError;

/// Reconciles results-channel membership against the set of users who have
/// earned access today.
pub struct MembershipService {
    client: Arc<dyn ChatClient>,
    provisioner: ChannelProvisioner,
}

impl MembershipService {
    pub fn new(client: Arc<dyn ChatClient>, scope: ChannelScope) -> Self {
        let provisioner = ChannelProvisioner::new(Arc::clone(&client), scope);
        Self {
            client,
            provisioner,
        }
    }

    /// The bot's own account id
    pub async fn service_identity(&self) -> Result<String, AppError> {
        self.client.service_identity().await
    }

    /// Grants a user access to the named channel, provisioning it first.
    /// Granting to an existing member is a no-op.
    #[instrument(skip(self))]
    pub async fn grant_access(&self, user_id: &str, channel_name: &str) -> Result<(), AppError> {
        let channel = self.provisioner.ensure_active_channel(channel_name).await?;

        let client = Arc::clone(&self.client);
        let channel_id = channel.id.clone();
        let user = user_id.to_string();
        with_retries("invite_member", RETRY_ATTEMPTS, move || {
            let client = Arc::clone(&client);
            let channel_id = channel_id.clone();
            let user = user.clone();
            async move { client.invite_member(&channel_id, &user).await }
        })
        .await?;

        info!(user_id = %user_id, channel_id = %channel.id, "Access granted");
        Ok(())
    }

    /// Removes every member of the named channel except the exempt service
    /// identity. An absent channel is a no-op; running twice in a row with
    /// no new joins is a no-op. Returns the number of members removed.
    #[instrument(skip(self))]
    pub async fn revoke_all_except(
        &self,
        channel_name: &str,
        exempt_user_id: &str,
    ) -> Result<usize, AppError> {
        let Some(channel) = self
            .client
            .find_channel_by_name(channel_name, self.provisioner.scope())
            .await?
        else {
            debug!(channel_name = %channel_name, "Channel absent, nothing to revoke");
            return Ok(0);
        };

        let members = {
            let client = Arc::clone(&self.client);
            let channel_id = channel.id.clone();
            with_retries("list_members", RETRY_ATTEMPTS, move || {
                let client = Arc::clone(&client);
                let channel_id = channel_id.clone();
                async move { client.list_members(&channel_id).await }
            })
            .await?
        };

        let kicks = members
            .into_iter()
            .filter(|member| member != exempt_user_id)
            .map(|member| {
                let client = Arc::clone(&self.client);
                let channel_id = channel.id.clone();
                async move {
                    match client.kick_member(&channel_id, &member).await {
                        Ok(()) => true,
                        Err(err) => {
                            // One stuck member must not block the rest
                            warn!(user_id = %member, error = %err, "Failed to kick member");
                            false
                        }
                    }
                }
            });

        let kicked = join_all(kicks)
            .await
            .into_iter()
            .filter(|removed| *removed)
            .count();

        info!(
            channel_id = %channel.id,
            kicked,
            "Membership revoked for all but the service identity"
        );
        Ok(kicked)
    }
}
