use chrono::{DateTime, Days, Local};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use super::membership::MembershipService;
use crate::shared::AppError;

/// Fallback delay when the next-midnight computation cannot produce a value
const RETRY_DELAY: Duration = Duration::from_secs(60 * 60);

/// Starts the background task that empties the results channel once per day
/// at local midnight, keeping only the service identity.
#[instrument(skip(membership))]
pub async fn start_reset_task(membership: Arc<MembershipService>, channel_name: String) {
    info!(channel = %channel_name, "Starting nightly membership reset task");

    loop {
        let delay = delay_until_next_midnight(Local::now());
        info!(sleep_secs = delay.as_secs(), "Next membership reset scheduled");
        tokio::time::sleep(delay).await;

        match run_nightly_reset(&membership, &channel_name).await {
            Ok(kicked) => {
                info!(channel = %channel_name, kicked, "Nightly membership reset completed");
            }
            Err(e) => {
                // Failed resets are retried on the next tick, never fatal
                error!(error = %e, channel = %channel_name, "Nightly membership reset failed");
            }
        }
    }
}

/// Revokes everyone's access to the channel except the bot itself
pub async fn run_nightly_reset(
    membership: &MembershipService,
    channel_name: &str,
) -> Result<usize, AppError> {
    let bot_id = membership.service_identity().await?;
    membership.revoke_all_except(channel_name, &bot_id).await
}

/// Time remaining until the next local midnight
fn delay_until_next_midnight(now: DateTime<Local>) -> Duration {
    let Some(tomorrow) = now.date_naive().checked_add_days(Days::new(1)) else {
        return RETRY_DELAY;
    };
    let Some(next_midnight) = tomorrow.and_hms_opt(0, 0, 0) else {
        return RETRY_DELAY;
    };

    (next_midnight - now.naive_local())
        .to_std()
        .unwrap_or(RETRY_DELAY)
}
