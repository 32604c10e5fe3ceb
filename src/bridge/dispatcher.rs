//! Hand-off of built payloads to a platform sink.
//!
//! One attempt per payload. Failures are logged and returned, never retried.

use tracing::{error, info, warn};

use crate::common::error::SendError;
use crate::common::messages::OutboundPayload;
use crate::common::sink::MessageSink;

/// Send `payload` to `channel_id` through `sink`, logging the outcome.
///
/// `author` is only used to give failure lines some context.
pub async fn dispatch(
    sink: &dyn MessageSink,
    channel_id: &str,
    payload: &OutboundPayload,
    author: &str,
) -> Result<(), SendError> {
    let platform = sink.platform();

    match sink.send_message(channel_id, payload).await {
        Ok(()) => {
            info!("✓ → {} #{}", platform, channel_id);
            Ok(())
        }
        Err(e) => {
            error!(
                author,
                "✗ Failed to send to {} #{}: {}", platform, channel_id, e
            );
            if matches!(e, SendError::RateLimited { .. }) {
                match e.retry_after() {
                    Some(secs) => warn!("  Rate limited! Retry after: {}s", secs),
                    None => warn!("  Rate limited! Retry after: unknown"),
                }
            }
            Err(e)
        }
    }
}
