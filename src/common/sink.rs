//! Outbound half of the platform adapter contract.

use async_trait::async_trait;

use crate::common::error::SendError;
use crate::common::messages::OutboundPayload;
use crate::common::types::Platform;

/// Something that can deliver a payload to a channel on one platform.
///
/// Implementations are shared between concurrent relay tasks, so `send_message`
/// takes `&self`.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Platform this sink delivers to.
    fn platform(&self) -> Platform;

    /// Post `payload` to `channel_id`. A single attempt, no retries.
    async fn send_message(
        &self,
        channel_id: &str,
        payload: &OutboundPayload,
    ) -> Result<(), SendError>;
}
