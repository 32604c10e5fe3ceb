//! Bridge orchestrator that ties Discord and Fluxer together.
//!
//! Takes inbound messages from both adapters, resolves their route, applies
//! the loop guard, builds the outbound payload and hands it to the sink of the
//! other platform.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::common::messages::{InboundMessage, OutboundPayload};
use crate::common::sink::MessageSink;
use crate::common::types::RelayDirection;
use crate::format::{
    append_attachments, avatar_url, build_payload, convert_embeds, preview, PayloadInput,
};

use super::dispatcher::dispatch;
use super::filter::{self, DropReason};
use super::router::RoutingTable;

/// Characters of content shown in the relay log line.
const LOG_PREVIEW_LEN: usize = 50;

/// A payload ready to be sent, together with where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRelay {
    pub direction: RelayDirection,
    /// Destination channel id.
    pub channel_id: String,
    pub payload: OutboundPayload,
}

/// Why [`Bridge::prepare`] produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Source channel is not mapped for this direction.
    NoRoute,
    Dropped(DropReason),
}

/// Result of one relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    NoRoute,
    Dropped(DropReason),
    Sent,
    /// Destination refused or could not be reached. Already logged.
    Failed,
}

impl From<Skip> for RelayOutcome {
    fn from(skip: Skip) -> Self {
        match skip {
            Skip::NoRoute => RelayOutcome::NoRoute,
            Skip::Dropped(reason) => RelayOutcome::Dropped(reason),
        }
    }
}

/// The main bridge that orchestrates message flow.
pub struct Bridge {
    routes: RoutingTable,
    discord: Arc<dyn MessageSink>,
    fluxer: Arc<dyn MessageSink>,
}

impl Bridge {
    /// Create a bridge over a routing table and one sink per platform.
    pub fn new(
        routes: RoutingTable,
        discord: Arc<dyn MessageSink>,
        fluxer: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            routes,
            discord,
            fluxer,
        }
    }

    fn sink(&self, direction: RelayDirection) -> &dyn MessageSink {
        match direction {
            RelayDirection::ToFluxer => self.fluxer.as_ref(),
            RelayDirection::ToDiscord => self.discord.as_ref(),
        }
    }

    /// Work out what, if anything, `message` turns into on the other side.
    ///
    /// Pure: no I/O, same input gives the same output.
    pub fn prepare(&self, message: &InboundMessage) -> Result<PreparedRelay, Skip> {
        let direction = RelayDirection::from_origin(message.platform);
        let route = self
            .routes
            .route(direction, &message.channel_id)
            .ok_or(Skip::NoRoute)?;

        filter::check(direction, message, route).map_err(Skip::Dropped)?;

        let avatar = avatar_url(direction.origin(), &message.author);
        let content = append_attachments(&message.content, &message.attachments);

        let payload = build_payload(PayloadInput {
            username: &message.author.username,
            avatar_url: &avatar,
            content: &content,
            existing_embeds: convert_embeds(&message.embeds),
            formatting: &route.formatting,
            created_at: message.created_at.as_ref(),
            direction,
        });

        Ok(PreparedRelay {
            direction,
            channel_id: route.channel_id.clone(),
            payload,
        })
    }

    /// Relay one inbound message. Never fails; problems are logged.
    pub async fn relay(&self, message: InboundMessage) -> RelayOutcome {
        let prepared = match self.prepare(&message) {
            Ok(prepared) => prepared,
            Err(skip) => {
                debug!(
                    platform = %message.platform,
                    channel_id = %message.channel_id,
                    "Not relaying message: {:?}",
                    skip
                );
                return skip.into();
            }
        };

        let direction = prepared.direction;
        let tag = if message.is_crosspost {
            "[CROSSPOST] "
        } else {
            ""
        };
        info!(
            "📨 {}[{} {} → {} {}] {}: {}",
            tag,
            direction.origin(),
            message.channel_id,
            direction.destination(),
            prepared.channel_id,
            message.author.username,
            preview(&message.content, LOG_PREVIEW_LEN)
        );

        match dispatch(
            self.sink(direction),
            &prepared.channel_id,
            &prepared.payload,
            &message.author.username,
        )
        .await
        {
            Ok(()) => RelayOutcome::Sent,
            Err(_) => RelayOutcome::Failed,
        }
    }

    /// Consume both inbound streams until shutdown or until both close.
    ///
    /// Every message is relayed on its own task, so a slow destination does
    /// not hold up the other direction. In-flight relays are awaited before
    /// returning.
    pub async fn run(
        self: Arc<Self>,
        mut discord_rx: mpsc::UnboundedReceiver<InboundMessage>,
        mut fluxer_rx: mpsc::UnboundedReceiver<InboundMessage>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut discord_open = true;
        let mut fluxer_open = true;
        let mut in_flight = JoinSet::new();

        loop {
            if !discord_open && !fluxer_open {
                info!("Both inbound streams closed, bridge stopping");
                break;
            }

            let message = tokio::select! {
                msg = discord_rx.recv(), if discord_open => match msg {
                    Some(msg) => msg,
                    None => {
                        warn!("Discord inbound stream closed");
                        discord_open = false;
                        continue;
                    }
                },
                msg = fluxer_rx.recv(), if fluxer_open => match msg {
                    Some(msg) => msg,
                    None => {
                        warn!("Fluxer inbound stream closed");
                        fluxer_open = false;
                        continue;
                    }
                },
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => continue,
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Bridge received shutdown signal");
                        break;
                    }
                    continue;
                }
            };

            let bridge = Arc::clone(&self);
            in_flight.spawn(async move {
                bridge.relay(message).await;
            });
        }

        while in_flight.join_next().await.is_some() {}
    }
}
