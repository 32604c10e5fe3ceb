//! Discord bot client abstraction.
//!
//! Provides a high-level interface for creating and running the Discord bot,
//! hiding serenity implementation details from the rest of the application.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::http::{Http, HttpBuilder, HttpError};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::common::error::SendError;
use crate::common::messages::{InboundMessage, OutboundPayload};
use crate::common::sink::MessageSink;
use crate::common::types::Platform;
use crate::config::types::Mapping;
use crate::discord::convert::{parse_channel_id, to_create_message, to_inbound};

/// Ceiling for the reconnect backoff.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

struct DiscordBotEvents {
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    mappings: Arc<Vec<Mapping>>,
}

#[async_trait]
impl EventHandler for DiscordBotEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        info!("🤖 Discord bot logged in as {}", ready.user.tag());
        info!("📡 Active bridges ({}):", self.mappings.len());
        for (i, mapping) in self.mappings.iter().enumerate() {
            info!("   {}. {}", i + 1, mapping);
        }
        info!("✅ Bridge is active!");
    }

    async fn message(&self, _context: Context, message: Message) {
        if let Err(error) = self.inbound_tx.send(to_inbound(&message)) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

async fn build_client(
    token: &str,
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    mappings: Arc<Vec<Mapping>>,
) -> anyhow::Result<Client> {
    let intents =
        GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT | GatewayIntents::GUILDS;

    // Build a custom reqwest client with timeout settings
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let http = HttpBuilder::new(token).client(reqwest_client).build();

    let events = DiscordBotEvents {
        inbound_tx,
        mappings,
    };
    let client = serenity::client::ClientBuilder::new_with_http(http, intents)
        .event_handler(events)
        .await?;
    Ok(client)
}

/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_RECONNECT_DELAY)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

/// Outbound side of the Discord adapter.
pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageSink for DiscordSink {
    fn platform(&self) -> Platform {
        Platform::Discord
    }

    async fn send_message(
        &self,
        channel_id: &str,
        payload: &OutboundPayload,
    ) -> Result<(), SendError> {
        let channel = parse_channel_id(channel_id)?;
        channel
            .send_message(self.http.as_ref(), to_create_message(payload))
            .await
            .map(|_| ())
            .map_err(send_error)
    }
}

fn send_error(error: serenity::Error) -> SendError {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            let status = response.status_code.as_u16();
            if status == 429 {
                SendError::RateLimited { retry_after: None }
            } else {
                SendError::Rejected {
                    status,
                    message: response.error.message,
                }
            }
        }
        other => SendError::Transport(other.to_string()),
    }
}

/// Running Discord connection.
pub struct DiscordBot {
    client: Option<Client>,
    http: Arc<Http>,
    token: String,
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    mappings: Arc<Vec<Mapping>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBot {
    /// Build the bot. Inbound messages are forwarded to `inbound_tx`.
    pub async fn build(
        token: String,
        mappings: Vec<Mapping>,
        inbound_tx: mpsc::UnboundedSender<InboundMessage>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> anyhow::Result<Self> {
        let mappings = Arc::new(mappings);
        let client = build_client(&token, inbound_tx.clone(), Arc::clone(&mappings)).await?;
        let http = Arc::clone(&client.http);

        Ok(Self {
            client: Some(client),
            http,
            token,
            inbound_tx,
            mappings,
            shutdown_rx,
        })
    }

    /// Sink sharing the bot's HTTP client.
    pub fn sink(&self) -> DiscordSink {
        DiscordSink::new(Arc::clone(&self.http))
    }

    pub async fn run(mut self) {
        // Extract shard manager before we move client into run_connection
        let shard_manager: Option<Arc<ShardManager>> =
            self.client.as_ref().map(|c| c.shard_manager.clone());
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::select! {
            _ = Self::run_connection(&mut self.client, &self.token, &self.inbound_tx, &self.mappings) => {},
            _ = async {
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                // Gracefully shutdown Discord gateway
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => {}
        }
        info!("Discord task ended");
    }

    async fn run_connection(
        client: &mut Option<Client>,
        token: &str,
        inbound_tx: &mpsc::UnboundedSender<InboundMessage>,
        mappings: &Arc<Vec<Mapping>>,
    ) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => {
                    // serenity mostly handles reconnections itself.
                    match build_client(token, inbound_tx.clone(), Arc::clone(mappings)).await {
                        Ok(client) => {
                            backoff = discord_backoff();
                            client
                        }
                        Err(e) => {
                            error!("Failed to rebuild Discord client: {}", e);
                            let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                            warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                            sleep(delay).await;
                            continue;
                        }
                    }
                }
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    break;
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
