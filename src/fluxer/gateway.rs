//! Fluxer gateway connection.
//!
//! Keeps one websocket session open, forwards `MESSAGE_CREATE` events to the
//! bridge and reconnects with backoff whenever the session ends.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use futures::{SinkExt, Stream, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep, timeout, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

use crate::common::error::GatewayError;
use crate::common::messages::InboundMessage;
use crate::fluxer::rest::{FluxerRest, API_VERSION};
use crate::fluxer::types::{
    opcode, FluxerMessage, GatewayPayload, Hello, Identify, IdentifyProperties, ReadyEvent,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(300);

/// Fluxer-bound messages need no privileged intents.
const INTENTS: u64 = 0;

/// How a session ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Reconnect,
}

/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn fluxer_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_RECONNECT_DELAY)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

/// Websocket URL for the gateway `url` returned by the API.
fn websocket_url(base: &str) -> String {
    format!(
        "{}/?v={}&encoding=json",
        base.trim_end_matches('/'),
        API_VERSION
    )
}

fn frame(op: u8, d: serde_json::Value) -> Result<Message, GatewayError> {
    let text = serde_json::to_string(&GatewayPayload::new(op, d))?;
    Ok(Message::Text(text))
}

/// Read frames until Hello arrives and return its heartbeat interval.
async fn read_hello<S>(read: &mut S) -> Result<Duration, GatewayError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = read.next().await {
        match message? {
            Message::Text(text) => {
                let payload: GatewayPayload = serde_json::from_str(&text)?;
                if payload.op == opcode::HELLO {
                    let hello: Hello = serde_json::from_value(payload.d)?;
                    return Ok(Duration::from_millis(hello.heartbeat_interval));
                }
                debug!(op = payload.op, "Ignoring frame before Hello");
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(GatewayError::NoHello)
}

/// Handle a dispatch. Returns true once the session is ready.
fn handle_dispatch(
    payload: GatewayPayload,
    inbound_tx: &mpsc::UnboundedSender<InboundMessage>,
) -> bool {
    match payload.t.as_deref() {
        Some("READY") => match serde_json::from_value::<ReadyEvent>(payload.d) {
            Ok(ready) => {
                info!("✅ Fluxer bot connected as {}", ready.user.username);
                true
            }
            Err(e) => {
                warn!("Malformed Fluxer READY: {}", e);
                true
            }
        },
        Some("MESSAGE_CREATE") => {
            match serde_json::from_value::<FluxerMessage>(payload.d) {
                Ok(message) => {
                    if let Err(error) = inbound_tx.send(message.into()) {
                        warn!("Failed to process fluxer event: {}", error);
                    }
                }
                Err(e) => warn!("Malformed Fluxer MESSAGE_CREATE: {}", e),
            }
            false
        }
        other => {
            debug!(event = ?other, "Ignoring Fluxer dispatch");
            false
        }
    }
}

/// Fluxer gateway client.
pub struct FluxerGateway {
    rest: Arc<FluxerRest>,
    token: String,
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    shutdown_rx: watch::Receiver<bool>,
}

impl FluxerGateway {
    pub fn new(
        rest: Arc<FluxerRest>,
        token: String,
        inbound_tx: mpsc::UnboundedSender<InboundMessage>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            rest,
            token,
            inbound_tx,
            shutdown_rx,
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Run until shutdown, reconnecting as needed.
    pub async fn run(mut self) {
        let mut backoff = fluxer_backoff();

        loop {
            if self.shutdown_requested() {
                break;
            }

            info!("📡 Connecting to Fluxer gateway...");
            let mut ready = false;
            match self.run_session(&mut ready).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Reconnect) => info!("Fluxer session ended"),
                Err(e) => error!("Fluxer gateway error: {}", e),
            }

            if ready {
                backoff = fluxer_backoff();
            }

            let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
            warn!(
                "Fluxer disconnected. Reconnecting in {:.1}s...",
                delay.as_secs_f64()
            );

            tokio::select! {
                _ = sleep(delay) => {},
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Fluxer task ended");
    }

    async fn run_session(&mut self, ready: &mut bool) -> Result<SessionEnd, GatewayError> {
        let base = self.rest.gateway_url().await?;
        let url = websocket_url(&base);
        debug!(url = %url, "Opening Fluxer websocket");

        let (ws, _) = timeout(CONNECT_TIMEOUT, connect_async(url.as_str()))
            .await
            .map_err(|_| GatewayError::Timeout(CONNECT_TIMEOUT))??;
        let (mut write, mut read) = ws.split();

        let interval = timeout(CONNECT_TIMEOUT, read_hello(&mut read))
            .await
            .map_err(|_| GatewayError::Timeout(CONNECT_TIMEOUT))??;
        debug!("Fluxer heartbeat interval: {:?}", interval);

        let identify = Identify {
            token: self.token.clone(),
            intents: INTENTS,
            properties: IdentifyProperties::current(),
        };
        write
            .send(frame(opcode::IDENTIFY, serde_json::to_value(identify)?)?)
            .await?;

        let first_beat = interval.mul_f64(rand::random::<f64>());
        let mut heartbeat = interval_at(Instant::now() + first_beat, interval);
        let mut sequence: Option<u64> = None;
        let mut awaiting_ack = false;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        warn!("Fluxer heartbeat not acknowledged");
                        return Ok(SessionEnd::Reconnect);
                    }
                    write.send(frame(opcode::HEARTBEAT, json!(sequence))?).await?;
                    awaiting_ack = true;
                }
                message = read.next() => {
                    let text = match message {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(close))) => {
                            warn!("Fluxer gateway closed: {:?}", close);
                            return Ok(SessionEnd::Reconnect);
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(SessionEnd::Reconnect),
                    };

                    let payload: GatewayPayload = match serde_json::from_str(&text) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Unparseable Fluxer frame: {}", e);
                            continue;
                        }
                    };
                    if payload.s.is_some() {
                        sequence = payload.s;
                    }

                    match payload.op {
                        opcode::DISPATCH => {
                            if handle_dispatch(payload, &self.inbound_tx) {
                                *ready = true;
                            }
                        }
                        opcode::HEARTBEAT => {
                            write.send(frame(opcode::HEARTBEAT, json!(sequence))?).await?;
                        }
                        opcode::HEARTBEAT_ACK => awaiting_ack = false,
                        opcode::RECONNECT => {
                            info!("Fluxer gateway requested reconnect");
                            return Ok(SessionEnd::Reconnect);
                        }
                        opcode::INVALID_SESSION => {
                            warn!("Fluxer session invalidated");
                            return Ok(SessionEnd::Reconnect);
                        }
                        op => debug!(op, "Ignoring Fluxer opcode"),
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("Closing Fluxer gateway...");
                        if let Err(e) = write.send(Message::Close(None)).await {
                            debug!("Failed to send close frame: {}", e);
                        }
                        return Ok(SessionEnd::Shutdown);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Platform;
    use futures::stream;

    fn text(value: serde_json::Value) -> Result<Message, tungstenite::Error> {
        Ok(Message::Text(value.to_string()))
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(
            websocket_url("wss://gateway.fluxer.app"),
            "wss://gateway.fluxer.app/?v=1&encoding=json"
        );
        assert_eq!(
            websocket_url("wss://gateway.fluxer.app/"),
            "wss://gateway.fluxer.app/?v=1&encoding=json"
        );
    }

    #[tokio::test]
    async fn test_read_hello() {
        let mut read = stream::iter(vec![
            text(json!({ "op": 11 })),
            text(json!({ "op": 10, "d": { "heartbeat_interval": 41250 } })),
        ]);
        let interval = read_hello(&mut read).await.unwrap();
        assert_eq!(interval, Duration::from_millis(41250));
    }

    #[tokio::test]
    async fn test_read_hello_closed_early() {
        let mut read = stream::iter(vec![Ok(Message::Close(None))]);
        assert!(matches!(
            read_hello(&mut read).await,
            Err(GatewayError::NoHello)
        ));
    }

    #[test]
    fn test_message_create_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let payload: GatewayPayload = serde_json::from_value(json!({
            "op": 0,
            "s": 3,
            "t": "MESSAGE_CREATE",
            "d": {
                "channel_id": "987",
                "author": { "id": "14", "username": "bob" },
                "content": "hey",
                "timestamp": "2023-11-14T22:13:20+00:00"
            }
        }))
        .unwrap();

        assert!(!handle_dispatch(payload, &tx));
        let inbound = rx.try_recv().unwrap();
        assert_eq!(inbound.platform, Platform::Fluxer);
        assert_eq!(inbound.content, "hey");
    }

    #[test]
    fn test_ready_marks_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let payload: GatewayPayload = serde_json::from_value(json!({
            "op": 0,
            "s": 1,
            "t": "READY",
            "d": { "user": { "id": "1", "username": "bridge", "bot": true } }
        }))
        .unwrap();

        assert!(handle_dispatch(payload, &tx));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_identify_frame() {
        let identify = Identify {
            token: "secret".to_string(),
            intents: INTENTS,
            properties: IdentifyProperties::current(),
        };
        let message = frame(opcode::IDENTIFY, serde_json::to_value(identify).unwrap()).unwrap();
        let Message::Text(text) = message else {
            panic!("expected text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["op"], 2);
        assert_eq!(value["d"]["intents"], 0);
        assert_eq!(value["d"]["properties"]["browser"], env!("CARGO_PKG_NAME"));
    }
}
