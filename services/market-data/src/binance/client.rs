//! Binance depth source implementation
//!
//! Opens one `<symbol>@depth` websocket per subscription and feeds
//! normalized depth updates to the engine until stopped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use matching_engine::source::{DepthCallback, Delivery, ErrorCallback};
use matching_engine::{DepthSource, SourceError, Subscription};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use types::ids::Symbol;

use super::normalizer::BinanceNormalizer;
use super::messages::BinanceDepthMessage;

/// Default Binance raw stream endpoint
pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Upper bound on the TCP, TLS and websocket handshake together
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Binance source settings
#[derive(Debug, Clone)]
pub struct BinanceSettings {
    /// Base websocket URL; the stream name is appended as a path segment
    pub ws_url: String,
    /// How long `subscribe` waits for the connection to open
    pub connect_timeout: Duration,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Depth source backed by the Binance diff-depth stream
///
/// Each subscription owns its own connection. There is no reconnect: a
/// dropped stream is reported through the error callback and ends delivery.
pub struct BinanceDepthSource {
    ws_url: String,
    connect_timeout: Duration,
    normalizer: Arc<BinanceNormalizer>,
}

impl BinanceDepthSource {
    pub fn new() -> Self {
        Self::with_settings(BinanceSettings::default())
    }

    pub fn with_settings(settings: BinanceSettings) -> Self {
        Self {
            ws_url: settings.ws_url,
            connect_timeout: settings.connect_timeout,
            normalizer: Arc::new(BinanceNormalizer::new()),
        }
    }

    /// Full stream URL for `symbol`, e.g. `.../ws/btcusdt@depth`
    pub fn stream_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/{}@depth",
            self.ws_url.trim_end_matches('/'),
            symbol.to_stream_name()
        )
    }
}

impl Default for BinanceDepthSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one text frame
///
/// `Ok(None)` marks a control message (subscription ack and the like).
pub fn parse_depth_message(text: &str) -> Result<Option<BinanceDepthMessage>, SourceError> {
    if let Ok(msg) = serde_json::from_str::<BinanceDepthMessage>(text) {
        return Ok(Some(msg));
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if value.get("result").is_some() || value.get("id").is_some() {
            return Ok(None);
        }
    }

    Err(SourceError::Protocol(format!(
        "unable to parse message: {text}"
    )))
}

#[async_trait]
impl DepthSource for BinanceDepthSource {
    async fn subscribe(
        &self,
        symbol: &Symbol,
        on_event: DepthCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError> {
        let url = self.stream_url(symbol);

        // No supervisor runs until this returns
        let handshake = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str())).await;
        let (ws_stream, _) = match handshake {
            Ok(Ok(connected)) => connected,
            Ok(Err(e)) => {
                return Err(SourceError::Connect {
                    url,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(SourceError::Connect {
                    url,
                    reason: "handshake timed out".to_string(),
                })
            }
        };

        info!(%url, "Connected to Binance depth stream");

        let (subscription, delivery) = Subscription::channel();
        let normalizer = self.normalizer.clone();
        tokio::spawn(deliver(ws_stream, normalizer, on_event, on_error, delivery));

        Ok(subscription)
    }
}

/// Delivery loop; `delivery` is dropped on every exit path, which resolves
/// the subscription's completion
async fn deliver(
    ws_stream: WsStream,
    normalizer: Arc<BinanceNormalizer>,
    on_event: DepthCallback,
    on_error: ErrorCallback,
    mut delivery: Delivery,
) {
    let (mut write, mut read) = ws_stream.split();
    let mut delivered = 0u64;

    loop {
        tokio::select! {
            biased;

            _ = delivery.stopped() => {
                debug!(delivered, "Stop requested, closing depth stream");
                if let Err(e) = write.send(Message::Close(None)).await {
                    warn!(error = %e, "Failed to send close frame");
                }
                break;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match parse_depth_message(text.as_str()) {
                        Ok(Some(msg)) => match normalizer.normalize(msg) {
                            Ok(event) => {
                                if delivery.is_stopped() {
                                    continue;
                                }
                                delivered += 1;
                                on_event(event);
                            }
                            Err(e) => warn!(error = %e, "Dropping depth update"),
                        },
                        Ok(None) => debug!(text = text.as_str(), "Control message"),
                        Err(e) => debug!(error = %e, "Skipping undecodable frame"),
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = write.send(Message::Pong(payload)).await {
                            warn!(error = %e, "Failed to send pong");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, delivered, "Depth stream closed by server");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(error = %e, delivered, "Depth stream transport error");
                        on_error(SourceError::Transport(e.to_string()));
                        break;
                    }
                    None => {
                        info!(delivered, "Depth stream ended");
                        break;
                    }
                }
            }
        }
    }
}
