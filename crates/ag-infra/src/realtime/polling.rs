//! Socket.IO client over Engine.IO long-polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use ag_core::ports::{RealtimeError, RealtimePort, SessionPort};
use ag_core::realtime::{RealtimeCommand, RealtimeEvent};

use crate::codec::socketio::{
    decode_payload, encode_payload, EnginePacket, SocketPacket, SocketPacketKind,
};

const EVENT_BUFFER: usize = 256;

/// What the client has to do about one received engine packet.
#[derive(Debug, Clone, PartialEq)]
enum Inbound {
    Ping(String),
    Connected,
    Rejected(String),
    Event(RealtimeEvent),
    Closed,
}

fn interpret(packets: Vec<EnginePacket>) -> Vec<Inbound> {
    let mut inbound = Vec::new();
    for packet in packets {
        match packet {
            EnginePacket::Ping(data) => inbound.push(Inbound::Ping(data)),
            EnginePacket::Close => inbound.push(Inbound::Closed),
            EnginePacket::Message(raw) => match SocketPacket::decode(&raw) {
                Ok(packet) => match packet.kind {
                    SocketPacketKind::Connect => inbound.push(Inbound::Connected),
                    SocketPacketKind::ConnectError => {
                        let reason = packet
                            .data
                            .as_ref()
                            .and_then(|data| data.get("message"))
                            .and_then(|message| message.as_str())
                            .unwrap_or("connection refused")
                            .to_string();
                        inbound.push(Inbound::Rejected(reason));
                    }
                    SocketPacketKind::Disconnect => inbound.push(Inbound::Closed),
                    SocketPacketKind::Event => {
                        let Some((name, payload)) = packet.as_event() else {
                            warn!(raw = %raw, "event packet without a name");
                            continue;
                        };
                        match RealtimeEvent::decode(name, payload) {
                            Ok(Some(event)) => inbound.push(Inbound::Event(event)),
                            Ok(None) => debug!(event = name, "ignoring unhandled realtime event"),
                            Err(err) => warn!(error = %err, "dropping malformed realtime event"),
                        }
                    }
                    SocketPacketKind::Ack
                    | SocketPacketKind::BinaryEvent
                    | SocketPacketKind::BinaryAck => {
                        debug!(kind = ?packet.kind, "ignoring socket packet");
                    }
                },
                Err(err) => warn!(error = %err, "undecodable socket packet"),
            },
            EnginePacket::Open(_) | EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
        }
    }
    inbound
}

/// One Engine.IO session.
struct Link {
    http: Client,
    endpoint: String,
    sid: String,
}

impl Link {
    async fn poll(&self) -> Result<Vec<EnginePacket>, RealtimeError> {
        let body = self
            .http
            .get(&self.endpoint)
            .query(&[("EIO", "4"), ("transport", "polling"), ("sid", self.sid.as_str())])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RealtimeError::Transport(err.to_string()))?
            .text()
            .await
            .map_err(|err| RealtimeError::Transport(err.to_string()))?;
        decode_payload(&body).map_err(|err| RealtimeError::Protocol(err.to_string()))
    }

    async fn push(&self, packets: &[EnginePacket]) -> Result<(), RealtimeError> {
        self.http
            .post(&self.endpoint)
            .query(&[("EIO", "4"), ("transport", "polling"), ("sid", self.sid.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(encode_payload(packets))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|err| RealtimeError::Transport(err.to_string()))
    }
}

struct Connection {
    link: Arc<Link>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Process-wide realtime connection. Owned by the application root and
/// injected as `Arc<dyn RealtimePort>`.
pub struct SocketIoPollingClient {
    http: Client,
    endpoint: String,
    session: Arc<dyn SessionPort>,
    events: broadcast::Sender<RealtimeEvent>,
    connected: Arc<AtomicBool>,
    connection: Mutex<Option<Connection>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SocketIoPollingClient {
    pub fn new(socket_url: &str, session: Arc<dyn SessionPort>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            http: Client::new(),
            endpoint: format!("{}/socket.io/", socket_url.trim_end_matches('/')),
            session,
            events,
            connected: Arc::new(AtomicBool::new(false)),
            connection: Mutex::new(None),
        }
    }

    async fn handshake(&self) -> Result<Link, RealtimeError> {
        let body = self
            .http
            .get(&self.endpoint)
            .query(&[("EIO", "4"), ("transport", "polling")])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RealtimeError::Transport(err.to_string()))?
            .text()
            .await
            .map_err(|err| RealtimeError::Transport(err.to_string()))?;

        let handshake = decode_payload(&body)
            .map_err(|err| RealtimeError::Protocol(err.to_string()))?
            .into_iter()
            .find_map(|packet| packet.handshake())
            .ok_or_else(|| RealtimeError::Protocol("missing open packet".to_string()))?
            .map_err(|err| RealtimeError::Protocol(err.to_string()))?;

        debug!(
            sid = %handshake.sid,
            ping_interval = handshake.ping_interval,
            "engine.io handshake complete"
        );
        Ok(Link {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            sid: handshake.sid,
        })
    }

    async fn auth(&self) -> Option<serde_json::Value> {
        match self.session.bearer_token().await {
            Ok(Some(token)) => Some(json!({ "token": token })),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "connecting realtime channel without a token");
                None
            }
        }
    }

    /// Reacts to received packets. Returns `false` once the session ended.
    async fn dispatch(
        link: &Link,
        inbound: Vec<Inbound>,
        events: &broadcast::Sender<RealtimeEvent>,
        connected: &AtomicBool,
    ) -> bool {
        for item in inbound {
            match item {
                Inbound::Ping(data) => {
                    if let Err(err) = link.push(&[EnginePacket::Pong(data)]).await {
                        warn!(error = %err, "failed to answer ping");
                    }
                }
                Inbound::Connected => {
                    if !connected.swap(true, Ordering::SeqCst) {
                        info!(sid = %link.sid, "realtime channel connected");
                    }
                }
                Inbound::Rejected(reason) => {
                    warn!(%reason, "realtime connection rejected");
                    connected.store(false, Ordering::SeqCst);
                    return false;
                }
                Inbound::Event(event) => {
                    debug!(event = event.name(), "realtime event received");
                    // No receivers is not an error.
                    let _ = events.send(event);
                }
                Inbound::Closed => {
                    info!("realtime channel closed by server");
                    connected.store(false, Ordering::SeqCst);
                    return false;
                }
            }
        }
        true
    }

    async fn run(
        link: Arc<Link>,
        events: broadcast::Sender<RealtimeEvent>,
        connected: Arc<AtomicBool>,
        cancel: CancellationToken,
    ) {
        loop {
            let packets = tokio::select! {
                _ = cancel.cancelled() => break,
                packets = link.poll() => packets,
            };
            match packets {
                Ok(packets) => {
                    if !Self::dispatch(&link, interpret(packets), &events, &connected).await {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "realtime poll failed, channel down");
                    connected.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl RealtimePort for SocketIoPollingClient {
    async fn connect(&self) -> Result<(), RealtimeError> {
        if lock(&self.connection).is_some() && self.is_connected() {
            return Ok(());
        }
        let span = info_span!("infra.realtime.connect", endpoint = %self.endpoint);

        async {
            let link = Arc::new(self.handshake().await?);
            let connect = SocketPacket::connect(self.auth().await);
            link.push(&[EnginePacket::Message(connect.encode())]).await?;

            // The server acknowledges the namespace on the first poll.
            let first = interpret(link.poll().await?);
            if let Some(Inbound::Rejected(reason)) = first
                .iter()
                .find(|item| matches!(item, Inbound::Rejected(_)))
            {
                return Err(RealtimeError::Protocol(reason.clone()));
            }
            if !Self::dispatch(&link, first, &self.events, &self.connected).await {
                return Err(RealtimeError::Protocol("closed during connect".to_string()));
            }

            let cancel = CancellationToken::new();
            let task = tokio::spawn(
                Self::run(
                    link.clone(),
                    self.events.clone(),
                    self.connected.clone(),
                    cancel.clone(),
                )
                .in_current_span(),
            );

            let previous = lock(&self.connection).replace(Connection { link, cancel, task });
            if let Some(previous) = previous {
                previous.cancel.cancel();
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn disconnect(&self) -> Result<(), RealtimeError> {
        let Some(connection) = lock(&self.connection).take() else {
            return Ok(());
        };
        connection.cancel.cancel();
        self.connected.store(false, Ordering::SeqCst);

        let goodbye = [
            EnginePacket::Message(SocketPacket::disconnect().encode()),
            EnginePacket::Close,
        ];
        let result = connection.link.push(&goodbye).await;
        if let Err(err) = connection.task.await {
            warn!(error = %err, "realtime poll task ended abnormally");
        }
        info!("realtime channel disconnected");
        result
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.events.subscribe()
    }

    async fn emit(&self, command: RealtimeCommand) -> Result<(), RealtimeError> {
        let link = match lock(&self.connection).as_ref() {
            Some(connection) if self.is_connected() => connection.link.clone(),
            _ => return Err(RealtimeError::NotConnected),
        };
        let packet = SocketPacket::event(command.name(), command.payload());
        debug!(command = command.name(), "emitting realtime command");
        link.push(&[EnginePacket::Message(packet.encode())]).await
    }
}

impl Drop for SocketIoPollingClient {
    fn drop(&mut self) {
        if let Some(connection) = lock(&self.connection).take() {
            connection.cancel.cancel();
            connection.task.abort();
        }
    }
}
