//! Engine.IO v4 / Socket.IO v5 text framing for the long-polling transport.
//!
//! A polling body is a sequence of engine packets joined by `\x1e`. Engine
//! `message` packets carry socket packets:
//! `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Separator between engine packets in one polling body.
pub const RECORD_SEPARATOR: char = '\x1e';

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty packet")]
    Empty,
    #[error("unknown engine packet type `{0}`")]
    UnknownEngineType(char),
    #[error("unknown socket packet type `{0}`")]
    UnknownSocketType(char),
    #[error("binary packets are not supported over text polling")]
    Binary,
    #[error("malformed packet: {0}")]
    Malformed(String),
    #[error("invalid packet json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Payload of the engine `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(String),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(data) => format!("0{data}"),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, CodecError> {
        let mut chars = raw.chars();
        let kind = chars.next().ok_or(CodecError::Empty)?;
        let data = chars.as_str().to_string();
        Ok(match kind {
            '0' => EnginePacket::Open(data),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(data),
            '3' => EnginePacket::Pong(data),
            '4' => EnginePacket::Message(data),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            'b' => return Err(CodecError::Binary),
            other => return Err(CodecError::UnknownEngineType(other)),
        })
    }

    /// Parses the `open` payload; `None` for any other packet.
    pub fn handshake(&self) -> Option<Result<Handshake, CodecError>> {
        match self {
            EnginePacket::Open(data) => Some(serde_json::from_str(data).map_err(CodecError::from)),
            _ => None,
        }
    }
}

/// Splits a polling body into engine packets.
pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>, CodecError> {
    body.split(RECORD_SEPARATOR)
        .filter(|raw| !raw.is_empty())
        .map(EnginePacket::decode)
        .collect()
}

pub fn encode_payload(packets: &[EnginePacket]) -> String {
    packets
        .iter()
        .map(EnginePacket::encode)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
    BinaryEvent,
    BinaryAck,
}

impl SocketPacketKind {
    fn code(self) -> char {
        match self {
            SocketPacketKind::Connect => '0',
            SocketPacketKind::Disconnect => '1',
            SocketPacketKind::Event => '2',
            SocketPacketKind::Ack => '3',
            SocketPacketKind::ConnectError => '4',
            SocketPacketKind::BinaryEvent => '5',
            SocketPacketKind::BinaryAck => '6',
        }
    }

    fn from_code(code: char) -> Result<Self, CodecError> {
        Ok(match code {
            '0' => SocketPacketKind::Connect,
            '1' => SocketPacketKind::Disconnect,
            '2' => SocketPacketKind::Event,
            '3' => SocketPacketKind::Ack,
            '4' => SocketPacketKind::ConnectError,
            '5' => SocketPacketKind::BinaryEvent,
            '6' => SocketPacketKind::BinaryAck,
            other => return Err(CodecError::UnknownSocketType(other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: SocketPacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    /// `CONNECT` to the default namespace with an optional auth object.
    pub fn connect(auth: Option<Value>) -> Self {
        Self {
            kind: SocketPacketKind::Connect,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            data: auth,
        }
    }

    pub fn disconnect() -> Self {
        Self {
            kind: SocketPacketKind::Disconnect,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            data: None,
        }
    }

    pub fn event(name: &str, payload: Value) -> Self {
        Self {
            kind: SocketPacketKind::Event,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            data: Some(Value::Array(vec![Value::String(name.to_string()), payload])),
        }
    }

    /// Name and first argument of an `EVENT` packet.
    pub fn as_event(&self) -> Option<(&str, Value)> {
        if self.kind != SocketPacketKind::Event {
            return None;
        }
        let args = self.data.as_ref()?.as_array()?;
        let name = args.first()?.as_str()?;
        Some((name, args.get(1).cloned().unwrap_or(Value::Null)))
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.code());
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    pub fn decode(raw: &str) -> Result<Self, CodecError> {
        let mut chars = raw.chars();
        let kind = SocketPacketKind::from_code(chars.next().ok_or(CodecError::Empty)?)?;
        if matches!(
            kind,
            SocketPacketKind::BinaryEvent | SocketPacketKind::BinaryAck
        ) {
            return Err(CodecError::Binary);
        }
        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            let namespace = rest[..end].to_string();
            rest = rest.get(end + 1..).unwrap_or("");
            namespace
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        let ack_id = if digits > 0 {
            let id = rest[..digits]
                .parse()
                .map_err(|_| CodecError::Malformed(raw.to_string()))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };

        Ok(Self {
            kind,
            namespace,
            ack_id,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_polling_body_on_record_separator() {
        let body = "2\u{1e}42[\"newDemand\",{\"_id\":\"d1\"}]\u{1e}6";

        let packets = decode_payload(body).unwrap();

        assert_eq!(
            packets,
            vec![
                EnginePacket::Ping(String::new()),
                EnginePacket::Message("2[\"newDemand\",{\"_id\":\"d1\"}]".into()),
                EnginePacket::Noop,
            ]
        );
    }

    #[test]
    fn reads_open_handshake() {
        let open = EnginePacket::decode(
            r#"0{"sid":"abc","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();

        let handshake = open.handshake().unwrap().unwrap();

        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.ping_interval, 25000);
        assert_eq!(handshake.max_payload, Some(1_000_000));
        assert!(EnginePacket::Noop.handshake().is_none());
    }

    #[test]
    fn event_packet_with_namespace_and_ack() {
        let packet = SocketPacket::decode(r#"2/admin,13["matchAccepted",{"_id":"m1"}]"#).unwrap();

        assert_eq!(packet.namespace, "/admin");
        assert_eq!(packet.ack_id, Some(13));
        let (name, payload) = packet.as_event().unwrap();
        assert_eq!(name, "matchAccepted");
        assert_eq!(payload, json!({"_id": "m1"}));
    }

    #[test]
    fn encodes_join_and_connect() {
        let join = SocketPacket::event("joinMatch", json!("m1"));
        assert_eq!(
            EnginePacket::Message(join.encode()).encode(),
            r#"42["joinMatch","m1"]"#
        );

        let connect = SocketPacket::connect(Some(json!({"token": "t"})));
        assert_eq!(connect.encode(), r#"0{"token":"t"}"#);
        assert_eq!(SocketPacket::disconnect().encode(), "1");
    }

    #[test]
    fn connect_ack_decodes_without_namespace() {
        let packet = SocketPacket::decode(r#"0{"sid":"xyz"}"#).unwrap();

        assert_eq!(packet.kind, SocketPacketKind::Connect);
        assert_eq!(packet.namespace, DEFAULT_NAMESPACE);
        assert_eq!(packet.data, Some(json!({"sid": "xyz"})));
        assert!(packet.as_event().is_none());
    }

    #[test]
    fn rejects_binary_and_unknown_types() {
        assert!(matches!(EnginePacket::decode("bAQID"), Err(CodecError::Binary)));
        assert!(matches!(
            EnginePacket::decode("9"),
            Err(CodecError::UnknownEngineType('9'))
        ));
        assert!(matches!(
            SocketPacket::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#),
            Err(CodecError::Binary)
        ));
        assert!(matches!(EnginePacket::decode(""), Err(CodecError::Empty)));
    }

    #[test]
    fn joins_packets_for_post_body() {
        let body = encode_payload(&[
            EnginePacket::Pong(String::new()),
            EnginePacket::Message(SocketPacket::event("leaveMatch", json!("m1")).encode()),
        ]);

        assert_eq!(body, "3\u{1e}42[\"leaveMatch\",\"m1\"]");
    }
}
