use crate::core::EventError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Transaction-scoped event emission.
///
/// Events set during a transaction are delivered, in call order, only if
/// that transaction commits.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn set_event(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), EventError>;
}

/// An event as delivered to subscribers after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEvent {
    pub tx_id: String,
    /// Always a station public key.
    pub topic: String,
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    pub fn command(&self) -> Option<StationCommand> {
        StationCommand::parse(&self.payload)
    }
}

const SEND_PREFIX: &str = "Send:";
const STOP_PREFIX: &str = "Stop:";

/// Instruction to a station to start or stop streaming to a participant link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StationCommand {
    Send(String),
    Stop(String),
}

impl StationCommand {
    pub fn link(&self) -> &str {
        match self {
            StationCommand::Send(link) | StationCommand::Stop(link) => link,
        }
    }

    /// Prefix and link concatenated verbatim, UTF-8 encoded.
    pub fn to_payload(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Only the first `:` separates the verb, so `udp://host:9000` survives.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(payload).ok()?;
        if let Some(link) = text.strip_prefix(SEND_PREFIX) {
            return Some(StationCommand::Send(link.to_string()));
        }
        text.strip_prefix(STOP_PREFIX)
            .map(|link| StationCommand::Stop(link.to_string()))
    }
}

impl std::fmt::Display for StationCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationCommand::Send(link) => write!(f, "{}{}", SEND_PREFIX, link),
            StationCommand::Stop(link) => write!(f, "{}{}", STOP_PREFIX, link),
        }
    }
}
