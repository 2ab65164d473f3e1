use serde::{Deserialize, Serialize};

/// What the embedding page receives: the turn now on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostMessage {
    pub turn: u32,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "key")]
    Key { key: String },
    #[serde(rename = "highlight")]
    Highlight { id: Option<String> },
    #[serde(rename = "toggleHighlight")]
    ToggleHighlight { id: String },
}

pub fn encode_host_message(message: &HostMessage) -> Option<String> {
    serde_json::to_string(message).ok()
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}
