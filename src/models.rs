use crate::db::DEFAULT_LIST_LIMIT;
use serde::{Deserialize, Serialize};

// Collection names
pub const CHAT_SESSIONS: &str = "chatsession";
pub const CHAT_MESSAGES: &str = "chatmessage";
pub const TRACKS: &str = "track";
pub const HEALTH_ENTRIES: &str = "healthentry";

// ============================================================================
// Stored schemas
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender role: user, assistant or system.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// A chat message stored on its own, pointing back at its session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub session_id: String,
    #[serde(flatten)]
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEntry {
    pub user_id: String,
    /// Metric type: steps, sleep, calories, mood, water.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub unit: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateChatSessionRequest {
    pub user_id: String,
    pub title: String,
}

impl CreateChatSessionRequest {
    pub fn into_session(self) -> ChatSession {
        ChatSession {
            user_id: self.user_id,
            title: self.title,
            messages: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub session_id: String,
    pub role: String,
    pub content: String,
}

impl AddMessageRequest {
    pub fn into_message(self) -> SessionMessage {
        SessionMessage {
            session_id: self.session_id,
            message: ChatMessage {
                role: self.role,
                content: self.content,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    pub title: String,
    pub artist: String,
    pub url: Option<String>,
}

impl CreateTrackRequest {
    pub fn into_track(self) -> Track {
        Track {
            title: self.title,
            artist: self.artist,
            url: self.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthEntryRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub unit: Option<String>,
}

impl HealthEntryRequest {
    pub fn into_entry(self) -> HealthEntry {
        HealthEntry {
            user_id: self.user_id,
            kind: self.kind,
            value: self.value,
            unit: self.unit,
        }
    }
}

// ============================================================================
// List queries
// ============================================================================

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub session_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct TracksQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    pub user_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<serde_json::Value>,
}
