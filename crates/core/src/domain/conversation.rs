use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::intent::Confidence;
use crate::domain::utterance::SessionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    User,
    Bot,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "bot" => Some(Self::Bot),
            _ => None,
        }
    }
}

/// A turn about to be written. The store assigns id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewChatMessage {
    pub session_id: SessionId,
    pub message_type: MessageType,
    pub user_message: String,
    pub bot_response: String,
    pub intent_detected: Option<String>,
    pub confidence: Confidence,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: SessionId,
    pub message_type: MessageType,
    pub user_message: String,
    pub bot_response: String,
    pub intent_detected: Option<String>,
    pub confidence: Confidence,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCount {
    pub intent: String,
    pub count: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnalytics {
    pub total_messages: i64,
    pub unique_sessions: i64,
    pub top_intents: Vec<IntentCount>,
}
