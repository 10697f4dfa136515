use std::sync::Arc;

use tracing::{debug, error};

use frontdesk_core::domain::conversation::{MessageType, NewChatMessage};
use frontdesk_core::domain::intent::Classification;
use frontdesk_core::domain::utterance::Utterance;
use frontdesk_db::repositories::ConversationRepository;

/// Small talk that is never worth keeping, compared against the whole message.
const STOPLIST: &[&str] = &[
    "hola", "hola!", "hi", "hello", "gracias", "thanks", "ok", "okay", "vale", "adiós", "bye",
    "chao", "nos vemos", "bueno", "sí", "no", "ja", "jaja", "jajaja",
];

const VALUABLE_INTENTS: &[&str] = &[
    "services",
    "contact",
    "hours",
    "location",
    "pricing",
    "estudiantes_total",
    "estadisticas_universidad",
    "inscripciones_pendientes",
    "reporte_generado",
    "carreras",
];

const MIN_MESSAGE_CHARS: usize = 3;
const LONG_MESSAGE_CHARS: usize = 15;

/// Decides whether a turn is worth storing.
pub fn should_persist(text: &str, intent: &str) -> bool {
    let trimmed = text.trim();
    let normalized = trimmed.to_lowercase();

    if STOPLIST.contains(&normalized.as_str()) {
        return false;
    }

    let length = trimmed.chars().count();
    if length < MIN_MESSAGE_CHARS {
        return false;
    }

    if VALUABLE_INTENTS.contains(&intent) {
        return true;
    }

    length > LONG_MESSAGE_CHARS
}

/// Applies [`should_persist`] and writes the turns that pass it.
pub struct ConversationRecorder {
    conversations: Arc<dyn ConversationRepository>,
}

impl ConversationRecorder {
    pub fn new(conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { conversations }
    }

    /// True only when a row was written.
    pub async fn record(&self, utterance: &Utterance, classification: &Classification) -> bool {
        let Some(session_id) = utterance.session_id() else {
            debug!(event_name = "agent.persist.no_session", intent = %classification.intent);
            return false;
        };

        if !should_persist(utterance.raw(), &classification.intent) {
            debug!(
                event_name = "agent.persist.skipped",
                session_id = %session_id.0,
                intent = %classification.intent,
                "turn filtered as small talk"
            );
            return false;
        }

        self.persist(NewChatMessage {
            session_id: session_id.clone(),
            message_type: MessageType::User,
            user_message: utterance.raw().to_string(),
            bot_response: classification.response.clone(),
            intent_detected: Some(classification.intent.clone()),
            confidence: classification.confidence,
        })
        .await
    }

    /// Writes one row. Failures are logged and reported as `false`.
    pub async fn persist(&self, message: NewChatMessage) -> bool {
        let session_id = message.session_id.0.clone();
        match self.conversations.insert_chat_message(message).await {
            Ok(id) => {
                debug!(event_name = "agent.persist.stored", session_id = %session_id, message_id = id);
                true
            }
            Err(store_error) => {
                error!(
                    event_name = "agent.persist.failed",
                    session_id = %session_id,
                    error = %store_error,
                    "conversation turn was not stored"
                );
                false
            }
        }
    }
}
