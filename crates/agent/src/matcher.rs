use std::sync::Arc;

use tracing::{debug, error};

use frontdesk_core::domain::intent::{
    Classification, Confidence, Intent, DEFAULT_INTENT, ERROR_INTENT,
};
use frontdesk_core::domain::utterance::Utterance;
use frontdesk_db::repositories::IntentRepository;

pub const DEFAULT_GREETING: &str = "¡Hola! Soy tu asistente virtual. ¿En qué puedo ayudarte hoy?";
pub const ERROR_FALLBACK: &str = "¡Hola! ¿En qué puedo ayudarte?";

/// Keyword cues scanned in order when no example phrase matched.
const KEYWORD_INTENTS: &[(&str, &str)] = &[
    ("hola", "greeting"),
    ("servicio", "services"),
    ("contacto", "contact"),
    ("horario", "hours"),
    ("ubicación", "location"),
    ("precio", "pricing"),
    ("gracias", "thanks"),
    ("adiós", "goodbye"),
];

/// Replies used when the intent table has no template for a keyword.
const LOCAL_RESPONSES: &[(&str, &str, &str)] = &[
    ("hola", "greeting", "¡Hola! ¿En qué puedo ayudarte?"),
    (
        "servicios",
        "services",
        "Ofrecemos servicios de consultoría tecnológica, desarrollo de software y soporte técnico. ¿Te interesa algún servicio en particular?",
    ),
    (
        "contacto",
        "contact",
        "Puedes contactarnos en info@recioymendoza.com o llamando al +52 656 123 4567",
    ),
    (
        "horario",
        "hours",
        "Nuestro horario de atención es de lunes a viernes de 9:00 a 18:00 horas",
    ),
    ("ubicación", "location", "Estamos ubicados en Calle Principal 123, Juárez, Chihuahua, México"),
    (
        "precio",
        "pricing",
        "Los precios varían según el servicio. ¿Podrías especificar qué servicio te interesa?",
    ),
];

/// Resolves an utterance against the intent table snapshot.
pub struct IntentMatcher {
    intents: Arc<dyn IntentRepository>,
}

impl IntentMatcher {
    pub fn new(intents: Arc<dyn IntentRepository>) -> Self {
        Self { intents }
    }

    pub async fn classify(&self, utterance: &Utterance) -> Classification {
        match self.intents.fetch_intents().await {
            Ok(snapshot) => resolve(utterance, &snapshot),
            Err(store_error) => {
                error!(
                    event_name = "agent.matcher.store_failed",
                    error = %store_error,
                    "intent table unavailable, replying with fallback"
                );
                Classification::new(ERROR_FALLBACK, ERROR_INTENT, Confidence::NONE)
            }
        }
    }
}

/// Pure resolution over an already fetched snapshot.
pub fn resolve(utterance: &Utterance, snapshot: &[Intent]) -> Classification {
    let text = utterance.normalized();

    if let Some(intent) = snapshot.iter().find(|intent| intent.matches(text)) {
        debug!(event_name = "agent.matcher.phrase_match", intent = %intent.name);
        return Classification::new(&intent.response_template, &intent.name, Confidence::MATCHED);
    }

    let keyword_intent =
        KEYWORD_INTENTS.iter().find(|(keyword, _)| text.contains(keyword)).map(|(_, name)| *name);
    if let Some(name) = keyword_intent {
        if let Some(intent) = snapshot.iter().find(|intent| intent.name == name) {
            debug!(event_name = "agent.matcher.keyword_match", intent = name);
            return Classification::new(&intent.response_template, name, Confidence::KEYWORD);
        }
    }

    if let Some((_, name, response)) =
        LOCAL_RESPONSES.iter().find(|(keyword, _, _)| text.contains(keyword))
    {
        debug!(event_name = "agent.matcher.local_fallback", intent = *name);
        return Classification::new(*response, *name, Confidence::MATCHED);
    }

    Classification::new(DEFAULT_GREETING, DEFAULT_INTENT, Confidence::DEFAULT)
}
