use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use frontdesk_agent::{AssistantRuntime, ChatReply};
use frontdesk_core::domain::conversation::{ChatAnalytics, ChatMessage};
use frontdesk_core::domain::utterance::SessionId;
use frontdesk_core::errors::ApplicationError;

use crate::errors::{correlation_id, ApiError};

#[derive(Clone)]
pub struct ChatState {
    runtime: Arc<AssistantRuntime>,
}

impl ChatState {
    pub fn new(runtime: Arc<AssistantRuntime>) -> Self {
        Self { runtime }
    }
}

pub fn router(runtime: Arc<AssistantRuntime>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/history", get(history))
        .route("/analytics", get(analytics))
        .with_state(ChatState::new(runtime))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(flatten)]
    pub reply: ChatReply,
}

pub async fn chat(
    State(state): State<ChatState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let correlation_id = correlation_id();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(
                event_name = "server.chat.invalid_body",
                correlation_id = %correlation_id,
                error = %rejection,
                "chat body could not be parsed"
            );
            ChatRequest::default()
        }
    };

    let turn = state
        .runtime
        .respond(request.message.as_deref().unwrap_or_default(), request.session_id.as_deref())
        .await
        .map_err(|domain_error| {
            ApiError::from(ApplicationError::from(domain_error).into_interface(&correlation_id))
        })?;

    Ok(Json(ChatResponse { success: true, reply: turn.reply }))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
}

/// Each stored turn becomes a user entry followed by the bot's answer.
pub async fn history(
    State(state): State<ChatState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let Some(session_id) = SessionId::parse(query.session_id.as_deref()) else {
        return Json(HistoryResponse { success: true, history: Vec::new() });
    };

    let history =
        state.runtime.history(&session_id, None).await.iter().flat_map(history_entries).collect();

    Json(HistoryResponse { success: true, history })
}

fn history_entries(message: &ChatMessage) -> [HistoryEntry; 2] {
    let timestamp = message.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    [
        HistoryEntry {
            kind: "user",
            message: message.user_message.clone(),
            timestamp: timestamp.clone(),
            intent: None,
        },
        HistoryEntry {
            kind: "bot",
            message: message.bot_response.clone(),
            timestamp,
            intent: message.intent_detected.clone(),
        },
    ]
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub analytics: ChatAnalytics,
}

pub async fn analytics(
    State(state): State<ChatState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let correlation_id = correlation_id();
    let analytics = state.runtime.analytics().await.map_err(|store_error| {
        error!(
            event_name = "server.analytics.failed",
            correlation_id = %correlation_id,
            error = %store_error,
            "analytics query failed"
        );
        ApiError::from(
            ApplicationError::Persistence(store_error.to_string()).into_interface(&correlation_id),
        )
    })?;

    Ok(Json(AnalyticsResponse { success: true, analytics }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        Json,
    };

    use frontdesk_agent::{AssistantRuntime, Repositories};
    use frontdesk_core::domain::intent::Intent;
    use frontdesk_db::repositories::InMemoryCampusStore;

    use super::{analytics, chat, history, ChatRequest, ChatState, HistoryQuery};

    fn state_over(store: Arc<InMemoryCampusStore>) -> ChatState {
        ChatState::new(Arc::new(AssistantRuntime::new(Repositories::shared(store))))
    }

    fn store() -> Arc<InMemoryCampusStore> {
        Arc::new(InMemoryCampusStore::new().with_intents(vec![Intent {
            name: "location".to_string(),
            example_phrases: vec!["dónde están".to_string()],
            response_template: "Estamos en Juárez".to_string(),
        }]))
    }

    fn request(message: &str, session_id: Option<&str>) -> Json<ChatRequest> {
        Json(ChatRequest {
            message: Some(message.to_string()),
            session_id: session_id.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn chat_returns_reply_with_success_flag() {
        let state = state_over(store());

        let Json(response) =
            chat(State(state), Ok(request("¿Dónde están ubicados?", Some("s-1"))))
                .await
                .expect("reply");

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["intent"], "location");
        assert_eq!(json["bot_response"], "Estamos en Juárez");
        assert!(json.get("estadisticas").is_none());
    }

    #[tokio::test]
    async fn empty_message_is_a_bad_request() {
        let state = state_over(store());

        let error = chat(State(state.clone()), Ok(request("   ", Some("s-1"))))
            .await
            .expect_err("empty message");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.body.error, "Mensaje vacío");
        assert!(!error.body.success);

        let missing = chat(State(state), Ok(Json(ChatRequest::default())))
            .await
            .expect_err("missing message");
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn history_lists_user_and_bot_entries_oldest_first() {
        let store = store();
        let state = state_over(store);

        let Json(first) =
            chat(State(state.clone()), Ok(request("¿Dónde están ubicados?", Some("s-9"))))
                .await
                .expect("first");
        let Json(second) = chat(
            State(state.clone()),
            Ok(request("¿Cuál es el horario del sábado?", Some("s-9"))),
        )
        .await
        .expect("second");
        assert_eq!(first.reply.intent, "location");
        assert_eq!(second.reply.intent, "hours");

        let Json(response) = history(
            State(state.clone()),
            Query(HistoryQuery { session_id: Some("s-9".to_string()) }),
        )
        .await;

        assert!(response.success);
        assert_eq!(response.history.len(), 4);
        assert_eq!(response.history[0].kind, "user");
        assert_eq!(response.history[0].message, "¿Dónde están ubicados?");
        assert_eq!(response.history[1].kind, "bot");
        assert_eq!(response.history[1].intent.as_deref(), Some("location"));
        assert_eq!(response.history[2].message, "¿Cuál es el horario del sábado?");

        let Json(empty) = history(State(state), Query(HistoryQuery::default())).await;
        assert!(empty.history.is_empty());
    }

    #[tokio::test]
    async fn analytics_reports_store_failure_as_unavailable() {
        let store = store();
        let state = state_over(store.clone());

        let Json(ok) = analytics(State(state.clone())).await.expect("analytics");
        assert_eq!(ok.analytics.total_messages, 0);

        store.set_unavailable(true);
        let error = analytics(State(state)).await.expect_err("unavailable");
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
