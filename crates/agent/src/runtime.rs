use std::sync::Arc;

use tracing::{error, info};

use frontdesk_core::domain::conversation::{ChatAnalytics, ChatMessage};
use frontdesk_core::domain::report::{ReportDescriptor, ReportKind};
use frontdesk_core::domain::utterance::{SessionId, Utterance};
use frontdesk_core::errors::DomainError;
use frontdesk_db::repositories::{
    ConversationRepository, EnrollmentRepository, IntentRepository, ReportRepository,
    RepositoryError, SqlConversationRepository, SqlEnrollmentRepository, SqlIntentRepository,
    SqlReportRepository,
};
use frontdesk_db::DbPool;

use crate::composer::{compose, ChatReply, RouteOutcome};
use crate::filter::ConversationRecorder;
use crate::matcher::IntentMatcher;
use crate::reports::ReportService;
use crate::router::DomainQueryRouter;

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Store handles shared by every component of the runtime.
#[derive(Clone)]
pub struct Repositories {
    pub intents: Arc<dyn IntentRepository>,
    pub enrollment: Arc<dyn EnrollmentRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub reports: Arc<dyn ReportRepository>,
}

impl Repositories {
    pub fn sql(pool: DbPool) -> Self {
        Self {
            intents: Arc::new(SqlIntentRepository::new(pool.clone())),
            enrollment: Arc::new(SqlEnrollmentRepository::new(pool.clone())),
            conversations: Arc::new(SqlConversationRepository::new(pool.clone())),
            reports: Arc::new(SqlReportRepository::new(pool)),
        }
    }

    /// One store object serving every trait, e.g. `InMemoryCampusStore`.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: IntentRepository
            + EnrollmentRepository
            + ConversationRepository
            + ReportRepository
            + 'static,
    {
        Self {
            intents: store.clone(),
            enrollment: store.clone(),
            conversations: store.clone(),
            reports: store,
        }
    }
}

/// Outcome of one chat turn.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatTurn {
    pub reply: ChatReply,
    pub persisted: bool,
}

pub struct AssistantRuntime {
    matcher: IntentMatcher,
    router: DomainQueryRouter,
    recorder: ConversationRecorder,
    reports: Arc<ReportService>,
    conversations: Arc<dyn ConversationRepository>,
    history_limit: u32,
}

impl AssistantRuntime {
    pub fn new(repositories: Repositories) -> Self {
        let reports = Arc::new(ReportService::new(
            repositories.enrollment.clone(),
            repositories.reports.clone(),
        ));

        Self {
            matcher: IntentMatcher::new(repositories.intents),
            router: DomainQueryRouter::new(repositories.enrollment, reports.clone()),
            recorder: ConversationRecorder::new(repositories.conversations.clone()),
            reports,
            conversations: repositories.conversations,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, history_limit: u32) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Validates the raw text, then runs [`Self::handle_turn`].
    pub async fn respond(
        &self,
        text: &str,
        session_id: Option<&str>,
    ) -> Result<ChatTurn, DomainError> {
        let utterance = Utterance::new(text, SessionId::parse(session_id))?;
        Ok(self.handle_turn(&utterance).await)
    }

    /// Router when a university topic is present, intent matcher otherwise.
    /// Store failures surface as fallback replies, never as errors.
    pub async fn handle_turn(&self, utterance: &Utterance) -> ChatTurn {
        let outcome = match self.router.detect(utterance) {
            Some(group) => self.router.route(utterance, group).await,
            None => RouteOutcome::from(self.matcher.classify(utterance).await),
        };

        let persisted = self.recorder.record(utterance, &outcome.classification).await;
        let reply = compose(outcome);

        info!(
            event_name = "agent.turn.completed",
            session_id = utterance.session_id().map(|id| id.0.as_str()).unwrap_or("-"),
            intent = %reply.intent,
            confidence = reply.confidence.value(),
            persisted,
        );

        ChatTurn { reply, persisted }
    }

    /// Most recent turns of a session, oldest first. Empty on store failure.
    pub async fn history(&self, session_id: &SessionId, limit: Option<u32>) -> Vec<ChatMessage> {
        let limit = limit.unwrap_or(self.history_limit);
        match self.conversations.chat_history(session_id, limit).await {
            Ok(messages) => messages,
            Err(store_error) => {
                error!(
                    event_name = "agent.history.failed",
                    session_id = %session_id.0,
                    error = %store_error,
                    "returning empty history"
                );
                Vec::new()
            }
        }
    }

    pub async fn analytics(&self) -> Result<ChatAnalytics, RepositoryError> {
        self.conversations.analytics().await
    }

    pub async fn generate_report(
        &self,
        kind: ReportKind,
    ) -> Result<ReportDescriptor, RepositoryError> {
        self.reports.generate(kind).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use frontdesk_core::domain::enrollment::Student;
    use frontdesk_core::domain::intent::{Confidence, Intent, DEFAULT_INTENT, ERROR_INTENT};
    use frontdesk_core::domain::utterance::SessionId;
    use frontdesk_core::errors::DomainError;
    use frontdesk_db::repositories::InMemoryCampusStore;

    use super::{AssistantRuntime, Repositories};

    fn campus() -> Arc<InMemoryCampusStore> {
        Arc::new(
            InMemoryCampusStore::new()
                .with_intents(vec![Intent {
                    name: "hours".to_string(),
                    example_phrases: vec!["horario de atención".to_string()],
                    response_template: "Lunes a viernes de 9 a 18".to_string(),
                }])
                .with_students(vec![Student {
                    matricula: "A1".to_string(),
                    first_name: "Ana".to_string(),
                    last_name: "Ruiz".to_string(),
                    career_code: "ISC".to_string(),
                    career_name: None,
                    semester: 1,
                    enrolled_on: NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid date"),
                    enrollment_paid: false,
                    email: None,
                    phone: None,
                }]),
        )
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let runtime = AssistantRuntime::new(Repositories::shared(campus()));

        assert_eq!(runtime.respond("   ", Some("s-1")).await, Err(DomainError::EmptyUtterance));
    }

    #[tokio::test]
    async fn university_topic_takes_the_router_path() {
        let store = campus();
        let runtime = AssistantRuntime::new(Repositories::shared(store.clone()));

        let turn =
            runtime.respond("estadísticas de la universidad", Some("s-1")).await.expect("turn");

        assert_eq!(turn.reply.intent, "estadisticas_universidad");
        assert!(turn.reply.estadisticas.is_some());
        assert!(turn.persisted);
    }

    #[tokio::test]
    async fn small_talk_uses_matcher_and_is_not_persisted() {
        let store = campus();
        let runtime = AssistantRuntime::new(Repositories::shared(store.clone()));

        let turn = runtime.respond("hola", Some("s-1")).await.expect("turn");

        assert_eq!(turn.reply.intent, "greeting");
        assert!(!turn.persisted);
        assert!(store.stored_messages().await.is_empty());

        let unknown = runtime.respond("xyz", Some("s-1")).await.expect("turn");
        assert_eq!(unknown.reply.intent, DEFAULT_INTENT);
        assert_eq!(unknown.reply.confidence, Confidence::DEFAULT);
    }

    #[tokio::test]
    async fn persisted_turns_come_back_in_insertion_order() {
        let runtime = AssistantRuntime::new(Repositories::shared(campus())).with_history_limit(2);
        let session = SessionId("s-7".to_string());

        for text in [
            "¿Cuál es su horario de atención?",
            "¿Hay inscripciones pendientes de pago?",
            "¿Me das el total de estudiantes?",
        ] {
            let turn = runtime.respond(text, Some("s-7")).await.expect("turn");
            assert!(turn.persisted, "{text}");
        }

        let history = runtime.history(&session, None).await;
        let texts: Vec<&str> = history.iter().map(|m| m.user_message.as_str()).collect();
        assert_eq!(
            texts,
            vec!["¿Hay inscripciones pendientes de pago?", "¿Me das el total de estudiantes?"]
        );

        let analytics = runtime.analytics().await.expect("analytics");
        assert_eq!(analytics.total_messages, 3);
        assert_eq!(analytics.unique_sessions, 1);
    }

    #[tokio::test]
    async fn unavailable_store_never_fails_the_turn() {
        let store = campus();
        store.set_unavailable(true);
        let runtime = AssistantRuntime::new(Repositories::shared(store));

        let turn = runtime.respond("¿cuál es el horario?", Some("s-1")).await.expect("turn");

        assert_eq!(turn.reply.intent, ERROR_INTENT);
        assert_eq!(turn.reply.confidence, Confidence::NONE);
        assert!(!turn.persisted);
        assert!(runtime.history(&SessionId("s-1".to_string()), None).await.is_empty());
    }
}
