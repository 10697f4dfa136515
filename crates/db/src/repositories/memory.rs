use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use frontdesk_core::domain::conversation::{
    ChatAnalytics, ChatMessage, IntentCount, NewChatMessage,
};
use frontdesk_core::domain::enrollment::{
    Career, CareerHeadcount, EnrollmentStatistics, Student,
};
use frontdesk_core::domain::intent::Intent;
use frontdesk_core::domain::report::ReportMetadata;
use frontdesk_core::domain::utterance::SessionId;

use super::{
    ConversationRepository, EnrollmentRepository, IntentRepository, ReportRepository,
    RepositoryError,
};

/// Process-local store implementing every repository trait.
///
/// Backs the engine's unit tests. `set_unavailable(true)` makes every call
/// fail the way a dropped connection pool would.
#[derive(Default)]
pub struct InMemoryCampusStore {
    intents: RwLock<Vec<Intent>>,
    students: RwLock<Vec<Student>>,
    careers: RwLock<Vec<Career>>,
    messages: RwLock<Vec<ChatMessage>>,
    reports: RwLock<Vec<ReportMetadata>>,
    unavailable: AtomicBool,
}

impl InMemoryCampusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intents(self, intents: Vec<Intent>) -> Self {
        Self { intents: RwLock::new(intents), ..self }
    }

    pub fn with_students(self, students: Vec<Student>) -> Self {
        Self { students: RwLock::new(students), ..self }
    }

    pub fn with_careers(self, careers: Vec<Career>) -> Self {
        Self { careers: RwLock::new(careers), ..self }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn stored_messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub async fn stored_reports(&self) -> Vec<ReportMetadata> {
        self.reports.read().await.clone()
    }

    fn ensure_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn career_name(careers: &[Career], code: &str) -> Option<String> {
        careers.iter().find(|career| career.code == code).map(|career| career.name.clone())
    }
}

#[async_trait::async_trait]
impl IntentRepository for InMemoryCampusStore {
    async fn fetch_intents(&self) -> Result<Vec<Intent>, RepositoryError> {
        self.ensure_available()?;
        let mut intents = self.intents.read().await.clone();
        intents.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(intents)
    }
}

#[async_trait::async_trait]
impl EnrollmentRepository for InMemoryCampusStore {
    async fn fetch_statistics(&self) -> Result<Option<EnrollmentStatistics>, RepositoryError> {
        self.ensure_available()?;
        let students = self.students.read().await;
        if students.is_empty() {
            return Ok(None);
        }
        let careers = self.careers.read().await;

        let mut by_career: Vec<CareerHeadcount> = Vec::new();
        for student in students.iter() {
            let label = Self::career_name(&careers, &student.career_code)
                .unwrap_or_else(|| student.career_code.clone());
            match by_career.iter_mut().find(|entry| entry.career == label) {
                Some(entry) => entry.count += 1,
                None => by_career.push(CareerHeadcount { career: label, count: 1 }),
            }
        }
        by_career.sort_by(|left, right| {
            right.count.cmp(&left.count).then_with(|| left.career.cmp(&right.career))
        });

        let total = students.len() as i64;
        let paid = students.iter().filter(|student| student.enrollment_paid).count() as i64;

        Ok(Some(EnrollmentStatistics { total, paid, pending: total - paid, by_career }))
    }

    async fn fetch_pending_enrollment_students(&self) -> Result<Vec<Student>, RepositoryError> {
        self.ensure_available()?;
        let careers = self.careers.read().await;
        let mut pending: Vec<Student> = self
            .students
            .read()
            .await
            .iter()
            .filter(|student| !student.enrollment_paid)
            .cloned()
            .map(|mut student| {
                student.career_name = Self::career_name(&careers, &student.career_code);
                student
            })
            .collect();
        pending.sort_by(|left, right| {
            right.enrolled_on.cmp(&left.enrolled_on).then_with(|| left.matricula.cmp(&right.matricula))
        });
        Ok(pending)
    }

    async fn fetch_careers(&self) -> Result<Vec<Career>, RepositoryError> {
        self.ensure_available()?;
        let mut careers: Vec<Career> =
            self.careers.read().await.iter().filter(|career| career.active).cloned().collect();
        careers.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(careers)
    }
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryCampusStore {
    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<i64, RepositoryError> {
        self.ensure_available()?;
        let mut messages = self.messages.write().await;
        let id = messages.len() as i64 + 1;
        messages.push(ChatMessage {
            id,
            session_id: message.session_id,
            message_type: message.message_type,
            user_message: message.user_message,
            bot_response: message.bot_response,
            intent_detected: message.intent_detected,
            confidence: message.confidence,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn chat_history(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.ensure_available()?;
        let messages = self.messages.read().await;
        let mut history: Vec<ChatMessage> = messages
            .iter()
            .rev()
            .filter(|message| &message.session_id == session_id)
            .take(limit as usize)
            .cloned()
            .collect();
        history.reverse();
        Ok(history)
    }

    async fn analytics(&self) -> Result<ChatAnalytics, RepositoryError> {
        self.ensure_available()?;
        let messages = self.messages.read().await;

        let mut sessions: Vec<&str> =
            messages.iter().map(|message| message.session_id.0.as_str()).collect();
        sessions.sort_unstable();
        sessions.dedup();

        let mut top_intents: Vec<IntentCount> = Vec::new();
        for intent in messages.iter().filter_map(|message| message.intent_detected.as_deref()) {
            match top_intents.iter_mut().find(|entry| entry.intent == intent) {
                Some(entry) => entry.count += 1,
                None => top_intents.push(IntentCount { intent: intent.to_string(), count: 1 }),
            }
        }
        top_intents.sort_by(|left, right| {
            right.count.cmp(&left.count).then_with(|| left.intent.cmp(&right.intent))
        });
        top_intents.truncate(5);

        Ok(ChatAnalytics {
            total_messages: messages.len() as i64,
            unique_sessions: sessions.len() as i64,
            top_intents,
        })
    }
}

#[async_trait::async_trait]
impl ReportRepository for InMemoryCampusStore {
    async fn insert_report_metadata(
        &self,
        metadata: ReportMetadata,
    ) -> Result<(), RepositoryError> {
        self.ensure_available()?;
        let mut reports = self.reports.write().await;
        match reports.iter_mut().find(|existing| existing.id == metadata.id) {
            Some(existing) => *existing = metadata,
            None => reports.push(metadata),
        }
        Ok(())
    }
}
