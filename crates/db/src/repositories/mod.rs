use async_trait::async_trait;
use thiserror::Error;

use frontdesk_core::domain::conversation::{ChatAnalytics, ChatMessage, NewChatMessage};
use frontdesk_core::domain::enrollment::{Career, EnrollmentStatistics, Student};
use frontdesk_core::domain::intent::Intent;
use frontdesk_core::domain::report::ReportMetadata;
use frontdesk_core::domain::utterance::SessionId;

pub mod conversation;
pub mod enrollment;
pub mod intent;
pub mod memory;
pub mod report;

pub use conversation::SqlConversationRepository;
pub use enrollment::SqlEnrollmentRepository;
pub use intent::SqlIntentRepository;
pub use memory::InMemoryCampusStore;
pub use report::SqlReportRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait IntentRepository: Send + Sync {
    /// All intents in store order (by name).
    async fn fetch_intents(&self) -> Result<Vec<Intent>, RepositoryError>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// `None` when there are no student records at all.
    async fn fetch_statistics(&self) -> Result<Option<EnrollmentStatistics>, RepositoryError>;

    /// Unpaid enrollments, most recent enrollment date first.
    async fn fetch_pending_enrollment_students(&self) -> Result<Vec<Student>, RepositoryError>;

    /// Active careers ordered by name.
    async fn fetch_careers(&self) -> Result<Vec<Career>, RepositoryError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn insert_chat_message(&self, message: NewChatMessage) -> Result<i64, RepositoryError>;

    /// The `limit` most recent turns of a session, oldest first.
    async fn chat_history(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    async fn analytics(&self) -> Result<ChatAnalytics, RepositoryError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert_report_metadata(&self, metadata: ReportMetadata)
        -> Result<(), RepositoryError>;
}

pub(crate) fn decode_error(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}
