pub mod config;
pub mod domain;
pub mod errors;

pub use domain::conversation::{
    ChatAnalytics, ChatMessage, IntentCount, MessageType, NewChatMessage,
};
pub use domain::enrollment::{Career, CareerHeadcount, EnrollmentStatistics, Student};
pub use domain::intent::{Classification, Confidence, Intent, DEFAULT_INTENT, ERROR_INTENT};
pub use domain::report::{ReportDescriptor, ReportKind, ReportMetadata, ReportRows, TabularReport};
pub use domain::utterance::{SessionId, Utterance};
pub use errors::{ApplicationError, DomainError, InterfaceError};
