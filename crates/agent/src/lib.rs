//! Per-turn chat engine.
//!
//! A turn flows through the [`router`] when the message mentions a university
//! topic, otherwise through the [`matcher`]. The [`composer`] shapes the reply
//! and the [`filter`] decides whether the exchange is stored.
//!
//! Every component reads the store through the repository traits of
//! `frontdesk-db`, so engine tests run against `InMemoryCampusStore`.

pub mod composer;
pub mod filter;
pub mod matcher;
pub mod reports;
pub mod router;
pub mod runtime;

pub use composer::{compose, ChatReply, RouteOutcome, StructuredPayload};
pub use filter::{should_persist, ConversationRecorder};
pub use matcher::IntentMatcher;
pub use reports::{ReportService, ReportSummary};
pub use router::{DomainQueryRouter, TopicGroup};
pub use runtime::{AssistantRuntime, ChatTurn, Repositories};
