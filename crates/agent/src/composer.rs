use serde::{Deserialize, Serialize};

use frontdesk_core::domain::enrollment::{Career, EnrollmentStatistics, Student};
use frontdesk_core::domain::intent::{Classification, Confidence};

use crate::reports::ReportSummary;

/// Structured data produced by a router branch, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StructuredPayload {
    #[default]
    None,
    Statistics(EnrollmentStatistics),
    Students(Vec<Student>),
    Careers(Vec<Career>),
    Report(ReportSummary),
}

/// Result of one router branch: the reply triple plus its data.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOutcome {
    pub classification: Classification,
    pub payload: StructuredPayload,
}

impl RouteOutcome {
    pub fn text(response: impl Into<String>, intent: &str, confidence: Confidence) -> Self {
        Self {
            classification: Classification::new(response, intent, confidence),
            payload: StructuredPayload::None,
        }
    }

    pub fn with_payload(mut self, payload: StructuredPayload) -> Self {
        self.payload = payload;
        self
    }
}

impl From<Classification> for RouteOutcome {
    fn from(classification: Classification) -> Self {
        Self { classification, payload: StructuredPayload::None }
    }
}

/// The per-turn payload returned to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub bot_response: String,
    pub intent: String,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estadisticas: Option<EnrollmentStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estudiantes: Option<Vec<Student>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carreras: Option<Vec<Career>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporte: Option<ReportSummary>,
}

pub fn compose(outcome: RouteOutcome) -> ChatReply {
    let RouteOutcome { classification, payload } = outcome;
    let mut reply = ChatReply {
        bot_response: classification.response,
        intent: classification.intent,
        confidence: classification.confidence,
        estadisticas: None,
        estudiantes: None,
        carreras: None,
        reporte: None,
    };

    match payload {
        StructuredPayload::None => {}
        StructuredPayload::Statistics(statistics) => reply.estadisticas = Some(statistics),
        StructuredPayload::Students(students) => reply.estudiantes = Some(students),
        StructuredPayload::Careers(careers) => reply.carreras = Some(careers),
        StructuredPayload::Report(summary) => reply.reporte = Some(summary),
    }

    reply
}
