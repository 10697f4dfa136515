use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Intent reported when nothing matched.
pub const DEFAULT_INTENT: &str = "default";
/// Intent reported when the store could not be consulted.
pub const ERROR_INTENT: &str = "error";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub example_phrases: Vec<String>,
    pub response_template: String,
}

impl Intent {
    /// True when any non-blank example phrase occurs inside `normalized_text`.
    /// Phrases are lowercased but kept verbatim otherwise, surrounding spaces included.
    pub fn matches(&self, normalized_text: &str) -> bool {
        self.example_phrases.iter().any(|phrase| {
            !phrase.trim().is_empty() && normalized_text.contains(&phrase.to_lowercase())
        })
    }
}

/// How a reply was derived, not a probability. Always within `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const MATCHED: Self = Self(0.9);
    pub const CLARIFY: Self = Self(0.8);
    pub const KEYWORD: Self = Self(0.7);
    pub const DEFAULT: Self = Self(0.5);
    pub const NONE: Self = Self(0.0);

    pub fn new(value: f64) -> Result<Self, DomainError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::ConfidenceOutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

/// The (text, intent, confidence) triple every resolution path produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub response: String,
    pub intent: String,
    pub confidence: Confidence,
}

impl Classification {
    pub fn new(
        response: impl Into<String>,
        intent: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self { response: response.into(), intent: intent.into(), confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::{Confidence, Intent};

    fn intent(phrases: &[&str]) -> Intent {
        Intent {
            name: "hours".to_string(),
            example_phrases: phrases.iter().map(|phrase| phrase.to_string()).collect(),
            response_template: "Abrimos de 9 a 18".to_string(),
        }
    }

    #[test]
    fn example_phrase_match_is_case_insensitive_containment() {
        let hours = intent(&["Horario de Atención"]);
        assert!(hours.matches("¿cuál es su horario de atención hoy?"));
        assert!(!hours.matches("horario"));
    }

    #[test]
    fn blank_example_phrases_never_match() {
        assert!(!intent(&["", "   "]).matches("cualquier cosa"));
    }

    #[test]
    fn example_phrase_padding_is_part_of_the_match() {
        let padded = intent(&[" horario "]);
        assert!(padded.matches("¿cuál es el horario de hoy?"));
        assert!(!padded.matches("horario"));
        assert!(!padded.matches("¿cuál es el horario?"));
    }

    #[test]
    fn confidence_rejects_values_outside_unit_interval() {
        assert!(Confidence::new(1.2).is_err());
        assert!(Confidence::new(-0.1).is_err());
        assert_eq!(Confidence::new(0.9).map(Confidence::value), Ok(0.9));
    }

    #[test]
    fn confidence_serializes_as_plain_number() {
        let json = serde_json::to_string(&Confidence::KEYWORD).expect("serialize");
        assert_eq!(json, "0.7");
        assert!(serde_json::from_str::<Confidence>("3.0").is_err());
    }
}
