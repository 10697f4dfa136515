use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Blank identifiers are treated as absent.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim).filter(|value| !value.is_empty()).map(|value| Self(value.to_string()))
    }
}

/// One user-submitted chat message.
///
/// `normalized` is the trimmed, lowercased text every matcher works on; the
/// raw text is what gets persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    raw: String,
    normalized: String,
    session_id: Option<SessionId>,
}

impl Utterance {
    pub fn new(raw: &str, session_id: Option<SessionId>) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyUtterance);
        }

        Ok(Self { raw: trimmed.to_string(), normalized: trimmed.to_lowercase(), session_id })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn char_len(&self) -> usize {
        self.raw.chars().count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.normalized.contains(needle)
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionId, Utterance};
    use crate::errors::DomainError;

    #[test]
    fn rejects_whitespace_only_text() {
        assert_eq!(Utterance::new("   \n\t", None), Err(DomainError::EmptyUtterance));
        assert_eq!(Utterance::new("", None), Err(DomainError::EmptyUtterance));
    }

    #[test]
    fn normalizes_case_and_surrounding_whitespace() {
        let utterance = Utterance::new("  ¿Cuál es su HORARIO?  ", None).expect("valid utterance");

        assert_eq!(utterance.raw(), "¿Cuál es su HORARIO?");
        assert_eq!(utterance.normalized(), "¿cuál es su horario?");
        assert!(utterance.contains("horario"));
    }

    #[test]
    fn char_len_counts_accented_characters_once() {
        let utterance = Utterance::new("sí", None).expect("valid utterance");
        assert_eq!(utterance.char_len(), 2);
    }

    #[test]
    fn blank_session_ids_are_dropped() {
        assert_eq!(SessionId::parse(Some("  ")), None);
        assert_eq!(SessionId::parse(None), None);
        assert_eq!(
            SessionId::parse(Some(" session-1 ")),
            Some(SessionId("session-1".to_string()))
        );
    }
}
