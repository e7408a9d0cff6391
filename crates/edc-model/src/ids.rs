use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Participant identifier as assigned at screening/consent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectIdentifier(String);

impl SubjectIdentifier {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSubjectIdentifier(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectIdentifier {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectIdentifier> for String {
    fn from(value: SubjectIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for SubjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Study visit code from the visit schedule (e.g. `1000`, `2000`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisitCode(String);

impl VisitCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidVisitCode(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VisitCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VisitCode> for String {
    fn from(value: VisitCode) -> Self {
        value.0
    }
}

impl fmt::Display for VisitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary key of an appointment row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppointmentId(u64);

impl AppointmentId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_code_is_trimmed() {
        let code = VisitCode::new(" 1000 ").unwrap();
        assert_eq!(code.as_str(), "1000");
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        assert_eq!(
            VisitCode::new("  "),
            Err(ModelError::InvalidVisitCode("  ".to_string()))
        );
        assert!(SubjectIdentifier::new("").is_err());
    }

    #[test]
    fn visit_code_deserializes_through_validation() {
        let code: VisitCode = serde_json::from_str("\"2000\"").unwrap();
        assert_eq!(code.to_string(), "2000");
        assert!(serde_json::from_str::<VisitCode>("\"\"").is_err());
    }
}
