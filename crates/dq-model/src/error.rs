use thiserror::Error;

use crate::kind::CheckKind;

/// Failures raised while turning candidate text into a validated [`Rule`].
///
/// [`Rule`]: crate::rule::Rule
#[derive(Debug, Error)]
pub enum RuleError {
    /// No JSON object could be extracted from the candidate text, even
    /// after falling back to brace-delimited extraction.
    #[error("no JSON rule object could be extracted: {reason}")]
    Malformed { reason: String },

    /// The parsed kind is not in the allow-list. The full list is carried
    /// so the caller can display what would have been accepted.
    #[error("unsupported check kind: {kind:?}")]
    UnsupportedKind {
        kind: String,
        allowed: Vec<&'static str>,
    },

    /// One or more required parameters are absent for the parsed kind.
    #[error("check kind {kind} is missing required parameters: {}", missing.join(", "))]
    MissingParameters {
        kind: CheckKind,
        missing: Vec<String>,
    },
}

impl RuleError {
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        RuleError::UnsupportedKind {
            kind: kind.into(),
            allowed: CheckKind::allowed_names(),
        }
    }
}
