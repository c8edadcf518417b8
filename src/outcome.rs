//! Terminal values of a pipeline run. Failures are data consumed by the
//! state machine's normal resolved transition, never exceptions crossing the
//! pipeline boundary.

use crate::probe::{GuideKind, RemediationGuide};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The host lacks or has disabled the feature, including version-too-low.
    CapabilityUnavailable,
    /// A model fetch is required or in flight. Expected, not a true error.
    DownloadPending,
    /// Any other host-side fault.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationError {
    pub kind: FailureKind,
    pub title: String,
    pub message: String,
    /// Ordered remediation steps shown to the user instead of raw messages.
    pub steps: Vec<String>,
}

impl TranslationError {
    pub fn from_guide(guide: RemediationGuide) -> Self {
        let kind = match guide.kind {
            GuideKind::DownloadingInProgress | GuideKind::DownloadRequired => {
                FailureKind::DownloadPending
            }
            GuideKind::Unexpected => FailureKind::Unexpected,
            GuideKind::NeedsUpgrade
            | GuideKind::NeedsFlagEnable
            | GuideKind::CapabilityUnavailable => FailureKind::CapabilityUnavailable,
        };
        Self { kind, title: guide.title, message: guide.message, steps: guide.steps }
    }

    pub fn unexpected(context: &str) -> Self {
        Self {
            kind: FailureKind::Unexpected,
            title: "Translation failed".to_string(),
            message: format!("An unexpected error occurred while {context}."),
            steps: vec![
                "Try selecting the text again".to_string(),
                "If the problem persists, restart the browser".to_string(),
            ],
        }
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    Success(String),
    Failure(TranslationError),
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn unexpected(context: &str) -> Self {
        Self::Failure(TranslationError::unexpected(context))
    }
}
