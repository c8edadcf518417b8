//! Capability probing and remediation guidance.
//!
//! Probes never fail: any fault while asking the host collapses to
//! [`Availability::Unavailable`]. When the combined statuses make translation
//! impossible, [`explain`] picks exactly one guidance variant; the priority
//! order below decides which single message the user sees when several
//! conditions hold at once.

use crate::capability::{Availability, DetectorProvider, HostInfo, TranslatorProvider};
use crate::lang::LanguagePair;
use std::sync::Arc;

/// Oldest browser major version that ships the built-in AI APIs at all.
pub const MIN_SUPPORTED_VERSION: u32 = 120;
/// Version from which the APIs are enabled without experimental flags.
pub const RECOMMENDED_VERSION: u32 = 138;

const FLAG_STEPS: [&str; 5] = [
    "Open the experimental flags page (chrome://flags)",
    "Set \"Prompt API for Gemini Nano\" to Enabled",
    "Set \"Translation API\" to Enabled",
    "Set \"Language Detection Web Platform API\" to Enabled",
    "Restart the browser",
];

/// Snapshot of both capability statuses plus host facts, taken fresh for one
/// diagnosis. Never cached across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub has_detector_api: bool,
    pub has_translator_api: bool,
    pub detector: Availability,
    pub translator: Availability,
    pub browser_version: Option<u32>,
}

impl StatusReport {
    fn has_any_api(&self) -> bool {
        self.has_detector_api || self.has_translator_api
    }

    fn status_line(&self) -> String {
        format!("Current status: detection {}, translation {}", self.detector, self.translator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    NeedsUpgrade,
    NeedsFlagEnable,
    DownloadingInProgress,
    DownloadRequired,
    CapabilityUnavailable,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemediationGuide {
    pub kind: GuideKind,
    pub title: String,
    pub message: String,
    pub steps: Vec<String>,
}

/// Maps a status report onto the one guidance variant to show.
///
/// Priority order (a design contract, not an accident): API surface entirely
/// absent beats everything, with version-too-low beating the flag advice;
/// then explicit unavailable, then downloading, then downloadable, then the
/// generic fallback.
pub fn explain(report: &StatusReport) -> RemediationGuide {
    if !report.has_any_api() {
        let version = report.browser_version.unwrap_or(0);
        if version < MIN_SUPPORTED_VERSION {
            return RemediationGuide {
                kind: GuideKind::NeedsUpgrade,
                title: "Browser update required".to_string(),
                message: format!(
                    "Version {version} does not support the built-in AI APIs."
                ),
                steps: vec![
                    "Open the browser menu and choose Help > About".to_string(),
                    format!("Update to version {MIN_SUPPORTED_VERSION} or later"),
                    "Restart the browser after the update completes".to_string(),
                ],
            };
        }
        let mut steps: Vec<String> = FLAG_STEPS.iter().map(|s| s.to_string()).collect();
        steps.push(format!(
            "If that does not help, update to version {RECOMMENDED_VERSION} or later"
        ));
        return RemediationGuide {
            kind: GuideKind::NeedsFlagEnable,
            title: "Built-in AI APIs are not available".to_string(),
            message: "The AI APIs may not be enabled in this browser.".to_string(),
            steps,
        };
    }

    let statuses = [report.detector, report.translator];
    if statuses.contains(&Availability::Unavailable) {
        let mut steps: Vec<String> = FLAG_STEPS.iter().map(|s| s.to_string()).collect();
        steps.push(format!(
            "If that does not help, update to version {RECOMMENDED_VERSION} or later"
        ));
        steps.push(report.status_line());
        return RemediationGuide {
            kind: GuideKind::CapabilityUnavailable,
            title: "AI APIs unavailable".to_string(),
            message: "This browser does not support the on-device AI capabilities.".to_string(),
            steps,
        };
    }
    if statuses.contains(&Availability::Downloading) {
        return RemediationGuide {
            kind: GuideKind::DownloadingInProgress,
            title: "AI model download in progress".to_string(),
            message: "Translation becomes available once the model download finishes."
                .to_string(),
            steps: vec![
                "Wait for the model download to complete".to_string(),
                "Reload the page afterwards".to_string(),
                report.status_line(),
            ],
        };
    }
    if statuses.contains(&Availability::Downloadable) {
        return RemediationGuide {
            kind: GuideKind::DownloadRequired,
            title: "AI model download required".to_string(),
            message: "Translating requires a one-time model download.".to_string(),
            steps: vec![
                "Triggering a translation starts the download".to_string(),
                "The download can take a few minutes".to_string(),
                report.status_line(),
            ],
        };
    }

    RemediationGuide {
        kind: GuideKind::Unexpected,
        title: "AI APIs unavailable".to_string(),
        message: "An unexpected error occurred.".to_string(),
        steps: vec![
            "Restart the browser".to_string(),
            format!("If the problem persists, update to version {RECOMMENDED_VERSION} or later"),
        ],
    }
}

/// Fault-free availability probing over the injected providers.
pub struct CapabilityProbe {
    detectors: Arc<dyn DetectorProvider>,
    translators: Arc<dyn TranslatorProvider>,
    host: Arc<dyn HostInfo>,
    pair: LanguagePair,
}

impl CapabilityProbe {
    pub fn new(
        detectors: Arc<dyn DetectorProvider>,
        translators: Arc<dyn TranslatorProvider>,
        host: Arc<dyn HostInfo>,
        pair: LanguagePair,
    ) -> Self {
        Self { detectors, translators, host, pair }
    }

    pub async fn probe_detector(&self) -> Availability {
        if !self.host.has_detector_api() {
            return Availability::Unavailable;
        }
        match self.detectors.availability().await {
            Ok(status) => status,
            Err(err) => {
                log::warn!("detector availability check failed: {err:#}");
                Availability::Unavailable
            }
        }
    }

    pub async fn probe_translator(&self, source: &str, target: &str) -> Availability {
        if !self.host.has_translator_api() {
            return Availability::Unavailable;
        }
        match self.translators.availability(source, target).await {
            Ok(status) => status,
            Err(err) => {
                log::warn!("translator availability check failed for {source}->{target}: {err:#}");
                Availability::Unavailable
            }
        }
    }

    /// Fresh snapshot of everything [`explain`] needs. The translator is
    /// probed for the configured pair's canonical direction.
    pub async fn report(&self) -> StatusReport {
        StatusReport {
            has_detector_api: self.host.has_detector_api(),
            has_translator_api: self.host.has_translator_api(),
            detector: self.probe_detector().await,
            translator: self
                .probe_translator(&self.pair.secondary, &self.pair.primary)
                .await,
            browser_version: self.host.browser_major_version(),
        }
    }

    pub async fn diagnose(&self) -> RemediationGuide {
        let report = self.report().await;
        log::debug!("capability report: {report:?}");
        explain(&report)
    }
}
