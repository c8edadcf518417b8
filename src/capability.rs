//! Host capability interfaces.
//!
//! The detection and translation models live in the host environment and are
//! reached through these traits only. Two generations of the host API exist
//! (a legacy capabilities-style surface and the current availability-style
//! one); both vocabularies parse onto the single [`Availability`] enum so the
//! rest of the crate is written against one stable interface.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Readiness of one capability, probed fresh on every use. The host may
/// change state between calls, so this is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unavailable,
    Downloadable,
    Downloading,
    Available,
}

impl Availability {
    /// Accepts both host API vocabularies. Anything unrecognized is treated
    /// as unavailable rather than an error.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "available" | "readily" => Self::Available,
            "downloadable" | "after-download" => Self::Downloadable,
            "downloading" => Self::Downloading,
            _ => Self::Unavailable,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unavailable => "unavailable",
            Self::Downloadable => "downloadable",
            Self::Downloading => "downloading",
            Self::Available => "available",
        };
        f.write_str(s)
    }
}

/// Fractional model download progress, forwarded from the host's monitor
/// callback while a capability instance is being created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    /// 0.0 ..= 1.0
    pub loaded: f64,
    pub total: Option<u64>,
}

/// Progress callback handed to `create` when a model download is expected.
pub type ProgressFn = Arc<dyn Fn(DownloadProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCandidate {
    pub language: String,
    pub confidence: f64,
}

#[async_trait]
pub trait DetectorProvider: Send + Sync {
    async fn availability(&self) -> Result<Availability>;
    /// `progress` is only passed when a download is anticipated.
    async fn create(&self, progress: Option<ProgressFn>) -> Result<Box<dyn Detector>>;
}

#[async_trait]
pub trait Detector: Send + Sync {
    /// Resolves once any pending model download has finished.
    async fn ready(&self) -> Result<()>;
    /// Ranked candidates, most confident first.
    async fn detect(&self, text: &str) -> Result<Vec<DetectionCandidate>>;
    fn destroy(&self);
}

#[async_trait]
pub trait TranslatorProvider: Send + Sync {
    async fn availability(&self, source: &str, target: &str) -> Result<Availability>;
    async fn create(
        &self,
        source: &str,
        target: &str,
        progress: Option<ProgressFn>,
    ) -> Result<Box<dyn Translator>>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn ready(&self) -> Result<()>;
    async fn translate(&self, text: &str) -> Result<String>;
    fn destroy(&self);
}

/// Facts about the host itself, used when explaining why a capability is
/// missing. Presence checks are distinct from availability probes: an absent
/// API surface means the host never shipped it, not that a model is missing.
pub trait HostInfo: Send + Sync {
    fn browser_major_version(&self) -> Option<u32>;
    fn has_detector_api(&self) -> bool;
    fn has_translator_api(&self) -> bool;
}
