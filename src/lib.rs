//! local-lingo: selection-triggered on-device translation for editable
//! fields (Japanese and one configured other language).
//!
//! The crate is the orchestration core only. The host environment — the page
//! DOM, the built-in detection/translation capabilities, the clipboard, the
//! settings store and the messaging channel — is reached through the traits
//! in [`capability`], [`selection`], [`apply`] and [`config`]; a thin host
//! binding implements them and forwards raw events.
//!
//! Flow: a [`selection::SelectionTracker`] feeds the
//! [`orchestrator::Orchestrator`], which runs the
//! [`pipeline::TranslationPipeline`] and exposes a [`machine::UiState`] for
//! the presentation layer; apply actions splice the result back or copy it.

pub mod apply;
pub mod capability;
pub mod commands;
pub mod config;
pub mod lang;
pub mod machine;
pub mod orchestrator;
pub mod outcome;
pub mod pipeline;
pub mod probe;
pub mod selection;

pub use apply::Clipboard;
pub use capability::{
    Availability, DetectionCandidate, Detector, DetectorProvider, DownloadProgress, HostInfo,
    ProgressFn, Translator, TranslatorProvider,
};
pub use commands::Command;
pub use config::{PopupMode, Settings, SettingsStore};
pub use lang::LanguagePair;
pub use machine::UiState;
pub use orchestrator::Orchestrator;
pub use outcome::{FailureKind, TranslationError, TranslationOutcome};
pub use pipeline::TranslationPipeline;
pub use selection::{AnchorRect, EditableField, Selection, SelectionTracker, Subscription};
