//! Drives the whole feature: selection events in, UI state out.
//!
//! Single writer rule: only this type mutates the shared state machine; the
//! presentation layer reads [`Orchestrator::ui_state`]. Pipeline runs are
//! spawned tasks whose completions re-enter the machine under its lock, where
//! the token comparison drops anything stale. In-flight host calls are never
//! cancelled and carry no timeout; a stalled call leaves the UI loading,
//! which is accepted.

use crate::apply::{self, Clipboard};
use crate::capability::ProgressFn;
use crate::commands::Command;
use crate::config::Settings;
use crate::machine::{Effect, RunToken, StateMachine, UiState};
use crate::outcome::TranslationOutcome;
use crate::pipeline::TranslationPipeline;
use crate::selection::{AnchorRect, EditableField, Selection};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub struct Orchestrator {
    machine: Arc<Mutex<StateMachine>>,
    pipeline: Arc<TranslationPipeline>,
    clipboard: Arc<dyn Clipboard>,
    settings: Mutex<Settings>,
    /// Hostname of the page this instance lives on, checked against the
    /// disabled list.
    page_host: String,
}

impl Orchestrator {
    pub fn new(
        pipeline: Arc<TranslationPipeline>,
        clipboard: Arc<dyn Clipboard>,
        settings: Settings,
        page_host: impl Into<String>,
    ) -> Self {
        let machine = Arc::new(Mutex::new(StateMachine::new(settings.popup_mode)));
        Self { machine, pipeline, clipboard, settings: Mutex::new(settings), page_host: page_host.into() }
    }

    /// Fresh settings snapshot pushed by the host's change notifications.
    pub fn update_settings(&self, settings: Settings) {
        self.machine.lock().unwrap().set_mode(settings.popup_mode);
        *self.settings.lock().unwrap() = settings;
    }

    pub fn ui_state(&self) -> UiState {
        self.machine.lock().unwrap().ui_state()
    }

    /// Anchor of the active selection, for popup placement via
    /// [`crate::selection::popup_position`].
    pub fn current_selection_anchor(&self) -> Option<AnchorRect> {
        self.machine.lock().unwrap().current_selection().map(|s| s.anchor)
    }

    /// Entry point for the selection tracker's callback.
    pub fn handle_selection(&self, selection: Option<Selection>) {
        match selection {
            None => self.machine.lock().unwrap().selection_cleared(),
            Some(selection) => {
                if !self.settings.lock().unwrap().enabled_for(&self.page_host) {
                    log::debug!("popup disabled on {}, ignoring selection", self.page_host);
                    return;
                }
                let effect = self.machine.lock().unwrap().selection_arrived(selection);
                self.obey(effect);
            }
        }
    }

    /// Compact mode: the user clicked the preview affordance.
    pub fn request_preview(&self) {
        let effect = self.machine.lock().unwrap().request_preview();
        self.obey(effect);
    }

    /// Applies a resolved translation over the original selection. No-op
    /// unless the machine holds a successful resolution; a second call after
    /// the first is a no-op by construction.
    pub fn apply_replace(&self) {
        let taken = self.machine.lock().unwrap().take_success();
        if let Some((selection, translated)) = taken {
            apply::apply_replace(&selection, &translated);
        }
        self.machine.lock().unwrap().settle_dismissed();
    }

    /// Copies a resolved translation to the clipboard. Same single-shot
    /// contract as [`Self::apply_replace`].
    pub async fn apply_copy(&self) {
        let taken = self.machine.lock().unwrap().take_success();
        if let Some((selection, translated)) = taken {
            if let Err(err) = apply::apply_copy(self.clipboard.as_ref(), &selection, &translated).await {
                log::warn!("clipboard write failed: {err:#}");
            }
        }
        self.machine.lock().unwrap().settle_dismissed();
    }

    /// Compact mode direct action: translate the held selection on demand,
    /// then replace. A selection arriving mid-run supersedes the run and the
    /// apply does not happen.
    pub async fn replace_selected(&self) {
        if self.run_direct().await == Some(true) {
            self.apply_replace();
        }
    }

    /// Compact mode direct action: translate on demand, then copy.
    pub async fn copy_selected(&self) {
        if self.run_direct().await == Some(true) {
            self.apply_copy().await;
        }
    }

    /// Runs the pipeline inline for the held selection. Returns `Some(true)`
    /// when the run resolved and is still current, `Some(false)` when it was
    /// superseded or failed, `None` when nothing was selected.
    async fn run_direct(&self) -> Option<bool> {
        let (token, selection) = self.machine.lock().unwrap().begin_direct_run()?;
        let on_progress = self.progress_fn(token);
        let outcome = self.pipeline.run(&selection.text, Some(on_progress)).await;
        let applied = self.machine.lock().unwrap().run_completed(token, outcome);
        Some(applied)
    }

    /// A command from the host messaging channel. Commands work on the text
    /// the host captured, apply when they finish regardless of popup state,
    /// and invalidate any in-flight popup run.
    pub async fn handle_command(
        &self,
        command: Command,
        active_field: Option<Arc<dyn EditableField>>,
    ) {
        let token = self.machine.lock().unwrap().supersede_for_command();
        log::info!("command {command:?} superseding popup state as {token:?}");

        match command {
            Command::Replace { text } => {
                let Some(field) = active_field else {
                    log::warn!("replace command with no active editable field");
                    return;
                };
                // Offsets captured before the pipeline suspends; the field
                // may refocus or change while translation runs.
                let range = field.selection_range();
                let anchor = field.bounding_rect();
                match self.pipeline.run(&text, None).await {
                    TranslationOutcome::Success(translated) => {
                        let selection = Selection {
                            text,
                            range,
                            anchor,
                            field,
                            captured_at: Instant::now(),
                        };
                        apply::apply_replace(&selection, &translated);
                    }
                    TranslationOutcome::Failure(error) => {
                        log::warn!("replace command failed: {error}");
                    }
                }
            }
            Command::Copy { text } => match self.pipeline.run(&text, None).await {
                TranslationOutcome::Success(translated) => {
                    if let Err(err) = self.clipboard.write_text(&translated).await {
                        log::warn!("clipboard write failed: {err:#}");
                    } else if let Some(field) = active_field {
                        field.focus();
                    }
                }
                TranslationOutcome::Failure(error) => {
                    log::warn!("copy command failed: {error}");
                }
            },
        }
    }

    fn obey(&self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::StartRun { token, text } => self.spawn_run(token, text),
        }
    }

    fn spawn_run(&self, token: RunToken, text: String) {
        let machine = Arc::clone(&self.machine);
        let pipeline = Arc::clone(&self.pipeline);
        let on_progress = self.progress_fn(token);
        tokio::spawn(async move {
            let outcome = pipeline.run(&text, Some(on_progress)).await;
            // Stale tokens are dropped here, not by cancelling the run.
            machine.lock().unwrap().run_completed(token, outcome);
        });
    }

    fn progress_fn(&self, token: RunToken) -> ProgressFn {
        let machine = Arc::clone(&self.machine);
        Arc::new(move |progress| {
            machine.lock().unwrap().progress(token, progress);
        })
    }
}
