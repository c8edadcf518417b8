//! The per-selection workflow state machine.
//!
//! Transitions are synchronous and return an [`Effect`] the driver obeys; the
//! machine itself never spawns work. Race safety rests on one rule: every run
//! carries a [`RunToken`], exactly one token is current, and a completion with
//! a stale token is a no-op. In-flight host calls are never cancelled, only
//! their effect is.

use crate::capability::DownloadProgress;
use crate::config::PopupMode;
use crate::outcome::{TranslationError, TranslationOutcome};
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunToken(u64);

#[derive(Debug)]
enum State {
    Idle,
    Previewing {
        selection: Selection,
        token: RunToken,
        /// False in compact mode until the user asks for a preview.
        run_started: bool,
        progress: Option<DownloadProgress>,
    },
    Resolved {
        selection: Selection,
        outcome: TranslationOutcome,
    },
    Dismissed,
}

/// What the driver must do after a transition.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    StartRun { token: RunToken, text: String },
}

/// What the presentation layer renders. A pure projection of the state.
#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    Hidden,
    /// Compact mode: a selection is held but no run has started.
    AwaitingAction,
    Loading { progress: Option<DownloadProgress> },
    Ready { translated: String },
    Failed { error: TranslationError },
}

pub struct StateMachine {
    state: State,
    mode: PopupMode,
    last_token: u64,
}

impl StateMachine {
    pub fn new(mode: PopupMode) -> Self {
        Self { state: State::Idle, mode, last_token: 0 }
    }

    pub fn set_mode(&mut self, mode: PopupMode) {
        self.mode = mode;
    }

    fn mint(&mut self) -> RunToken {
        self.last_token += 1;
        RunToken(self.last_token)
    }

    /// A qualifying selection arrived. Supersedes whatever was active; the
    /// superseded run's eventual completion will carry a stale token.
    pub fn selection_arrived(&mut self, selection: Selection) -> Effect {
        let token = self.mint();
        let start_now = self.mode == PopupMode::Full;
        let text = selection.text.clone();
        log::debug!("selection arrived, minted {token:?} (start_now={start_now})");
        self.state = State::Previewing { selection, token, run_started: start_now, progress: None };
        if start_now {
            Effect::StartRun { token, text }
        } else {
            Effect::None
        }
    }

    /// Compact mode: the user explicitly asked for a preview.
    pub fn request_preview(&mut self) -> Effect {
        match &mut self.state {
            State::Previewing { selection, token, run_started, .. } if !*run_started => {
                *run_started = true;
                Effect::StartRun { token: *token, text: selection.text.clone() }
            }
            _ => Effect::None,
        }
    }

    /// Compact mode direct apply: marks the held selection's run as started
    /// and hands back what the driver needs to run the pipeline inline.
    pub fn begin_direct_run(&mut self) -> Option<(RunToken, Selection)> {
        match &mut self.state {
            State::Previewing { selection, token, run_started, .. } => {
                *run_started = true;
                Some((*token, selection.clone()))
            }
            _ => None,
        }
    }

    /// Mints a token without any popup state, so a command-channel run
    /// invalidates any in-flight popup run.
    pub fn supersede_for_command(&mut self) -> RunToken {
        let token = self.mint();
        self.state = State::Idle;
        token
    }

    pub fn selection_cleared(&mut self) {
        if !matches!(self.state, State::Idle) {
            log::debug!("selection cleared");
        }
        self.state = State::Idle;
    }

    /// Download progress for a run. Ignored unless the token is current.
    pub fn progress(&mut self, token: RunToken, update: DownloadProgress) {
        if let State::Previewing { token: current, progress, run_started: true, .. } =
            &mut self.state
        {
            if *current == token {
                *progress = Some(update);
            }
        }
    }

    /// A pipeline run finished. Applies only if `token` is still current;
    /// stale completions are dropped, which is the entire race-safety
    /// contract. A failure outcome still resolves — errors are display
    /// states, not crashes. Returns whether the completion was applied.
    pub fn run_completed(&mut self, token: RunToken, outcome: TranslationOutcome) -> bool {
        match &self.state {
            State::Previewing { token: current, selection, run_started: true, .. }
                if *current == token =>
            {
                let selection = selection.clone();
                log::debug!("run {token:?} resolved (success={})", outcome.is_success());
                self.state = State::Resolved { selection, outcome };
                true
            }
            _ => {
                log::debug!("stale run {token:?} completed, dropped");
                false
            }
        }
    }

    /// Consumes a successful resolution for an apply action. The first call
    /// moves to `Dismissed`; any further call is `None`, which makes the
    /// apply actions single-shot. A resolved failure is not consumable.
    pub fn take_success(&mut self) -> Option<(Selection, String)> {
        match &self.state {
            State::Resolved { outcome: TranslationOutcome::Success(text), selection } => {
                let taken = (selection.clone(), text.clone());
                self.state = State::Dismissed;
                Some(taken)
            }
            _ => None,
        }
    }

    /// The implicit Dismissed -> Idle edge, taken once the apply finished.
    pub fn settle_dismissed(&mut self) {
        if matches!(self.state, State::Dismissed) {
            self.state = State::Idle;
        }
    }

    pub fn current_selection(&self) -> Option<&Selection> {
        match &self.state {
            State::Previewing { selection, .. } | State::Resolved { selection, .. } => {
                Some(selection)
            }
            _ => None,
        }
    }

    pub fn ui_state(&self) -> UiState {
        match &self.state {
            State::Idle | State::Dismissed => UiState::Hidden,
            State::Previewing { run_started: false, .. } => UiState::AwaitingAction,
            State::Previewing { progress, .. } => UiState::Loading { progress: *progress },
            State::Resolved { outcome: TranslationOutcome::Success(text), .. } => {
                UiState::Ready { translated: text.clone() }
            }
            State::Resolved { outcome: TranslationOutcome::Failure(error), .. } => {
                UiState::Failed { error: error.clone() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{AnchorRect, EditableField};
    use std::sync::Arc;
    use std::time::Instant;

    struct NullField;

    impl EditableField for NullField {
        fn value(&self) -> String {
            String::new()
        }
        fn selection_range(&self) -> (usize, usize) {
            (0, 0)
        }
        fn set_value(&self, _value: String) {}
        fn set_caret(&self, _offset: usize) {}
        fn focus(&self) {}
        fn notify_input(&self) {}
        fn bounding_rect(&self) -> AnchorRect {
            AnchorRect::default()
        }
    }

    fn selection(text: &str) -> Selection {
        Selection {
            text: text.to_string(),
            range: (0, text.chars().count()),
            anchor: AnchorRect::default(),
            field: Arc::new(NullField),
            captured_at: Instant::now(),
        }
    }

    fn start_token(effect: Effect) -> RunToken {
        match effect {
            Effect::StartRun { token, .. } => token,
            other => panic!("expected StartRun, got {other:?}"),
        }
    }

    #[test]
    fn full_mode_starts_a_run_on_selection() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let effect = machine.selection_arrived(selection("hello"));
        assert!(matches!(effect, Effect::StartRun { ref text, .. } if text == "hello"));
        assert!(matches!(machine.ui_state(), UiState::Loading { .. }));
    }

    #[test]
    fn newer_selection_supersedes_and_stale_completion_is_dropped() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let first = start_token(machine.selection_arrived(selection("first")));
        let second = start_token(machine.selection_arrived(selection("second")));

        // The fast second run resolves.
        assert!(machine.run_completed(second, TranslationOutcome::Success("二".to_string())));
        assert_eq!(machine.ui_state(), UiState::Ready { translated: "二".to_string() });

        // The slow first run's late completion must not overwrite it.
        assert!(!machine.run_completed(first, TranslationOutcome::Success("一".to_string())));
        assert_eq!(machine.ui_state(), UiState::Ready { translated: "二".to_string() });
    }

    #[test]
    fn completion_after_clear_is_dropped() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let token = start_token(machine.selection_arrived(selection("hello")));
        machine.selection_cleared();
        assert!(!machine.run_completed(token, TranslationOutcome::Success("x".to_string())));
        assert_eq!(machine.ui_state(), UiState::Hidden);
    }

    #[test]
    fn failure_resolves_to_a_display_state() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let token = start_token(machine.selection_arrived(selection("hello")));
        let outcome = TranslationOutcome::unexpected("testing");
        assert!(machine.run_completed(token, outcome));
        assert!(matches!(machine.ui_state(), UiState::Failed { .. }));
        // A failure is never consumable by an apply action.
        assert!(machine.take_success().is_none());
    }

    #[test]
    fn take_success_is_single_shot() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let token = start_token(machine.selection_arrived(selection("hello")));
        machine.run_completed(token, TranslationOutcome::Success("こんにちは".to_string()));

        let (_, text) = machine.take_success().expect("first take succeeds");
        assert_eq!(text, "こんにちは");
        assert!(machine.take_success().is_none());

        machine.settle_dismissed();
        assert_eq!(machine.ui_state(), UiState::Hidden);
    }

    #[test]
    fn compact_mode_defers_the_run_until_preview() {
        let mut machine = StateMachine::new(PopupMode::Compact);
        assert_eq!(machine.selection_arrived(selection("hello")), Effect::None);
        assert_eq!(machine.ui_state(), UiState::AwaitingAction);

        let effect = machine.request_preview();
        let token = start_token(effect);
        assert!(matches!(machine.ui_state(), UiState::Loading { .. }));

        // Requesting again while running does nothing.
        assert_eq!(machine.request_preview(), Effect::None);
        assert!(machine.run_completed(token, TranslationOutcome::Success("x".to_string())));
    }

    #[test]
    fn progress_updates_only_the_current_run() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let first = start_token(machine.selection_arrived(selection("first")));
        let second = start_token(machine.selection_arrived(selection("second")));

        machine.progress(first, DownloadProgress { loaded: 0.9, total: None });
        assert_eq!(machine.ui_state(), UiState::Loading { progress: None });

        machine.progress(second, DownloadProgress { loaded: 0.4, total: None });
        assert_eq!(
            machine.ui_state(),
            UiState::Loading { progress: Some(DownloadProgress { loaded: 0.4, total: None }) }
        );
    }

    #[test]
    fn command_supersession_invalidates_popup_runs() {
        let mut machine = StateMachine::new(PopupMode::Full);
        let popup_run = start_token(machine.selection_arrived(selection("hello")));
        let _command = machine.supersede_for_command();
        assert!(!machine.run_completed(popup_run, TranslationOutcome::Success("x".to_string())));
        assert_eq!(machine.ui_state(), UiState::Hidden);
    }

    #[test]
    fn direct_run_consumes_the_held_selection() {
        let mut machine = StateMachine::new(PopupMode::Compact);
        machine.selection_arrived(selection("hello"));
        let (token, sel) = machine.begin_direct_run().expect("selection held");
        assert_eq!(sel.text, "hello");
        assert!(machine.run_completed(token, TranslationOutcome::Success("x".to_string())));
    }
}
