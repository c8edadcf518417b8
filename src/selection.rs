//! Selection tracking inside editable fields.
//!
//! The host binding forwards raw DOM-side events (select, pointer-down) into
//! a [`SelectionTracker`]; the tracker filters and enriches them and emits
//! `Option<Selection>` to its consumer (`None` means cleared). Geometry is
//! read at event time, never lazily, since the field may scroll between the
//! event and any later use.

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Assumed popup width used for horizontal clamping.
pub const POPUP_WIDTH: f64 = 240.0;
/// Vertical distance between the anchor top and the popup.
pub const POPUP_OFFSET: f64 = 45.0;
/// Minimum distance kept from every viewport edge.
pub const VIEWPORT_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorRect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl AnchorRect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Where to place the popup for a given anchor: above the selection with a
/// fixed offset, flipped below when the top would leave the viewport, and
/// clamped horizontally assuming [`POPUP_WIDTH`].
pub fn popup_position(anchor: &AnchorRect, viewport: &Viewport) -> (f64, f64) {
    let top = if anchor.top - POPUP_OFFSET >= VIEWPORT_MARGIN {
        anchor.top - POPUP_OFFSET
    } else {
        anchor.bottom + VIEWPORT_MARGIN
    };
    let max_left = (viewport.width - POPUP_WIDTH - VIEWPORT_MARGIN).max(VIEWPORT_MARGIN);
    let left = anchor.left.clamp(VIEWPORT_MARGIN, max_left);
    (left, top)
}

/// Host side of an editable element (input/textarea). Offsets are char
/// offsets into `value()`.
pub trait EditableField: Send + Sync {
    fn value(&self) -> String;
    fn selection_range(&self) -> (usize, usize);
    fn set_value(&self, value: String);
    fn set_caret(&self, offset: usize);
    fn focus(&self);
    /// Raises a synthetic input notification so framework-bound listeners
    /// observe a programmatic edit.
    fn notify_input(&self);
    fn bounding_rect(&self) -> AnchorRect;
}

/// One captured selection. Immutable; a newer selection supersedes it, it is
/// never mutated in place.
#[derive(Clone)]
pub struct Selection {
    pub text: String,
    /// Char offsets recorded at capture time. Apply actions splice at these,
    /// not at re-queried offsets.
    pub range: (usize, usize),
    pub anchor: AnchorRect,
    pub field: Arc<dyn EditableField>,
    pub captured_at: Instant,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("text", &self.text)
            .field("range", &self.range)
            .field("anchor", &self.anchor)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

pub type SelectionCallback = Box<dyn Fn(Option<Selection>) + Send + Sync>;

pub struct SelectionTracker {
    callback: SelectionCallback,
    popup_region: Mutex<Option<AnchorRect>>,
    /// Last emitted (text, range, anchor), for deduping the bursts of
    /// identical select events some hosts fire while dragging.
    last_emitted: Mutex<Option<(String, (usize, usize), AnchorRect)>>,
}

impl SelectionTracker {
    pub fn new(callback: SelectionCallback) -> Self {
        Self { callback, popup_region: Mutex::new(None), last_emitted: Mutex::new(None) }
    }

    /// Region a pointer-down must not clear the selection from (the popup
    /// itself). `None` while no popup is shown.
    pub fn set_popup_region(&self, region: Option<AnchorRect>) {
        *self.popup_region.lock().unwrap() = region;
    }

    /// Native select event on an editable field, delivered in capturing mode
    /// by the host binding so nested targets are seen too.
    pub fn on_select(&self, field: Arc<dyn EditableField>) {
        let (start, end) = field.selection_range();
        let value = field.value();
        let text: String = value.chars().skip(start).take(end.saturating_sub(start)).collect();
        if text.trim().is_empty() {
            // Empty and whitespace-only selections are clears.
            *self.last_emitted.lock().unwrap() = None;
            (self.callback)(None);
            return;
        }
        let anchor = field.bounding_rect();
        let fingerprint = (text.clone(), (start, end), anchor);
        {
            let mut last = self.last_emitted.lock().unwrap();
            if last.as_ref() == Some(&fingerprint) {
                return;
            }
            *last = Some(fingerprint);
        }
        log::debug!("selection captured: {} chars at {start}..{end}", text.chars().count());
        (self.callback)(Some(Selection {
            text,
            range: (start, end),
            anchor,
            field,
            captured_at: Instant::now(),
        }));
    }

    /// Pointer interaction anywhere outside the popup clears the selection.
    pub fn on_pointer_down(&self, x: f64, y: f64) {
        if let Some(region) = *self.popup_region.lock().unwrap() {
            if region.contains(x, y) {
                return;
            }
        }
        *self.last_emitted.lock().unwrap() = None;
        (self.callback)(None);
    }
}

/// RAII guard for a host event listener registration. Dropping it runs the
/// unsubscribe closure, so listeners cannot leak across navigations.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self { unsubscribe: Some(Box::new(unsubscribe)) }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
