//! Apply actions: splice the translation back into the field, or copy it.
//!
//! Both work from offsets recorded at selection time — the field's content
//! may have changed since, and re-querying would splice at the wrong place.
//! Single-shot behavior is enforced upstream by the state machine's
//! `take_success`, so calling these twice with the same resolution is
//! impossible through the orchestrator.

use crate::selection::{EditableField, Selection};
use anyhow::Result;
use async_trait::async_trait;

/// Host clipboard. Writing is a suspension point.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Splices `translated` over the recorded selection range, raises a synthetic
/// input notification, then restores focus with the caret right after the
/// inserted text.
pub fn apply_replace(selection: &Selection, translated: &str) {
    let (start, end) = selection.range;
    let value = selection.field.value();
    let prefix: String = value.chars().take(start).collect();
    let suffix: String = value.chars().skip(end.max(start)).collect();

    selection.field.set_value(format!("{prefix}{translated}{suffix}"));
    selection.field.notify_input();
    selection.field.focus();
    selection.field.set_caret(start + translated.chars().count());
    log::info!("replaced {}..{} with {} chars", start, end, translated.chars().count());
}

/// Writes `translated` to the clipboard and hands focus back to the owning
/// field. A clipboard fault is reported, not fatal.
pub async fn apply_copy(
    clipboard: &dyn Clipboard,
    selection: &Selection,
    translated: &str,
) -> Result<()> {
    clipboard.write_text(translated).await?;
    selection.field.focus();
    log::info!("copied {} chars to clipboard", translated.chars().count());
    Ok(())
}
