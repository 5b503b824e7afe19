//! Default backend selection.
//!
//! When a caller asks for a tool without naming a backend, a selector picks
//! one from the tool's current backend set. The built-in policy prefers
//! `local`, then `provider`, then `mcp`.

use std::sync::Arc;

use toolmodel::{BackendKind, ToolBackend};

/// Picks the default backend from a tool's backends (in insertion order).
pub type BackendSelector =
    Arc<dyn Fn(&[ToolBackend]) -> Option<ToolBackend> + Send + Sync + 'static>;

pub const DEFAULT_BACKEND_PRIORITY: [BackendKind; 3] =
    [BackendKind::Local, BackendKind::Provider, BackendKind::Mcp];

/// Default priority: local > provider > mcp. Within a kind, the earliest
/// registered backend wins.
pub fn default_backend_selector(backends: &[ToolBackend]) -> Option<ToolBackend> {
    select_by_priority(&DEFAULT_BACKEND_PRIORITY, backends)
}

/// Return the first backend of the highest-priority kind present. Kinds not
/// listed in `priority` are only chosen when nothing listed matches.
pub fn select_by_priority(
    priority: &[BackendKind],
    backends: &[ToolBackend],
) -> Option<ToolBackend> {
    priority
        .iter()
        .find_map(|kind| backends.iter().find(|b| b.kind() == *kind))
        .or_else(|| backends.first())
        .cloned()
}

/// Selector built from an explicit kind priority list.
pub fn priority_selector(priority: Vec<BackendKind>) -> BackendSelector {
    Arc::new(move |backends: &[ToolBackend]| select_by_priority(&priority, backends))
}
