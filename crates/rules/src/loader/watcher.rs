//! Filesystem event handler for the notify watcher (hot-reload).

use notify::event::ModifyKind;
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::catalog::CatalogHandle;

use super::core::is_yaml;

/// Handle a single filesystem event from the notify watcher.
///
/// The catalog is rebuilt from scratch rather than patched per file, so a
/// reader never observes a half-applied change.
pub(super) fn handle_fs_event(event: &Event, handle: &CatalogHandle) {
    if !is_relevant(&event.kind) {
        return;
    }

    let Some(path) = event.paths.iter().find(|p| {
        let dotfile = p
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false);
        is_yaml(p) && !dotfile
    }) else {
        return;
    };

    match handle.reload() {
        Ok(catalog) => {
            info!(
                path = %path.display(),
                generation = catalog.generation(),
                rules = catalog.len(),
                degraded = catalog.is_degraded(),
                "hot-reloaded rule catalog"
            );
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to rebuild catalog during hot-reload, keeping previous version"
            );
        }
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}
