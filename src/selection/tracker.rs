use super::{Selection, SelectionGeometry};
use crate::dom::Document;
use crate::layout::LayoutProbe;
use tokio::sync::watch;
use tracing::trace;

/// Publishes [`SelectionGeometry`] to any number of subscribers.
///
/// The tracker only reads the selection; it never changes it.
#[derive(Debug)]
pub struct SelectionTracker {
    sender: watch::Sender<SelectionGeometry>,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SelectionGeometry::default());
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionGeometry> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> SelectionGeometry {
        *self.sender.borrow()
    }

    /// Recompute geometry for `selection` and notify subscribers if it changed.
    pub fn observe(
        &self,
        document: Option<&Document>,
        selection: &Selection,
        layout: &impl LayoutProbe,
    ) -> SelectionGeometry {
        let geometry = measure(document, selection, layout);
        let changed = self.sender.send_if_modified(|current| {
            if *current == geometry {
                false
            } else {
                *current = geometry;
                true
            }
        });
        if changed {
            trace!(
                collapsed = geometry.is_collapsed,
                left = geometry.left(),
                top = geometry.top(),
                width = geometry.width(),
                "Selection geometry changed"
            );
        }
        geometry
    }
}

fn measure(
    document: Option<&Document>,
    selection: &Selection,
    layout: &impl LayoutProbe,
) -> SelectionGeometry {
    let (Some(document), Some(range)) = (document, selection.range_at(0)) else {
        return SelectionGeometry::default();
    };
    if !range.is_valid_in(document) {
        return SelectionGeometry::default();
    }
    SelectionGeometry {
        rect: layout.bounding_rect(document, range),
        is_collapsed: range.is_collapsed(),
    }
}
