//! Label-keyed collection of open plot windows.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::info;

use crate::plotview::PlotView;

/// The plot windows of an application, at most one per label.
///
/// The application owns the registry and passes it where windows are looked
/// up; there is no global instance.
#[derive(Debug, Default)]
pub struct PlotViewRegistry {
    views: BTreeMap<String, PlotView>,
    active: Option<String>,
}

impl PlotViewRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a view under its label and makes it active.
    ///
    /// A view already registered under the same label is closed and
    /// replaced.
    pub fn insert(&mut self, view: PlotView) -> &mut PlotView {
        let label = view.label().to_string();
        self.active = Some(label.clone());
        match self.views.entry(label) {
            Entry::Occupied(mut entry) => {
                info!("Replacing plot view {}", entry.key());
                let mut old = entry.insert(view);
                old.close();
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(view),
        }
    }

    /// View registered under `label`.
    pub fn get(&self, label: &str) -> Option<&PlotView> {
        self.views.get(label)
    }

    /// View registered under `label`, for editing.
    pub fn get_mut(&mut self, label: &str) -> Option<&mut PlotView> {
        self.views.get_mut(label)
    }

    /// Label of the active view.
    pub fn active_label(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active view.
    pub fn active(&self) -> Option<&PlotView> {
        self.active.as_deref().and_then(|label| self.views.get(label))
    }

    /// The active view, for editing.
    pub fn active_mut(&mut self) -> Option<&mut PlotView> {
        let label = self.active.as_deref()?;
        self.views.get_mut(label)
    }

    /// Makes `label` the active view. Returns `false` for unknown labels.
    pub fn set_active(&mut self, label: &str) -> bool {
        if self.views.contains_key(label) {
            self.active = Some(label.to_string());
            true
        } else {
            false
        }
    }

    /// Closes and removes a view. Unknown labels are ignored.
    ///
    /// When the active view is closed the first remaining view becomes active.
    pub fn close(&mut self, label: &str) -> bool {
        let Some(mut view) = self.views.remove(label) else {
            return false;
        };
        view.close();
        if self.active.as_deref() == Some(label) {
            self.active = self.views.keys().next().cloned();
        }
        true
    }

    /// Closes every view.
    pub fn close_all(&mut self) {
        for view in self.views.values_mut() {
            view.close();
        }
        self.views.clear();
        self.active = None;
    }

    /// First free label of the form `"Figure N"`, counting from 1.
    pub fn next_label(&self) -> String {
        (1..)
            .map(|n| format!("Figure {n}"))
            .find(|label| !self.views.contains_key(label))
            .unwrap_or_default()
    }

    /// Registered labels, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// Number of open views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no view is open.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::plotview::Phase;
    use crate::render::RecordingRenderer;

    fn view(label: &str, renderer: &RecordingRenderer) -> PlotView {
        PlotView::new(label, PlotConfig::default(), renderer.clone())
    }

    #[test]
    fn test_insert_replaces_and_closes() {
        let first = RecordingRenderer::new();
        let second = RecordingRenderer::new();
        let mut registry = PlotViewRegistry::new();
        registry.insert(view("Figure 1", &first));
        registry.insert(view("Figure 1", &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.cleared(), 1);
        assert_eq!(second.cleared(), 0);
        assert_eq!(
            registry.get("Figure 1").map(PlotView::phase),
            Some(Phase::Uninitialized)
        );
    }

    #[test]
    fn test_close_and_labels() {
        let renderer = RecordingRenderer::new();
        let mut registry = PlotViewRegistry::new();
        assert_eq!(registry.next_label(), "Figure 1");
        registry.insert(view("Figure 1", &renderer));
        registry.insert(view("Figure 2", &renderer));
        assert_eq!(registry.active_label(), Some("Figure 2"));

        assert!(registry.close("Figure 1"));
        assert!(!registry.close("Figure 1"));
        assert_eq!(registry.next_label(), "Figure 1");
        assert_eq!(registry.labels().collect::<Vec<_>>(), vec!["Figure 2"]);

        assert!(registry.close("Figure 2"));
        assert!(registry.active().is_none());
        assert!(registry.is_empty());
    }
}
