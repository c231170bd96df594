//! View models fed by selection notifications.
//!
//! Each panel keeps only the projection it draws. None of them holds a copy
//! of the session or the label table; they change only through the
//! `SelectionObserver` hooks.

use civis_core::{Label, LabelSummary, SelectionObserver, SelectionUpdate, TraceProjection};

/// Placeholder entry of the three neuron menus.
pub const MENU_PLACEHOLDER: &str = "Click to see options...";

/// Spatial view: which contour is emphasised.
#[derive(Debug, Default)]
pub struct SpatialView {
    pub highlighted: Option<usize>,
}

impl SelectionObserver for SpatialView {
    fn on_highlight(&mut self, update: &SelectionUpdate) {
        self.highlighted = Some(update.index);
    }
}

/// Temporal view: traces of the active neuron.
#[derive(Debug)]
pub struct TemporalView {
    pub title: String,
    pub projection: Option<TraceProjection>,
}

impl Default for TemporalView {
    fn default() -> Self {
        Self {
            title: String::from("Temporal Activity"),
            projection: None,
        }
    }
}

impl SelectionObserver for TemporalView {
    fn on_traces(&mut self, update: &SelectionUpdate) {
        self.title = format!("Temporal Activity: Neuron {}", update.id);
        self.projection = Some(update.traces.clone());
    }
}

/// Keep/Discard/Unlabeled buttons: which one is lit.
#[derive(Debug, Default)]
pub struct LabelIndicator {
    pub active: Option<Label>,
}

impl SelectionObserver for LabelIndicator {
    fn on_label(&mut self, update: &SelectionUpdate) {
        self.active = Some(update.label);
    }
}

/// Slider, index field and Previous/Next buttons.
#[derive(Debug, Default)]
pub struct NavigationView {
    pub id: Option<i64>,
    pub id_range: (i64, i64),
    pub can_previous: bool,
    pub can_next: bool,
    /// Index field buffer; edited by the operator, applied on Enter.
    pub index_text: String,
}

impl NavigationView {
    /// Restores the index field to the active id after a rejected entry.
    pub fn reset_text(&mut self) {
        self.index_text = self.id.map(|id| id.to_string()).unwrap_or_default();
    }
}

impl SelectionObserver for NavigationView {
    fn on_index(&mut self, update: &SelectionUpdate) {
        self.id = Some(update.id);
        self.id_range = update.id_range;
        self.can_previous = update.can_previous;
        self.can_next = update.can_next;
        self.index_text = update.id.to_string();
    }
}

/// Counter text and the three neuron menus.
#[derive(Debug)]
pub struct SummaryView {
    pub counts_text: String,
    pub kept: Vec<i64>,
    pub discarded: Vec<i64>,
    pub unlabeled: Vec<i64>,
}

impl Default for SummaryView {
    fn default() -> Self {
        Self {
            counts_text: String::from("Keep: 0 | Discard: 0 | Unlabeled: 0"),
            kept: Vec::new(),
            discarded: Vec::new(),
            unlabeled: Vec::new(),
        }
    }
}

impl SelectionObserver for SummaryView {
    fn on_labels_changed(&mut self, summary: &LabelSummary) {
        self.counts_text = summary.counts.to_string();
        self.kept = summary.ids(Label::Keep).to_vec();
        self.discarded = summary.ids(Label::Discard).to_vec();
        self.unlabeled = summary.ids(Label::Unlabeled).to_vec();
    }
}

/// Every view model, notified in a fixed order.
#[derive(Debug, Default)]
pub struct Views {
    pub temporal: TemporalView,
    pub spatial: SpatialView,
    pub labels: LabelIndicator,
    pub navigation: NavigationView,
    pub summary: SummaryView,
}

impl Views {
    pub fn observers(&mut self) -> [&mut dyn SelectionObserver; 5] {
        [
            &mut self.temporal,
            &mut self.spatial,
            &mut self.labels,
            &mut self.navigation,
            &mut self.summary,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civis_core::{Annotator, RawSession, SelectionEvent, Step, TraceKind};
    use ndarray::{array, Array2};
    use std::collections::BTreeMap;

    fn session(n: usize) -> civis_core::Session {
        let traces: BTreeMap<_, _> = TraceKind::ALL
            .iter()
            .map(|&kind| (kind, Array2::from_elem((n, 4), 1.0)))
            .collect();
        RawSession {
            image: Array2::zeros((10, 10 * n)),
            contours: (0..n)
                .map(|i| {
                    let x = (i * 10) as f64;
                    array![[x, x + 5.0, x + 5.0, x], [2.0, 2.0, 7.0, 7.0]]
                })
                .collect(),
            traces,
            ids: (1..=n).map(|id| id as f64).collect(),
            centroids: None,
            metadata_path: String::new(),
        }
        .into_session()
        .unwrap()
    }

    #[test]
    fn test_load_refreshes_every_view() {
        let mut views = Views::default();
        let mut annotator = Annotator::default();
        annotator.install(session(3), &mut views.observers()).unwrap();

        assert_eq!(views.temporal.title, "Temporal Activity: Neuron 0");
        assert_eq!(views.spatial.highlighted, Some(0));
        assert_eq!(views.labels.active, Some(Label::Unlabeled));
        assert_eq!(views.navigation.index_text, "0");
        assert_eq!(views.navigation.id_range, (0, 2));
        assert!(!views.navigation.can_previous);
        assert_eq!(views.summary.counts_text, "Keep: 0 | Discard: 0 | Unlabeled: 3");
        assert_eq!(views.summary.unlabeled, vec![0, 1, 2]);
    }

    #[test]
    fn test_views_follow_navigation_and_labels() {
        let mut views = Views::default();
        let mut annotator = Annotator::default();
        annotator.install(session(3), &mut views.observers()).unwrap();

        annotator
            .dispatch(SelectionEvent::Step(Step::Next), &mut views.observers())
            .unwrap();
        annotator
            .set_label(Label::Discard, &mut views.observers())
            .unwrap();

        assert_eq!(views.spatial.highlighted, Some(1));
        assert_eq!(views.labels.active, Some(Label::Discard));
        assert_eq!(views.summary.discarded, vec![1]);
        assert_eq!(views.summary.unlabeled, vec![0, 2]);
        assert_eq!(views.temporal.title, "Temporal Activity: Neuron 1");
    }

    #[test]
    fn test_rejected_entry_keeps_views() {
        let mut views = Views::default();
        let mut annotator = Annotator::default();
        annotator.install(session(3), &mut views.observers()).unwrap();

        views.navigation.index_text = String::from("9");
        assert!(annotator
            .dispatch(SelectionEvent::Direct(9), &mut views.observers())
            .is_err());
        views.navigation.reset_text();

        assert_eq!(views.navigation.index_text, "0");
        assert_eq!(views.spatial.highlighted, Some(0));
    }
}
