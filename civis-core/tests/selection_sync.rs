#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use civis_core::{
    Annotator, Error, Label, LabelStore, LabelSummary, RawSession, SelectionEvent,
    SelectionObserver, SelectionState, SelectionUpdate, Session, Step, TraceKind, Transition,
};
use ndarray::Array2;

/// Builds a session whose stored (one-based) ids are `ids`, with a square
/// contour per neuron laid out along the x axis.
fn session_with_ids(ids: &[i64]) -> Session {
    let n = ids.len();
    let timepoints = 8;
    let traces: BTreeMap<TraceKind, Array2<f64>> = TraceKind::ALL
        .into_iter()
        .map(|kind| {
            let matrix = Array2::from_shape_fn((n, timepoints), |(row, col)| {
                (row * 100 + col) as f64
            });
            (kind, matrix)
        })
        .collect();
    let contours = (0..n)
        .map(|i| {
            let x0 = (i * 10) as f64;
            Array2::from_shape_vec(
                (2, 4),
                vec![x0, x0 + 8.0, x0 + 8.0, x0, 1.0, 1.0, 9.0, 9.0],
            )
            .unwrap()
        })
        .collect();
    RawSession {
        image: Array2::zeros((10, n * 10)),
        contours,
        traces,
        ids: ids.iter().map(|&id| (id + 1) as f64).collect(),
        centroids: None,
        metadata_path: String::new(),
    }
    .into_session()
    .unwrap()
}

fn dense_session(n: i64) -> Session {
    session_with_ids(&(0..n).collect::<Vec<_>>())
}

#[derive(Default)]
struct Recorder {
    name: &'static str,
    log: Vec<String>,
    highlighted: Option<usize>,
    label: Option<Label>,
    index_text: String,
    trace_first: Option<f64>,
    counts: Option<String>,
}

impl Recorder {
    fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

impl SelectionObserver for Recorder {
    fn on_traces(&mut self, update: &SelectionUpdate) {
        self.log.push(format!("{}:traces:{}", self.name, update.id));
        self.trace_first = update
            .traces
            .get(TraceKind::Raw)
            .and_then(|s| s.first().copied());
    }

    fn on_highlight(&mut self, update: &SelectionUpdate) {
        self.log.push(format!("{}:highlight:{}", self.name, update.id));
        self.highlighted = Some(update.index);
    }

    fn on_label(&mut self, update: &SelectionUpdate) {
        self.log.push(format!("{}:label:{}", self.name, update.id));
        self.label = Some(update.label);
    }

    fn on_index(&mut self, update: &SelectionUpdate) {
        self.log.push(format!("{}:index:{}", self.name, update.id));
        self.index_text = update.id.to_string();
    }

    fn on_labels_changed(&mut self, summary: &LabelSummary) {
        self.counts = Some(summary.counts.to_string());
    }
}

#[test]
fn test_load_resets_labels_and_selection() {
    let mut annotator = Annotator::default();
    let mut view = Recorder::named("v");
    annotator
        .install(dense_session(50), &mut [&mut view])
        .unwrap();

    assert_eq!(annotator.labels().len(), 50);
    assert!(annotator.labels().iter().all(|l| l == Label::Unlabeled));
    assert_eq!(annotator.selection().state(), SelectionState::Active { id: 0 });
    assert_eq!(view.index_text, "0");
    assert_eq!(
        view.counts.as_deref(),
        Some("Keep: 0 | Discard: 0 | Unlabeled: 50")
    );
}

#[test]
fn test_step_clamps_at_boundaries() {
    let mut annotator = Annotator::default();
    annotator.install(dense_session(50), &mut []).unwrap();

    let t = annotator
        .dispatch(SelectionEvent::Step(Step::Previous), &mut [])
        .unwrap();
    assert_eq!(t, Transition::Unchanged);
    assert_eq!(annotator.active_id(), Some(0));

    annotator
        .dispatch(SelectionEvent::Direct(49), &mut [])
        .unwrap();
    let t = annotator
        .dispatch(SelectionEvent::Step(Step::Next), &mut [])
        .unwrap();
    assert_eq!(t, Transition::Unchanged);
    assert_eq!(annotator.active_id(), Some(49));

    let t = annotator
        .dispatch(SelectionEvent::Step(Step::Previous), &mut [])
        .unwrap();
    assert_eq!(t, Transition::Moved { from: 49, to: 48 });
}

#[test]
fn test_out_of_range_direct_set_is_rejected() {
    let mut annotator = Annotator::default();
    let mut view = Recorder::named("v");
    annotator
        .install(dense_session(50), &mut [&mut view])
        .unwrap();
    annotator
        .dispatch(SelectionEvent::Direct(12), &mut [&mut view])
        .unwrap();
    view.log.clear();

    let err = annotator
        .dispatch(SelectionEvent::Direct(75), &mut [&mut view])
        .unwrap_err();
    assert_eq!(
        err,
        Error::IdOutOfRange {
            id: 75,
            min: 0,
            max: 49
        }
    );
    assert_eq!(annotator.active_id(), Some(12));
    assert!(view.log.is_empty());

    assert!(annotator
        .dispatch(SelectionEvent::Direct(-1), &mut [&mut view])
        .is_err());
    assert_eq!(annotator.active_id(), Some(12));
}

#[test]
fn test_notifications_run_stage_by_stage() {
    let mut annotator = Annotator::default();
    annotator.install(dense_session(5), &mut []).unwrap();
    let mut a = Recorder::named("a");
    let mut b = Recorder::named("b");

    annotator
        .dispatch(SelectionEvent::Direct(3), &mut [&mut a, &mut b])
        .unwrap();

    assert_eq!(a.log, vec!["a:traces:3", "a:highlight:3", "a:label:3", "a:index:3"]);
    assert_eq!(b.highlighted, Some(3));
    assert_eq!(b.trace_first, Some(300.0));
    assert_eq!(b.label, Some(Label::Unlabeled));
}

#[test]
fn test_stage_order_across_observers() {
    struct Shared<'a> {
        name: &'static str,
        log: &'a std::cell::RefCell<Vec<String>>,
    }
    impl SelectionObserver for Shared<'_> {
        fn on_traces(&mut self, _u: &SelectionUpdate) {
            self.log.borrow_mut().push(format!("{}1", self.name));
        }
        fn on_highlight(&mut self, _u: &SelectionUpdate) {
            self.log.borrow_mut().push(format!("{}2", self.name));
        }
        fn on_label(&mut self, _u: &SelectionUpdate) {
            self.log.borrow_mut().push(format!("{}3", self.name));
        }
        fn on_index(&mut self, _u: &SelectionUpdate) {
            self.log.borrow_mut().push(format!("{}4", self.name));
        }
    }

    let log = std::cell::RefCell::new(Vec::new());
    let mut a = Shared { name: "a", log: &log };
    let mut b = Shared { name: "b", log: &log };
    let mut annotator = Annotator::default();
    annotator.install(dense_session(3), &mut []).unwrap();
    annotator
        .dispatch(SelectionEvent::Step(Step::Next), &mut [&mut a, &mut b])
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["a1", "b1", "a2", "b2", "a3", "b3", "a4", "b4"]
    );
}

#[test]
fn test_second_load_lands_on_new_minimum() {
    let mut annotator = Annotator::default();
    annotator.install(dense_session(50), &mut []).unwrap();
    annotator
        .dispatch(SelectionEvent::Direct(31), &mut [])
        .unwrap();
    annotator.set_label(Label::Keep, &mut []).unwrap();

    let mut view = Recorder::named("v");
    annotator
        .install(session_with_ids(&[7, 8, 9]), &mut [&mut view])
        .unwrap();
    assert_eq!(annotator.active_id(), Some(7));
    assert_eq!(view.index_text, "7");
    assert_eq!(annotator.labels(), &LabelStore::new(3));
}

#[test]
fn test_empty_session_is_rejected_and_state_kept() {
    let mut annotator = Annotator::default();
    annotator.install(dense_session(4), &mut []).unwrap();
    annotator
        .dispatch(SelectionEvent::Direct(2), &mut [])
        .unwrap();

    let err = annotator
        .install(session_with_ids(&[]), &mut [])
        .unwrap_err();
    assert_eq!(err, Error::EmptySession);
    assert_eq!(annotator.active_id(), Some(2));
    assert_eq!(annotator.session().map(Session::neuron_count), Some(4));
}

#[test]
fn test_dispatch_before_load_is_disabled() {
    let mut annotator = Annotator::default();
    assert_eq!(
        annotator.dispatch(SelectionEvent::Direct(0), &mut []),
        Err(Error::NotLoaded)
    );
    assert_eq!(annotator.set_label(Label::Keep, &mut []), Err(Error::NotLoaded));
    assert_eq!(annotator.selection().state(), SelectionState::Uninitialized);
}

#[test]
fn test_sparse_ids_step_and_reject_gaps() {
    let mut annotator = Annotator::default();
    annotator
        .install(session_with_ids(&[2, 5, 9]), &mut [])
        .unwrap();
    assert_eq!(annotator.active_id(), Some(2));

    annotator
        .dispatch(SelectionEvent::Step(Step::Next), &mut [])
        .unwrap();
    assert_eq!(annotator.active_id(), Some(5));
    assert_eq!(annotator.active_index(), Some(1));

    let err = annotator
        .dispatch(SelectionEvent::Direct(6), &mut [])
        .unwrap_err();
    assert_eq!(err, Error::UnknownId(6));
    assert_eq!(annotator.active_id(), Some(5));
}

#[test]
fn test_set_label_updates_indicators_and_counts() {
    let mut annotator = Annotator::default();
    let mut view = Recorder::named("v");
    annotator
        .install(dense_session(4), &mut [&mut view])
        .unwrap();
    annotator
        .dispatch(SelectionEvent::Direct(1), &mut [&mut view])
        .unwrap();

    assert!(annotator.set_label(Label::Discard, &mut [&mut view]).unwrap());
    assert_eq!(view.label, Some(Label::Discard));
    assert_eq!(
        view.counts.as_deref(),
        Some("Keep: 0 | Discard: 1 | Unlabeled: 3")
    );

    view.counts = None;
    assert!(!annotator.set_label(Label::Discard, &mut [&mut view]).unwrap());
    assert!(view.counts.is_none());

    let summary = annotator.summary().unwrap();
    assert_eq!(summary.discard_ids, vec![1]);
    assert_eq!(summary.active, Some((1, Label::Discard)));
}

#[test]
fn test_click_selects_contour() {
    let mut annotator = Annotator::default();
    annotator.install(dense_session(3), &mut []).unwrap();

    // Neuron 2 spans x in [20, 28]; display y in [1, 9].
    let t = annotator.select_at(24.0, 5.0, &mut []).unwrap();
    assert_eq!(t, Transition::Moved { from: 0, to: 2 });

    let t = annotator.select_at(29.5, 5.0, &mut []).unwrap();
    assert_eq!(t, Transition::Unchanged);
    assert_eq!(annotator.active_id(), Some(2));
}

#[test]
fn test_replace_labels_checks_length() {
    let mut annotator = Annotator::default();
    annotator.install(dense_session(3), &mut []).unwrap();

    assert!(annotator
        .replace_labels(LabelStore::new(2), &mut [])
        .is_err());

    let mut view = Recorder::named("v");
    let store = LabelStore::from_labels(vec![Label::Keep, Label::Keep, Label::Discard]);
    annotator.replace_labels(store, &mut [&mut view]).unwrap();
    assert_eq!(view.label, Some(Label::Keep));
    assert_eq!(
        view.counts.as_deref(),
        Some("Keep: 2 | Discard: 1 | Unlabeled: 0")
    );
}

#[test]
fn test_boundary_flags_in_update() {
    let mut annotator = Annotator::default();
    let update = annotator.install(dense_session(2), &mut []).unwrap();
    assert!(!update.can_previous);
    assert!(update.can_next);
    assert_eq!(update.id_range, (0, 1));
    let session = annotator.session().unwrap();
    assert!(annotator.selection().can_step(Step::Next, session.ids()));
    assert!(!annotator.selection().can_step(Step::Previous, session.ids()));
}
