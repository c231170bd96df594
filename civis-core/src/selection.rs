//! Active-neuron selection state machine.
//!
//! The controller is the single source of truth for which neuron is active.
//! User input of every kind (slider, typed index, menu pick, image click,
//! Next/Previous) reduces to a [`SelectionEvent`]. A successful transition
//! builds a complete [`SelectionUpdate`] first and only then fans it out to
//! observers in four stages, so no observer sees a half-applied selection.
//!
//! Observers receive shared references and have no handle back to the
//! controller: updating a widget from a notification can never start a
//! second transition.

use log::{debug, warn};

use crate::label::Label;
use crate::session::{IdMap, Session};
use crate::store::{LabelStore, LabelSummary};
use crate::trace::TraceProjection;
use crate::{Error, Result};

/// Direction of a Next/Previous step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// User-originated request to change the active neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Jump to a neuron id (slider, text input, menu, image click).
    Direct(i64),
    /// Move to the neighbouring id.
    Step(Step),
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// No session loaded; every selection operation is disabled.
    #[default]
    Uninitialized,
    /// A session is loaded and `id` is the active neuron.
    Active { id: i64 },
}

/// Outcome of a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The active neuron changed and observers were notified.
    Moved { from: i64, to: i64 },
    /// The request resolved to the current neuron (e.g. a step at a
    /// boundary); nothing was notified.
    Unchanged,
}

/// Immutable snapshot of everything views need for the active neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionUpdate {
    pub id: i64,
    pub index: usize,
    pub label: Label,
    pub traces: TraceProjection,
    /// Whether a Previous step would move.
    pub can_previous: bool,
    /// Whether a Next step would move.
    pub can_next: bool,
    /// Inclusive id range of the session.
    pub id_range: (i64, i64),
}

/// View that renders selection and label state.
///
/// Hooks are invoked stage by stage: every observer's `on_traces`, then
/// every observer's `on_highlight`, then `on_label`, then `on_index`.
pub trait SelectionObserver {
    /// Stage 1: temporal traces of the active neuron.
    fn on_traces(&mut self, _update: &SelectionUpdate) {}

    /// Stage 2: highlight the active neuron, and only it, in the spatial view.
    fn on_highlight(&mut self, _update: &SelectionUpdate) {}

    /// Stage 3: label indicators for the active neuron.
    fn on_label(&mut self, _update: &SelectionUpdate) {}

    /// Stage 4: numeric/text displays of the active id. Display only.
    fn on_index(&mut self, _update: &SelectionUpdate) {}

    /// Label table mutated (or replaced); counters and menus refresh here.
    fn on_labels_changed(&mut self, _summary: &LabelSummary) {}
}

/// Runs the four notification stages over `observers`.
pub fn notify(update: &SelectionUpdate, observers: &mut [&mut dyn SelectionObserver]) {
    for observer in observers.iter_mut() {
        observer.on_traces(update);
    }
    for observer in observers.iter_mut() {
        observer.on_highlight(update);
    }
    for observer in observers.iter_mut() {
        observer.on_label(update);
    }
    for observer in observers.iter_mut() {
        observer.on_index(update);
    }
}

/// Pushes a label summary to every observer.
pub fn notify_labels(summary: &LabelSummary, observers: &mut [&mut dyn SelectionObserver]) {
    for observer in observers.iter_mut() {
        observer.on_labels_changed(summary);
    }
}

/// Single source of truth for the active neuron.
#[derive(Debug, Clone)]
pub struct SelectionController {
    state: SelectionState,
    sample_rate_hz: f64,
}

impl SelectionController {
    /// Creates an uninitialized controller projecting traces at
    /// `sample_rate_hz`.
    #[must_use]
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            state: SelectionState::Uninitialized,
            sample_rate_hz,
        }
    }

    #[must_use]
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Active neuron id, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<i64> {
        match self.state {
            SelectionState::Uninitialized => None,
            SelectionState::Active { id } => Some(id),
        }
    }

    #[must_use]
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Whether a step in `direction` would move.
    #[must_use]
    pub fn can_step(&self, direction: Step, ids: &IdMap) -> bool {
        self.active_id()
            .is_some_and(|id| neighbour(ids, id, direction).is_some())
    }

    /// Forces the Load transition to the session's minimum id.
    ///
    /// State is untouched on error.
    ///
    /// # Errors
    /// Returns [`Error::EmptySession`] for a zero-neuron session.
    pub fn load(
        &mut self,
        session: &Session,
        labels: &LabelStore,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<SelectionUpdate> {
        let id = session.ids().min().ok_or(Error::EmptySession)?;
        let update = self.snapshot(session, labels, id)?;
        self.state = SelectionState::Active { id };
        debug!("selection reset to neuron {id}");
        notify(&update, observers);
        Ok(update)
    }

    /// Applies a Direct set or Step.
    ///
    /// Out-of-range and unknown ids are rejected with a logged diagnostic
    /// and the prior state retained; steps clamp at the id range ends.
    ///
    /// # Errors
    /// Returns [`Error::NotLoaded`], [`Error::IdOutOfRange`] or
    /// [`Error::UnknownId`].
    pub fn dispatch(
        &mut self,
        event: SelectionEvent,
        session: &Session,
        labels: &LabelStore,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<Transition> {
        let from = self.active_id().ok_or(Error::NotLoaded)?;
        let to = match Self::resolve(event, from, session.ids()) {
            Ok(to) => to,
            Err(e) => {
                warn!("selection request rejected: {e}");
                return Err(e);
            }
        };
        if to == from {
            return Ok(Transition::Unchanged);
        }
        let update = self.snapshot(session, labels, to)?;
        self.state = SelectionState::Active { id: to };
        debug!("selection {from} -> {to}");
        notify(&update, observers);
        Ok(Transition::Moved { from, to })
    }

    /// Builds the snapshot for the active neuron without changing state.
    ///
    /// # Errors
    /// Returns [`Error::NotLoaded`] in the uninitialized state.
    pub fn current(&self, session: &Session, labels: &LabelStore) -> Result<SelectionUpdate> {
        let id = self.active_id().ok_or(Error::NotLoaded)?;
        self.snapshot(session, labels, id)
    }

    /// Resets to the uninitialized state.
    pub fn clear(&mut self) {
        self.state = SelectionState::Uninitialized;
    }

    fn resolve(event: SelectionEvent, from: i64, ids: &IdMap) -> Result<i64> {
        match event {
            SelectionEvent::Direct(id) => {
                let (min, max) = id_range(ids)?;
                if id < min || id > max {
                    return Err(Error::IdOutOfRange { id, min, max });
                }
                if ids.id_to_index(id).is_none() {
                    return Err(Error::UnknownId(id));
                }
                Ok(id)
            }
            SelectionEvent::Step(direction) => Ok(neighbour(ids, from, direction).unwrap_or(from)),
        }
    }

    fn snapshot(&self, session: &Session, labels: &LabelStore, id: i64) -> Result<SelectionUpdate> {
        let ids = session.ids();
        let index = ids.id_to_index(id).ok_or(Error::UnknownId(id))?;
        Ok(SelectionUpdate {
            id,
            index,
            label: labels.get_label(index)?,
            traces: session.project(index, self.sample_rate_hz)?,
            can_previous: neighbour(ids, id, Step::Previous).is_some(),
            can_next: neighbour(ids, id, Step::Next).is_some(),
            id_range: id_range(ids)?,
        })
    }
}

fn neighbour(ids: &IdMap, id: i64, direction: Step) -> Option<i64> {
    match direction {
        Step::Previous => ids.prev_before(id),
        Step::Next => ids.next_after(id),
    }
}

fn id_range(ids: &IdMap) -> Result<(i64, i64)> {
    ids.min().zip(ids.max()).ok_or(Error::EmptySession)
}
