//! Application state: session, labels and selection under one owner.

use log::info;

use crate::label::Label;
use crate::selection::{
    notify, notify_labels, SelectionController, SelectionEvent, SelectionObserver,
    SelectionUpdate, Transition,
};
use crate::session::Session;
use crate::store::{LabelStore, LabelSummary};
use crate::trace::DEFAULT_SAMPLE_RATE_HZ;
use crate::{Error, Result};

/// Owns the loaded [`Session`], its [`LabelStore`] and the
/// [`SelectionController`].
///
/// Created by the process entry point and passed by reference to whatever
/// handles operator input. Observers are borrowed per call.
#[derive(Debug, Clone)]
pub struct Annotator {
    session: Option<Session>,
    labels: LabelStore,
    selection: SelectionController,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl Annotator {
    #[must_use]
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            session: None,
            labels: LabelStore::default(),
            selection: SelectionController::new(sample_rate_hz),
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Active neuron id.
    #[must_use]
    pub fn active_id(&self) -> Option<i64> {
        self.selection.active_id()
    }

    /// Active neuron array index.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        let session = self.session.as_ref()?;
        session.ids().id_to_index(self.selection.active_id()?)
    }

    /// Replaces the session wholesale: fresh all-unlabeled table and a Load
    /// transition to the minimum id.
    ///
    /// All-or-nothing: on error the previous session, labels and selection
    /// are untouched.
    ///
    /// # Errors
    /// Returns [`Error::EmptySession`] if `session` has no neurons.
    pub fn install(
        &mut self,
        session: Session,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<SelectionUpdate> {
        if session.neuron_count() == 0 {
            return Err(Error::EmptySession);
        }
        let labels = LabelStore::new(session.neuron_count());
        let mut selection = self.selection.clone();
        let update = selection.load(&session, &labels, observers)?;

        info!(
            "installed session with {} neurons (ids {}..={})",
            session.neuron_count(),
            update.id_range.0,
            update.id_range.1
        );
        let summary = LabelSummary::new(&labels, session.ids(), Some((update.id, update.label)));
        self.session = Some(session);
        self.labels = labels;
        self.selection = selection;
        notify_labels(&summary, observers);
        Ok(update)
    }

    /// Routes a selection event to the controller.
    ///
    /// # Errors
    /// Propagates the controller's rejection; state is unchanged on error.
    pub fn dispatch(
        &mut self,
        event: SelectionEvent,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<Transition> {
        let session = self.session.as_ref().ok_or(Error::NotLoaded)?;
        self.selection
            .dispatch(event, session, &self.labels, observers)
    }

    /// Selects the topmost neuron under a spatial-view point.
    ///
    /// A click on empty background is not an error and changes nothing.
    ///
    /// # Errors
    /// Returns [`Error::NotLoaded`] without a session.
    pub fn select_at(
        &mut self,
        x: f64,
        y: f64,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<Transition> {
        let session = self.session.as_ref().ok_or(Error::NotLoaded)?;
        let Some(id) = session
            .neuron_at(x, y)
            .and_then(|index| session.ids().index_to_id(index))
        else {
            return Ok(Transition::Unchanged);
        };
        self.dispatch(SelectionEvent::Direct(id), observers)
    }

    /// Labels the active neuron. Returns `true` if the label changed.
    ///
    /// # Errors
    /// Returns [`Error::NotLoaded`] without an active neuron.
    pub fn set_label(
        &mut self,
        label: Label,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<bool> {
        let session = self.session.as_ref().ok_or(Error::NotLoaded)?;
        let index = self.active_index().ok_or(Error::NotLoaded)?;
        let changed = self.labels.set_label(index, label)?;
        if changed {
            let update = self.selection.current(session, &self.labels)?;
            for observer in observers.iter_mut() {
                observer.on_label(&update);
            }
            notify_labels(&self.summary_for(session), observers);
        }
        Ok(changed)
    }

    /// Replaces the label table (e.g. from a saved file) and refreshes views.
    ///
    /// # Errors
    /// Returns [`Error::Inconsistent`] if `labels` has the wrong length.
    pub fn replace_labels(
        &mut self,
        labels: LabelStore,
        observers: &mut [&mut dyn SelectionObserver],
    ) -> Result<()> {
        let session = self.session.as_ref().ok_or(Error::NotLoaded)?;
        if labels.len() != session.neuron_count() {
            return Err(Error::Inconsistent(format!(
                "label table has {} rows but session has {} neurons",
                labels.len(),
                session.neuron_count()
            )));
        }
        self.labels = labels;
        let update = self.selection.current(session, &self.labels)?;
        notify(&update, observers);
        notify_labels(&self.summary_for(session), observers);
        Ok(())
    }

    /// Label summary of the current table.
    #[must_use]
    pub fn summary(&self) -> Option<LabelSummary> {
        self.session.as_ref().map(|s| self.summary_for(s))
    }

    fn summary_for(&self, session: &Session) -> LabelSummary {
        let active = self.active_index().and_then(|index| {
            let id = session.ids().index_to_id(index)?;
            Some((id, self.labels.get_label(index).ok()?))
        });
        LabelSummary::new(&self.labels, session.ids(), active)
    }
}
