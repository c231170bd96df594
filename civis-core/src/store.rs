//! In-memory label table for the loaded session.

use crate::label::{Label, LabelCounts};
use crate::session::IdMap;
use crate::{Error, Result};

/// Index-aligned label table, one entry per neuron.
///
/// Every neuron carries exactly one [`Label`]; the one-hot persisted form is
/// produced by [`LabelStore::rows`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStore {
    labels: Vec<Label>,
}

impl LabelStore {
    /// Creates a table of `neuron_count` unlabeled neurons.
    #[must_use]
    pub fn new(neuron_count: usize) -> Self {
        Self {
            labels: vec![Label::Unlabeled; neuron_count],
        }
    }

    /// Creates a table from existing labels (e.g. a loaded label file).
    #[must_use]
    pub fn from_labels(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// Reinitializes the table to `neuron_count` unlabeled neurons.
    pub fn reset(&mut self, neuron_count: usize) {
        self.labels.clear();
        self.labels.resize(neuron_count, Label::Unlabeled);
    }

    /// Number of neurons in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sets the label of neuron `index`.
    ///
    /// Returns `true` if the stored label changed.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn set_label(&mut self, index: usize, label: Label) -> Result<bool> {
        let len = self.labels.len();
        let slot = self
            .labels
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        let changed = *slot != label;
        *slot = label;
        Ok(changed)
    }

    /// Label of neuron `index`.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn get_label(&self, index: usize) -> Result<Label> {
        self.labels
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    /// Aggregate counts; `counts().total() == len()`.
    #[must_use]
    pub fn counts(&self) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for &label in &self.labels {
            counts.increment(label);
        }
        counts
    }

    /// Ascending indices of all neurons carrying `label`.
    #[must_use]
    pub fn indices_with_label(&self, label: Label) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| (l == label).then_some(i))
            .collect()
    }

    /// Labels in neuron-index order.
    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        self.labels.iter().copied()
    }

    /// One-hot `[keep, discard, unlabeled]` rows in neuron-index order.
    pub fn rows(&self) -> impl Iterator<Item = [bool; 3]> + '_ {
        self.labels.iter().map(|l| l.one_hot())
    }
}

/// Snapshot of the label table pushed to label observers after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSummary {
    pub counts: LabelCounts,
    /// Ids per kind, ascending by neuron index.
    pub keep_ids: Vec<i64>,
    pub discard_ids: Vec<i64>,
    pub unlabeled_ids: Vec<i64>,
    /// Active neuron id and its label, if a session is active.
    pub active: Option<(i64, Label)>,
}

impl LabelSummary {
    /// Builds a summary of `store`, translating indices to ids through `ids`.
    #[must_use]
    pub fn new(store: &LabelStore, ids: &IdMap, active: Option<(i64, Label)>) -> Self {
        let ids_for = |label| {
            store
                .indices_with_label(label)
                .into_iter()
                .filter_map(|index| ids.index_to_id(index))
                .collect()
        };
        Self {
            counts: store.counts(),
            keep_ids: ids_for(Label::Keep),
            discard_ids: ids_for(Label::Discard),
            unlabeled_ids: ids_for(Label::Unlabeled),
            active,
        }
    }

    /// Ids for a single kind.
    #[must_use]
    pub fn ids(&self, label: Label) -> &[i64] {
        match label {
            Label::Keep => &self.keep_ids,
            Label::Discard => &self.discard_ids,
            Label::Unlabeled => &self.unlabeled_ids,
        }
    }
}
