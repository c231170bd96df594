//! Label kinds and aggregate counts.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Operator decision for one neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Label {
    Keep,
    Discard,
    #[default]
    Unlabeled,
}

impl Label {
    /// All label kinds in column order.
    pub const ALL: [Label; 3] = [Label::Keep, Label::Discard, Label::Unlabeled];

    /// Column names of the persisted one-hot table, in column order.
    pub const COLUMNS: [&'static str; 3] = ["Keep", "Discard", "Unlabeled"];

    /// Column position of this label in the one-hot row.
    #[must_use]
    pub fn column(self) -> usize {
        match self {
            Label::Keep => 0,
            Label::Discard => 1,
            Label::Unlabeled => 2,
        }
    }

    /// One-hot row `[keep, discard, unlabeled]`.
    #[must_use]
    pub fn one_hot(self) -> [bool; 3] {
        let mut row = [false; 3];
        row[self.column()] = true;
        row
    }

    /// Decode a one-hot row. Returns `None` unless exactly one flag is set.
    #[must_use]
    pub fn from_one_hot(row: [bool; 3]) -> Option<Self> {
        match row {
            [true, false, false] => Some(Label::Keep),
            [false, true, false] => Some(Label::Discard),
            [false, false, true] => Some(Label::Unlabeled),
            _ => None,
        }
    }

    /// Column/display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::COLUMNS[self.column()]
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Label::Keep),
            "discard" => Ok(Label::Discard),
            "unlabeled" => Ok(Label::Unlabeled),
            other => Err(format!("unknown label: {other}")),
        }
    }
}

/// Number of neurons per label kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelCounts {
    pub keep: usize,
    pub discard: usize,
    pub unlabeled: usize,
}

impl LabelCounts {
    /// Sum over all kinds. Always equals the neuron count of the table.
    #[must_use]
    pub fn total(&self) -> usize {
        self.keep + self.discard + self.unlabeled
    }

    /// Count for a single kind.
    #[must_use]
    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Keep => self.keep,
            Label::Discard => self.discard,
            Label::Unlabeled => self.unlabeled,
        }
    }

    pub(crate) fn increment(&mut self, label: Label) {
        match label {
            Label::Keep => self.keep += 1,
            Label::Discard => self.discard += 1,
            Label::Unlabeled => self.unlabeled += 1,
        }
    }
}

impl fmt::Display for LabelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Keep: {} | Discard: {} | Unlabeled: {}",
            self.keep, self.discard, self.unlabeled
        )
    }
}
