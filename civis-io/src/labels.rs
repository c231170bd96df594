//! Label table persistence as one-hot CSV.
//!
//! Header row `Keep,Discard,Unlabeled`, then one row per neuron in array
//! order. Cells are written as `true`/`false`; readers also accept any
//! casing and `1`/`0`.

use std::fs::File;
use std::path::Path;

use civis_core::{Label, LabelStore};
use log::{debug, info};
use serde::Serialize;

use crate::{Error, Result};

#[derive(Serialize)]
struct LabelRow {
    #[serde(rename = "Keep")]
    keep: bool,
    #[serde(rename = "Discard")]
    discard: bool,
    #[serde(rename = "Unlabeled")]
    unlabeled: bool,
}

impl From<Label> for LabelRow {
    fn from(label: Label) -> Self {
        let [keep, discard, unlabeled] = label.one_hot();
        Self {
            keep,
            discard,
            unlabeled,
        }
    }
}

/// Writes the label table, overwriting `path`.
///
/// # Errors
/// Returns [`Error::Io`] if the target directory does not exist or the file
/// cannot be written.
pub fn save_labels<P: AsRef<Path>>(store: &LabelStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);
    if store.is_empty() {
        writer.write_record(Label::COLUMNS)?;
    }
    for label in store.iter() {
        writer.serialize(LabelRow::from(label))?;
    }
    writer.flush()?;

    info!(
        "saved {} labels ({}) to {}",
        store.len(),
        store.counts(),
        path.display()
    );
    Ok(())
}

/// Reads a label table.
///
/// With `expected_len` set, a row count other than the session's neuron
/// count is rejected.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be opened and
/// [`Error::InvalidFormat`] on a wrong header, a row that is not exactly
/// one-hot, or a row-count mismatch.
pub fn load_labels<P: AsRef<Path>>(path: P, expected_len: Option<usize>) -> Result<LabelStore> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| malformed(path, e))?;
    if headers.iter().ne(Label::COLUMNS) {
        return Err(Error::InvalidFormat(format!(
            "{}: header must be {}, found {}",
            path.display(),
            Label::COLUMNS.join(","),
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut labels = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(path, e))?;
        let line = row + 2;
        let mut cells = [false; 3];
        for (cell, text) in cells.iter_mut().zip(record.iter()) {
            *cell = parse_cell(text).ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "{}:{line}: '{text}' is not a boolean",
                    path.display()
                ))
            })?;
        }
        let label = Label::from_one_hot(cells).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "{}:{line}: row must have exactly one true cell",
                path.display()
            ))
        })?;
        labels.push(label);
    }

    if let Some(expected) = expected_len {
        if labels.len() != expected {
            return Err(Error::InvalidFormat(format!(
                "{}: {} label rows but session has {expected} neurons",
                path.display(),
                labels.len()
            )));
        }
    }

    debug!("read {} label rows from {}", labels.len(), path.display());
    Ok(LabelStore::from_labels(labels))
}

/// Reader failures other than I/O mean the file is not a label table.
fn malformed(path: &Path, err: csv::Error) -> Error {
    if err.is_io_error() {
        return Error::Csv(err);
    }
    match err.position() {
        Some(pos) => Error::InvalidFormat(format!("{}:{}: {err}", path.display(), pos.line())),
        None => Error::InvalidFormat(format!("{}: {err}", path.display())),
    }
}

fn parse_cell(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}
