//! Temporal activity traces.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array2, ArrayView1};

use crate::{Error, Result};

/// Default trace sampling rate (Hz).
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 20.0;

/// Processing variant of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraceKind {
    /// Lowpass-filtered display trace (`C`).
    Lowpass,
    /// Raw fluorescence (`C_raw`).
    Raw,
    /// Denoised trace (`C_denoised`).
    Denoised,
    /// Deconvolved activity (`C_deconvolved`).
    Deconvolved,
    /// Re-based raw trace (`C_reraw`).
    Reraw,
}

impl TraceKind {
    /// All kinds in container order.
    pub const ALL: [TraceKind; 5] = [
        TraceKind::Lowpass,
        TraceKind::Raw,
        TraceKind::Denoised,
        TraceKind::Deconvolved,
        TraceKind::Reraw,
    ];

    /// Dataset name inside the session container.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            TraceKind::Lowpass => "C",
            TraceKind::Raw => "C_raw",
            TraceKind::Denoised => "C_denoised",
            TraceKind::Deconvolved => "C_deconvolved",
            TraceKind::Reraw => "C_reraw",
        }
    }

    /// Whether a session container must provide this kind.
    #[must_use]
    pub fn is_required(self) -> bool {
        !matches!(self, TraceKind::Reraw)
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceKind::Lowpass => "Lowpass",
            TraceKind::Raw => "Raw",
            TraceKind::Denoised => "Denoised",
            TraceKind::Deconvolved => "Deconvolved",
            TraceKind::Reraw => "Reraw",
        };
        f.write_str(name)
    }
}

/// Time axis for `len` samples at `sample_rate_hz`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn time_axis(len: usize, sample_rate_hz: f64) -> Vec<f64> {
    let step = 1.0 / sample_rate_hz;
    (0..len).map(|i| i as f64 * step).collect()
}

/// Neuron × timepoint matrices, one per trace kind, sharing one shape.
#[derive(Debug, Clone, Default)]
pub struct TraceSet {
    matrices: BTreeMap<TraceKind, Array2<f64>>,
    neurons: usize,
    timepoints: usize,
}

impl TraceSet {
    /// Builds a trace set.
    ///
    /// # Errors
    /// Returns [`Error::Inconsistent`] if a required kind is missing or the
    /// matrices disagree on shape.
    pub fn new(matrices: BTreeMap<TraceKind, Array2<f64>>) -> Result<Self> {
        if let Some(kind) = TraceKind::ALL
            .into_iter()
            .find(|k| k.is_required() && !matrices.contains_key(k))
        {
            return Err(Error::Inconsistent(format!(
                "missing trace matrix {}",
                kind.field_name()
            )));
        }
        let mut shape = None;
        for (kind, matrix) in &matrices {
            let dim = matrix.dim();
            match shape {
                None => shape = Some(dim),
                Some(expected) if expected != dim => {
                    return Err(Error::Inconsistent(format!(
                        "trace matrix {} has shape {:?}, expected {:?}",
                        kind.field_name(),
                        dim,
                        expected
                    )));
                }
                Some(_) => {}
            }
        }
        let (neurons, timepoints) = shape.unwrap_or((0, 0));
        Ok(Self {
            matrices,
            neurons,
            timepoints,
        })
    }

    /// Number of neurons (matrix rows).
    #[must_use]
    pub fn neurons(&self) -> usize {
        self.neurons
    }

    /// Number of timepoints (matrix columns).
    #[must_use]
    pub fn timepoints(&self) -> usize {
        self.timepoints
    }

    /// Kinds present in this set.
    pub fn kinds(&self) -> impl Iterator<Item = TraceKind> + '_ {
        self.matrices.keys().copied()
    }

    /// Full matrix for one kind.
    #[must_use]
    pub fn matrix(&self, kind: TraceKind) -> Option<&Array2<f64>> {
        self.matrices.get(&kind)
    }

    /// Time series of neuron `index` for one kind.
    #[must_use]
    pub fn row(&self, kind: TraceKind, index: usize) -> Option<ArrayView1<'_, f64>> {
        let matrix = self.matrices.get(&kind)?;
        (index < matrix.nrows()).then(|| matrix.row(index))
    }
}

/// Owned per-neuron slice of every trace kind, ready for plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceProjection {
    pub time: Vec<f64>,
    pub series: BTreeMap<TraceKind, Vec<f64>>,
}

impl TraceProjection {
    /// Slices `traces` at neuron `index`.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is not a valid row.
    pub fn new(traces: &TraceSet, index: usize, sample_rate_hz: f64) -> Result<Self> {
        if index >= traces.neurons() {
            return Err(Error::IndexOutOfRange {
                index,
                len: traces.neurons(),
            });
        }
        let series = traces
            .matrices
            .iter()
            .map(|(&kind, m)| (kind, m.row(index).to_vec()))
            .collect();
        Ok(Self {
            time: time_axis(traces.timepoints(), sample_rate_hz),
            series,
        })
    }

    /// Samples of one kind.
    #[must_use]
    pub fn get(&self, kind: TraceKind) -> Option<&[f64]> {
        self.series.get(&kind).map(Vec::as_slice)
    }

    /// `[t, value]` pairs for one kind.
    #[must_use]
    pub fn points(&self, kind: TraceKind) -> Vec<[f64; 2]> {
        self.get(kind)
            .map(|values| {
                self.time
                    .iter()
                    .zip(values)
                    .map(|(&t, &v)| [t, v])
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn required(rows: usize, cols: usize) -> BTreeMap<TraceKind, Array2<f64>> {
        TraceKind::ALL
            .into_iter()
            .filter(|k| k.is_required())
            .map(|k| (k, Array2::zeros((rows, cols))))
            .collect()
    }

    #[test]
    fn test_time_axis_20hz() {
        let t = time_axis(4, DEFAULT_SAMPLE_RATE_HZ);
        assert_eq!(t.len(), 4);
        assert_relative_eq!(t[1], 0.05);
        assert_relative_eq!(t[3], 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_trace_set_requires_four_kinds() {
        let mut m = required(2, 3);
        m.remove(&TraceKind::Deconvolved);
        let err = TraceSet::new(m).unwrap_err();
        assert!(matches!(err, Error::Inconsistent(msg) if msg.contains("C_deconvolved")));
    }

    #[test]
    fn test_trace_set_rejects_shape_mismatch() {
        let mut m = required(2, 3);
        m.insert(TraceKind::Reraw, Array2::zeros((2, 4)));
        assert!(TraceSet::new(m).is_err());
    }

    #[test]
    fn test_projection_slices_each_kind() {
        let mut m = required(2, 3);
        m.insert(TraceKind::Raw, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let set = TraceSet::new(m).unwrap();
        assert_eq!(set.kinds().count(), 4);

        let proj = TraceProjection::new(&set, 1, DEFAULT_SAMPLE_RATE_HZ).unwrap();
        assert_eq!(proj.get(TraceKind::Raw), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(proj.get(TraceKind::Reraw), None);
        assert_eq!(proj.points(TraceKind::Raw)[2], [0.1, 6.0]);
        assert!(TraceProjection::new(&set, 2, DEFAULT_SAMPLE_RATE_HZ).is_err());
    }
}
