//! Loaded recording session and id translation.

use std::collections::{BTreeMap, HashMap};

use ndarray::Array2;

use crate::geometry::Contour;
use crate::trace::{time_axis, TraceKind, TraceProjection, TraceSet};
use crate::{Error, Result};

/// Bidirectional translation between neuron ids and array indices.
///
/// Ids are not assumed to be contiguous or zero-based; every array access
/// goes through [`IdMap::id_to_index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: Vec<i64>,
    lookup: HashMap<i64, usize>,
    sorted: Vec<i64>,
}

impl IdMap {
    /// Builds the map from index-aligned ids.
    ///
    /// # Errors
    /// Returns [`Error::Inconsistent`] on duplicate ids.
    pub fn new(ids: Vec<i64>) -> Result<Self> {
        let mut lookup = HashMap::with_capacity(ids.len());
        for (index, &id) in ids.iter().enumerate() {
            if lookup.insert(id, index).is_some() {
                return Err(Error::Inconsistent(format!("duplicate neuron id {id}")));
            }
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        Ok(Self {
            ids,
            lookup,
            sorted,
        })
    }

    /// Array index of `id`.
    #[must_use]
    pub fn id_to_index(&self, id: i64) -> Option<usize> {
        self.lookup.get(&id).copied()
    }

    /// Id of array index `index`.
    #[must_use]
    pub fn index_to_id(&self, index: usize) -> Option<i64> {
        self.ids.get(index).copied()
    }

    /// Ids in index order.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Smallest id.
    #[must_use]
    pub fn min(&self) -> Option<i64> {
        self.sorted.first().copied()
    }

    /// Largest id.
    #[must_use]
    pub fn max(&self) -> Option<i64> {
        self.sorted.last().copied()
    }

    /// Returns true if ids form the dense range `min..=max`.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => max
                .checked_sub(min)
                .and_then(|span| span.checked_add(1))
                .and_then(|count| usize::try_from(count).ok())
                == Some(self.ids.len()),
            _ => true,
        }
    }

    /// Next larger id after `id`, if any.
    #[must_use]
    pub fn next_after(&self, id: i64) -> Option<i64> {
        let pos = self.sorted.partition_point(|&x| x <= id);
        self.sorted.get(pos).copied()
    }

    /// Next smaller id before `id`, if any.
    #[must_use]
    pub fn prev_before(&self, id: i64) -> Option<i64> {
        let pos = self.sorted.partition_point(|&x| x < id);
        pos.checked_sub(1).map(|p| self.sorted[p])
    }
}

/// Session fields in consumption layout, before id and coordinate transforms.
///
/// The container reader produces this after transposing every stored matrix.
#[derive(Debug, Clone)]
pub struct RawSession {
    /// Reference image, height × width.
    pub image: Array2<f64>,
    /// Per-neuron contour coordinates, 2 × K (row 0 = x, row 1 = y) in image
    /// coordinates (origin top-left).
    pub contours: Vec<Array2<f64>>,
    /// Neuron × timepoint matrices.
    pub traces: BTreeMap<TraceKind, Array2<f64>>,
    /// One-based neuron ids as stored.
    pub ids: Vec<f64>,
    /// Optional N × 2 centroid matrix.
    pub centroids: Option<Array2<f64>>,
    /// Pass-through metadata path.
    pub metadata_path: String,
}

impl RawSession {
    /// Validates dimensions and applies the load transforms: ids become
    /// zero-based and contour y-coordinates are flipped to `height - y`.
    ///
    /// # Errors
    /// Returns [`Error::Inconsistent`] if any field disagrees with the id
    /// count, a contour is not 2 × K, or an id is not a positive integer.
    pub fn into_session(self) -> Result<Session> {
        let n = self.ids.len();
        let ids = IdMap::new(
            self.ids
                .iter()
                .map(|&raw| zero_based_id(raw))
                .collect::<Result<_>>()?,
        )?;

        let traces = TraceSet::new(self.traces)?;
        if traces.neurons() != n {
            return Err(Error::Inconsistent(format!(
                "trace matrices have {} rows but {} ids",
                traces.neurons(),
                n
            )));
        }
        if self.contours.len() != n {
            return Err(Error::Inconsistent(format!(
                "{} contours but {} ids",
                self.contours.len(),
                n
            )));
        }
        if let Some(centroids) = &self.centroids {
            if centroids.dim() != (n, 2) {
                return Err(Error::Inconsistent(format!(
                    "centroid matrix has shape {:?}, expected ({n}, 2)",
                    centroids.dim()
                )));
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let height = self.image.nrows() as f64;
        let contours = self
            .contours
            .iter()
            .enumerate()
            .map(|(i, coords)| {
                if coords.nrows() != 2 {
                    return Err(Error::Inconsistent(format!(
                        "contour {i} has {} coordinate rows, expected 2",
                        coords.nrows()
                    )));
                }
                let points = coords
                    .row(0)
                    .iter()
                    .zip(coords.row(1))
                    .map(|(&x, &y)| [x, height - y])
                    .collect();
                Ok(Contour::new(points))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Session {
            image: self.image,
            contours,
            ids,
            traces,
            centroids: self.centroids,
            metadata_path: self.metadata_path,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn zero_based_id(raw: f64) -> Result<i64> {
    if !raw.is_finite() || raw.fract() != 0.0 || raw < 1.0 || raw > 9.0e15 {
        return Err(Error::Inconsistent(format!(
            "neuron id {raw} is not a positive integer"
        )));
    }
    Ok(raw as i64 - 1)
}

/// One recording's segmentation and trace results. Immutable after load.
#[derive(Debug, Clone)]
pub struct Session {
    image: Array2<f64>,
    contours: Vec<Contour>,
    ids: IdMap,
    traces: TraceSet,
    centroids: Option<Array2<f64>>,
    metadata_path: String,
}

impl Session {
    /// Number of neurons.
    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.ids.len()
    }

    /// Reference image, height × width.
    #[must_use]
    pub fn image(&self) -> &Array2<f64> {
        &self.image
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.image.nrows()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.image.ncols()
    }

    /// Contours in display coordinates, index-aligned with neurons.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    #[must_use]
    pub fn ids(&self) -> &IdMap {
        &self.ids
    }

    #[must_use]
    pub fn traces(&self) -> &TraceSet {
        &self.traces
    }

    #[must_use]
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    #[must_use]
    pub fn metadata_path(&self) -> &str {
        &self.metadata_path
    }

    /// Index of the topmost contour containing `(x, y)`.
    #[must_use]
    pub fn neuron_at(&self, x: f64, y: f64) -> Option<usize> {
        self.contours.iter().rposition(|c| c.contains(x, y))
    }

    /// Sample times in seconds for every timepoint.
    #[must_use]
    pub fn time_axis(&self, sample_rate_hz: f64) -> Vec<f64> {
        time_axis(self.traces.timepoints(), sample_rate_hz)
    }

    /// Trace projection for neuron `index`.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= neuron_count()`.
    pub fn project(&self, index: usize, sample_rate_hz: f64) -> Result<TraceProjection> {
        TraceProjection::new(&self.traces, index, sample_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn traces(rows: usize, cols: usize) -> BTreeMap<TraceKind, Array2<f64>> {
        TraceKind::ALL
            .into_iter()
            .map(|k| (k, Array2::zeros((rows, cols))))
            .collect()
    }

    fn raw_session() -> RawSession {
        RawSession {
            image: array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]],
            contours: vec![array![[0.0, 1.0, 2.0], [0.0, 1.0, 2.0]]],
            traces: traces(1, 5),
            ids: vec![1.0],
            centroids: Some(array![[1.0, 1.0]]),
            metadata_path: "C:\\virmen\\session.mat".to_string(),
        }
    }

    #[test]
    fn test_contour_y_is_flipped() {
        let session = raw_session().into_session().unwrap();
        assert_eq!(session.height(), 3);
        let contour = &session.contours()[0];
        assert_eq!(contour.xs(), vec![0.0, 1.0, 2.0]);
        assert_eq!(contour.ys(), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_ids_become_zero_based() {
        let mut raw = raw_session();
        raw.ids = vec![5.0];
        let session = raw.into_session().unwrap();
        assert_eq!(session.ids().ids(), &[4]);
        assert_eq!(session.ids().id_to_index(4), Some(0));
    }

    #[test]
    fn test_rejects_trace_row_mismatch() {
        let mut raw = raw_session();
        raw.traces = traces(2, 5);
        let err = raw.into_session().unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
    }

    #[test]
    fn test_rejects_contour_count_mismatch() {
        let mut raw = raw_session();
        raw.contours.push(array![[0.0], [0.0]]);
        assert!(raw.into_session().is_err());
    }

    #[test]
    fn test_rejects_bad_contour_layout() {
        let mut raw = raw_session();
        raw.contours = vec![array![[0.0, 1.0, 2.0]]];
        assert!(raw.into_session().is_err());
    }

    #[test]
    fn test_rejects_non_integer_id() {
        let mut raw = raw_session();
        raw.ids = vec![1.5];
        assert!(raw.into_session().is_err());
        let mut raw = raw_session();
        raw.ids = vec![0.0];
        assert!(raw.into_session().is_err());
    }

    #[test]
    fn test_rejects_centroid_mismatch() {
        let mut raw = raw_session();
        raw.centroids = Some(array![[1.0, 1.0, 1.0]]);
        assert!(raw.into_session().is_err());
    }

    #[test]
    fn test_id_map_neighbours() {
        let ids = IdMap::new(vec![7, 2, 4]).unwrap();
        assert_eq!(ids.min(), Some(2));
        assert_eq!(ids.max(), Some(7));
        assert!(!ids.is_contiguous());
        assert_eq!(ids.next_after(2), Some(4));
        assert_eq!(ids.next_after(5), Some(7));
        assert_eq!(ids.next_after(7), None);
        assert_eq!(ids.prev_before(4), Some(2));
        assert_eq!(ids.prev_before(2), None);
        assert_eq!(ids.id_to_index(7), Some(0));
        assert_eq!(ids.index_to_id(2), Some(4));
    }

    #[test]
    fn test_contiguity_with_extreme_ids() {
        let ids = IdMap::new(vec![i64::MIN, i64::MAX]).unwrap();
        assert!(!ids.is_contiguous());
        assert!(IdMap::new(vec![i64::MAX]).unwrap().is_contiguous());
    }

    #[test]
    fn test_id_map_rejects_duplicates() {
        assert!(IdMap::new(vec![1, 2, 1]).is_err());
        assert!(IdMap::new((0..50).collect()).unwrap().is_contiguous());
    }

    #[test]
    fn test_neuron_at_prefers_topmost() {
        let mut raw = raw_session();
        raw.image = Array2::zeros((10, 10));
        raw.ids = vec![1.0, 2.0];
        raw.traces = traces(2, 5);
        raw.centroids = None;
        // Image coordinates; after the flip both squares overlap around y = 7.
        raw.contours = vec![
            array![[0.0, 4.0, 4.0, 0.0], [0.0, 0.0, 4.0, 4.0]],
            array![[2.0, 6.0, 6.0, 2.0], [2.0, 2.0, 6.0, 6.0]],
        ];
        let session = raw.into_session().unwrap();
        assert_eq!(session.neuron_at(1.0, 9.0), Some(0));
        assert_eq!(session.neuron_at(3.0, 7.0), Some(1));
        assert_eq!(session.neuron_at(9.0, 1.0), None);
    }

    #[test]
    fn test_project_includes_time_axis() {
        let session = raw_session().into_session().unwrap();
        let proj = session.project(0, 20.0).unwrap();
        assert_eq!(proj.time.len(), 5);
        assert_relative_eq!(proj.time[4], 0.2, epsilon = 1e-12);
        assert_eq!(proj.series.len(), 5);
        assert!(session.project(1, 20.0).is_err());
        assert_eq!(session.time_axis(20.0), proj.time);
    }
}
