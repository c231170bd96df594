//! Synthetic sessions for demos and manual testing.
//!
//! Neurons sit on a jittered grid. Each gets a 16-vertex contour, a Gaussian
//! footprint in the reference image and a calcium-like trace family driven
//! by random spike trains.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use civis_core::{RawSession, TraceKind};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CONTOUR_VERTICES: usize = 16;
const SPIKE_PROBABILITY: f64 = 0.02;
const CALCIUM_DECAY: f64 = 0.92;
const LOWPASS_WINDOW: usize = 5;

/// Generator settings.
#[derive(Debug, Clone, Copy)]
pub struct SynthParams {
    pub neurons: usize,
    pub timepoints: usize,
    pub size: usize,
    pub seed: u64,
}

struct Footprint {
    cx: f64,
    cy: f64,
    radius: f64,
}

/// Builds a session in consumption layout with one-based ids `1..=neurons`.
#[must_use]
pub fn synthetic_session(params: &SynthParams) -> RawSession {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let footprints = place_footprints(params, &mut rng);

    let contours = footprints
        .iter()
        .map(|fp| contour(fp, &mut rng))
        .collect();
    let image = reference_image(params.size, &footprints, &mut rng);
    let traces = trace_family(params.neurons, params.timepoints, &mut rng);

    let mut centroids = Array2::zeros((params.neurons, 2));
    for (i, fp) in footprints.iter().enumerate() {
        centroids[[i, 0]] = fp.cx;
        centroids[[i, 1]] = fp.cy;
    }

    RawSession {
        image,
        contours,
        traces,
        ids: (1..=params.neurons).map(|id| id as f64).collect(),
        centroids: Some(centroids),
        metadata_path: format!("synthetic/seed_{}.mat", params.seed),
    }
}

fn place_footprints(params: &SynthParams, rng: &mut StdRng) -> Vec<Footprint> {
    let cols = (params.neurons as f64).sqrt().ceil().max(1.0) as usize;
    let cell = params.size as f64 / cols as f64;
    let radius = cell * 0.3;
    (0..params.neurons)
        .map(|i| {
            let jitter = cell * 0.1;
            Footprint {
                cx: ((i % cols) as f64 + 0.5) * cell + rng.gen_range(-jitter..=jitter),
                cy: ((i / cols) as f64 + 0.5) * cell + rng.gen_range(-jitter..=jitter),
                radius: radius * rng.gen_range(0.8..=1.0),
            }
        })
        .collect()
}

fn contour(fp: &Footprint, rng: &mut StdRng) -> Array2<f64> {
    let mut coords = Array2::zeros((2, CONTOUR_VERTICES));
    for k in 0..CONTOUR_VERTICES {
        let angle = TAU * k as f64 / CONTOUR_VERTICES as f64;
        let r = fp.radius * rng.gen_range(0.85..=1.15);
        coords[[0, k]] = fp.cx + r * angle.cos();
        coords[[1, k]] = fp.cy + r * angle.sin();
    }
    coords
}

fn reference_image(size: usize, footprints: &[Footprint], rng: &mut StdRng) -> Array2<f64> {
    let mut image = Array2::from_shape_fn((size, size), |_| rng.gen_range(0.0..0.1));
    for ((row, col), value) in image.indexed_iter_mut() {
        let (x, y) = (col as f64 + 0.5, row as f64 + 0.5);
        for fp in footprints {
            let sigma = fp.radius * 0.6;
            let d2 = (x - fp.cx).powi(2) + (y - fp.cy).powi(2);
            *value += (-d2 / (2.0 * sigma * sigma)).exp();
        }
    }
    image
}

fn trace_family(
    neurons: usize,
    timepoints: usize,
    rng: &mut StdRng,
) -> BTreeMap<TraceKind, Array2<f64>> {
    let mut spikes = Array2::zeros((neurons, timepoints));
    let mut calcium = Array2::zeros((neurons, timepoints));
    let mut raw = Array2::zeros((neurons, timepoints));
    for n in 0..neurons {
        let mut level = 0.0;
        for t in 0..timepoints {
            if rng.gen_bool(SPIKE_PROBABILITY) {
                spikes[[n, t]] = rng.gen_range(1.0..3.0);
            }
            level = level * CALCIUM_DECAY + spikes[[n, t]];
            calcium[[n, t]] = level;
            raw[[n, t]] = level + rng.gen_range(-0.25..0.25);
        }
    }

    let mut lowpass = Array2::zeros((neurons, timepoints));
    let mut reraw = Array2::zeros((neurons, timepoints));
    for n in 0..neurons {
        let row = raw.row(n);
        let floor = row.iter().copied().fold(f64::INFINITY, f64::min);
        for t in 0..timepoints {
            let start = t.saturating_sub(LOWPASS_WINDOW - 1);
            let window = row.slice(ndarray::s![start..=t]);
            lowpass[[n, t]] = window.sum() / window.len() as f64;
            reraw[[n, t]] = row[t] - floor;
        }
    }

    BTreeMap::from([
        (TraceKind::Lowpass, lowpass),
        (TraceKind::Raw, raw),
        (TraceKind::Denoised, calcium),
        (TraceKind::Deconvolved, spikes),
        (TraceKind::Reraw, reraw),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> SynthParams {
        SynthParams {
            neurons: 9,
            timepoints: 50,
            size: 60,
            seed: 7,
        }
    }

    #[test]
    fn test_synthetic_session_is_consistent() {
        let raw = synthetic_session(&params());
        assert_eq!(raw.image.dim(), (60, 60));
        assert_eq!(raw.contours.len(), 9);
        assert_eq!(raw.traces.len(), 5);

        let session = raw.into_session().unwrap();
        assert_eq!(session.neuron_count(), 9);
        assert_eq!(session.ids().min(), Some(0));
        assert_eq!(session.ids().max(), Some(8));
        assert_eq!(session.traces().timepoints(), 50);
    }

    #[test]
    fn test_centroid_hits_own_contour() {
        let raw = synthetic_session(&params());
        let centroids = raw.centroids.clone().unwrap();
        let height = raw.image.nrows() as f64;
        let session = raw.into_session().unwrap();
        for i in 0..9 {
            let (cx, cy) = (centroids[[i, 0]], centroids[[i, 1]]);
            assert_eq!(session.neuron_at(cx, height - cy), Some(i));
        }
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = synthetic_session(&params());
        let b = synthetic_session(&params());
        assert_eq!(a.image, b.image);
        assert_eq!(a.traces[&TraceKind::Raw], b.traces[&TraceKind::Raw]);
    }

    #[test]
    fn test_reraw_is_rebased() {
        let raw = synthetic_session(&params());
        let reraw = &raw.traces[&TraceKind::Reraw];
        for row in reraw.rows() {
            let min = row.iter().copied().fold(f64::INFINITY, f64::min);
            assert_relative_eq!(min, 0.0);
        }
    }
}
