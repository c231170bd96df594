//! civis-core: Session model, label store and selection state for manual
//! review of segmented calcium-imaging neurons.
//!
//! This crate holds no file I/O; `civis-io` turns session containers and
//! label files into the types defined here.
//!

pub mod annotator;
pub mod error;
pub mod geometry;
pub mod label;
pub mod selection;
pub mod session;
pub mod store;
pub mod trace;

pub use annotator::Annotator;
pub use error::{Error, Result};
pub use geometry::Contour;
pub use label::{Label, LabelCounts};
pub use selection::{
    SelectionController, SelectionEvent, SelectionObserver, SelectionState, SelectionUpdate, Step,
    Transition,
};
pub use session::{IdMap, RawSession, Session};
pub use store::{LabelStore, LabelSummary};
pub use trace::{time_axis, TraceKind, TraceProjection, TraceSet, DEFAULT_SAMPLE_RATE_HZ};
