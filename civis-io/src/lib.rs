//! civis-io: Session containers, label files and configuration.
//!
//! The MATLAB v7.3 container reader sits behind the `hdf5` feature so the
//! label and configuration code builds without a system HDF5.
//!

pub mod config;
mod error;
pub mod labels;
#[cfg(feature = "hdf5")]
pub mod mat;

pub use config::{label_file_beside, resolve_config_path, LabelerConfig};
pub use error::{Error, Result};
pub use labels::{load_labels, save_labels};
#[cfg(feature = "hdf5")]
pub use mat::{load_session, read_raw_session, write_session_container};
