//! Path configuration for session discovery and label output.

use std::path::{Path, PathBuf};

use civis_core::DEFAULT_SAMPLE_RATE_HZ;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "CIVIS_CONFIG";

/// Default user-supplied suffix of label files.
pub const DEFAULT_LABEL_FILE_NAME: &str = "labels.csv";

/// Suffix of processed session containers: `<session>_v7.mat`.
pub const SESSION_FILE_SUFFIX: &str = "_v7.mat";

/// Labeler configuration, read from JSON.
///
/// Unknown keys are ignored so the file can be shared with other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelerConfig {
    /// Base directory of processed sessions (`ProcessedFilePath`).
    pub processed_file_path: PathBuf,
    /// Base directory of label output (`LabelsPath`).
    pub labels_path: PathBuf,
    /// Trace sampling rate in Hz (`SampleRateHz`).
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: f64,
    /// Default label file suffix (`LabelFileName`).
    #[serde(default = "default_label_file_name")]
    pub label_file_name: String,
}

fn default_sample_rate() -> f64 {
    DEFAULT_SAMPLE_RATE_HZ
}

fn default_label_file_name() -> String {
    DEFAULT_LABEL_FILE_NAME.to_string()
}

impl LabelerConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the file is missing, unparsable or invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Parses and validates configuration JSON.
    ///
    /// # Errors
    /// Returns [`Error::Json`] on malformed JSON or [`Error::Config`] on
    /// invalid values.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value constraints.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.processed_file_path.as_os_str().is_empty() {
            return Err(Error::Config("ProcessedFilePath is empty".into()));
        }
        if self.labels_path.as_os_str().is_empty() {
            return Err(Error::Config("LabelsPath is empty".into()));
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(Error::Config(format!(
                "SampleRateHz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        check_name("label file name", &self.label_file_name)?;
        Ok(())
    }

    /// `<ProcessedFilePath>/<session>/<session>_v7.mat`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an empty session name.
    pub fn session_file(&self, session: &str) -> Result<PathBuf> {
        let session = check_name("session name", session)?;
        Ok(self
            .processed_file_path
            .join(session)
            .join(format!("{session}{SESSION_FILE_SUFFIX}")))
    }

    /// `<LabelsPath>/<session>/<session>_<file_name>`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an empty session or file name.
    pub fn label_file(&self, session: &str, file_name: &str) -> Result<PathBuf> {
        let session = check_name("session name", session)?;
        let file_name = check_name("label file name", file_name)?;
        Ok(self
            .labels_path
            .join(session)
            .join(format!("{session}_{file_name}")))
    }
}

/// Configuration file location: `explicit`, else `$CIVIS_CONFIG`, else
/// `config.json` in the working directory.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            std::env::var_os(CONFIG_ENV_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

/// Label file placed next to a session container opened directly:
/// `<dir>/<stem>_<file_name>`, with a trailing `_v7` dropped from the stem.
///
/// # Errors
/// Returns [`Error::Config`] for an empty file name or a path without a
/// file stem.
pub fn label_file_beside(session_file: &Path, file_name: &str) -> Result<PathBuf> {
    let file_name = check_name("label file name", file_name)?;
    let stem = session_file
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::Config(format!("no file name in {}", session_file.display()))
        })?;
    let stem = stem.strip_suffix("_v7").unwrap_or(stem);
    let dir = session_file.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("{stem}_{file_name}")))
}

fn check_name<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Config(format!("{what} is empty")));
    }
    Ok(trimmed)
}
