//! civis CLI
//!
//! Inspect session containers, summarise label files and prepare fixtures.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

mod synth;

use std::path::{Path, PathBuf};

use civis_core::{LabelCounts, LabelStore, Session};
use civis_io::{load_labels, load_session, save_labels, write_session_container, LabelerConfig};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use serde::Serialize;
use thiserror::Error;

use crate::synth::{synthetic_session, SynthParams};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    CivisIo(#[from] civis_io::Error),

    #[error("core error: {0}")]
    Core(#[from] civis_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

/// Review tools for segmented calcium-imaging sessions.
#[derive(Parser)]
#[command(name = "civis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: $CIVIS_CONFIG, then ./config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show neuron count, id range, image size and traces of a session
    Info {
        /// Session container path
        #[arg(conflicts_with = "session")]
        file: Option<PathBuf>,

        /// Session name, resolved through the configuration
        #[arg(long)]
        session: Option<String>,

        /// Print a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Show label counts of a saved label file
    Labels {
        /// Label CSV path
        csv: PathBuf,

        /// Expected neuron count
        #[arg(long)]
        neurons: Option<usize>,

        /// Print a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Write an all-unlabeled label file for a session
    InitLabels {
        /// Session name
        #[arg(long)]
        session: String,

        /// Label file suffix (default from configuration)
        #[arg(long)]
        file_name: Option<String>,

        /// Overwrite an existing label file
        #[arg(long)]
        force: bool,
    },

    /// Write a synthetic session container
    Synth {
        /// Output container path
        output: PathBuf,

        /// Number of neurons
        #[arg(long, default_value = "24")]
        neurons: usize,

        /// Number of timepoints per trace
        #[arg(long, default_value = "600")]
        timepoints: usize,

        /// Reference image edge length in pixels
        #[arg(long, default_value = "128")]
        size: usize,

        /// Random seed
        #[arg(long, default_value = "1")]
        seed: u64,
    },
}

#[derive(Serialize)]
struct SessionInfo<'a> {
    path: &'a Path,
    neurons: usize,
    id_min: Option<i64>,
    id_max: Option<i64>,
    contiguous_ids: bool,
    height: usize,
    width: usize,
    timepoints: usize,
    duration_s: f64,
    traces: Vec<&'static str>,
    centroids: bool,
    metadata_path: &'a str,
}

impl<'a> SessionInfo<'a> {
    fn new(path: &'a Path, session: &'a Session, sample_rate_hz: f64) -> Self {
        let timepoints = session.traces().timepoints();
        Self {
            path,
            neurons: session.neuron_count(),
            id_min: session.ids().min(),
            id_max: session.ids().max(),
            contiguous_ids: session.ids().is_contiguous(),
            height: session.height(),
            width: session.width(),
            timepoints,
            duration_s: timepoints as f64 / sample_rate_hz,
            traces: session.traces().kinds().map(|k| k.field_name()).collect(),
            centroids: session.centroids().is_some(),
            metadata_path: session.metadata_path(),
        }
    }

    fn print(&self) {
        println!("File: {}", self.path.display());
        println!("Neurons: {}", self.neurons);
        if let (Some(min), Some(max)) = (self.id_min, self.id_max) {
            let note = if self.contiguous_ids { "" } else { " (sparse)" };
            println!("Ids: {} - {}{}", min, max, note);
        }
        println!("Image: {} x {}", self.height, self.width);
        println!("Timepoints: {} ({:.2} s)", self.timepoints, self.duration_s);
        println!("Traces: {}", self.traces.join(", "));
        println!("Centroids: {}", if self.centroids { "yes" } else { "no" });
        println!("Metadata path: {}", self.metadata_path);
    }
}

#[derive(Serialize)]
struct LabelFileInfo<'a> {
    path: &'a Path,
    neurons: usize,
    counts: LabelCounts,
}

impl<'a> LabelFileInfo<'a> {
    fn new(path: &'a Path, store: &LabelStore) -> Self {
        Self {
            path,
            neurons: store.len(),
            counts: store.counts(),
        }
    }

    fn print(&self) {
        println!("File: {}", self.path.display());
        println!("Neurons: {}", self.neurons);
        println!("{}", self.counts);
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Info {
            file,
            session,
            json,
        } => {
            let (path, sample_rate_hz) = match (file, session) {
                (Some(file), _) => {
                    let rate = load_config(cli.config.as_deref())
                        .map_or(civis_core::DEFAULT_SAMPLE_RATE_HZ, |c| c.sample_rate_hz);
                    (file, rate)
                }
                (None, Some(name)) => {
                    let config = require_config(cli.config.as_deref())?;
                    (config.session_file(&name)?, config.sample_rate_hz)
                }
                (None, None) => {
                    return Err(CliError::Usage(
                        "info needs a session file or --session NAME".into(),
                    ))
                }
            };
            let session = load_session(&path)?;
            let summary = SessionInfo::new(&path, &session, sample_rate_hz);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                summary.print();
            }
        }

        Commands::Labels { csv, neurons, json } => {
            let store = load_labels(&csv, neurons)?;
            let summary = LabelFileInfo::new(&csv, &store);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                summary.print();
            }
        }

        Commands::InitLabels {
            session,
            file_name,
            force,
        } => {
            let config = require_config(cli.config.as_deref())?;
            let file_name = file_name.unwrap_or_else(|| config.label_file_name.clone());
            let container = config.session_file(&session)?;
            let target = config.label_file(&session, &file_name)?;
            if target.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists (use --force to overwrite)",
                    target.display()
                )));
            }

            let neurons = load_session(&container)?.neuron_count();
            if let Some(dir) = target.parent() {
                std::fs::create_dir_all(dir)?;
            }
            save_labels(&LabelStore::new(neurons), &target)?;
            println!("Wrote {} unlabeled rows to {}", neurons, target.display());
        }

        Commands::Synth {
            output,
            neurons,
            timepoints,
            size,
            seed,
        } => {
            if neurons == 0 || timepoints == 0 {
                return Err(CliError::Usage(
                    "--neurons and --timepoints must be positive".into(),
                ));
            }
            if size < 16 {
                return Err(CliError::Usage("--size must be at least 16".into()));
            }
            let params = SynthParams {
                neurons,
                timepoints,
                size,
                seed,
            };
            let raw = synthetic_session(&params);
            write_session_container(&output, &raw)?;
            info!("synthetic session written to {}", output.display());
            println!(
                "Wrote {} neurons x {} timepoints ({}x{} image) to {}",
                neurons,
                timepoints,
                size,
                size,
                output.display()
            );
        }
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Option<LabelerConfig> {
    let path = civis_io::resolve_config_path(explicit);
    if !path.exists() {
        return None;
    }
    match LabelerConfig::load(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("ignoring configuration: {e}");
            None
        }
    }
}

fn require_config(explicit: Option<&Path>) -> Result<LabelerConfig> {
    let path = civis_io::resolve_config_path(explicit);
    Ok(LabelerConfig::load(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use civis_core::Label;

    #[test]
    fn test_label_summary_json_carries_counts() {
        let store = LabelStore::from_labels(vec![Label::Keep, Label::Discard, Label::Keep]);
        let summary = LabelFileInfo::new(Path::new("M1/M1_labels.csv"), &store);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["neurons"], 3);
        assert_eq!(value["counts"]["keep"], 2);
        assert_eq!(value["counts"]["discard"], 1);
        assert_eq!(value["counts"]["unlabeled"], 0);
    }

    #[test]
    fn test_labels_command_accepts_json_flag() {
        let cli = Cli::try_parse_from(["civis", "labels", "labels.csv", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Labels { json: true, .. }));
    }
}
