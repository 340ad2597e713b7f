//! Command-line front end.
//!
//! Streams a synthetic NV21 source through the preview pipeline into an
//! in-memory surface, optionally writing the last presented frame as a PNG
//! and printing session diagnostics.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::diagnostics::stats::DiagnosticSnapshot;
use crate::filter::types::FilterSelector;
use crate::overlay::target::ImageTarget;
use crate::preview::error::{ConfigError, PipelineError, StateError};
use crate::preview::pipeline::PreviewPipeline;
use crate::preview::source::SyntheticSource;
use crate::preview::types::{DropReason, FrameOutcome};
use crate::settings::error::SettingsError;
use crate::settings::store::SettingsStore;
use crate::settings::types::PreviewSettings;

#[derive(Debug, Parser)]
#[command(name = "preview-filter")]
#[command(about = "Run NV21 preview frames through a pixel filter and overlay its label")]
#[command(version)]
pub struct Args {
    /// Settings file (JSON). Defaults are used when it does not exist.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Frame width, overriding the settings file
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height, overriding the settings file
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of frames to stream
    #[arg(short = 'n', long, default_value = "90")]
    pub frames: u64,

    /// Filter to start with, overriding the settings file
    #[arg(short, long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Switch to the next filter every N frames (0 disables)
    #[arg(long, default_value = "0")]
    pub cycle: u64,

    /// Write the last presented frame to this PNG file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Persist the final filter choice back to the settings file
    #[arg(long, requires = "config")]
    pub save_settings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Rgba,
    Laplacian,
    Gaussian,
}

impl From<FilterArg> for FilterSelector {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Rgba => FilterSelector::PassthroughConvert,
            FilterArg::Laplacian => FilterSelector::Laplacian,
            FilterArg::Gaussian => FilterSelector::Gaussian,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub presented: u64,
    pub final_filter: FilterSelector,
    pub diagnostics: DiagnosticSnapshot,
}

/// Resolve settings from the optional file and command-line overrides.
pub fn resolve_settings(args: &Args) -> Result<PreviewSettings, CliError> {
    let mut settings = match &args.config {
        Some(path) => SettingsStore::load(path)?,
        None => PreviewSettings::default(),
    };
    if let Some(width) = args.width {
        settings.capture.width = width;
    }
    if let Some(height) = args.height {
        settings.capture.height = height;
    }
    if let Some(filter) = args.filter {
        settings.filter = filter.into();
    }
    settings.capture.validate()?;
    Ok(settings)
}

/// Stream `args.frames` synthetic frames through a fresh pipeline.
pub fn run(args: &Args) -> Result<RunSummary, CliError> {
    let settings = resolve_settings(args)?;
    let capture = settings.capture;

    let target = ImageTarget::new(capture.width, capture.height);
    let pipeline = PreviewPipeline::new(Box::new(target.clone()))
        .with_style(settings.overlay)
        .with_failure_threshold(settings.failure_threshold)
        .with_initial_filter(settings.filter);
    pipeline.configure(capture)?;
    pipeline.start()?;

    let mut source = SyntheticSource::new().with_limit(args.frames);
    let mut presented = 0u64;
    loop {
        match pipeline.pump(&mut source)? {
            FrameOutcome::Presented { sequence, filter } => {
                presented += 1;
                debug!("frame {sequence} presented with {filter}");
                if args.cycle > 0 && presented % args.cycle == 0 {
                    pipeline.set_filter(filter.next());
                }
            }
            FrameOutcome::Dropped(DropReason::NoFrame) => break,
            FrameOutcome::Dropped(reason) => warn!("frame dropped: {reason:?}"),
        }
    }
    pipeline.stop()?;

    if let Some(path) = &args.output {
        target.save(path).map_err(|source| CliError::Export {
            path: path.clone(),
            source,
        })?;
        info!("last frame written to {}", path.display());
    }

    let final_filter = pipeline.selector();
    if args.save_settings {
        if let Some(path) = &args.config {
            let store = SettingsStore::open(path.clone())?;
            store.set_filter(final_filter);
            store.save()?;
        }
    }

    Ok(RunSummary {
        presented,
        final_filter,
        diagnostics: pipeline.diagnostics(),
    })
}
