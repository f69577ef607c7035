//! End-to-end run: load, reposition, join, then render each configured year.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::data_loader::{load_change_table, load_states};
use crate::error::{MapError, Result};
use crate::geometry::reposition_insets;
use crate::join::merge;
use crate::logging::{log_operation_end, log_operation_start, log_timed_operation};
use crate::render::Renderer;
use crate::state::MergedDataset;

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of states drawn on every map
    pub states: usize,
    /// Written PNG files in year order
    pub outputs: Vec<PathBuf>,
}

/// Load inputs and build the joined dataset
pub fn prepare_dataset(config: &Config) -> Result<MergedDataset> {
    let mut features = log_timed_operation("load_states", || load_states(config))?;
    reposition_insets(
        &mut features,
        &[config.geometry.alaska.clone(), config.geometry.hawaii.clone()],
    );

    let table = log_timed_operation("load_change_table", || {
        load_change_table(&config.paths.csv_path)
    })?;

    let dataset = merge(features, &table);
    dataset.validate()?;
    Ok(dataset)
}

/// Run the whole pipeline for the configured year range.
///
/// Rendering stops at the first failing year.
pub fn run(config: &Config) -> Result<RunSummary> {
    let start = Instant::now();
    log_operation_start(
        "run",
        Some(&format!("years {}..={}", config.years.start, config.years.end)),
    );

    let dataset = prepare_dataset(config)?;
    prepare_output_dir(&config.paths.output_dir, config.paths.create_output_dir)?;

    let years = config.years.columns();
    for year in &years {
        if dataset.column(year).is_none() {
            return Err(MapError::DataNotFound {
                message: format!(
                    "Year column {} not found in {}",
                    year,
                    config.paths.csv_path.display()
                ),
            });
        }
    }

    let renderer = Renderer::new(config, &dataset)?;
    let mut outputs = Vec::with_capacity(years.len());
    for year in &years {
        let path = renderer.render_year(&dataset, year)?;
        info!(
            year = %year,
            path = %path.display(),
            states = dataset.len(),
            "Rendered map"
        );
        outputs.push(path);
    }

    log_operation_end("run", start, !dataset.is_empty());
    Ok(RunSummary {
        states: dataset.len(),
        outputs,
    })
}

/// Make sure the output directory exists, creating it only when allowed
pub fn prepare_output_dir(dir: &Path, create: bool) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if create {
        std::fs::create_dir_all(dir)?;
        info!("Created output directory {}", dir.display());
        return Ok(());
    }
    Err(MapError::DataNotFound {
        message: format!("Output directory not found: {}", dir.display()),
    })
}
