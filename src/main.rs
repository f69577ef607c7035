//! passport-maps - yearly choropleth maps of U.S. passport recipient change
//!
//! This is the main entry point for the passport-maps application.

use tracing::{error, info};

use passport_maps::logging::{init_tracing, log_error};
use passport_maps::{pipeline, Config, Result};

fn main() -> Result<()> {
    // Load configuration before tracing so the configured level applies
    let config = Config::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting passport-maps v{}", env!("CARGO_PKG_VERSION"));

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let summary = pipeline::run(&config).map_err(|e| {
        log_error(&e, "pipeline run");
        e
    })?;

    info!(
        states = summary.states,
        maps = summary.outputs.len(),
        "Finished rendering"
    );
    Ok(())
}
