//! # passport-maps
//!
//! Renders one choropleth map of the U.S. states per year from a census
//! boundary shapefile and a CSV of year-over-year change figures.
//!
//! ## Pipeline
//!
//! - **Loading**: boundaries are read from a shapefile, territories dropped,
//!   and everything projected to Albers equal-area (ESRI:102003)
//! - **Insets**: Alaska and Hawaii are translated, scaled and rotated next to
//!   the contiguous states
//! - **Join**: boundaries are inner-merged with the CSV on the USPS abbreviation
//! - **Rendering**: a diverging green/red colormap, state borders, annotations
//!   and a legend are drawn to `<year>.png`

pub mod colormaps;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod geometry;
pub mod join;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod state;

pub use config::Config;
pub use error::{MapError, Result};
pub use logging::{
    init_tracing, log_data_load_stats, log_error, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use pipeline::{run, RunSummary};
pub use state::{ChangeRow, ChangeTable, MergedDataset, StateFeature};
