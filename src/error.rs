//! Error types for the passport-maps pipeline.
//!
//! This module defines a single error enum covering every failure the
//! pipeline can hit, from reading the shapefile to saving the PNGs.

use thiserror::Error;

/// The main error type for passport-maps operations.
#[derive(Error, Debug)]
pub enum MapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shapefile / dBase read errors
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// CSV parse errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// PNG encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input file or column not found
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Input present but unusable
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Rendering errors
    #[error("Render error: {message}")]
    Render { message: String },
}

/// Convenience type alias for Results with MapError
pub type Result<T> = std::result::Result<T, MapError>;
