//! Data model for the map pipeline.
//!
//! State boundaries, the per-year change table read from CSV, and the merged
//! dataset that every yearly render draws from.

use geo::MultiPolygon;
use std::collections::{BTreeMap, HashMap};

use crate::error::{MapError, Result};

/// One state or state-equivalent from the boundary file
#[derive(Debug, Clone, PartialEq)]
pub struct StateFeature {
    /// Two-digit FIPS code, e.g. "06"
    pub statefp: String,
    /// USPS abbreviation, e.g. "CA"
    pub stusps: String,
    /// Census GEOID; unique across a loaded collection
    pub geoid: String,
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// One CSV row: an abbreviation and its value per year column
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub stusps: String,
    /// Aligned with [`ChangeTable::years`]; `None` for empty or malformed cells
    pub values: Vec<Option<f64>>,
}

/// Per-state, per-year change figures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeTable {
    /// Year column names in file order
    pub years: Vec<String>,
    pub rows: Vec<ChangeRow>,
}

impl ChangeTable {
    #[cfg(test)]
    pub(crate) fn row(&self, stusps: &str) -> Option<&ChangeRow> {
        self.rows.iter().find(|row| row.stusps == stusps)
    }

    /// Map from abbreviation to row index, first occurrence wins
    pub fn index_by_stusps(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            index.entry(row.stusps.as_str()).or_insert(i);
        }
        index
    }
}

/// Geometry joined with its change figures.
///
/// Values are stored column-wise, one vector per year aligned row-for-row
/// with `features`, so a year's colors can be computed in one pass.
#[derive(Debug, Clone, Default)]
pub struct MergedDataset {
    pub features: Vec<StateFeature>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl MergedDataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Get a year's value column
    pub fn column(&self, year: &str) -> Option<&[Option<f64>]> {
        self.columns.get(year).map(Vec::as_slice)
    }

    /// Get a year's value column with error handling
    pub fn column_checked(&self, year: &str) -> Result<&[Option<f64>]> {
        self.column(year).ok_or_else(|| MapError::DataNotFound {
            message: format!("Year column not found: {}", year),
        })
    }

    /// Abbreviations in row order
    pub fn abbreviations(&self) -> Vec<&str> {
        self.features
            .iter()
            .map(|feature| feature.stusps.as_str())
            .collect()
    }

    /// Check that every column lines up with the feature rows
    pub fn validate(&self) -> Result<()> {
        for (year, column) in &self.columns {
            if column.len() != self.features.len() {
                return Err(MapError::InvalidData {
                    message: format!(
                        "Column {} has {} values for {} features",
                        year,
                        column.len(),
                        self.features.len()
                    ),
                });
            }
        }
        Ok(())
    }
}
