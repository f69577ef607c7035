//! Joining boundaries with the change table.
//!
//! An inner merge on the USPS abbreviation. Rows present on only one side are
//! dropped; each one is logged so a territory filter and a missing CSV row can
//! be told apart in the output.

use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

use crate::state::{ChangeTable, MergedDataset, StateFeature};

/// Merge features and table rows that share an abbreviation.
///
/// Output rows follow the feature order; every table column is carried over.
pub fn merge(features: Vec<StateFeature>, table: &ChangeTable) -> MergedDataset {
    let index = table.index_by_stusps();

    let mut columns: BTreeMap<String, Vec<Option<f64>>> = table
        .years
        .iter()
        .map(|year| (year.clone(), Vec::with_capacity(features.len())))
        .collect();

    let mut matched_features = Vec::with_capacity(features.len());
    let mut matched_keys: HashSet<String> = HashSet::new();

    for feature in features {
        let Some(&row_index) = index.get(feature.stusps.as_str()) else {
            warn!(
                stusps = %feature.stusps,
                geoid = %feature.geoid,
                "State has no row in the change table, dropping it"
            );
            continue;
        };

        let row = &table.rows[row_index];
        for (year, value) in table.years.iter().zip(&row.values) {
            if let Some(column) = columns.get_mut(year) {
                column.push(*value);
            }
        }
        // Flexible CSV rows may be short; pad so columns stay aligned
        for year in table.years.iter().skip(row.values.len()) {
            if let Some(column) = columns.get_mut(year) {
                column.push(None);
            }
        }

        matched_keys.insert(feature.stusps.clone());
        matched_features.push(feature);
    }

    for row in &table.rows {
        if !matched_keys.contains(&row.stusps) {
            warn!(
                stusps = %row.stusps,
                "Change table row has no matching boundary, dropping it"
            );
        }
    }

    if matched_features.is_empty() {
        warn!("Join matched no states; maps will be empty");
    }

    info!(
        operation = "join",
        matched = matched_features.len(),
        table_rows = table.rows.len(),
        "Joined boundaries with change table"
    );

    MergedDataset {
        features: matched_features,
        columns,
    }
}
