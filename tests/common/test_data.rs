//! Test data generation utilities.
//!
//! Writes small synthetic boundary shapefiles and change CSVs with known
//! layouts, so rendered colors can be checked at known positions.

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};
use std::path::Path;

/// One synthetic state: a lon/lat box
#[derive(Debug, Clone)]
pub struct TestState {
    pub statefp: &'static str,
    pub stusps: &'static str,
    pub west: f64,
    pub south: f64,
    pub size: f64,
}

impl TestState {
    pub const fn new(statefp: &'static str, stusps: &'static str, west: f64, south: f64) -> Self {
        Self {
            statefp,
            stusps,
            west,
            south,
            size: 5.0,
        }
    }

    /// Outer ring, clockwise as the shapefile format expects
    fn ring(&self) -> Vec<Point> {
        let (w, s, n) = (self.west, self.south, self.size);
        vec![
            Point::new(w, s),
            Point::new(w, s + n),
            Point::new(w + n, s + n),
            Point::new(w + n, s),
            Point::new(w, s),
        ]
    }
}

/// Two contiguous-U.S. boxes with a gap between them
pub fn two_states() -> Vec<TestState> {
    vec![
        TestState::new("01", "AA", -105.0, 35.0),
        TestState::new("06", "BB", -92.0, 35.0),
    ]
}

/// Write a polygon shapefile with STATEFP, STUSPS, GEOID and NAME fields
pub fn write_states_shapefile(
    path: &Path,
    states: &[TestState],
) -> Result<(), shapefile::Error> {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("STATEFP").unwrap(), 2)
        .add_character_field(FieldName::try_from("STUSPS").unwrap(), 2)
        .add_character_field(FieldName::try_from("GEOID").unwrap(), 2)
        .add_character_field(FieldName::try_from("NAME").unwrap(), 40);
    let mut writer = Writer::from_path(path, table)?;

    for state in states {
        let polygon = Polygon::with_rings(vec![PolygonRing::Outer(state.ring())]);
        let mut record = Record::default();
        for (field, value) in [
            ("STATEFP", state.statefp.to_string()),
            ("STUSPS", state.stusps.to_string()),
            ("GEOID", state.statefp.to_string()),
            ("NAME", format!("Test {}", state.stusps)),
        ] {
            record.insert(field.to_string(), FieldValue::Character(Some(value)));
        }
        writer.write_shape_and_record(&polygon, &record)?;
    }

    Ok(())
}

/// Write a change CSV: a STUSPS column followed by one column per year.
///
/// `None` cells are left empty.
pub fn write_change_csv(
    path: &Path,
    years: &[&str],
    rows: &[(&str, Vec<Option<f64>>)],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["STUSPS".to_string()];
    header.extend(years.iter().map(|year| year.to_string()));
    writer.write_record(&header)?;

    for (stusps, values) in rows {
        let mut record = vec![stusps.to_string()];
        record.extend(
            values
                .iter()
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
