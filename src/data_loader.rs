//! Input loading: state boundaries from a shapefile and change figures from CSV.
//!
//! Boundaries are read as geographic lon/lat, stripped of territories,
//! projected to the configured equal-area projection and sorted by GEOID.
//! The CSV is read leniently: bad numeric cells become missing values.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{MapError, Result};
use crate::geometry::AlbersProjection;
use crate::logging::log_data_load_stats;
use crate::state::{ChangeRow, ChangeTable, StateFeature};

/// Key column shared by the shapefile and the CSV
pub const KEY_COLUMN: &str = "STUSPS";

/// Load, filter, project and sort the state boundaries
pub fn load_states(config: &Config) -> Result<Vec<StateFeature>> {
    let shp_path = find_shapefile(&config.paths.data_dir)?;
    info!("Opening shapefile: {}", shp_path.display());
    warn_if_projected(&shp_path);

    let features = read_shapefile(&shp_path)?;
    let total = features.len();

    let mut features = filter_territories(features, &config.geometry.excluded_fips);
    let excluded = total - features.len();

    let projection = AlbersProjection::new(config.geometry.projection)?;
    for feature in &mut features {
        feature.geometry = projection.project_geometry(&feature.geometry);
    }

    features.sort_by(|a, b| a.geoid.cmp(&b.geoid));
    ensure_unique_keys(&features)?;

    log_data_load_stats(&shp_path.display().to_string(), features.len(), excluded);
    Ok(features)
}

/// Locate the first `.shp` file (by name) in a directory
pub fn find_shapefile(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(MapError::DataNotFound {
            message: format!("Geometry directory not found: {}", dir.display()),
        });
    }

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_shp = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"));
        if is_shp && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(MapError::DataNotFound {
            message: format!("No .shp file in {}", dir.display()),
        }),
        1 => Ok(candidates.remove(0)),
        n => {
            warn!(
                "Found {} shapefiles in {}, using {}",
                n,
                dir.display(),
                candidates[0].display()
            );
            Ok(candidates.remove(0))
        }
    }
}

/// Read every record of a shapefile into unprojected features
pub fn read_shapefile(path: &Path) -> Result<Vec<StateFeature>> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut features = Vec::new();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;

        let statefp = required_field(&record, "STATEFP", index)?;
        let stusps = required_field(&record, KEY_COLUMN, index)?;
        let geoid = required_field(&record, "GEOID", index)?;
        let name = text_field(&record, "NAME");

        let geometry = match shape_to_multipolygon(shape) {
            Ok(geometry) => geometry,
            Err(shape_type) => {
                return Err(MapError::InvalidData {
                    message: format!(
                        "Record {} ({}) has unsupported shape type {}",
                        index, stusps, shape_type
                    ),
                });
            }
        };

        features.push(StateFeature {
            statefp,
            stusps,
            geoid,
            name,
            geometry,
        });
    }

    debug!("Read {} records from {}", features.len(), path.display());
    Ok(features)
}

/// Drop every feature whose STATEFP is in `excluded`
pub fn filter_territories(features: Vec<StateFeature>, excluded: &[String]) -> Vec<StateFeature> {
    let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
    features
        .into_iter()
        .filter(|feature| {
            let keep = !excluded.contains(feature.statefp.as_str());
            if !keep {
                debug!(statefp = %feature.statefp, stusps = %feature.stusps, "Excluding territory");
            }
            keep
        })
        .collect()
}

/// Load the per-state change CSV
pub fn load_change_table(path: &Path) -> Result<ChangeTable> {
    if !path.exists() {
        return Err(MapError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let key_index = headers
        .iter()
        .position(|header| header == KEY_COLUMN)
        .ok_or_else(|| MapError::DataNotFound {
            message: format!("Column {} not found in {}", KEY_COLUMN, path.display()),
        })?;

    let value_indices: Vec<usize> = (0..headers.len()).filter(|&i| i != key_index).collect();
    let years: Vec<String> = value_indices
        .iter()
        .map(|&i| headers[i].to_string())
        .collect();

    let mut rows: Vec<ChangeRow> = Vec::new();
    let mut seen = HashSet::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let stusps = match record.get(key_index) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                warn!(row = line + 1, "Skipping CSV row without {}", KEY_COLUMN);
                continue;
            }
        };

        if !seen.insert(stusps.clone()) {
            warn!(stusps = %stusps, "Duplicate CSV row, keeping the first");
            continue;
        }

        let values = value_indices
            .iter()
            .zip(&years)
            .map(|(&i, year)| parse_value(record.get(i), &stusps, year))
            .collect();

        rows.push(ChangeRow { stusps, values });
    }

    info!(
        operation = "csv_load",
        file_path = %path.display(),
        rows = rows.len(),
        columns = years.len(),
        "Change table loaded"
    );

    Ok(ChangeTable { years, rows })
}

fn parse_value(cell: Option<&str>, stusps: &str, year: &str) -> Option<f64> {
    let cell = cell.unwrap_or("");
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(stusps = stusps, year = year, cell = cell, "Unparseable value treated as missing");
            None
        }
    }
}

fn text_field(record: &Record, name: &str) -> Option<String> {
    match record.get(name)? {
        FieldValue::Character(Some(text)) => Some(text.trim().to_string()),
        FieldValue::Memo(text) => Some(text.trim().to_string()),
        _ => None,
    }
}

fn required_field(record: &Record, name: &str, index: usize) -> Result<String> {
    text_field(record, name)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| MapError::DataNotFound {
            message: format!("Record {} has no {} attribute", index, name),
        })
}

/// Convert a polygon shape, or report the shape type when it is not one
fn shape_to_multipolygon(shape: Shape) -> std::result::Result<MultiPolygon<f64>, String> {
    match shape {
        Shape::Polygon(polygon) => Ok(rings_to_multipolygon(polygon.rings(), |p| Coord {
            x: p.x,
            y: p.y,
        })),
        Shape::PolygonM(polygon) => Ok(rings_to_multipolygon(polygon.rings(), |p| Coord {
            x: p.x,
            y: p.y,
        })),
        Shape::PolygonZ(polygon) => Ok(rings_to_multipolygon(polygon.rings(), |p| Coord {
            x: p.x,
            y: p.y,
        })),
        other => Err(format!("{:?}", other.shapetype())),
    }
}

/// Group shapefile rings into polygons: each outer ring starts a polygon and
/// the inner rings that follow are its holes.
fn rings_to_multipolygon<P>(
    rings: &[PolygonRing<P>],
    to_coord: impl Fn(&P) -> Coord<f64>,
) -> MultiPolygon<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

    for ring in rings {
        let line: LineString<f64> = ring.points().iter().map(&to_coord).collect();
        match ring {
            PolygonRing::Inner(_) if !polygons.is_empty() => {
                if let Some((_, holes)) = polygons.last_mut() {
                    holes.push(line);
                }
            }
            // An inner ring with no outer ring before it is wound the wrong way
            _ => polygons.push((line, Vec::new())),
        }
    }

    polygons
        .into_iter()
        .map(|(exterior, holes)| Polygon::new(exterior, holes))
        .collect()
}

fn warn_if_projected(shp_path: &Path) {
    let prj_path = shp_path.with_extension("prj");
    if let Ok(wkt) = std::fs::read_to_string(&prj_path) {
        if wkt.trim_start().starts_with("PROJCS") {
            warn!(
                prj = %prj_path.display(),
                "Shapefile declares a projected CRS; coordinates are treated as lon/lat degrees"
            );
        }
    }
}

/// GEOID and STUSPS must each identify one feature; STUSPS is the join key
fn ensure_unique_keys(features: &[StateFeature]) -> Result<()> {
    // Input is sorted by GEOID, so those duplicates are adjacent
    for pair in features.windows(2) {
        if pair[0].geoid == pair[1].geoid {
            return Err(MapError::InvalidData {
                message: format!("Duplicate GEOID {} in boundary file", pair[0].geoid),
            });
        }
    }

    let mut seen = HashSet::with_capacity(features.len());
    for feature in features {
        if !seen.insert(feature.stusps.as_str()) {
            return Err(MapError::InvalidData {
                message: format!(
                    "Duplicate {} {} in boundary file (GEOID {})",
                    KEY_COLUMN, feature.stusps, feature.geoid
                ),
            });
        }
    }
    Ok(())
}
