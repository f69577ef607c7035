use std::error::Error;
use std::path::PathBuf;

use geo::CoordsIter;
use passport_maps::config::GeometryConfig;
use passport_maps::data_loader::{find_shapefile, read_shapefile};
use passport_maps::render::features_bounds;
use shapefile::dbase;

fn main() -> Result<(), Box<dyn Error>> {
    // A .shp file, or a directory holding one
    let arg = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data/"));
    let shp_path = if arg.is_dir() { find_shapefile(&arg)? } else { arg };

    println!("Inspecting shapefile: {}", shp_path.display());

    println!("\n=== FIELDS ===");
    let table = dbase::Reader::from_path(shp_path.with_extension("dbf"))?;
    for field in table.fields() {
        println!("  {} ({:?})", field.name(), field.field_type());
    }

    let features = read_shapefile(&shp_path)?;
    println!("\n=== RECORDS ({}) ===", features.len());

    let excluded = GeometryConfig::default().excluded_fips;
    for feature in &features {
        let polygons = feature.geometry.0.len();
        let holes: usize = feature
            .geometry
            .iter()
            .map(|polygon| polygon.interiors().len())
            .sum();
        println!(
            "  STATEFP={} STUSPS={} GEOID={} NAME={} polygons={} holes={} points={}{}",
            feature.statefp,
            feature.stusps,
            feature.geoid,
            feature.name.as_deref().unwrap_or("-"),
            polygons,
            holes,
            feature.geometry.coords_count(),
            if excluded.contains(&feature.statefp) {
                "  (excluded)"
            } else {
                ""
            }
        );
    }

    println!("\n=== BOUNDING BOX ===");
    match features_bounds(&features) {
        Some(bounds) => println!(
            "  x: {:.4} .. {:.4}\n  y: {:.4} .. {:.4}",
            bounds.min().x,
            bounds.max().x,
            bounds.min().y,
            bounds.max().y
        ),
        None => println!("  (empty)"),
    }

    Ok(())
}
