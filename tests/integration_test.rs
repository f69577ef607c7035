//! Integration tests for passport-maps
//!
//! These tests run the full pipeline on synthetic boundaries and CSVs and
//! inspect the written PNGs.

mod common;

use common::assertions::{assert_approx_eq, assert_in_range};
use common::image_utils::{count_dark_pixels, count_pixels, load_rgba, pixel_at};
use common::test_data::{two_states, write_change_csv, write_states_shapefile, TestState};
use geo::{Area, Centroid};
use image::Rgba;
use passport_maps::pipeline::{prepare_dataset, run};
use passport_maps::render::Renderer;
use passport_maps::{Config, MapError};
use std::path::Path;
use tempfile::TempDir;

const LIGHT_GREEN: Rgba<u8> = Rgba([230, 255, 230, 255]);
const LIGHT_RED: Rgba<u8> = Rgba([255, 230, 230, 255]);
const BACKGROUND: Rgba<u8> = Rgba([250, 250, 250, 255]);

/// Lay out `data/`, `passport.csv` and `images/` in a scratch directory
fn setup(states: &[TestState], years: &[&str], rows: &[(&str, Vec<Option<f64>>)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    std::fs::create_dir(dir.path().join("images")).unwrap();
    write_states_shapefile(&dir.path().join("data").join("states.shp"), states).unwrap();
    write_change_csv(&dir.path().join("passport.csv"), years, rows).unwrap();
    dir
}

fn config_for(dir: &Path, start: i32, end: i32) -> Config {
    let mut config = Config::default();
    config.paths.data_dir = dir.join("data");
    config.paths.csv_path = dir.join("passport.csv");
    config.paths.output_dir = dir.join("images");
    config.years.start = start;
    config.years.end = end;
    config.style.width = 800;
    config.style.height = 800;
    config
}

/// Each joined state's centroid in figure pixels, in dataset order
fn centroid_pixels(config: &Config) -> Vec<(f64, f64)> {
    let dataset = prepare_dataset(config).unwrap();
    let renderer = Renderer::new(config, &dataset).unwrap();
    dataset
        .features
        .iter()
        .map(|feature| renderer.frame().to_pixel(feature.geometry.centroid().unwrap().0))
        .collect()
}

#[test]
fn test_two_states_render_distinct_colors() {
    let dir = setup(
        &two_states(),
        &["2020"],
        &[("AA", vec![Some(10.0)]), ("BB", vec![Some(-10.0)])],
    );
    let config = config_for(dir.path(), 2020, 2020);
    config.validate().unwrap();

    let summary = run(&config).unwrap();
    assert_eq!(summary.states, 2);
    assert_eq!(summary.outputs, vec![dir.path().join("images").join("2020.png")]);

    let image = load_rgba(&summary.outputs[0]).unwrap();
    assert_eq!(image.dimensions(), (800, 800));

    let pixels = centroid_pixels(&config);
    assert_eq!(pixel_at(&image, pixels[0].0, pixels[0].1), LIGHT_GREEN);
    assert_eq!(pixel_at(&image, pixels[1].0, pixels[1].1), LIGHT_RED);
    assert_eq!(pixel_at(&image, 1.0, 1.0), BACKGROUND);

    // Both states cover a substantial area of the figure
    assert!(count_pixels(&image, LIGHT_GREEN) > 1000);
    assert!(count_pixels(&image, LIGHT_RED) > 1000);

    // Title and year above the map, caption and source below it
    let dataset = prepare_dataset(&config).unwrap();
    let axes = Renderer::new(&config, &dataset).unwrap().frame().axes();
    assert!(count_dark_pixels(&image, 0.0, axes.top) > 100);
    assert!(count_dark_pixels(&image, axes.bottom(), 800.0) > 100);
}

#[test]
fn test_one_png_per_year() {
    let dir = setup(
        &two_states(),
        &["2019", "2020", "2021"],
        &[
            ("AA", vec![Some(1.0), Some(-50.0), None]),
            ("BB", vec![Some(2.0), Some(150.0), Some(0.0)]),
        ],
    );
    let config = config_for(dir.path(), 2019, 2021);

    let summary = run(&config).unwrap();
    let names: Vec<String> = summary
        .outputs
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["2019.png", "2020.png", "2021.png"]);

    let pixels = centroid_pixels(&config);

    let image = load_rgba(&summary.outputs[1]).unwrap();
    assert_eq!(pixel_at(&image, pixels[0].0, pixels[0].1), Rgba([255, 128, 128, 255]));
    assert_eq!(pixel_at(&image, pixels[1].0, pixels[1].1), Rgba([0, 255, 0, 255]));

    let image = load_rgba(&summary.outputs[2]).unwrap();
    assert_eq!(pixel_at(&image, pixels[0].0, pixels[0].1), Rgba([211, 211, 211, 255]));
    assert_eq!(pixel_at(&image, pixels[1].0, pixels[1].1), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_territories_are_excluded() {
    let mut states = two_states();
    states.push(TestState::new("72", "PR", -67.0, 17.5));
    states.push(TestState::new("66", "GU", 144.0, 13.0));
    let dir = setup(
        &states,
        &["2020"],
        &[
            ("AA", vec![Some(10.0)]),
            ("BB", vec![Some(-10.0)]),
            ("PR", vec![Some(5.0)]),
            ("GU", vec![Some(5.0)]),
        ],
    );
    let config = config_for(dir.path(), 2020, 2020);

    let dataset = prepare_dataset(&config).unwrap();
    assert_eq!(dataset.abbreviations(), vec!["AA", "BB"]);
    assert_eq!(run(&config).unwrap().states, 2);
}

#[test]
fn test_alaska_is_repositioned_as_inset() {
    let mut states = two_states();
    states.push(TestState::new("02", "AK", -150.0, 60.0));
    let dir = setup(
        &states,
        &["2020"],
        &[
            ("AA", vec![Some(10.0)]),
            ("AK", vec![Some(-20.0)]),
            ("BB", vec![Some(-10.0)]),
        ],
    );
    let mut config = config_for(dir.path(), 2020, 2020);

    let moved = prepare_dataset(&config).unwrap();
    config.geometry.alaska.offset_x = 0.0;
    config.geometry.alaska.offset_y = 0.0;
    config.geometry.alaska.scale = 1.0;
    config.geometry.alaska.rotate_deg = 0.0;
    let untouched = prepare_dataset(&config).unwrap();

    // Rows are in GEOID order: 01, 02, 06
    assert_eq!(moved.abbreviations(), vec!["AA", "AK", "BB"]);
    let area_moved = moved.features[1].geometry.unsigned_area();
    let area_untouched = untouched.features[1].geometry.unsigned_area();
    assert_approx_eq(area_moved / area_untouched, 0.25, Some(1e-6));

    // The inset moves south, toward the contiguous states
    let y_moved = moved.features[1].geometry.centroid().unwrap().y();
    let y_untouched = untouched.features[1].geometry.centroid().unwrap().y();
    assert_in_range(y_untouched - y_moved, 4.0e6, 6.0e6);

    // Other states are not affected
    assert_eq!(moved.features[0].geometry, untouched.features[0].geometry);
}

#[test]
fn test_empty_join_renders_empty_map() {
    let dir = setup(&two_states(), &["2020"], &[("ZZ", vec![Some(10.0)])]);
    let config = config_for(dir.path(), 2020, 2020);

    let summary = run(&config).unwrap();
    assert_eq!(summary.states, 0);

    let image = load_rgba(&summary.outputs[0]).unwrap();
    assert_eq!(count_pixels(&image, LIGHT_GREEN), 0);
    assert_eq!(pixel_at(&image, 400.0, 400.0), BACKGROUND);
}

#[test]
fn test_missing_output_dir_is_fatal() {
    let dir = setup(
        &two_states(),
        &["2020"],
        &[("AA", vec![Some(10.0)]), ("BB", vec![Some(-10.0)])],
    );
    let mut config = config_for(dir.path(), 2020, 2020);
    config.paths.output_dir = dir.path().join("missing");

    assert!(matches!(run(&config), Err(MapError::DataNotFound { .. })));
    assert!(!dir.path().join("missing").exists());

    config.paths.create_output_dir = true;
    let summary = run(&config).unwrap();
    assert!(summary.outputs[0].starts_with(dir.path().join("missing")));
    assert!(summary.outputs[0].is_file());
}

#[test]
fn test_missing_year_column_is_fatal() {
    let dir = setup(
        &two_states(),
        &["2020"],
        &[("AA", vec![Some(10.0)]), ("BB", vec![Some(-10.0)])],
    );
    let config = config_for(dir.path(), 2020, 2021);

    assert!(matches!(run(&config), Err(MapError::DataNotFound { .. })));
    assert!(!dir.path().join("images").join("2020.png").exists());
}

#[test]
fn test_missing_csv_is_fatal() {
    let dir = setup(&two_states(), &["2020"], &[]);
    std::fs::remove_file(dir.path().join("passport.csv")).unwrap();
    let config = config_for(dir.path(), 2020, 2020);

    assert!(matches!(run(&config), Err(MapError::Io(_))));
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = setup(
        &two_states(),
        &["2020"],
        &[("AA", vec![Some(10.0)]), ("BB", vec![Some(-10.0)])],
    );
    let json = serde_json::json!({
        "paths": {
            "data_dir": dir.path().join("data"),
            "csv_path": dir.path().join("passport.csv"),
            "output_dir": dir.path().join("images"),
        },
        "years": { "start": 2020, "end": 2020 },
        "style": { "width": 400, "height": 300, "background_color": "#ffffff" },
    });
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, json.to_string()).unwrap();

    let config = Config::load_from_file(&config_path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.style.edge_color, "#30011E");
    assert_eq!(config.colormap.saturation_limit, 100.0);

    let summary = run(&config).unwrap();
    let image = load_rgba(&summary.outputs[0]).unwrap();
    assert_eq!(image.dimensions(), (400, 300));
    assert_eq!(pixel_at(&image, 0.0, 0.0), Rgba([255, 255, 255, 255]));
}
