//! Configuration management for passport-maps.
//!
//! Every path, year bound and visual constant used by the pipeline lives in
//! [`Config`]. Values are resolved with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. JSON config file
//! 3. Default values (lowest priority)
//!
//! Running the binary with no arguments uses the defaults, which reproduce the
//! fixed layout `./data/`, `./passport.csv` and `./images/`.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::colormaps::{get_colormap, Rgb};
use crate::error::{MapError, Result};
use crate::geometry::{AlbersParams, InsetTransform};

/// Command-line arguments for passport-maps
#[derive(Parser, Debug)]
#[command(name = "passport-maps")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the state boundary shapefile
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// CSV with one row per state and one column per year
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Directory the yearly PNGs are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Create `output_dir` when it does not exist instead of failing
    #[serde(default)]
    pub create_output_dir: bool,
}

/// Inclusive range of year columns to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearsConfig {
    pub start: i32,
    pub end: i32,
}

impl YearsConfig {
    /// Year column names in render order
    pub fn columns(&self) -> Vec<String> {
        (self.start..=self.end).map(|year| year.to_string()).collect()
    }
}

/// Territory filtering, projection and inset placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// STATEFP codes dropped on load (PR, MP, AS, GU, VI)
    #[serde(default = "default_excluded_fips")]
    pub excluded_fips: Vec<String>,

    /// Equal-area projection applied to every geometry
    #[serde(default)]
    pub projection: AlbersParams,

    #[serde(default = "InsetTransform::alaska")]
    pub alaska: InsetTransform,

    #[serde(default = "InsetTransform::hawaii")]
    pub hawaii: InsetTransform,
}

/// Vertical anchor of an annotation relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    /// Position is the baseline of the first line
    Baseline,
    /// Position is the top of the text block
    Top,
}

/// A text annotation placed in axes-fraction coordinates.
///
/// `{year}` inside `text` is replaced with the year being rendered; `\n`
/// starts a new line. Text is always centered horizontally on `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size_pt: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default = "default_anchor")]
    pub anchor: VerticalAnchor,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
}

impl Annotation {
    fn new(text: &str, x: f64, y: f64, size_pt: f32) -> Self {
        Self {
            text: text.to_string(),
            x,
            y,
            size_pt,
            bold: false,
            anchor: VerticalAnchor::Baseline,
            line_spacing: default_line_spacing(),
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Text with the `{year}` placeholder filled in
    pub fn text_for(&self, year: &str) -> String {
        self.text.replace("{year}", year)
    }
}

/// One legend row: a swatch and its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

/// Legend drawn in the lower-right corner of the axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendConfig {
    pub entries: Vec<LegendEntry>,
    pub size_pt: f32,
}

/// Axes box in figure fractions, before aspect fitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxesFractions {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Visual constants for the rendered figures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background_color: String,
    pub text_color: String,
    pub edge_color: String,
    /// Alpha of the edge color in the fill pass (0x55 by default)
    pub edge_alpha: u8,
    /// Fill for states with no value in the rendered year
    pub missing_color: String,
    pub width: u32,
    pub height: u32,
    pub dpi: f32,
    pub axes: AxesFractions,
    /// Padding around the data extent, as a fraction of each span
    pub margin: f64,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub annotations: Vec<Annotation>,
    pub legend: LegendConfig,
}

/// Which colormap to use and its saturation point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColormapConfig {
    #[serde(default = "default_colormap")]
    pub name: String,

    /// Magnitude at which colors reach full saturation
    #[serde(default = "default_saturation_limit")]
    pub saturation_limit: f64,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub years: YearsConfig,

    #[serde(default)]
    pub geometry: GeometryConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub colormap: ColormapConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        let args = Args::parse();

        let mut config = match &args.config {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => Config::default(),
        };

        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file; absent fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.years.start > self.years.end {
            return Err(MapError::Config {
                message: format!(
                    "Year range is empty: start {} is after end {}",
                    self.years.start, self.years.end
                ),
            });
        }

        if self.style.width == 0 || self.style.height == 0 {
            return Err(MapError::Config {
                message: "Figure width and height must be non-zero".to_string(),
            });
        }

        if !(self.style.dpi > 0.0) {
            return Err(MapError::Config {
                message: format!("Figure dpi must be positive, got {}", self.style.dpi),
            });
        }

        let axes = &self.style.axes;
        if !(0.0..=1.0).contains(&axes.left)
            || !(0.0..=1.0).contains(&axes.right)
            || !(0.0..=1.0).contains(&axes.bottom)
            || !(0.0..=1.0).contains(&axes.top)
            || axes.left >= axes.right
            || axes.bottom >= axes.top
        {
            return Err(MapError::Config {
                message: format!("Invalid axes box: {:?}", axes),
            });
        }

        for inset in [&self.geometry.alaska, &self.geometry.hawaii] {
            if !(inset.scale > 0.0) {
                return Err(MapError::Config {
                    message: format!(
                        "Inset scale for STATEFP {} must be positive, got {}",
                        inset.statefp, inset.scale
                    ),
                });
            }
        }

        let colors: [&String; 4] = [
            &self.style.background_color,
            &self.style.text_color,
            &self.style.edge_color,
            &self.style.missing_color,
        ];
        for color in colors
            .into_iter()
            .chain(self.style.legend.entries.iter().map(|entry| &entry.color))
        {
            Rgb::from_hex(color)?;
        }

        if !(self.colormap.saturation_limit > 0.0) {
            return Err(MapError::Config {
                message: format!(
                    "Colormap saturation limit must be positive, got {}",
                    self.colormap.saturation_limit
                ),
            });
        }
        get_colormap(&self.colormap.name, self.colormap.saturation_limit)?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(MapError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            years: YearsConfig::default(),
            geometry: GeometryConfig::default(),
            style: StyleConfig::default(),
            colormap: ColormapConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            csv_path: default_csv_path(),
            output_dir: default_output_dir(),
            create_output_dir: false,
        }
    }
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            start: 2014,
            end: 2022,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            excluded_fips: default_excluded_fips(),
            projection: AlbersParams::default(),
            alaska: InsetTransform::alaska(),
            hawaii: InsetTransform::hawaii(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        let caption = Annotation {
            anchor: VerticalAnchor::Top,
            line_spacing: 1.8,
            ..Annotation::new(
                "Change of U.S. citizenship\nrecipients relative to previous year.",
                0.5,
                -0.08,
                18.0,
            )
        };

        Self {
            background_color: "#fafafa".to_string(),
            text_color: "#000000".to_string(),
            edge_color: "#30011E".to_string(),
            edge_alpha: 0x55,
            missing_color: "#d3d3d3".to_string(),
            width: 2000,
            height: 2000,
            dpi: 100.0,
            axes: AxesFractions {
                left: 0.125,
                right: 0.9,
                bottom: 0.11,
                top: 0.88,
            },
            margin: 0.05,
            font_path: None,
            bold_font_path: None,
            annotations: vec![
                Annotation::new("U.S. Passport recipients change", 0.5, 1.1, 16.0),
                Annotation::new("{year}", 0.5, 1.03, 32.0).bold(),
                caption,
                Annotation::new(
                    "Source: https://www.dhs.gov/ohss/topics/immigration/yearbook/2022",
                    0.5,
                    -0.22,
                    16.0,
                )
                .bold(),
            ],
            legend: LegendConfig {
                entries: vec![
                    LegendEntry {
                        color: "#33cc33".to_string(),
                        label: "Positive Change".to_string(),
                    },
                    LegendEntry {
                        color: "#cc3333".to_string(),
                        label: "Negative Change".to_string(),
                    },
                ],
                size_pt: 10.0,
            },
        }
    }
}

impl Default for ColormapConfig {
    fn default() -> Self {
        Self {
            name: default_colormap(),
            saturation_limit: default_saturation_limit(),
        }
    }
}

// Default value functions for serde
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/")
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("./passport.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./images/")
}

fn default_excluded_fips() -> Vec<String> {
    ["72", "69", "60", "66", "78"]
        .iter()
        .map(|fips| fips.to_string())
        .collect()
}

fn default_anchor() -> VerticalAnchor {
    VerticalAnchor::Baseline
}

fn default_line_spacing() -> f32 {
    1.2
}

fn default_colormap() -> String {
    "change".to_string()
}

fn default_saturation_limit() -> f64 {
    100.0
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paths.data_dir, PathBuf::from("./data/"));
        assert_eq!(config.paths.csv_path, PathBuf::from("./passport.csv"));
        assert_eq!(config.paths.output_dir, PathBuf::from("./images/"));
        assert_eq!(config.years.start, 2014);
        assert_eq!(config.years.end, 2022);
        assert_eq!(
            config.geometry.excluded_fips,
            vec!["72", "69", "60", "66", "78"]
        );
        assert_eq!(config.style.edge_color, "#30011E");
        assert_eq!(config.style.edge_alpha, 0x55);
        assert_eq!(config.colormap.name, "change");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_year_columns() {
        let years = YearsConfig::default();
        let columns = years.columns();
        assert_eq!(columns.len(), 9);
        assert_eq!(columns.first().map(String::as_str), Some("2014"));
        assert_eq!(columns.last().map(String::as_str), Some("2022"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "years": { "start": 2020, "end": 2020 }, "paths": { "output_dir": "out" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.years.columns(), vec!["2020".to_string()]);
        assert_eq!(config.paths.output_dir, PathBuf::from("out"));
        assert_eq!(config.paths.data_dir, PathBuf::from("./data/"));
        assert_eq!(config.style.width, 2000);
        assert_eq!(config.geometry.alaska.scale, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_annotation_year_placeholder() {
        let style = StyleConfig::default();
        assert_eq!(style.annotations[1].text_for("2017"), "2017");
        assert!(style.annotations[1].bold);
        assert_eq!(
            style.annotations[0].text_for("2017"),
            "U.S. Passport recipients change"
        );
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.years = YearsConfig {
            start: 2022,
            end: 2014,
        };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.style.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.style.edge_color = "not-a-color".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.geometry.alaska.scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.colormap.name = "unknown".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }
}
