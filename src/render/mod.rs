//! Choropleth rendering of one year of the merged dataset.
//!
//! Each figure is drawn in a fixed order: background, state fills with a
//! translucent edge, an opaque edge pass over every state, the text
//! annotations and finally the legend.

pub mod annotate;
pub mod frame;
pub mod raster;

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

pub use annotate::{draw_annotation, draw_legend, points_to_pixels, Fonts};
pub use frame::{features_bounds, MapFrame, PixelRect};
pub use raster::{fill_multipolygon, fill_rings, stroke_multipolygon};

use crate::colormaps::{get_colormap, Colormap, Rgb};
use crate::config::{Config, StyleConfig};
use crate::error::{MapError, Result};
use crate::state::MergedDataset;

/// Draws and saves the yearly maps for one dataset
pub struct Renderer {
    style: StyleConfig,
    colormap: Box<dyn Colormap>,
    fonts: Fonts,
    frame: MapFrame,
    background: Rgb,
    text_color: Rgba<u8>,
    edge_color: Rgba<u8>,
    missing_color: Rgb,
    output_dir: PathBuf,
}

impl Renderer {
    /// Prepare colors, fonts and the map frame for `dataset`.
    ///
    /// The frame is fitted once so every year shares the same layout.
    pub fn new(config: &Config, dataset: &MergedDataset) -> Result<Self> {
        let style = config.style.clone();
        if style.width == 0 || style.height == 0 {
            return Err(MapError::Render {
                message: format!("Cannot draw a {}x{} figure", style.width, style.height),
            });
        }
        let fonts = Fonts::load(&style)?;
        let colormap = get_colormap(&config.colormap.name, config.colormap.saturation_limit)?;
        let frame = MapFrame::fit(features_bounds(&dataset.features), &style);

        debug!(
            axes = ?frame.axes(),
            scale = frame.scale(),
            "Fitted map frame"
        );

        Ok(Self {
            background: Rgb::from_hex(&style.background_color)?,
            text_color: Rgb::from_hex(&style.text_color)?.to_rgba(255),
            edge_color: Rgb::from_hex(&style.edge_color)?.to_rgba(255),
            missing_color: Rgb::from_hex(&style.missing_color)?,
            output_dir: config.paths.output_dir.clone(),
            style,
            colormap,
            fonts,
            frame,
        })
    }

    pub fn frame(&self) -> &MapFrame {
        &self.frame
    }

    /// Location of the PNG for `year`
    pub fn output_path(&self, year: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", year))
    }

    /// Draw the figure for one year column
    pub fn draw_year(&self, dataset: &MergedDataset, year: &str) -> Result<RgbaImage> {
        let values = dataset.column_checked(year)?;
        if values.len() != dataset.features.len() {
            return Err(MapError::InvalidData {
                message: format!(
                    "Column {} has {} values for {} features",
                    year,
                    values.len(),
                    dataset.features.len()
                ),
            });
        }
        let colors = self.colormap.map_column(values, self.missing_color);

        let mut image =
            RgbaImage::from_pixel(self.style.width, self.style.height, self.background.to_rgba(255));

        let edge_opacity = self.style.edge_alpha as f32 / 255.0;
        for (feature, color) in dataset.features.iter().zip(&colors) {
            fill_multipolygon(&mut image, &self.frame, &feature.geometry, color.to_rgba(255));
            stroke_multipolygon(
                &mut image,
                &self.frame,
                &feature.geometry,
                self.edge_color,
                edge_opacity,
            );
        }

        // Opaque boundaries over every state
        for feature in &dataset.features {
            stroke_multipolygon(&mut image, &self.frame, &feature.geometry, self.edge_color, 1.0);
        }

        for annotation in &self.style.annotations {
            draw_annotation(
                &mut image,
                &self.frame,
                &self.fonts,
                annotation,
                year,
                self.text_color,
                self.style.dpi,
            );
        }

        draw_legend(
            &mut image,
            &self.frame,
            &self.fonts,
            &self.style.legend,
            self.background,
            self.text_color,
            self.style.dpi,
        )?;

        Ok(image)
    }

    /// Draw one year and write it to `<output_dir>/<year>.png`
    pub fn render_year(&self, dataset: &MergedDataset, year: &str) -> Result<PathBuf> {
        let image = self.draw_year(dataset, year)?;
        let path = self.output_path(year);
        save_png(&image, &path)?;
        Ok(path)
    }
}

fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
