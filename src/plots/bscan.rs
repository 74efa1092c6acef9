use anyhow::{anyhow, Result};
use itertools::Itertools;
use log::debug;
use plotly::color::{Rgb, Rgba};
use plotly::common::{DashType, Line, Marker, Mode};
use plotly::traces::image::ColorModel;
use plotly::{Image, Plot, Scatter};

use super::{
    area_overlay_pixels, clipped_curve, grayscale_pixels, RenderOptions,
};
use crate::config::{self, LineStyle};
use crate::data_structs::bscan::BscanView;
use crate::utils::Color;

fn to_rgb(color: Color) -> Rgb { Rgb::new(color.r, color.g, color.b) }

fn pixel_rows(pixels: Vec<Vec<Color>>) -> Vec<Vec<Rgba>> {
    pixels
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|c| Rgba::new(c.r, c.g, c.b, c.a))
                .collect()
        })
        .collect()
}

fn dash_type(style: LineStyle) -> DashType {
    match style {
        LineStyle::Solid => DashType::Solid,
        LineStyle::Dash => DashType::Dash,
        LineStyle::Dot => DashType::Dot,
        LineStyle::DashDot => DashType::DashDot,
    }
}

impl<'a> BscanView<'a> {
    /// Draw this B-scan onto `plot`, cropped to the requested region,
    /// with the selected layer and area annotations overlaid.
    ///
    /// Area masks become translucent RGBA images over the scan, layer
    /// boundaries become line traces clipped to the region. Every drawn
    /// annotation contributes a named trace, so plotly's legend lists
    /// them as-is.
    pub fn render(
        &self,
        plot: &mut Plot,
        options: &RenderOptions,
    ) -> Result<()> {
        let region = options.region.resolve(self.shape());
        let layer_names =
            options.layers.resolve(self.volume().layers().keys());
        let area_names =
            options.areas.resolve(self.volume().volume_maps().keys());
        let (line_width, line_style) = options.layer_style.merged();
        let area_alpha = options.area_style.merged();

        debug!(
            "rendering bscan {} ({} layers, {} areas, region {:?})",
            self.index(),
            layer_names.len(),
            area_names.len(),
            region
        );

        if !options.annotations_only {
            let pixels = grayscale_pixels(self.data(), region);
            plot.add_trace(
                Image::new(pixel_rows(pixels)).color_model(ColorModel::RGBA),
            );
        }

        for name in &area_names {
            let annotation = self
                .volume()
                .volume_maps()
                .get(name)
                .ok_or_else(|| anyhow!("unknown volume map: {}", name))?;
            let color = annotation.display_color()?;
            let mask = self.area_map(name)?;

            // Zero-size marker so the area gets a legend entry without
            // visible geometry.
            plot.add_trace(
                Scatter::new(vec![0.0], vec![0.0])
                    .mode(Mode::Markers)
                    .marker(Marker::new().size(0).color(to_rgb(color)))
                    .name(name),
            );

            let pixels =
                area_overlay_pixels(mask.view(), region, color, area_alpha);
            plot.add_trace(
                Image::new(pixel_rows(pixels)).color_model(ColorModel::RGBA),
            );
        }

        for name in &layer_names {
            let color = config::layer_color(name);
            let layer = self.layer(name)?;
            let curve = clipped_curve(layer.data(), region);
            let columns = (0..curve.len()).map(|c| c as f64).collect_vec();

            plot.add_trace(
                Scatter::new(columns, curve)
                    .mode(Mode::Lines)
                    .line(
                        Line::new()
                            .color(to_rgb(color))
                            .width(line_width)
                            .dash(dash_type(line_style)),
                    )
                    .name(name),
            );
        }

        Ok(())
    }
}
