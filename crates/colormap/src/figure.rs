//! Side-by-side figures: one color-mapped panel per raster, each with a
//! title and a vertical colorbar legend.
//!
//! Output is a standalone SVG document; panel pixels are embedded as
//! base64 PNG so the file opens in any browser without companions.

use crate::error::{RenderError, Result};
use crate::render::{colorbar_rgba, png_bytes, raster_to_rgba, rgba_image, ColormapParams};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Write as _;
use std::path::Path;
use verdant_core::raster::{Raster, RasterElement};

const PANEL_WIDTH: f64 = 320.0;
const MARGIN: f64 = 24.0;
const TITLE_HEIGHT: f64 = 28.0;
const BAR_GAP: f64 = 10.0;
const BAR_WIDTH: f64 = 16.0;
const LEGEND_WIDTH: f64 = 72.0;
const BAR_RESOLUTION: u32 = 256;

/// One rendered raster with its legend
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub colorbar_label: String,
    params: ColormapParams,
    rows: usize,
    cols: usize,
    png: Vec<u8>,
}

impl Panel {
    /// Render `raster` with `params` into a panel.
    pub fn new<T: RasterElement>(
        title: impl Into<String>,
        raster: &Raster<T>,
        params: ColormapParams,
        colorbar_label: impl Into<String>,
    ) -> Result<Self> {
        let (rows, cols) = raster.shape();
        if rows == 0 || cols == 0 {
            return Err(RenderError::EmptyRaster { rows, cols });
        }
        let image = rgba_image(cols as u32, rows as u32, raster_to_rgba(raster, &params))?;
        Ok(Self {
            title: title.into(),
            colorbar_label: colorbar_label.into(),
            png: png_bytes(&image)?,
            params,
            rows,
            cols,
        })
    }

    /// Drawn size of the raster area, width fixed and aspect preserved
    fn image_size(&self) -> (f64, f64) {
        let height = PANEL_WIDTH * self.rows as f64 / self.cols as f64;
        (PANEL_WIDTH, height)
    }

    fn total_width() -> f64 {
        PANEL_WIDTH + BAR_GAP + BAR_WIDTH + LEGEND_WIDTH
    }
}

/// A row of panels
#[derive(Debug, Clone, Default)]
pub struct Figure {
    panels: Vec<Panel>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.push(panel);
        self
    }

    /// Overall (width, height) of the document in pixels
    pub fn size(&self) -> (f64, f64) {
        let n = self.panels.len() as f64;
        let width = MARGIN + n * (Panel::total_width() + MARGIN);
        let tallest = self
            .panels
            .iter()
            .map(|p| p.image_size().1)
            .fold(0.0, f64::max);
        (width, TITLE_HEIGHT + tallest + 2.0 * MARGIN)
    }

    /// Render the figure as an SVG document
    pub fn to_svg(&self) -> Result<String> {
        if self.panels.is_empty() {
            return Err(RenderError::EmptyFigure);
        }

        let (width, height) = self.size();
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif">"#,
            w = width,
            h = height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        for (i, panel) in self.panels.iter().enumerate() {
            let x = MARGIN + i as f64 * (Panel::total_width() + MARGIN);
            self.write_panel(&mut svg, panel, x)?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    fn write_panel(&self, svg: &mut String, panel: &Panel, x: f64) -> Result<()> {
        let (img_w, img_h) = panel.image_size();
        let top = MARGIN + TITLE_HEIGHT;

        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="15" text-anchor="middle">{}</text>"#,
            x + img_w / 2.0,
            MARGIN + TITLE_HEIGHT / 2.0,
            escape(&panel.title)
        );
        let _ = writeln!(
            svg,
            r#"<image x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" preserveAspectRatio="none" style="image-rendering:pixelated" href="data:image/png;base64,{}"/>"#,
            x,
            top,
            img_w,
            img_h,
            STANDARD.encode(&panel.png)
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black" stroke-width="0.8"/>"#,
            x, top, img_w, img_h
        );

        let bar = rgba_image(
            1,
            BAR_RESOLUTION,
            colorbar_rgba(&panel.params, 1, BAR_RESOLUTION),
        )?;
        let bar_x = x + img_w + BAR_GAP;
        let _ = writeln!(
            svg,
            r#"<image x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" preserveAspectRatio="none" href="data:image/png;base64,{}"/>"#,
            bar_x,
            top,
            BAR_WIDTH,
            img_h,
            STANDARD.encode(png_bytes(&bar)?)
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black" stroke-width="0.8"/>"#,
            bar_x, top, BAR_WIDTH, img_h
        );

        let params = &panel.params;
        let ticks = [
            (params.max, top),
            ((params.min + params.max) / 2.0, top + img_h / 2.0),
            (params.min, top + img_h),
        ];
        for (value, y) in ticks {
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="11" dominant-baseline="middle">{}</text>"#,
                bar_x + BAR_WIDTH + 4.0,
                y,
                format_tick(value)
            );
        }

        let label_x = bar_x + BAR_WIDTH + LEGEND_WIDTH - 10.0;
        let label_y = top + img_h / 2.0;
        let _ = writeln!(
            svg,
            r#"<text x="{lx:.1}" y="{ly:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 {lx:.1} {ly:.1})">{label}</text>"#,
            lx = label_x,
            ly = label_y,
            label = escape(&panel.colorbar_label)
        );
        Ok(())
    }

    /// Write the SVG document to a file
    pub fn write_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_svg()?)?;
        Ok(())
    }
}

fn format_tick(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::ColorScheme;

    fn ndvi_panel() -> Panel {
        let ndvi = Raster::from_vec(vec![-0.5, 0.0, 0.5, f64::NAN], 2, 2).unwrap();
        Panel::new("NDVI Image", &ndvi, ColormapParams::ndvi(), "NDVI Value").unwrap()
    }

    #[test]
    fn panels_are_laid_out_side_by_side() {
        let mask = Raster::from_vec(vec![1u8, 0, 0, 1], 2, 2).unwrap();
        let figure = Figure::new().with_panel(ndvi_panel()).with_panel(
            Panel::new(
                "Water Body Mask",
                &mask,
                ColormapParams::mask(ColorScheme::Blues),
                "Water Probability",
            )
            .unwrap(),
        );

        let svg = figure.to_svg().unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("NDVI Image"));
        assert!(svg.contains("Water Body Mask"));
        assert!(svg.contains("Water Probability"));
        // two rasters plus two colorbars
        assert_eq!(svg.matches("data:image/png;base64,").count(), 4);

        let (one_w, _) = Figure::new().with_panel(ndvi_panel()).size();
        let (two_w, _) = figure.size();
        assert!(two_w > one_w * 1.5);
    }

    #[test]
    fn colorbar_ticks_show_range() {
        let svg = Figure::new().with_panel(ndvi_panel()).to_svg().unwrap();
        assert!(svg.contains(">1</text>"));
        assert!(svg.contains(">0</text>"));
        assert!(svg.contains(">-1</text>"));
    }

    #[test]
    fn titles_are_escaped() {
        let ndvi = Raster::<f64>::filled(1, 1, 0.0);
        let panel = Panel::new("a < b & c", &ndvi, ColormapParams::ndvi(), "x").unwrap();
        let svg = Figure::new().with_panel(panel).to_svg().unwrap();
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn empty_figure_is_an_error() {
        assert!(matches!(Figure::new().to_svg(), Err(RenderError::EmptyFigure)));
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(1.0), "1");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(0.5), "0.5");
    }
}
