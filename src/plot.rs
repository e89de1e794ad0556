use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{DepthPlotError, Result};

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

/// Output image format. PDF is accepted by name for compatibility but has
/// no rendering backend and is rejected at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
    Jpg,
    Pdf,
}

impl ImageFormat {
    pub fn from_name(name: &str) -> Option<ImageFormat> {
        match name.to_ascii_lowercase().as_str() {
            "svg" => Some(ImageFormat::Svg),
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpg),
            "pdf" => Some(ImageFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// Panel model
// ---------------------------------------------------------------------------

/// The panels a depth plot can carry, left to right. An explicit list
/// rather than a panel count: optional panels are present or absent by
/// kind, never inferred from how many panels happen to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Eigenvalues,
    AnisotropyDegree,
    MinorAxisInclination,
    MajorAxisDeclination,
    BulkSusceptibility,
}

/// Marker shape for a scatter series.
#[derive(Debug, Clone, Copy)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
}

/// One scatter series: `(x, depth)` points with a marker and colour.
#[derive(Debug, Clone)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
    pub marker: Marker,
    pub color: RGBColor,
}

/// One plot column.
#[derive(Debug, Clone)]
pub struct Panel {
    pub kind: PanelKind,
    pub x_label: String,
    pub x_range: (f64, f64),
    pub series: Vec<Series>,
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// An owned, backend-independent description of the assembled figure.
/// Nothing global: every call to the plot builder produces a fresh value,
/// rendered on demand into whichever backend the caller picks.
#[derive(Debug, Clone)]
pub struct DepthPlotFigure {
    pub location: String,
    pub y_label: String,
    /// `(top, bottom)` of the inverted depth axis, i.e. `(dmin, dmax)`.
    pub depth_range: (f64, f64),
    /// Reference horizon depths drawn as dotted guides on every panel.
    pub summary_depths: Vec<f64>,
    pub panels: Vec<Panel>,
    /// Small stamp drawn in the bottom-left corner.
    pub footer: String,
    pub width: u32,
    pub height: u32,
}

impl DepthPlotFigure {
    pub fn has_panel(&self, kind: PanelKind) -> bool {
        self.panels.iter().any(|p| p.kind == kind)
    }

    /// Render into an SVG document held in memory.
    pub fn render_svg(&self) -> Result<String> {
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (self.width, self.height))
                .into_drawing_area();
            self.render(&root)?;
            root.present()
                .map_err(|e| DepthPlotError::Render(e.to_string()))?;
        }
        Ok(buf)
    }

    /// Render straight to a file, picking the backend from the format.
    pub fn save(&self, path: &Path, fmt: ImageFormat) -> Result<()> {
        match fmt {
            ImageFormat::Svg => {
                let root =
                    SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
                self.render(&root)?;
                root.present()
                    .map_err(|e| DepthPlotError::Render(e.to_string()))
            }
            ImageFormat::Png | ImageFormat::Jpg => {
                let root =
                    BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
                self.render(&root)?;
                root.present()
                    .map_err(|e| DepthPlotError::Render(e.to_string()))
            }
            ImageFormat::Pdf => Err(DepthPlotError::UnsupportedFormat("pdf".into())),
        }
    }

    /// Draw all panels side by side on the given drawing area.
    pub fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let err = |e: DrawingAreaErrorKind<DB::ErrorType>| DepthPlotError::Render(e.to_string());

        root.fill(&WHITE).map_err(err)?;
        let columns = root.split_evenly((1, self.panels.len().max(1)));

        let (dmin, dmax) = self.depth_range;
        for (idx, (panel, area)) in self.panels.iter().zip(columns.iter()).enumerate() {
            let first = idx == 0;
            let (x_lo, x_hi) = pad_degenerate(panel.x_range);

            let mut chart = ChartBuilder::on(area)
                .margin(8)
                .x_label_area_size(42)
                .y_label_area_size(if first { 52 } else { 12 })
                .caption(
                    if idx == 1 { self.location.as_str() } else { "" },
                    ("sans-serif", 18),
                )
                // Depth axis inverted: origin at the top.
                .build_cartesian_2d(x_lo..x_hi, dmax..dmin)
                .map_err(err)?;

            {
                let mut mesh = chart.configure_mesh();
                mesh.disable_x_mesh()
                    .disable_y_mesh()
                    // Kept sparse so adjacent panels do not collide.
                    .x_labels(4)
                    .x_desc(&panel.x_label)
                    .label_style(("sans-serif", 13));
                if first {
                    mesh.y_desc(&self.y_label);
                } else {
                    mesh.y_labels(0);
                }
                mesh.draw().map_err(err)?;
            }

            for series in &panel.series {
                draw_series(&mut chart, series).map_err(err)?;
            }

            for &depth in &self.summary_depths {
                chart
                    .draw_series(DashedLineSeries::new(
                        [(x_lo, depth), (x_hi, depth)],
                        2,
                        4,
                        BLUE.stroke_width(1),
                    ))
                    .map_err(err)?;
            }
        }

        root.draw(&Text::new(
            self.footer.clone(),
            (8, self.height as i32 - 16),
            ("sans-serif", 11).into_font().color(&BLACK.mix(0.6)),
        ))
        .map_err(err)?;

        Ok(())
    }
}

/// Widen a zero-width x-range so the coordinate mapping stays well-defined.
fn pad_degenerate((lo, hi): (f64, f64)) -> (f64, f64) {
    if (hi - lo).abs() < 1e-12 {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn draw_series<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    series: &Series,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let style = series.color.filled();
    match series.marker {
        Marker::Circle => {
            chart.draw_series(
                series
                    .points
                    .iter()
                    .map(|&(x, d)| Circle::new((x, d), 3, style)),
            )?;
        }
        Marker::Triangle => {
            chart.draw_series(
                series
                    .points
                    .iter()
                    .map(|&(x, d)| TriangleMarker::new((x, d), 4, style)),
            )?;
        }
        Marker::Square => {
            chart.draw_series(series.points.iter().map(|&(x, d)| {
                EmptyElement::at((x, d)) + Rectangle::new([(-3, -3), (3, 3)], style)
            }))?;
        }
    }
    Ok(())
}
