use std::path::{Path, PathBuf};

use plotters::style::colors::{BLACK, BLUE, RED};

use crate::data::loader::{load_summary_depths, load_table, resolve_file_name};
use crate::data::merge::{
    bulk_susceptibility, filter_depths, join_specimen_depths, propagate_core_depth,
    propagate_location_to_specimens, uppercase_sample_names,
};
use crate::data::model::{cell, Contribution, DepthScale, TableType};
use crate::error::{DepthPlotError, Result};
use crate::plot::{DepthPlotFigure, ImageFormat, Marker, Panel, PanelKind, Series};
use crate::tensor::{dohext, parse_aniso_s};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration surface of the depth-plot builder. Relative file names are
/// resolved against `dir_path`.
#[derive(Debug, Clone)]
pub struct DepthPlotOptions {
    pub spec_file: String,
    pub samp_file: String,
    pub meas_file: String,
    pub site_file: String,
    /// Optional ages file. A valid one takes precedence over the samples
    /// file and forces the age depth scale.
    pub age_file: Option<String>,
    /// Optional core-summary CSV with reference horizon depths.
    pub sum_file: Option<String>,
    pub fmt: ImageFormat,
    /// Depth bounds. The two bounds act as independent one-sided filters
    /// (see [`filter_depths`]); an unset bound behaves as the legacy `-1`.
    pub dmin: Option<f64>,
    pub dmax: Option<f64>,
    pub depth_scale: DepthScale,
    pub dir_path: PathBuf,
}

impl Default for DepthPlotOptions {
    fn default() -> Self {
        Self {
            spec_file: "specimens.txt".into(),
            samp_file: "samples.txt".into(),
            meas_file: "measurements.txt".into(),
            site_file: "sites.txt".into(),
            age_file: None,
            sum_file: None,
            fmt: ImageFormat::default(),
            dmin: None,
            dmax: None,
            depth_scale: DepthScale::default(),
            dir_path: PathBuf::from("."),
        }
    }
}

/// A successfully assembled depth plot: the owned figure plus the file
/// name(s) it should be saved under.
#[derive(Debug, Clone)]
pub struct DepthPlot {
    pub figure: DepthPlotFigure,
    pub file_names: Vec<String>,
    pub fmt: ImageFormat,
}

impl DepthPlot {
    /// Write the figure to `dir/<file name>` and return the full path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_names[0]);
        self.figure.save(&path, self.fmt)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Build an anisotropy depth plot from MagIC files on disk.
///
/// Requires specimens and sites tables, and either samples or ages. The
/// measurements table is optional and adds a bulk-susceptibility panel;
/// the summary file is optional and adds horizon guide lines.
pub fn ani_depthplot(options: &DepthPlotOptions) -> Result<DepthPlot> {
    let dir = &options.dir_path;
    let mut depth_scale = options.depth_scale;

    // An unreadable age file demotes to a warning, not a failure.
    let age_path = match &options.age_file {
        Some(name) => {
            let path = resolve_file_name(name, dir);
            if path.is_file() {
                log::warn!("ages file provided; it takes precedence over samples");
                depth_scale = DepthScale::Age;
                Some(path)
            } else {
                log::warn!("invalid age file; attempting to use sample file instead");
                depth_scale = DepthScale::CoreDepth;
                None
            }
        }
        None => None,
    };

    let mut con = Contribution::new();
    let named = [
        (TableType::Measurements, options.meas_file.as_str()),
        (TableType::Specimens, options.spec_file.as_str()),
        (TableType::Samples, options.samp_file.as_str()),
        (TableType::Sites, options.site_file.as_str()),
    ];
    for (dtype, name) in named {
        let path = resolve_file_name(name, dir);
        if path.is_file() {
            con.insert(dtype, load_table(&path, dtype)?);
        }
    }
    if let Some(path) = &age_path {
        con.insert(TableType::Ages, load_table(path, TableType::Ages)?);
    }

    let summary_depths = match &options.sum_file {
        Some(name) => load_summary_depths(&resolve_file_name(name, dir))?,
        None => Vec::new(),
    };

    let mut effective = options.clone();
    effective.depth_scale = depth_scale;
    ani_depthplot_from(con, &summary_depths, &effective)
}

/// Build the plot from a pre-assembled [`Contribution`], bypassing file I/O.
pub fn ani_depthplot_from(
    mut con: Contribution,
    summary_depths: &[f64],
    options: &DepthPlotOptions,
) -> Result<DepthPlot> {
    let mut depth_scale = options.depth_scale;

    for dtype in [TableType::Specimens, TableType::Samples, TableType::Sites] {
        if !con.has(dtype) {
            if dtype == TableType::Samples && con.has(TableType::Ages) {
                depth_scale = DepthScale::Age;
                continue;
            }
            log::warn!("this function requires a {dtype} file to run");
            return Err(DepthPlotError::MissingTable(dtype));
        }
    }

    propagate_core_depth(&mut con);
    propagate_location_to_specimens(&mut con);

    let use_ages = depth_scale == DepthScale::Age && con.has(TableType::Ages);
    let depth_table = if use_ages {
        con.get(TableType::Ages)
    } else {
        con.get(TableType::Samples)
    }
    .ok_or(DepthPlotError::MissingTable(TableType::Samples))?;

    let age_unit = con
        .get(TableType::Ages)
        .and_then(|t| t.first_value("age_unit"))
        .map(|v| v.to_string())
        .unwrap_or_else(|| "Ma".to_string());

    let specimens = con
        .get(TableType::Specimens)
        .ok_or(DepthPlotError::MissingTable(TableType::Specimens))?;

    let merged = join_specimen_depths(specimens, depth_table, depth_scale);
    let mut records = filter_depths(merged, depth_scale, options.dmin, options.dmax);
    uppercase_sample_names(&mut records);

    if records.is_empty() {
        return Err(DepthPlotError::NoData);
    }

    let (bulks, bulk_depths) = match con.get(TableType::Measurements) {
        Some(meas) if !meas.is_empty() => bulk_susceptibility(meas, &records),
        _ => (Vec::new(), Vec::new()),
    };

    // Plot title: first record's location, then the sites table, then
    // "unknown".
    let location = {
        let first = cell(&records[0], "location");
        if first.is_null() {
            con.get(TableType::Sites)
                .and_then(|t| t.first_value("location"))
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            first.to_string()
        }
    };

    // Per-specimen Hext statistics; rows with a null tensor are skipped.
    let mut depths = Vec::new();
    let mut tau1 = Vec::new();
    let mut tau2 = Vec::new();
    let mut tau3 = Vec::new();
    let mut v3_incs = Vec::new();
    let mut v1_decs = Vec::new();
    let mut p_values = Vec::new();
    for row in &records {
        let aniso = cell(row, "aniso_s");
        if aniso.is_null() {
            continue;
        }
        let specimen = cell(row, "specimen").to_string();
        let s = parse_aniso_s(&specimen, &aniso.to_string())?;
        let nmeas = cell(row, "aniso_s_n_measurements").as_i64().unwrap_or(0);
        let sigma = cell(row, "aniso_s_sigma").as_f64().unwrap_or(0.0);
        let Some(depth) = cell(row, "core_depth").as_f64() else {
            continue;
        };

        let stats = dohext(nmeas - 6, sigma, &s);
        depths.push(depth);
        tau1.push(stats.t1);
        tau2.push(stats.t2);
        tau3.push(stats.t3);
        v3_incs.push(stats.v3_inc);
        v1_decs.push(stats.v1_dec);
        p_values.push(stats.p());
    }

    if depths.is_empty() {
        return Err(DepthPlotError::NoData);
    }

    // Depth-axis bounds: data min/max unless an explicit dmax was supplied
    // (legacy sentinel semantics: only an unset dmax triggers recomputation
    // of both bounds).
    let (dmin, dmax) = match options.dmax {
        None => (
            depths.iter().cloned().fold(f64::INFINITY, f64::min),
            depths.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        ),
        Some(dmax) => (options.dmin.unwrap_or(-1.0), dmax),
    };

    // Eigenvalue x-range: clamp so a minimum spread stays visible.
    let mut tau_min = 1.0;
    for &t in &tau3 {
        if t > 0.0 && t < tau_min {
            tau_min = t;
        }
    }
    let mut tau_max = tau1.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if tau_min > 0.3 {
        tau_min = 0.3;
    }
    if tau_max < 0.36 {
        tau_max = 0.36;
    }

    let p_min = p_values.iter().cloned().fold(f64::INFINITY, f64::min);
    let p_max = p_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let pair = |xs: &[f64]| -> Vec<(f64, f64)> {
        xs.iter().cloned().zip(depths.iter().cloned()).collect()
    };

    let mut panels = vec![
        Panel {
            kind: PanelKind::Eigenvalues,
            x_label: "Eigenvalues".into(),
            x_range: (tau_min, tau_max),
            series: vec![
                Series {
                    points: pair(&tau1),
                    marker: Marker::Square,
                    color: RED,
                },
                Series {
                    points: pair(&tau2),
                    marker: Marker::Triangle,
                    color: BLUE,
                },
                Series {
                    points: pair(&tau3),
                    marker: Marker::Circle,
                    color: BLACK,
                },
            ],
        },
        Panel {
            kind: PanelKind::AnisotropyDegree,
            x_label: "P".into(),
            x_range: (p_min, p_max),
            series: vec![Series {
                points: pair(&p_values),
                marker: Marker::Square,
                color: RED,
            }],
        },
        Panel {
            kind: PanelKind::MinorAxisInclination,
            x_label: "V3 Inclination".into(),
            x_range: (0.0, 90.0),
            series: vec![Series {
                points: pair(&v3_incs),
                marker: Marker::Circle,
                color: BLACK,
            }],
        },
        Panel {
            kind: PanelKind::MajorAxisDeclination,
            x_label: "V1 Declination".into(),
            x_range: (0.0, 360.0),
            series: vec![Series {
                points: pair(&v1_decs),
                marker: Marker::Square,
                color: RED,
            }],
        },
    ];

    if !bulks.is_empty() {
        let b_min = bulks.iter().cloned().fold(f64::INFINITY, f64::min);
        let b_max = bulks.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        panels.push(Panel {
            kind: PanelKind::BulkSusceptibility,
            x_label: "Bulk Susc. (uSI)".into(),
            x_range: padded_range(b_min, b_max),
            series: vec![Series {
                points: bulks.iter().cloned().zip(bulk_depths).collect(),
                marker: Marker::Circle,
                color: BLUE,
            }],
        });
    }

    let y_label = match depth_scale {
        DepthScale::CoreDepth => "Depth (mbsf)".to_string(),
        DepthScale::Age => format!("Age ({age_unit})"),
        DepthScale::CompositeDepth => "Depth (mcd)".to_string(),
    };

    let figure = DepthPlotFigure {
        location: location.clone(),
        y_label,
        depth_range: (dmin, dmax),
        summary_depths: summary_depths
            .iter()
            .cloned()
            .filter(|&d| d >= dmin && d < dmax)
            .collect(),
        panels,
        footer: format!("ani-depthplot v{}", env!("CARGO_PKG_VERSION")),
        width: 1100,
        height: 700,
    };

    let file_name = format!("{location}_ani_depthplot.{}", options.fmt.extension());
    Ok(DepthPlot {
        figure,
        file_names: vec![file_name],
        fmt: options.fmt,
    })
}

/// Pad a data range by 15% so markers do not sit on the frame, matching the
/// spread given to the bulk-susceptibility panel.
fn padded_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let range = (max_val - min_val).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min_val - padding, max_val + padding)
}
