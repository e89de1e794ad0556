//! Anisotropy-of-susceptibility depth profiles from MagIC tables.
//!
//! The crate has one job: read specimen/sample/site (and optionally
//! measurement, age and core-summary) tables, run Hext eigenanalysis on
//! each specimen's six-component anisotropy tensor, and assemble a
//! multi-panel plot of the statistics against depth or age.
//!
//! ```no_run
//! use ani_depthplot::{ani_depthplot, DepthPlotOptions};
//!
//! let options = DepthPlotOptions {
//!     dir_path: "data/U1359A".into(),
//!     ..Default::default()
//! };
//! let plot = ani_depthplot(&options)?;
//! plot.save(std::path::Path::new("."))?;
//! # Ok::<(), ani_depthplot::DepthPlotError>(())
//! ```

pub mod data;
pub mod depthplot;
pub mod error;
pub mod plot;
pub mod tensor;

pub use data::model::{CellValue, Contribution, DepthScale, MagicTable, Row, TableType};
pub use depthplot::{ani_depthplot, ani_depthplot_from, DepthPlot, DepthPlotOptions};
pub use error::DepthPlotError;
pub use plot::{DepthPlotFigure, ImageFormat, PanelKind};
pub use tensor::{dohext, parse_aniso_s, HextStats};
