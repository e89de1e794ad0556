use crate::data::model::TableType;

// ---------------------------------------------------------------------------
// Library error type
// ---------------------------------------------------------------------------

/// Everything that can stop a depth plot from being produced.
///
/// The "soft" failures the caller is expected to branch on
/// ([`MissingTable`](DepthPlotError::MissingTable) and
/// [`NoData`](DepthPlotError::NoData)) render to the exact messages the
/// MagIC tooling conventions use, so their `Display` output can be shown
/// to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DepthPlotError {
    #[error("missing required file type: {0}")]
    MissingTable(TableType),

    #[error("no data to plot")]
    NoData,

    /// An `aniso_s` cell that does not decode to six numeric components.
    #[error("malformed tensor data for specimen '{specimen}': '{value}' ({reason})")]
    MalformedTensor {
        specimen: String,
        value: String,
        reason: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DepthPlotError>;
