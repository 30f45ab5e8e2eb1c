use thiserror::Error;

// ---------------------------------------------------------------------------
// Analysis error taxonomy
// ---------------------------------------------------------------------------

/// Errors produced by the numeric core and the data layer.
///
/// `Parse`, `MissingData`, `InsufficientData` and `DegenerateInput` raised
/// while processing a single run are recoverable: the driver logs them and
/// excludes the run. The same kinds are fatal when they describe a global
/// precondition (no runs at all, fewer than two groups for a fit).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No usable data where some was required (empty window, no runs found).
    #[error("no data: {0}")]
    MissingData(String),

    /// Input did not match the expected shape (folder name, file line,
    /// temperature label).
    #[error("parse error: {0}")]
    Parse(String),

    /// A regression was requested over fewer than two points.
    #[error("insufficient data: regression needs at least 2 points, got {0}")]
    InsufficientData(usize),

    /// Zero-variance x values or a zero slope handed to an inversion.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

// ---------------------------------------------------------------------------
// Per-run failure
// ---------------------------------------------------------------------------

/// A recoverable failure attributed to one run folder or data file.
#[derive(Debug, Error)]
#[error("run '{run}': {source}")]
pub struct RunError {
    /// Folder (or folder/file) the failure belongs to.
    pub run: String,
    #[source]
    pub source: AnalysisError,
}

impl RunError {
    pub fn new(run: impl Into<String>, source: AnalysisError) -> Self {
        RunError {
            run: run.into(),
            source,
        }
    }
}
