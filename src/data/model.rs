use std::fmt;

use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Series – one run's (time, value) samples
// ---------------------------------------------------------------------------

/// A single time series (one data file), times non-decreasing.
#[derive(Debug, Clone, Default)]
pub struct Series {
    /// Time axis, femtoseconds in raw files, picoseconds after windowing.
    pub time: Vec<f64>,
    /// Observed values (pressure, MSD in Å²) – same length as `time`.
    pub value: Vec<f64>,
}

impl Series {
    /// Build a series from paired vectors. Lengths must match.
    pub fn new(time: Vec<f64>, value: Vec<f64>) -> Self {
        debug_assert_eq!(time.len(), value.len());
        Series { time, value }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Iterate over (time, value) pairs.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.value.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Window – a closed time interval
// ---------------------------------------------------------------------------

/// A closed interval [start, end] on the time axis of a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    /// Construct a window, rejecting inverted bounds.
    pub fn new(start: f64, end: f64) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::Parse(format!(
                "window start {start} exceeds end {end}"
            )));
        }
        Ok(Window { start, end })
    }

    /// Inclusive membership test.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

// ---------------------------------------------------------------------------
// RunKey – identity of one simulation run
// ---------------------------------------------------------------------------

/// Identity of one run folder, parsed from the naming convention
/// `<class-prefix>-...-<numeric-parameter>`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunKey {
    /// Full folder name, kept for reporting.
    pub folder: String,
    /// First "-"-delimited token, used for ignore/verify classification.
    pub prefix: String,
    /// Numeric parameter parsed from the token after the final "-".
    pub parameter: f64,
}

impl RunKey {
    /// Parse a folder name into a key. The trailing token must be a float.
    pub fn parse(folder: &str) -> Result<Self, AnalysisError> {
        let prefix = folder.split('-').next().unwrap_or(folder).to_string();
        let tail = folder.rsplit('-').next().unwrap_or("");
        let parameter: f64 = tail.parse().map_err(|_| {
            AnalysisError::Parse(format!(
                "folder '{folder}' does not end in a numeric parameter"
            ))
        })?;
        Ok(RunKey {
            folder: folder.to_string(),
            prefix,
            parameter,
        })
    }

    /// The trailing parameter token exactly as written in the folder name.
    pub fn parameter_label(&self) -> &str {
        self.folder.rsplit('-').next().unwrap_or(&self.folder)
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder)
    }
}

// ---------------------------------------------------------------------------
// RunClass – ignore / verify / normal partitioning
// ---------------------------------------------------------------------------

/// Classification of a run against the configured prefix sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClass {
    /// Dropped before any processing.
    Ignore,
    /// Processed and reported, excluded from predictive fits.
    Verify,
    /// Used for fitting.
    Normal,
}

/// Classify a prefix. Ignore is checked first and wins when a prefix
/// appears in both sets.
pub fn classify(prefix: &str, ignore: &[String], verify: &[String]) -> RunClass {
    if ignore.iter().any(|p| p == prefix) {
        RunClass::Ignore
    } else if verify.iter().any(|p| p == prefix) {
        RunClass::Verify
    } else {
        RunClass::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_key_parses_prefix_and_parameter() {
        let key = RunKey::parse("n-run3-1.25").unwrap();
        assert_eq!(key.prefix, "n");
        assert_eq!(key.parameter, 1.25);
        assert_eq!(key.folder, "n-run3-1.25");
    }

    #[test]
    fn run_key_single_token_folder() {
        // No "-" at all: the whole name is both prefix and parameter.
        let key = RunKey::parse("1.5").unwrap();
        assert_eq!(key.prefix, "1.5");
        assert_eq!(key.parameter, 1.5);
    }

    #[test]
    fn run_key_rejects_non_numeric_tail() {
        assert!(RunKey::parse("n-base").is_err());
    }

    #[test]
    fn classify_ignore_beats_verify() {
        let both = vec!["5".to_string()];
        assert_eq!(classify("5", &both, &both), RunClass::Ignore);
        assert_eq!(classify("5", &[], &both), RunClass::Verify);
        assert_eq!(classify("5", &[], &[]), RunClass::Normal);
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(Window::new(5.0, 1.0).is_err());
        assert!(Window::new(1.0, 1.0).is_ok());
    }
}
