use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::data::loader::list_run_folders;
use crate::data::model::Window;
use crate::error::AnalysisError;

/// File name of the per-root analysis configuration.
pub const CONFIG_FILE: &str = "config.json";

/// Matplotlib's default category palette, the base colours the original
/// simulation reports were styled with.
const DEFAULT_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn default_colors() -> Vec<String> {
    DEFAULT_COLORS.iter().map(|c| c.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// A [start, end] time range in picoseconds, as stored in config files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FitRange {
    pub fit_start: f64,
    pub fit_end: f64,
}

impl FitRange {
    pub fn window(&self) -> Result<Window, AnalysisError> {
        Window::new(self.fit_start, self.fit_end)
    }
}

// ---------------------------------------------------------------------------
// Pressure pipeline configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// Class prefixes dropped before any processing.
    pub ignore_dirs: Vec<String>,
    /// Class prefixes reported separately, excluded from the fit.
    pub verify_dirs: Vec<String>,
    /// Base colours cycled across per-run plots.
    pub colors: Vec<String>,
    /// Pressure the fitted line is inverted at.
    pub expected_pressure: f64,
    /// Optional averaging window in picoseconds; absent means the whole
    /// series.
    pub window_ps: Option<FitRange>,
}

impl Default for PressureConfig {
    fn default() -> Self {
        PressureConfig {
            ignore_dirs: Vec::new(),
            verify_dirs: Vec::new(),
            colors: default_colors(),
            expected_pressure: 0.5,
            window_ps: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Diffusion pipeline configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    /// Whether to fit diffusion coefficients at all (plots are always made).
    pub enable_fitting: bool,
    /// Case-insensitive substring a data file name must contain to enter the
    /// results table; empty matches everything.
    pub target_keyword: String,
    /// Class prefixes of temperature groups dropped before processing.
    pub ignore_dirs: Vec<String>,
    /// Class prefixes of temperature groups kept out of the Arrhenius fit.
    pub verify_dirs: Vec<String>,
    pub colors: Vec<String>,
    /// Per-temperature-group regression ranges, picoseconds.
    pub fit_ranges: BTreeMap<String, FitRange>,
    /// MSD extraction window start, picoseconds.
    pub start_time_ps: f64,
    /// MSD extraction window end, picoseconds.
    pub end_time_ps: f64,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        DiffusionConfig {
            enable_fitting: true,
            target_keyword: "ti".to_string(),
            ignore_dirs: Vec::new(),
            verify_dirs: Vec::new(),
            colors: default_colors(),
            fit_ranges: BTreeMap::new(),
            start_time_ps: 20.0,
            end_time_ps: 30.0,
        }
    }
}

impl DiffusionConfig {
    /// The MSD extraction window.
    pub fn msd_window(&self) -> Result<Window, AnalysisError> {
        Window::new(self.start_time_ps, self.end_time_ps)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Path of the config file under an analysis root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load the pressure configuration from `<root>/config.json`, falling back
/// to defaults when the file is absent.
pub fn load_pressure_config(root: &Path) -> Result<PressureConfig> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(PressureConfig::default());
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Load the diffusion configuration from `<root>/config.json`.
///
/// When the file is absent, a default configuration is generated with one
/// fit range per discovered temperature group and written back, so the fit
/// windows can be tuned per group between runs.
pub fn load_diffusion_config(root: &Path) -> Result<DiffusionConfig> {
    let path = config_path(root);
    if path.exists() {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()));
    }

    info!("{} not found, generating defaults", path.display());
    let mut config = DiffusionConfig::default();
    for group in list_run_folders(root)? {
        config.fit_ranges.insert(
            group,
            FitRange {
                fit_start: config.start_time_ps,
                fit_end: config.end_time_ps,
            },
        );
    }

    let text = serde_json::to_string_pretty(&config)?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pressure_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_pressure_config(dir.path()).unwrap();
        assert_eq!(config.expected_pressure, 0.5);
        assert!(config.ignore_dirs.is_empty());
        assert_eq!(config.colors.len(), 10);
    }

    #[test]
    fn partial_pressure_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            r#"{"expected_pressure": 1.25, "verify_dirs": ["5"]}"#,
        )
        .unwrap();

        let config = load_pressure_config(dir.path()).unwrap();
        assert_eq!(config.expected_pressure, 1.25);
        assert_eq!(config.verify_dirs, vec!["5"]);
        assert_eq!(config.colors.len(), 10);
    }

    #[test]
    fn missing_diffusion_config_is_generated_per_group() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("600K")).unwrap();
        std::fs::create_dir(dir.path().join("800K")).unwrap();

        let config = load_diffusion_config(dir.path()).unwrap();
        assert!(config.enable_fitting);
        assert_eq!(config.fit_ranges.len(), 2);
        assert!(config.fit_ranges.contains_key("600K"));
        assert!(config_path(dir.path()).exists());

        // Second load round-trips through the written file.
        let reloaded = load_diffusion_config(dir.path()).unwrap();
        assert_eq!(reloaded.fit_ranges.len(), 2);
    }
}
