use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::analysis::aggregate::mean;
use crate::analysis::regression::{fit_line, RegressionResult};
use crate::analysis::solver::solve_parameter;
use crate::color::ColorCycle;
use crate::config::PressureConfig;
use crate::data::loader::{find_pressure_file, list_run_folders, read_series};
use crate::data::model::{classify, RunClass, RunKey};
use crate::data::window::window_ps;
use crate::error::{AnalysisError, RunError};
use crate::plot;
use crate::report;

// ---------------------------------------------------------------------------
// Per-run result
// ---------------------------------------------------------------------------

/// One processed run: its identity, classification, and average pressure.
#[derive(Debug, Clone)]
pub struct PressureRun {
    pub key: RunKey,
    pub class: RunClass,
    pub average: f64,
}

/// The pipeline's end result, returned for reporting and testing.
#[derive(Debug, Clone)]
pub struct PressureSummary {
    pub runs: Vec<PressureRun>,
    pub fit: RegressionResult,
    pub predicted_parameter: f64,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run the pressure pipeline over an analysis root: average every run's
/// pressure series, fit the averages of normal runs against the run
/// parameter, and invert the fit at the configured target pressure.
///
/// Per-run failures are logged and the run is excluded; a missing root, zero
/// usable runs, or fewer than two normal runs abort the pipeline.
pub fn run(root: &Path, config: &PressureConfig) -> Result<PressureSummary> {
    let folders = list_run_folders(root)?;
    if folders.is_empty() {
        bail!("no run folders found under {}", root.display());
    }

    let output_dir = root.join("output");
    let plots_dir = output_dir.join("timeseries_plots");
    fs::create_dir_all(&plots_dir)
        .with_context(|| format!("creating {}", plots_dir.display()))?;

    info!("processing {} folders", folders.len());
    let mut colors = ColorCycle::new(&config.colors);
    let mut runs = Vec::new();

    for folder in &folders {
        let prefix = folder.split('-').next().unwrap_or(folder);
        if classify(prefix, &config.ignore_dirs, &config.verify_dirs) == RunClass::Ignore {
            info!("ignoring folder '{folder}' (configured exclusion)");
            continue;
        }
        match process_run(root, folder, config, &plots_dir, &mut colors) {
            Ok(run) => runs.push(run),
            Err(err) => warn!("skipping {err}"),
        }
    }

    if runs.is_empty() {
        bail!("no valid run folders produced data under {}", root.display());
    }

    info!("valid parameter/average pairs:");
    for run in &runs {
        info!(
            "  parameter {:<10} -> average {:.4}",
            run.key.parameter_label(),
            run.average
        );
    }

    runs.sort_by(|a, b| a.key.parameter.total_cmp(&b.key.parameter));
    let table: Vec<(String, f64, bool)> = runs
        .iter()
        .map(|r| {
            (
                r.key.parameter_label().to_string(),
                r.average,
                r.class == RunClass::Verify,
            )
        })
        .collect();
    let table_path = output_dir.join("average_pressures.txt");
    report::write_pressure_table(&table_path, &table)?;
    info!("averages written to {}", table_path.display());

    let normal: Vec<(f64, f64)> = runs
        .iter()
        .filter(|r| r.class == RunClass::Normal)
        .map(|r| (r.key.parameter, r.average))
        .collect();
    let verify: Vec<(f64, f64)> = runs
        .iter()
        .filter(|r| r.class == RunClass::Verify)
        .map(|r| (r.key.parameter, r.average))
        .collect();

    if normal.len() < 2 {
        bail!(
            "a fit needs at least 2 normal runs, got {} (verify runs never enter the fit)",
            normal.len()
        );
    }

    let (x, y): (Vec<f64>, Vec<f64>) = normal.iter().copied().unzip();
    let fit = fit_line(&x, &y)?;
    let predicted_parameter = solve_parameter(&fit, config.expected_pressure)?;

    // Chart failures are logged, never fatal: the numbers are the result.
    let chart_path = output_dir.join("average_pressure_analysis.png");
    let base = ColorCycle::new(&config.colors).next_color();
    match plot::plot_pressure_fit(
        &chart_path,
        &normal,
        &verify,
        &fit,
        config.expected_pressure,
        predicted_parameter,
        base,
    ) {
        Ok(()) => info!("analysis chart written to {}", chart_path.display()),
        Err(err) => warn!("could not render {}: {err:#}", chart_path.display()),
    }

    info!(
        "linear fit: y = {:.4}x {:+.4} (R² = {:.4})",
        fit.slope, fit.intercept, fit.r_squared
    );
    info!("target pressure: {}", config.expected_pressure);
    info!("predicted parameter: {predicted_parameter:.4}");

    Ok(PressureSummary {
        runs,
        fit,
        predicted_parameter,
    })
}

/// Process one run folder into a [`PressureRun`]. Every failure is
/// attributed to the folder and recoverable.
fn process_run(
    root: &Path,
    folder: &str,
    config: &PressureConfig,
    plots_dir: &Path,
    colors: &mut ColorCycle,
) -> Result<PressureRun, RunError> {
    let key = RunKey::parse(folder).map_err(|e| RunError::new(folder, e))?;
    let class = classify(&key.prefix, &config.ignore_dirs, &config.verify_dirs);

    let Some(data_file) = find_pressure_file(&root.join(folder)) else {
        return Err(RunError::new(
            folder,
            AnalysisError::MissingData("no results/total-pressure.dat".to_string()),
        ));
    };

    let series = read_series(&data_file)
        .map_err(|e| RunError::new(folder, AnalysisError::Parse(format!("{e:#}"))))?;

    let windowed = match &config.window_ps {
        Some(range) => {
            let window = range.window().map_err(|e| RunError::new(folder, e))?;
            window_ps(&series, window)
        }
        None => series,
    };
    if windowed.is_empty() {
        return Err(RunError::new(
            folder,
            AnalysisError::MissingData("no samples in the averaging window".to_string()),
        ));
    }

    let average = mean(&windowed.value).map_err(|e| RunError::new(folder, e))?;

    // Chart failures cost the plot, not the run.
    let plot_path = plots_dir.join(format!("{folder}_plot.png"));
    let title = format!("Pressure Data - {folder}");
    if let Err(err) = plot::plot_run_series(&plot_path, &windowed, &title, colors.next_color()) {
        warn!("could not render {}: {err:#}", plot_path.display());
    } else {
        info!("time-series chart written to {}", plot_path.display());
    }

    Ok(PressureRun {
        key,
        class,
        average,
    })
}
