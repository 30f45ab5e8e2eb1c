use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, error, info, warn};

use crate::analysis::aggregate::log_mean_by_temperature;
use crate::analysis::diffusion::{arrhenius_fit, estimate_diffusion, ArrheniusFit, DiffusionFit};
use crate::color::ColorCycle;
use crate::config::DiffusionConfig;
use crate::data::loader::{list_data_files, list_run_folders, read_series};
use crate::data::model::{classify, RunClass, Window};
use crate::data::window::window_ps;
use crate::plot::{self, MsdCurve};
use crate::report;

// ---------------------------------------------------------------------------
// Per-file result
// ---------------------------------------------------------------------------

/// One data file's diffusion coefficient, tagged with its temperature group.
#[derive(Debug, Clone)]
pub struct DiffusionRun {
    pub group: String,
    pub file_name: String,
    pub class: RunClass,
    pub fit: DiffusionFit,
}

/// The pipeline's end result, returned for reporting and testing.
#[derive(Debug, Clone)]
pub struct DiffusionSummary {
    pub runs: Vec<DiffusionRun>,
    /// (1000/T, mean ln D) fit inputs, hottest group first. Empty when
    /// fitting is disabled.
    pub arrhenius_points: Vec<(f64, f64)>,
    /// Absent when fitting is disabled.
    pub arrhenius: Option<ArrheniusFit>,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run the diffusion pipeline over an analysis root: one MSD chart and a set
/// of diffusion coefficients per temperature group, a CSV of all
/// coefficients, and an Arrhenius fit over the per-group mean ln(D).
///
/// Group-level failures are logged and the group is excluded; a missing
/// root, zero usable coefficients, or fewer than two temperature groups
/// abort the pipeline.
pub fn run(root: &Path, config: &DiffusionConfig) -> Result<DiffusionSummary> {
    let groups = list_run_folders(root)?;
    if groups.is_empty() {
        bail!("no temperature groups found under {}", root.display());
    }

    let output_dir = root.join("output");
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let msd_window = config.msd_window()?;
    info!(
        "found {} temperature groups: {}",
        groups.len(),
        groups.join(", ")
    );

    let mut runs = Vec::new();
    for group in &groups {
        let prefix = group.split('-').next().unwrap_or(group);
        let class = classify(prefix, &config.ignore_dirs, &config.verify_dirs);
        if class == RunClass::Ignore {
            info!("ignoring group '{group}' (configured exclusion)");
            continue;
        }
        info!("processing temperature group {group}");
        if let Err(err) =
            process_group(root, group, class, config, msd_window, &output_dir, &mut runs)
        {
            error!("group '{group}' failed: {err:#}");
        }
    }

    if !config.enable_fitting {
        info!("fitting disabled, MSD charts only");
        return Ok(DiffusionSummary {
            runs,
            arrhenius_points: Vec::new(),
            arrhenius: None,
        });
    }

    if runs.is_empty() {
        bail!("no diffusion coefficients could be computed under {}", root.display());
    }

    let csv_path = output_dir.join("diffusion_coefficients.csv");
    let rows: Vec<(String, f64, f64)> = runs
        .iter()
        .map(|r| (r.group.clone(), r.fit.d, r.fit.r_squared))
        .collect();
    report::write_diffusion_csv(&csv_path, &rows)?;
    info!("diffusion coefficients written to {}", csv_path.display());

    // Verify groups are reported above but stay out of the predictive fit.
    let mut fit_inputs: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for run in runs.iter().filter(|r| r.class == RunClass::Normal) {
        fit_inputs.entry(run.group.clone()).or_default().push(run.fit.d);
    }
    let by_temperature = log_mean_by_temperature(&fit_inputs);
    if by_temperature.len() < 2 {
        bail!(
            "an Arrhenius fit needs at least 2 temperature groups, got {}",
            by_temperature.len()
        );
    }
    for (temperature, mean_ln) in &by_temperature {
        info!("temperature {temperature} K: mean ln(D) = {mean_ln:.4}");
    }

    let arrhenius_points: Vec<(f64, f64)> = by_temperature
        .iter()
        .map(|&(t, mean_ln)| (1000.0 / t, mean_ln))
        .collect();
    let arrhenius = arrhenius_fit(&arrhenius_points)?;

    let keyword = config.target_keyword.trim();
    let chart_name = if keyword.is_empty() {
        "diffusion_coefficient_vs_temperature.png".to_string()
    } else {
        format!("diffusion_coefficient_vs_{keyword}.png")
    };
    // Chart failures are logged, never fatal: the numbers are the result.
    let chart_path = output_dir.join(chart_name);
    match plot::plot_arrhenius(&chart_path, &arrhenius_points, &arrhenius) {
        Ok(()) => info!("Arrhenius chart written to {}", chart_path.display()),
        Err(err) => warn!("could not render {}: {err:#}", chart_path.display()),
    }

    let summary_path = output_dir.join("fitting_results.txt");
    report::write_arrhenius_summary(&summary_path, &arrhenius)?;
    info!("fit summary written to {}", summary_path.display());
    info!(
        "Arrhenius fit: slope {:.2e} K, ln(D0) {:.2e}, R² {:.4}, D0 {:.2e} m²/s",
        arrhenius.slope, arrhenius.intercept, arrhenius.r_squared, arrhenius.d0
    );

    Ok(DiffusionSummary {
        runs,
        arrhenius_points,
        arrhenius: Some(arrhenius),
    })
}

/// Process one temperature group: every `.dat` file becomes a curve on the
/// group's MSD chart, and files matching the target keyword contribute a
/// diffusion coefficient to `runs`.
fn process_group(
    root: &Path,
    group: &str,
    class: RunClass,
    config: &DiffusionConfig,
    msd_window: Window,
    output_dir: &Path,
    runs: &mut Vec<DiffusionRun>,
) -> Result<()> {
    let group_dir = root.join(group);
    let files = list_data_files(&group_dir)?;
    if files.is_empty() {
        bail!("no .dat files in {}", group_dir.display());
    }

    let range = config
        .fit_ranges
        .get(group)
        .with_context(|| format!("no fit range configured for group '{group}'"))?;
    let fit_window = range.window()?;

    let keyword = config.target_keyword.trim().to_lowercase();
    let mut curves = Vec::new();

    for file in &files {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let series = match read_series(file) {
            Ok(series) => series,
            Err(err) => {
                warn!("{group}/{file_name}: unreadable, skipping: {err:#}");
                continue;
            }
        };

        let windowed = window_ps(&series, msd_window);
        if windowed.is_empty() {
            warn!("{group}/{file_name}: no samples in the MSD window, skipping");
            continue;
        }

        let mut fit_coeffs = None;
        if config.enable_fitting {
            let matches_keyword = keyword.is_empty() || file_name.to_lowercase().contains(&keyword);
            match estimate_diffusion(&windowed, fit_window) {
                Ok(fit) => {
                    if matches_keyword {
                        fit_coeffs = Some((fit.slope, fit.intercept));
                        info!(
                            "{group}/{file_name}: D = {:.6e} m²/s, R² = {:.4}",
                            fit.d, fit.r_squared
                        );
                        runs.push(DiffusionRun {
                            group: group.to_string(),
                            file_name: file_name.clone(),
                            class,
                            fit,
                        });
                    } else {
                        debug!("{group}/{file_name}: does not contain keyword '{keyword}', not tabulated");
                    }
                }
                Err(err) => {
                    warn!("{group}/{file_name}: cannot compute a diffusion coefficient: {err}")
                }
            }
        }

        // Legend label: the trailing token of the file stem.
        let stem = file_name.trim_end_matches(".dat");
        let label = stem.rsplit('-').next().unwrap_or(stem).to_string();
        curves.push(MsdCurve {
            label,
            series: windowed,
            fit: fit_coeffs,
        });
    }

    let chart_path = output_dir.join(format!("MSD_{group}.png"));
    let mut colors = ColorCycle::new(&config.colors);
    match plot::plot_msd_group(&chart_path, &curves, fit_window, &mut colors) {
        Ok(()) => info!("MSD chart written to {}", chart_path.display()),
        Err(err) => warn!("could not render {}: {err:#}", chart_path.display()),
    }

    Ok(())
}
