use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use mdpost::config;
use mdpost::pipeline;

/// Seconds between config-file checks in watch mode.
const WATCH_INTERVAL: Duration = Duration::from_secs(10);

/// Printed after a fatal pipeline failure.
const REMEDIATION: [&str; 4] = [
    "1. check that the data root path exists",
    "2. confirm each run folder contains its data file (results/total-pressure.dat or *.dat)",
    "3. verify folder names end in a numeric parameter",
    "4. make sure at least two valid run folders / temperature groups are present",
];

#[derive(Parser)]
#[command(
    name = "mdpost",
    version,
    about = "Batch post-processing for molecular-dynamics pressure and MSD output"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Average per-run pressure, fit the averages against the run
    /// parameter, and predict the parameter for a target pressure
    Pressure {
        /// Root directory containing the run folders
        root: PathBuf,
        /// Override the configured target pressure
        #[arg(long)]
        target_pressure: Option<f64>,
    },
    /// Diffusion coefficients from MSD series, grouped by temperature
    /// folder, reduced to an Arrhenius fit
    Diffusion {
        /// Root directory containing the temperature-group folders
        root: PathBuf,
        /// Keep running, re-processing whenever <root>/config.json changes
        #[arg(long)]
        watch: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Pressure {
            root,
            target_pressure,
        } => run_pressure(&root, target_pressure),
        Command::Diffusion { root, watch } => run_diffusion(&root, watch),
    };

    if let Err(err) = result {
        error!("analysis failed: {err:#}");
        error!("troubleshooting checklist:");
        for line in REMEDIATION {
            error!("  {line}");
        }
        std::process::exit(1);
    }
}

fn run_pressure(root: &Path, target_pressure: Option<f64>) -> Result<()> {
    let mut config = config::load_pressure_config(root)?;
    if let Some(target) = target_pressure {
        config.expected_pressure = target;
    }
    info!(
        "pressure analysis of {} (ignore: {:?}, verify: {:?}, target: {})",
        root.display(),
        config.ignore_dirs,
        config.verify_dirs,
        config.expected_pressure
    );
    pipeline::pressure::run(root, &config)?;
    Ok(())
}

fn run_diffusion(root: &Path, watch: bool) -> Result<()> {
    let config = config::load_diffusion_config(root)?;
    if !watch {
        pipeline::diffusion::run(root, &config)?;
        return Ok(());
    }

    // Watch mode never gives up on a failed pass; the next config edit
    // triggers another attempt.
    if let Err(err) = pipeline::diffusion::run(root, &config) {
        error!("pipeline failed: {err:#}");
    }

    let config_file = config::config_path(root);
    info!(
        "watching {} for changes (Ctrl+C to stop)",
        config_file.display()
    );
    let mut last_mtime = modified(&config_file);

    loop {
        thread::sleep(WATCH_INTERVAL);
        let Some(mtime) = modified(&config_file) else {
            warn!("{} does not exist", config_file.display());
            continue;
        };
        if last_mtime.map_or(true, |last| mtime > last) {
            info!("configuration changed, re-running the pipeline");
            match config::load_diffusion_config(root) {
                Ok(config) => {
                    if let Err(err) = pipeline::diffusion::run(root, &config) {
                        error!("pipeline failed: {err:#}");
                    }
                }
                Err(err) => error!("reloading configuration failed: {err:#}"),
            }
            last_mtime = Some(mtime);
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
