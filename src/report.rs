use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::analysis::diffusion::ArrheniusFit;

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// Write the per-run average table: one `<param>\t<average>` line per run,
/// verify runs marked with a trailing `(verify)`.
pub fn write_pressure_table(path: &Path, rows: &[(String, f64, bool)]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    for (label, average, verify) in rows {
        if *verify {
            writeln!(file, "{label}\t{average:.4}\t(verify)")?;
        } else {
            writeln!(file, "{label}\t{average:.4}")?;
        }
    }
    Ok(())
}

/// Write the diffusion results CSV, one row per run:
/// `Temperature, Diffusion Coefficient (m²/s), R²`.
pub fn write_diffusion_csv(path: &Path, rows: &[(String, f64, f64)]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Temperature", "Diffusion Coefficient (m²/s)", "R²"])?;
    for (temperature, d, r_squared) in rows {
        writer.write_record([
            temperature.as_str(),
            &format!("{d:.6e}"),
            &format!("{r_squared:.4}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the Arrhenius fit summary text file.
pub fn write_arrhenius_summary(path: &Path, fit: &ArrheniusFit) -> Result<()> {
    let text = format!(
        "Fitting Results:\n\
         - Slope (Ea/R): {:.2e} K\n\
         - Intercept (lnD0): {:.2e}\n\
         - R²: {:.4}\n\
         - D0: {:.2e} m²/s\n",
        fit.slope, fit.intercept, fit.r_squared, fit.d0
    );
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
