use crate::data::model::{Series, Window};
use crate::data::window::clip;
use crate::error::AnalysisError;

use super::regression::fit_line;

/// Divisor of the MSD slope for three-dimensional diffusion, MSD = 6·D·t.
const MSD_SLOPE_DIVISOR: f64 = 6.0;

// ---------------------------------------------------------------------------
// Diffusion coefficient from an MSD slope
// ---------------------------------------------------------------------------

/// A diffusion coefficient together with the regression it came from.
#[derive(Debug, Clone, Copy)]
pub struct DiffusionFit {
    /// Diffusion coefficient, slope / 6.
    pub d: f64,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Regress (time, MSD) over the fit window (same time unit as the series)
/// and derive D from the slope.
///
/// Fewer than two samples in the window fails like the underlying
/// regression; this is a recoverable, per-run failure.
pub fn estimate_diffusion(
    series: &Series,
    fit_window: Window,
) -> Result<DiffusionFit, AnalysisError> {
    let fit = clip(series, fit_window);
    let regression = fit_line(&fit.time, &fit.value)?;
    Ok(DiffusionFit {
        d: regression.slope / MSD_SLOPE_DIVISOR,
        slope: regression.slope,
        intercept: regression.intercept,
        r_squared: regression.r_squared,
    })
}

// ---------------------------------------------------------------------------
// Arrhenius reduction
// ---------------------------------------------------------------------------

/// Arrhenius line over (1000/T, mean ln D) points.
#[derive(Debug, Clone, Copy)]
pub struct ArrheniusFit {
    /// Slope of ln D vs 1000/T, proportional to −Ea/R.
    pub slope: f64,
    /// Intercept, ln(D₀).
    pub intercept: f64,
    pub r_squared: f64,
    /// Pre-exponential factor, exp(intercept).
    pub d0: f64,
}

/// Fit ln(D) against 1000/T. Needs at least two distinct temperature
/// groups.
pub fn arrhenius_fit(points: &[(f64, f64)]) -> Result<ArrheniusFit, AnalysisError> {
    let (x, y): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let regression = fit_line(&x, &y)?;
    Ok(ArrheniusFit {
        slope: regression.slope,
        intercept: regression.intercept,
        r_squared: regression.r_squared,
        d0: regression.intercept.exp(),
    })
}

/// Parse a temperature-group label such as `600K` or `600` into Kelvin.
pub fn parse_temperature(label: &str) -> Result<f64, AnalysisError> {
    let trimmed = label.trim();
    let digits = trimmed
        .strip_suffix('K')
        .or_else(|| trimmed.strip_suffix('k'))
        .unwrap_or(trimmed);
    digits.parse().map_err(|_| {
        AnalysisError::Parse(format!("'{label}' is not a temperature label"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msd_slope_of_six_halves_yields_half() {
        // msd(t) = 6 · 0.5 · t, so D must come out as 0.5.
        let time: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let value: Vec<f64> = time.iter().map(|t| 6.0 * 0.5 * t).collect();
        let series = Series::new(time, value);

        let fit = estimate_diffusion(&series, Window::new(0.0, 10.0).unwrap()).unwrap();
        assert!((fit.d - 0.5).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sparse_fit_window_is_recoverable() {
        let series = Series::new(vec![0.0, 1.0, 2.0], vec![0.0, 3.0, 6.0]);
        let err = estimate_diffusion(&series, Window::new(1.5, 1.8).unwrap()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(0)));
    }

    #[test]
    fn arrhenius_recovers_d0_from_intercept() {
        // ln D = -2 · (1000/T) + 1  →  D0 = e.
        let points = [(1.0, -1.0), (2.0, -3.0), (4.0, -7.0)];
        let fit = arrhenius_fit(&points).unwrap();
        assert!((fit.slope + 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.d0 - 1.0f64.exp()).abs() < 1e-12);
    }

    #[test]
    fn arrhenius_needs_two_groups() {
        assert!(arrhenius_fit(&[(1.0, -1.0)]).is_err());
    }

    #[test]
    fn temperature_labels_parse_with_and_without_suffix() {
        assert_eq!(parse_temperature("600K").unwrap(), 600.0);
        assert_eq!(parse_temperature(" 750k ").unwrap(), 750.0);
        assert_eq!(parse_temperature("900").unwrap(), 900.0);
        assert!(parse_temperature("hot").is_err());
    }
}
