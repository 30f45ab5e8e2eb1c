use crate::error::AnalysisError;

use super::regression::RegressionResult;

// ---------------------------------------------------------------------------
// Linear inversion: observed value → parameter
// ---------------------------------------------------------------------------

/// Invert a fitted line to find the parameter producing `target_value`:
/// `(target_value − intercept) / slope`.
///
/// A zero slope has no solution and is `DegenerateInput`. This is a direct
/// inversion, exact given the regression's coefficients.
pub fn solve_parameter(fit: &RegressionResult, target_value: f64) -> Result<f64, AnalysisError> {
    if fit.slope == 0.0 {
        return Err(AnalysisError::DegenerateInput(
            "fit slope is zero, target value is unreachable".to_string(),
        ));
    }
    Ok((target_value - fit.intercept) / fit.slope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(slope: f64, intercept: f64) -> RegressionResult {
        RegressionResult {
            slope,
            intercept,
            r_squared: 1.0,
        }
    }

    #[test]
    fn inverts_the_fitted_line() {
        assert_eq!(solve_parameter(&fit(2.0, 1.0), 5.0).unwrap(), 2.0);
    }

    #[test]
    fn zero_slope_is_degenerate() {
        assert!(matches!(
            solve_parameter(&fit(0.0, 1.0), 5.0),
            Err(AnalysisError::DegenerateInput(_))
        ));
    }
}
