use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Result of a least-squares line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Squared Pearson correlation, in [0, 1].
    pub r_squared: f64,
}

/// Fit `y = slope·x + intercept` over the given points.
///
/// Fewer than two points is `InsufficientData`; zero x-variance (all x
/// equal) is `DegenerateInput`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<RegressionResult, AnalysisError> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData(n));
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    let mut ss_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        ss_xy += dx * dy;
    }

    if ss_xx == 0.0 {
        return Err(AnalysisError::DegenerateInput(
            "all x values are equal".to_string(),
        ));
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;
    // Zero y-variance: the horizontal fit is exact.
    let r_squared = if ss_yy == 0.0 {
        1.0
    } else {
        (ss_xy * ss_xy) / (ss_xx * ss_yy)
    };

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared,
    })
}
