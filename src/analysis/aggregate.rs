use std::collections::BTreeMap;

use log::warn;

use crate::error::AnalysisError;

use super::diffusion::parse_temperature;

// ---------------------------------------------------------------------------
// Per-run and per-group reductions
// ---------------------------------------------------------------------------

/// Arithmetic mean of a non-empty slice.
pub fn mean(values: &[f64]) -> Result<f64, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::MissingData(
            "cannot average an empty series".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Reduce temperature-labelled diffusion coefficients to one
/// (temperature K, mean ln D) point per group, highest temperature first.
///
/// Non-positive D values are non-physical and are excluded with a warning;
/// a group left with no positive values is dropped entirely, never treated
/// as zero. Labels that do not parse as temperatures are skipped.
pub fn log_mean_by_temperature(groups: &BTreeMap<String, Vec<f64>>) -> Vec<(f64, f64)> {
    let mut points = Vec::new();

    for (label, d_values) in groups {
        let temperature = match parse_temperature(label) {
            Ok(t) => t,
            Err(err) => {
                warn!("skipping group '{label}': {err}");
                continue;
            }
        };

        let positive: Vec<f64> = d_values.iter().copied().filter(|&d| d > 0.0).collect();
        let dropped = d_values.len() - positive.len();
        if dropped > 0 {
            warn!("group '{label}': excluded {dropped} non-positive diffusion coefficient(s)");
        }
        if positive.is_empty() {
            warn!("group '{label}': no positive diffusion coefficients, group dropped");
            continue;
        }

        let mean_ln = positive.iter().map(|d| d.ln()).sum::<f64>() / positive.len() as f64;
        points.push((temperature, mean_ln));
    }

    points.sort_by(|a, b| b.0.total_cmp(&a.0));
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[0.4, 0.6]).unwrap(), 0.5);
    }

    #[test]
    fn mean_of_empty_is_missing_data() {
        assert!(matches!(mean(&[]), Err(AnalysisError::MissingData(_))));
    }

    #[test]
    fn log_mean_excludes_non_positive_values() {
        let mut groups = BTreeMap::new();
        groups.insert("600K".to_string(), vec![1.0, 2.0, -1.0, 4.0]);

        let points = log_mean_by_temperature(&groups);
        assert_eq!(points.len(), 1);
        let expected = (1.0f64.ln() + 2.0f64.ln() + 4.0f64.ln()) / 3.0;
        assert_eq!(points[0].0, 600.0);
        assert!((points[0].1 - expected).abs() < 1e-12);
    }

    #[test]
    fn group_without_positive_values_is_dropped() {
        let mut groups = BTreeMap::new();
        groups.insert("600K".to_string(), vec![-1.0, 0.0]);
        groups.insert("800K".to_string(), vec![2.0]);

        let points = log_mean_by_temperature(&groups);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].0, 800.0);
    }

    #[test]
    fn groups_come_out_hottest_first() {
        let mut groups = BTreeMap::new();
        groups.insert("600K".to_string(), vec![1.0]);
        groups.insert("900K".to_string(), vec![1.0]);
        groups.insert("750K".to_string(), vec![1.0]);

        let temps: Vec<f64> = log_mean_by_temperature(&groups)
            .iter()
            .map(|p| p.0)
            .collect();
        assert_eq!(temps, vec![900.0, 750.0, 600.0]);
    }
}
