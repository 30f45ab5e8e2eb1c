use std::fs;
use std::path::Path;

use mdpost::config::{DiffusionConfig, FitRange, PressureConfig};
use mdpost::data::model::RunClass;
use mdpost::pipeline::{diffusion, pressure};

/// Write a series file in the simulation output format: time in fs in
/// field 0, the observed value in field 4.
fn write_series(path: &Path, samples: &[(f64, f64)]) {
    let mut text = String::from("# generated fixture\nTime(fs) x y z total\n");
    for (t, v) in samples {
        text.push_str(&format!("{t} 0 0 0 {v}\n"));
    }
    fs::write(path, text).unwrap();
}

fn write_pressure_run(root: &Path, folder: &str, value: f64) {
    let results = root.join(folder).join("results");
    fs::create_dir_all(&results).unwrap();
    let samples: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, value)).collect();
    write_series(&results.join("total-pressure.dat"), &samples);
}

#[test]
fn pressure_pipeline_predicts_parameter_and_separates_verify_runs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_pressure_run(root, "n-1.0", 0.4);
    write_pressure_run(root, "n-2.0", 0.6);
    write_pressure_run(root, "v-1.5", 0.5);

    let config = PressureConfig {
        verify_dirs: vec!["v".to_string()],
        expected_pressure: 0.5,
        ..PressureConfig::default()
    };

    let summary = pressure::run(root, &config).unwrap();

    // Fit over the normal runs only: (1.0, 0.4), (2.0, 0.6).
    assert!((summary.fit.slope - 0.2).abs() < 1e-9);
    assert!((summary.fit.intercept - 0.2).abs() < 1e-9);
    assert!((summary.predicted_parameter - 1.5).abs() < 1e-9);

    let verify: Vec<_> = summary
        .runs
        .iter()
        .filter(|r| r.class == RunClass::Verify)
        .collect();
    assert_eq!(verify.len(), 1);
    assert_eq!(verify[0].key.folder, "v-1.5");
    assert!((verify[0].average - 0.5).abs() < 1e-9);

    // The verify run is reported in the table, marked as such.
    let table = fs::read_to_string(root.join("output/average_pressures.txt")).unwrap();
    assert!(table.contains("1.5\t0.5000\t(verify)"));
    assert!(table.contains("1.0\t0.4000\n"));
}

#[test]
fn pressure_pipeline_needs_two_normal_runs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_pressure_run(root, "n-1.0", 0.4);
    write_pressure_run(root, "v-1.5", 0.5);

    let config = PressureConfig {
        verify_dirs: vec!["v".to_string()],
        ..PressureConfig::default()
    };

    assert!(pressure::run(root, &config).is_err());
}

#[test]
fn pressure_pipeline_skips_ignored_and_unparseable_folders() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_pressure_run(root, "n-1.0", 0.4);
    write_pressure_run(root, "n-2.0", 0.6);
    write_pressure_run(root, "4-3.0", 9.9);
    fs::create_dir_all(root.join("n-notanumber/results")).unwrap();

    let config = PressureConfig {
        ignore_dirs: vec!["4".to_string()],
        ..PressureConfig::default()
    };

    let summary = pressure::run(root, &config).unwrap();
    assert_eq!(summary.runs.len(), 2);
    assert!(summary.runs.iter().all(|r| r.key.prefix == "n"));
}

#[test]
fn diffusion_pipeline_fits_arrhenius_over_temperature_groups() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    // Two temperature groups, one MSD file each. Times span 0..50 ps at
    // 1000 fs per sample; the configured window keeps 20..30 ps.
    for (group, slope) in [("600K", 0.6), ("800K", 1.2)] {
        let group_dir = root.join(group);
        fs::create_dir_all(&group_dir).unwrap();
        let samples: Vec<(f64, f64)> = (0..=50_000)
            .step_by(1000)
            .map(|t_fs| (t_fs as f64, slope * t_fs as f64 / 1000.0))
            .collect();
        write_series(&group_dir.join("msd-ti.dat"), &samples);
    }

    let mut config = DiffusionConfig {
        target_keyword: "ti".to_string(),
        ..DiffusionConfig::default()
    };
    for group in ["600K", "800K"] {
        config.fit_ranges.insert(
            group.to_string(),
            FitRange {
                fit_start: 0.0,
                fit_end: 10.0,
            },
        );
    }

    let summary = diffusion::run(root, &config).unwrap();

    assert_eq!(summary.runs.len(), 2);
    let d600 = summary
        .runs
        .iter()
        .find(|r| r.group == "600K")
        .unwrap()
        .fit
        .d;
    assert!((d600 - 0.1).abs() < 1e-9);

    // Hottest group first, x = 1000/T.
    assert_eq!(summary.arrhenius_points.len(), 2);
    assert!((summary.arrhenius_points[0].0 - 1000.0 / 800.0).abs() < 1e-9);

    let csv = fs::read_to_string(root.join("output/diffusion_coefficients.csv")).unwrap();
    assert!(csv.starts_with("Temperature,Diffusion Coefficient (m²/s),R²"));
    assert!(csv.contains("600K"));

    let fit_summary = fs::read_to_string(root.join("output/fitting_results.txt")).unwrap();
    assert!(fit_summary.starts_with("Fitting Results:"));
    assert!(fit_summary.contains("D0:"));
}

#[test]
fn diffusion_pipeline_keyword_filter_excludes_files_from_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for group in ["600K", "800K"] {
        let group_dir = root.join(group);
        fs::create_dir_all(&group_dir).unwrap();
        let samples: Vec<(f64, f64)> = (0..=50_000)
            .step_by(1000)
            .map(|t_fs| (t_fs as f64, t_fs as f64 / 1000.0))
            .collect();
        write_series(&group_dir.join("msd-ti.dat"), &samples);
        write_series(&group_dir.join("msd-other.dat"), &samples);
    }

    let mut config = DiffusionConfig {
        target_keyword: "ti".to_string(),
        ..DiffusionConfig::default()
    };
    for group in ["600K", "800K"] {
        config.fit_ranges.insert(
            group.to_string(),
            FitRange {
                fit_start: 0.0,
                fit_end: 10.0,
            },
        );
    }

    let summary = diffusion::run(root, &config).unwrap();
    assert_eq!(summary.runs.len(), 2);
    assert!(summary.runs.iter().all(|r| r.file_name.contains("ti")));
}
