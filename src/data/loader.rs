use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;

use super::model::Series;

/// Marker token of the column header line in simulation output files.
const HEADER_TOKEN: &str = "Time(fs)";

/// File name of the per-run pressure series (matched case-insensitively).
const PRESSURE_FILE: &str = "total-pressure.dat";

// ---------------------------------------------------------------------------
// Series loading
// ---------------------------------------------------------------------------

/// Read a whitespace-delimited series file.
///
/// Lines starting with `#` or containing the column header token are
/// ignored. Retained lines need at least 5 fields: field 0 is the time in
/// femtoseconds, field 4 the observed value. Short or malformed lines are
/// skipped, not fatal.
pub fn read_series(path: &Path) -> Result<Series> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut time = Vec::new();
    let mut value = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.contains(HEADER_TOKEN) {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 5 {
            debug!(
                "{}:{}: skipping line with {} fields",
                path.display(),
                line_no + 1,
                fields.len()
            );
            continue;
        }

        match (fields[0].parse::<f64>(), fields[4].parse::<f64>()) {
            (Ok(t), Ok(v)) => {
                time.push(t);
                value.push(v);
            }
            _ => {
                debug!(
                    "{}:{}: skipping non-numeric line",
                    path.display(),
                    line_no + 1
                );
            }
        }
    }

    Ok(Series::new(time, value))
}

// ---------------------------------------------------------------------------
// Directory discovery
// ---------------------------------------------------------------------------

/// List the sub-folder names of an analysis root in lexicographic order,
/// excluding the tool's own `output` folder.
pub fn list_run_folders(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        bail!("data root does not exist: {}", root.display());
    }

    let mut folders = Vec::new();
    for entry in root
        .read_dir()
        .with_context(|| format!("listing {}", root.display()))?
    {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.eq_ignore_ascii_case("output") {
            continue;
        }
        folders.push(name);
    }

    folders.sort();
    Ok(folders)
}

/// List the `.dat` files directly inside a folder, sorted by file name.
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in dir
        .read_dir()
        .with_context(|| format!("listing {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("dat"))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Locate `results/total-pressure.dat` inside a run folder, matching the
/// file name case-insensitively. `None` when the `results` folder or the
/// file is missing.
pub fn find_pressure_file(run_dir: &Path) -> Option<PathBuf> {
    let results = run_dir.join("results");
    let entries = results.read_dir().ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().eq_ignore_ascii_case(PRESSURE_FILE) {
            return Some(results.join(name));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_series_skips_comments_headers_and_short_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msd.dat");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "# produced by the simulation").unwrap();
        writeln!(f, "Time(fs) x y z total").unwrap();
        writeln!(f, "0.0 1 2 3 0.5").unwrap();
        writeln!(f, "1.0 1 2").unwrap();
        writeln!(f, "2.0 1 2 3 1.5").unwrap();
        writeln!(f, "3.0 a b c nan-ish?").unwrap();
        drop(f);

        let series = read_series(&path).unwrap();
        assert_eq!(series.time, vec![0.0, 2.0]);
        assert_eq!(series.value, vec![0.5, 1.5]);
    }

    #[test]
    fn list_run_folders_sorts_and_excludes_output() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["n-2.0", "output", "n-1.0"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let folders = list_run_folders(dir.path()).unwrap();
        assert_eq!(folders, vec!["n-1.0", "n-2.0"]);
    }

    #[test]
    fn list_run_folders_rejects_missing_root() {
        assert!(list_run_folders(Path::new("/no/such/root")).is_err());
    }

    #[test]
    fn find_pressure_file_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        std::fs::create_dir(&results).unwrap();
        File::create(results.join("Total-Pressure.DAT")).unwrap();

        let found = find_pressure_file(dir.path()).unwrap();
        assert!(found.ends_with("Total-Pressure.DAT"));
    }
}
