use super::model::{Series, Window};

// ---------------------------------------------------------------------------
// Time-window extraction
// ---------------------------------------------------------------------------

/// Femtoseconds per picosecond; raw data files tick at 1 fs per sample.
pub const FS_PER_PS: f64 = 1000.0;

/// Extract the picosecond window `[window.start, window.end]` from a raw
/// femtosecond series, re-basing time so the first retained sample sits at 0.
///
/// An empty intersection yields an empty series, never an error – callers
/// treat empty results as "skip this run, log a warning".
pub fn window_ps(series: &Series, window: Window) -> Series {
    let mut time = Vec::new();
    let mut value = Vec::new();

    for (t_fs, v) in series.samples() {
        let t_ps = t_fs / FS_PER_PS;
        if window.contains(t_ps) {
            time.push(t_ps);
            value.push(v);
        }
    }

    if let Some(&t0) = time.first() {
        for t in &mut time {
            *t -= t0;
        }
    }

    Series::new(time, value)
}

/// Restrict a series to `[window.start, window.end]` in its own time unit,
/// without re-basing. Used to select regression fit ranges.
pub fn clip(series: &Series, window: Window) -> Series {
    let (time, value) = series
        .samples()
        .filter(|&(t, _)| window.contains(t))
        .unzip();
    Series::new(time, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_series() -> Series {
        // 0..5 ps at 1000 fs spacing, values tracking the index.
        let time: Vec<f64> = (0..=5).map(|i| i as f64 * 1000.0).collect();
        let value: Vec<f64> = (0..=5).map(|i| i as f64 * 10.0).collect();
        Series::new(time, value)
    }

    #[test]
    fn empty_intersection_yields_empty_series() {
        let out = window_ps(&fs_series(), Window::new(100.0, 200.0).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn window_rebases_first_sample_to_zero() {
        let out = window_ps(&fs_series(), Window::new(2.0, 4.0).unwrap());
        assert_eq!(out.len(), 3);
        assert_eq!(out.time[0], 0.0);
        assert_eq!(out.time[2], 2.0);
        assert_eq!(out.value, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let out = window_ps(&fs_series(), Window::new(0.0, 5.0).unwrap());
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn clip_keeps_original_time_base() {
        let series = Series::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]);
        let out = clip(&series, Window::new(2.0, 3.0).unwrap());
        assert_eq!(out.time, vec![2.0, 3.0]);
        assert_eq!(out.value, vec![5.0, 6.0]);
    }
}
