use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use crate::analysis::diffusion::ArrheniusFit;
use crate::analysis::regression::RegressionResult;
use crate::color::{contrast_pair, ColorCycle};
use crate::data::model::{Series, Window};

/// Dark slate used for target guide lines.
const GUIDE_COLOR: RGBColor = RGBColor(0x2c, 0x3e, 0x50);

// ---------------------------------------------------------------------------
// Range helpers
// ---------------------------------------------------------------------------

fn bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    (min <= max).then_some((min, max))
}

/// Pad a range by `frac` on each side, widening degenerate ranges so the
/// chart axes never collapse.
fn padded(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = max - min;
    if span == 0.0 {
        (min - 1.0, max + 1.0)
    } else {
        (min - span * frac, max + span * frac)
    }
}

fn draw_empty_note(path: &Path, note: &str) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    root.draw(&Text::new(
        note.to_string(),
        (320, 240),
        ("sans-serif", 20).into_font().color(&BLACK),
    ))?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-run time series
// ---------------------------------------------------------------------------

/// Plot one run's raw values against the sample index.
pub fn plot_run_series(path: &Path, series: &Series, title: &str, base: RGBColor) -> Result<()> {
    if series.is_empty() {
        return draw_empty_note(path, "No samples");
    }

    let (data_color, _) = contrast_pair(base);
    let (y_min, y_max) = bounds(series.value.iter().copied()).unwrap();
    let (y_min, y_max) = padded(y_min, y_max, 0.05);
    let x_max = (series.len() - 1).max(1) as f64;

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Data Index")
        .y_desc("Pressure")
        .draw()?;

    chart.draw_series(LineSeries::new(
        series
            .value
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v)),
        data_color.mix(0.6).stroke_width(1),
    ))?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pressure fit and prediction chart
// ---------------------------------------------------------------------------

/// Scatter the per-run averages, draw the fitted line, and mark the target
/// pressure and the predicted parameter with guide lines.
pub fn plot_pressure_fit(
    path: &Path,
    normal: &[(f64, f64)],
    verify: &[(f64, f64)],
    fit: &RegressionResult,
    target_pressure: f64,
    predicted_parameter: f64,
    base: RGBColor,
) -> Result<()> {
    if normal.is_empty() {
        return draw_empty_note(path, "No fit data");
    }

    let (data_color, fit_color) = contrast_pair(base);

    let params = normal
        .iter()
        .chain(verify)
        .map(|p| p.0)
        .chain([predicted_parameter]);
    let (x_min, x_max) = bounds(params).unwrap();
    let (x_min, x_max) = padded(x_min, x_max, 0.05);

    let values = normal
        .iter()
        .chain(verify)
        .map(|p| p.1)
        .chain([target_pressure]);
    let (y_min, y_max) = bounds(values).unwrap();
    let (y_min, y_max) = padded(y_min, y_max, 0.1);

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Pressure vs Parameter", ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Parameter Value")
        .y_desc("Average Pressure")
        .draw()?;

    chart
        .draw_series(
            normal
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, data_color.filled())),
        )?
        .label("Average Values")
        .legend(move |(x, y)| Circle::new((x + 10, y), 5, data_color.filled()));

    if !verify.is_empty() {
        chart
            .draw_series(
                verify
                    .iter()
                    .map(|&(x, y)| Cross::new((x, y), 5, GUIDE_COLOR.stroke_width(2))),
            )?
            .label("Verify Runs")
            .legend(|(x, y)| Cross::new((x + 10, y), 5, GUIDE_COLOR.stroke_width(2)));
    }

    let slope = fit.slope;
    let intercept = fit.intercept;
    let steps = 200;
    let step = (x_max - x_min) / steps as f64;
    chart
        .draw_series(DashedLineSeries::new(
            (0..=steps).map(|i| {
                let x = x_min + i as f64 * step;
                (x, slope * x + intercept)
            }),
            8,
            4,
            fit_color.stroke_width(2),
        ))?
        .label(format!("Fit: y = {slope:.4}x {intercept:+.4}"))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fit_color));

    chart
        .draw_series(LineSeries::new(
            [(x_min, target_pressure), (x_max, target_pressure)],
            GUIDE_COLOR.mix(0.7).stroke_width(1),
        ))?
        .label(format!("Target Pressure: {target_pressure}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GUIDE_COLOR));

    chart.draw_series(LineSeries::new(
        [(predicted_parameter, y_min), (predicted_parameter, y_max)],
        GUIDE_COLOR.mix(0.7).stroke_width(1),
    ))?
    .label(format!("Predicted Parameter: {predicted_parameter:.4}"))
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GUIDE_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .border_style(GUIDE_COLOR)
        .draw()?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// MSD curves per temperature group
// ---------------------------------------------------------------------------

/// One MSD curve on a group chart, with optional fit coefficients.
pub struct MsdCurve {
    pub label: String,
    pub series: Series,
    /// (slope, intercept) drawn dashed over the fit window when present.
    pub fit: Option<(f64, f64)>,
}

/// Plot a temperature group's MSD curves with their fit overlays.
pub fn plot_msd_group(
    path: &Path,
    curves: &[MsdCurve],
    fit_window: Window,
    colors: &mut ColorCycle,
) -> Result<()> {
    let t_bounds = bounds(curves.iter().flat_map(|c| c.series.time.iter().copied()));
    let v_bounds = bounds(curves.iter().flat_map(|c| c.series.value.iter().copied()));
    let (Some((t_min, t_max)), Some((v_min, v_max))) = (t_bounds, v_bounds) else {
        return draw_empty_note(path, "No MSD data");
    };
    // Time axis spans the data exactly; only a degenerate span is widened.
    let (t_min, t_max) = if t_min == t_max {
        (t_min - 1.0, t_max + 1.0)
    } else {
        (t_min, t_max)
    };
    let (v_min, v_max) = padded(v_min, v_max, 0.05);

    let root = BitMapBackend::new(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t_min..t_max, v_min..v_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (ps)")
        .y_desc("MSD (Å²)")
        .draw()?;

    for curve in curves {
        let base = colors.next_color();
        let (data_color, fit_color) = contrast_pair(base);

        chart
            .draw_series(LineSeries::new(
                curve.series.samples(),
                data_color.mix(0.4).stroke_width(1),
            ))?
            .label(curve.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], data_color));

        if let Some((slope, intercept)) = curve.fit {
            let start = fit_window.start.max(t_min);
            let end = fit_window.end.min(t_max);
            if start < end {
                chart
                    .draw_series(DashedLineSeries::new(
                        [
                            (start, slope * start + intercept),
                            (end, slope * end + intercept),
                        ],
                        8,
                        4,
                        fit_color.stroke_width(2),
                    ))?
                    .label(format!("{} fit: y = {slope:.5}x {intercept:+.4}", curve.label))
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], fit_color)
                    });
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .draw()?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Arrhenius chart
// ---------------------------------------------------------------------------

/// Plot mean ln(D) against 1000/T with the fitted Arrhenius line.
pub fn plot_arrhenius(path: &Path, points: &[(f64, f64)], fit: &ArrheniusFit) -> Result<()> {
    if points.is_empty() {
        return draw_empty_note(path, "No data available");
    }

    let (x_min, x_max) = bounds(points.iter().map(|p| p.0)).unwrap();
    let (x_min, x_max) = padded(x_min, x_max, 0.05);
    let fitted = points
        .iter()
        .map(|p| p.1)
        .chain([fit.slope * x_min + fit.intercept, fit.slope * x_max + fit.intercept]);
    let (y_min, y_max) = bounds(fitted).unwrap();
    let (y_min, y_max) = padded(y_min, y_max, 0.1);

    let root = BitMapBackend::new(path, (900, 650)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Arrhenius Plot", ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("1000/T (K⁻¹)")
        .y_desc("ln(D) (m²/s)")
        .draw()?;

    let point_color = RGBColor(0x2c, 0x5f, 0x94);
    let line_color = RGBColor(0x97, 0xcc, 0x04);

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, point_color.stroke_width(2))),
        )?
        .label("Mean ln(D)")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, point_color.stroke_width(2)));

    let slope = fit.slope;
    let intercept = fit.intercept;
    let steps = 100;
    let step = (x_max - x_min) / steps as f64;
    chart
        .draw_series(DashedLineSeries::new(
            (0..=steps).map(|i| {
                let x = x_min + i as f64 * step;
                (x, slope * x + intercept)
            }),
            8,
            4,
            line_color.stroke_width(2),
        ))?
        .label(format!(
            "ln(D) = {slope:.2}·(1000/T) {intercept:+.2}, R² = {:.3}",
            fit.r_squared
        ))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .draw()?;

    root.present()?;
    Ok(())
}
