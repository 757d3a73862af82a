use std::path::Path;

use plotters::prelude::*;

use crate::matrix::{BoundaryCorrectedMatrix, TsepConfigMatrix};
use crate::utils::DynError;

const PLOT_FONT_SCALE: f64 = 1.2;
const PANEL_SIZE: (u32, u32) = (360, 270);
const MAX_PANEL_COLUMNS: usize = 10;

fn scaled_font_size(base: i32) -> i32 {
    ((base as f64) * PLOT_FONT_SCALE).round() as i32
}

fn scaled_area_size(base: i32) -> i32 {
    ((base as f64) * PLOT_FONT_SCALE).round() as i32
}

/// Grid shape (rows, columns) for `panels` panels.
pub fn panel_grid(panels: usize) -> (usize, usize) {
    let cols = panels.clamp(1, MAX_PANEL_COLUMNS);
    let rows = panels.max(1).div_ceil(cols);
    (rows, cols)
}

/// Finite min/max of `values`, padded so flat data still gets a usable axis.
fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let span = max - min;
    let pad = if span > 0.0 {
        0.05 * span
    } else if min != 0.0 {
        0.05 * min.abs()
    } else {
        1.0
    };
    Some((min - pad, max + pad))
}

/// Render one scatter panel per config (corrected value vs. raw time separation) into a
/// single per-type PNG document.
pub fn plot_corrected_configs(
    filename: &Path,
    label: &str,
    tsep_labels: &TsepConfigMatrix,
    corrected: &BoundaryCorrectedMatrix,
) -> Result<(), DynError> {
    let configs = corrected.configs();
    if configs == 0 || corrected.tseps() == 0 {
        return Err("No data points to plot".into());
    }
    if tsep_labels.configs() != configs || tsep_labels.tseps() != corrected.tseps() {
        return Err("Time-separation labels do not match the corrected matrix shape".into());
    }

    let (rows, cols) = panel_grid(configs);
    let size = (PANEL_SIZE.0 * cols as u32, PANEL_SIZE.1 * rows as u32);
    let root = BitMapBackend::new(filename, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((rows, cols));

    for (config, panel) in panels.iter().enumerate().take(configs) {
        let xs = tsep_labels.column(config);
        let ys = corrected.column(config);
        let (x_min, x_max) = padded_range(xs.iter().copied()).ok_or("Failed to determine tsep range")?;
        let (y_min, y_max) = match padded_range(ys.iter().copied()) {
            Some(range) => range,
            None => {
                println!("[warn] {label} config {config}: no finite values to plot");
                continue;
            }
        };

        let mut chart = ChartBuilder::on(panel)
            .caption(
                format!("{label} config{config}"),
                ("sans-serif", scaled_font_size(12)).into_font(),
            )
            .margin(6)
            .x_label_area_size(scaled_area_size(22))
            .y_label_area_size(scaled_area_size(50))
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("tsep")
            .x_labels(6)
            .y_labels(5)
            .label_style(("sans-serif", scaled_font_size(9)).into_font())
            .axis_desc_style(("sans-serif", scaled_font_size(10)).into_font())
            .draw()?;

        chart.draw_series(
            xs.iter()
                .zip(ys.iter())
                .filter(|(_, y)| y.is_finite())
                .map(|(&x, &y)| Circle::new((x, y), 2, BLUE.filled())),
        )?;
    }

    root.present()?;
    println!("[plot] Wrote {} config panels to {}", configs, filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_wraps_after_ten_columns() {
        assert_eq!(panel_grid(1), (1, 1));
        assert_eq!(panel_grid(3), (1, 3));
        assert_eq!(panel_grid(10), (1, 10));
        assert_eq!(panel_grid(101), (11, 10));
    }

    #[test]
    fn flat_series_still_gets_a_range() {
        let (lo, hi) = padded_range([2.0, 2.0].into_iter()).unwrap();
        assert!((lo - 1.9).abs() < 1e-12 && (hi - 2.1).abs() < 1e-12);
        assert_eq!(padded_range([0.0].into_iter()), Some((-1.0, 1.0)));
        assert_eq!(padded_range([f64::NAN].into_iter()), None);
        let (lo, hi) = padded_range([-1.0, 3.0].into_iter()).unwrap();
        assert!((lo + 1.2).abs() < 1e-12 && (hi - 3.2).abs() < 1e-12);
    }

    #[test]
    fn mismatched_label_shape_is_rejected() {
        let labels = TsepConfigMatrix::from_columns(&[vec![2.0, 3.0]]);
        let values = TsepConfigMatrix::from_columns(&[vec![1.0, 2.0], vec![1.0, 2.0]]);
        let dir = tempfile::tempdir().unwrap();
        let err = plot_corrected_configs(
            &dir.path().join("x.png"),
            "t00_fwd_row0",
            &labels,
            &values.to_corrected(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("shape"));
    }
}
