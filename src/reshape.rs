use crate::error::CorrError;
use crate::matrix::TsepConfigMatrix;
use crate::table::RawSeries;

/// Studied time-separation window and the number of leading rows dropped per config block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TsepWindow {
    pub mintsep: i64,
    pub maxtsep: i64,
    pub skip: usize,
}

impl TsepWindow {
    /// Window whose raw extraction starts at separation 0, so `mintsep` rows are skipped.
    pub fn new(mintsep: i64, maxtsep: i64) -> Self {
        Self {
            mintsep,
            maxtsep,
            skip: mintsep.max(0) as usize,
        }
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Number of studied separations, `maxtsep - mintsep + 1`.
    pub fn tseps(&self) -> usize {
        (self.maxtsep - self.mintsep + 1).max(0) as usize
    }

    /// Raw rows per config block.
    pub fn period(&self) -> usize {
        self.tseps() + self.skip
    }
}

/// Reshaped values plus the raw separation label stored in each cell.
#[derive(Clone, Debug)]
pub struct Reshaped {
    pub values: TsepConfigMatrix,
    pub tsep_labels: TsepConfigMatrix,
}

/// Cut a flat per-type series into a tsep x config matrix.
pub fn reshape(
    label: &str,
    series: &RawSeries,
    totconfigs: usize,
    window: &TsepWindow,
) -> Result<Reshaped, CorrError> {
    if window.maxtsep < window.mintsep {
        return Err(CorrError::shape(
            label,
            format!("maxtsep {} is below mintsep {}", window.maxtsep, window.mintsep),
        ));
    }
    let period = window.period();
    let len = series.len();
    if len % period != 0 {
        return Err(CorrError::shape(
            label,
            format!("{len} samples are not a whole number of {period}-row config blocks"),
        ));
    }
    let blocks = len / period;
    if blocks != totconfigs {
        return Err(CorrError::shape(
            label,
            format!("{len} samples hold {blocks} config blocks of {period} rows, expected {totconfigs}"),
        ));
    }

    let tseps = window.tseps();
    let mut values = TsepConfigMatrix::zeros(tseps, totconfigs);
    let mut tsep_labels = TsepConfigMatrix::zeros(tseps, totconfigs);
    for (config, block) in series.samples.chunks_exact(period).enumerate() {
        for (tsep, sample) in block[window.skip..].iter().enumerate() {
            values.set(tsep, config, sample.value);
            tsep_labels.set(tsep, config, sample.tsep);
        }
    }
    Ok(Reshaped {
        values,
        tsep_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_series(configs: usize, window: &TsepWindow) -> RawSeries {
        let mut pairs = Vec::new();
        for config in 0..configs {
            for row in 0..window.period() {
                let value = if row < window.skip {
                    0.0
                } else {
                    (config * 100 + row) as f64
                };
                pairs.push((row as f64, value));
            }
        }
        RawSeries::from_pairs(&pairs)
    }

    #[test]
    fn period_counts_skipped_rows() {
        let window = TsepWindow::new(2, 20);
        assert_eq!(window.tseps(), 19);
        assert_eq!(window.period(), 21);
        assert_eq!(window.with_skip(0).period(), 19);
    }

    #[test]
    fn leading_rows_are_dropped_per_block() {
        let window = TsepWindow::new(2, 4);
        let series = block_series(3, &window);
        let reshaped = reshape("t00_fwd_row0", &series, 3, &window).unwrap();

        assert_eq!(reshaped.values.tseps(), 3);
        assert_eq!(reshaped.values.configs(), 3);
        assert_eq!(reshaped.values.column(0), vec![2.0, 3.0, 4.0]);
        assert_eq!(reshaped.values.column(2), vec![202.0, 203.0, 204.0]);
        assert_eq!(reshaped.tsep_labels.column(1), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn ragged_series_is_a_shape_mismatch() {
        let window = TsepWindow::new(2, 4);
        let mut series = block_series(3, &window);
        series.samples.pop();
        let err = reshape("t00_fwd_row0", &series, 3, &window).unwrap_err();
        assert!(matches!(err, CorrError::ShapeMismatch { ref label, .. } if label == "t00_fwd_row0"));
    }

    #[test]
    fn config_count_disagreement_is_a_shape_mismatch() {
        let window = TsepWindow::new(2, 4);
        let series = block_series(4, &window);
        let err = reshape("t01_bwd_row1", &series, 3, &window).unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let window = TsepWindow {
            mintsep: 5,
            maxtsep: 4,
            skip: 0,
        };
        let series = RawSeries::from_pairs(&[(0.0, 1.0)]);
        assert!(reshape("t00_fwd_row0", &series, 1, &window).is_err());
    }
}
