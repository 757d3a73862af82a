use nalgebra::DMatrix;

/// Correlator values laid out as (time-separation index) x (relative config index).
///
/// This is the uncorrected pre-image. Correction never mutates it; see
/// [`TsepConfigMatrix::to_corrected`].
#[derive(Clone, Debug, PartialEq)]
pub struct TsepConfigMatrix {
    data: DMatrix<f64>,
}

/// Sign-corrected counterpart of a [`TsepConfigMatrix`].
///
/// Only the boundary corrector builds one, and nothing accepts it as input for another
/// correction pass, so the one-shot transform cannot be applied twice.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryCorrectedMatrix {
    data: DMatrix<f64>,
}

impl TsepConfigMatrix {
    pub fn zeros(tseps: usize, configs: usize) -> Self {
        Self {
            data: DMatrix::zeros(tseps, configs),
        }
    }

    /// Build from per-config columns. All columns must have the same length.
    #[cfg(test)]
    pub fn from_columns(columns: &[Vec<f64>]) -> Self {
        let configs = columns.len();
        let tseps = columns.first().map_or(0, |c| c.len());
        let mut data = DMatrix::zeros(tseps, configs);
        for (j, column) in columns.iter().enumerate() {
            debug_assert_eq!(column.len(), tseps);
            for (i, &v) in column.iter().enumerate() {
                data[(i, j)] = v;
            }
        }
        Self { data }
    }

    pub fn tseps(&self) -> usize {
        self.data.nrows()
    }

    pub fn configs(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, tsep: usize, config: usize) -> f64 {
        self.data[(tsep, config)]
    }

    pub fn set(&mut self, tsep: usize, config: usize, value: f64) {
        self.data[(tsep, config)] = value;
    }

    pub fn column(&self, config: usize) -> Vec<f64> {
        self.data.column(config).iter().copied().collect()
    }

    /// Deep copy of the values into a corrected-matrix buffer, still unflipped.
    pub(crate) fn to_corrected(&self) -> BoundaryCorrectedMatrix {
        BoundaryCorrectedMatrix {
            data: self.data.clone(),
        }
    }

    pub(crate) fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

impl BoundaryCorrectedMatrix {
    pub fn tseps(&self) -> usize {
        self.data.nrows()
    }

    pub fn configs(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, tsep: usize, config: usize) -> f64 {
        self.data[(tsep, config)]
    }

    pub fn column(&self, config: usize) -> Vec<f64> {
        self.data.column(config).iter().copied().collect()
    }

    /// Negate the entries of `config` from separation index `from` to the end.
    pub(crate) fn negate_tail(&mut self, config: usize, from: usize) {
        for value in self.data.column_mut(config).iter_mut().skip(from) {
            *value = -*value;
        }
    }

    pub(crate) fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, tsep: usize, config: usize, value: f64) {
        self.data[(tsep, config)] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrected_copy_does_not_alias_the_pre_image() {
        let original = TsepConfigMatrix::from_columns(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let mut corrected = original.to_corrected();
        corrected.negate_tail(1, 1);
        assert_eq!(original.column(1), vec![4.0, 5.0, 6.0]);
        assert_eq!(corrected.column(1), vec![4.0, -5.0, -6.0]);
        assert_eq!(corrected.column(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_columns_is_tsep_major_by_config() {
        let m = TsepConfigMatrix::from_columns(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!(m.tseps(), 2);
        assert_eq!(m.configs(), 3);
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m.get(0, 1), 3.0);
    }
}
