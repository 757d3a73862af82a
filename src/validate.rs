use crate::error::CorrError;
use crate::matrix::{BoundaryCorrectedMatrix, TsepConfigMatrix};

/// Outcome of the sign-only check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    Ok,
    /// (separation index, config index) of every cell whose magnitude changed.
    Mismatch(Vec<(usize, usize)>),
}

impl Validation {
    #[cfg(test)]
    pub fn is_ok(&self) -> bool {
        matches!(self, Validation::Ok)
    }

    /// `ok` / `ERROR`, one line per type in the run summary.
    pub fn status_line(&self) -> &'static str {
        match self {
            Validation::Ok => "ok",
            Validation::Mismatch(_) => "ERROR",
        }
    }

    pub fn into_result(self, label: &str) -> Result<(), CorrError> {
        match self {
            Validation::Ok => Ok(()),
            Validation::Mismatch(cells) => Err(CorrError::ConsistencyViolation {
                label: label.to_string(),
                cells,
            }),
        }
    }
}

/// Compare `|original|` and `|corrected|` cell by cell.
///
/// Magnitudes are compared bitwise, so a NaN cell passes only if the corrector left its
/// payload untouched.
pub fn check_magnitudes(
    label: &str,
    original: &TsepConfigMatrix,
    corrected: &BoundaryCorrectedMatrix,
) -> Result<Validation, CorrError> {
    let (a, b) = (original.as_dmatrix(), corrected.as_dmatrix());
    if a.shape() != b.shape() {
        return Err(CorrError::shape(
            label,
            format!(
                "corrected matrix is {:?}, pre-correction matrix is {:?}",
                b.shape(),
                a.shape()
            ),
        ));
    }

    let mut cells = Vec::new();
    for config in 0..a.ncols() {
        for tsep in 0..a.nrows() {
            let before = a[(tsep, config)].abs().to_bits();
            let after = b[(tsep, config)].abs().to_bits();
            if before != after {
                cells.push((tsep, config));
            }
        }
    }
    if cells.is_empty() {
        Ok(Validation::Ok)
    } else {
        Ok(Validation::Mismatch(cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrtype::CorrelatorType;
    use crate::correct::correct_boundary;
    use crate::reshape::TsepWindow;
    use crate::resolve::ResolvedSourceTimes;

    fn sample_matrix() -> TsepConfigMatrix {
        TsepConfigMatrix::from_columns(&[
            vec![3.0e-2, -1.5e-2, 7.0e-3],
            vec![2.9e-2, -1.4e-2, 6.5e-3],
            vec![3.1e-2, 1.6e-2, -7.2e-3],
        ])
    }

    #[test]
    fn corrected_matrix_with_crossings_preserves_magnitudes() {
        let original = sample_matrix();
        let ty = CorrelatorType::from_label("t01_bwd_row0").unwrap();
        let window = TsepWindow::new(2, 4);
        let times = ResolvedSourceTimes::uniform(&[1, 3, 9]);
        let correction = correct_boundary(&original, &ty, &times, 10, &window).unwrap();
        assert!(correction.crossings.iter().any(Option::is_some));

        let validation = check_magnitudes(ty.label(), &original, &correction.matrix).unwrap();
        assert_eq!(validation, Validation::Ok);
        assert_eq!(validation.status_line(), "ok");
        assert!(validation.into_result(ty.label()).is_ok());
    }

    #[test]
    fn changed_magnitude_is_reported_per_cell() {
        let original = sample_matrix();
        let mut corrected = original.to_corrected();
        corrected.set(1, 2, 0.5);
        corrected.set(0, 0, -3.0e-2);

        let validation = check_magnitudes("t00_fwd_row0", &original, &corrected).unwrap();
        assert_eq!(validation, Validation::Mismatch(vec![(1, 2)]));
        assert_eq!(validation.status_line(), "ERROR");
        let err = validation.into_result("t00_fwd_row0").unwrap_err();
        assert!(matches!(err, CorrError::ConsistencyViolation { ref cells, .. } if cells == &[(1, 2)]));
    }

    #[test]
    fn shape_difference_is_a_shape_mismatch() {
        let original = sample_matrix();
        let other = TsepConfigMatrix::from_columns(&[vec![1.0, 2.0]]).to_corrected();
        let err = check_magnitudes("t00_fwd_row0", &original, &other).unwrap_err();
        assert!(matches!(err, CorrError::ShapeMismatch { .. }));
    }
}
