use std::path::Path;

use rayon::prelude::*;

use crate::correct::{correct_boundary, Correction};
use crate::corrtype::CorrelatorType;
use crate::error::CorrError;
use crate::matrix::{BoundaryCorrectedMatrix, TsepConfigMatrix};
use crate::reshape::{reshape, TsepWindow};
use crate::resolve::ResolvedSourceTimes;
use crate::table::{read_raw_series, RawSeries};
use crate::validate::{check_magnitudes, Validation};

/// Parameters shared read-only by every per-type unit.
#[derive(Clone, Copy, Debug)]
pub struct PassConfig<'a> {
    pub window: &'a TsepWindow,
    pub totconfigs: usize,
    pub tott: i64,
    pub source_times: &'a ResolvedSourceTimes,
}

/// Everything one correlator type produces.
#[derive(Clone, Debug)]
pub struct TypeOutcome {
    pub ty: CorrelatorType,
    pub original: TsepConfigMatrix,
    pub tsep_labels: TsepConfigMatrix,
    pub corrected: BoundaryCorrectedMatrix,
    pub crossings: Vec<Option<usize>>,
    pub validation: Validation,
}

impl TypeOutcome {
    pub fn flipped_configs(&self) -> usize {
        self.crossings.iter().filter(|c| c.is_some()).count()
    }
}

/// Reshape, correct and validate one type.
///
/// A magnitude mismatch is surfaced as [`CorrError::ConsistencyViolation`], never as an
/// outcome.
pub fn process_series(
    ty: &CorrelatorType,
    series: &RawSeries,
    pass: &PassConfig<'_>,
) -> Result<TypeOutcome, CorrError> {
    let reshaped = reshape(ty.label(), series, pass.totconfigs, pass.window)?;
    let Correction { matrix, crossings } =
        correct_boundary(&reshaped.values, ty, pass.source_times, pass.tott, pass.window)?;
    let validation = check_magnitudes(ty.label(), &reshaped.values, &matrix)?;
    validation.clone().into_result(ty.label())?;

    Ok(TypeOutcome {
        ty: ty.clone(),
        original: reshaped.values,
        tsep_labels: reshaped.tsep_labels,
        corrected: matrix,
        crossings,
        validation,
    })
}

/// Classify a label, read its `corr_<label>.dat` and process it.
pub fn process_label(
    label: &str,
    corr_dir: &Path,
    pass: &PassConfig<'_>,
) -> Result<TypeOutcome, CorrError> {
    let ty = CorrelatorType::from_label(label)?;
    let series = read_raw_series(&corr_dir.join(ty.input_file_name()))?;
    process_series(&ty, &series, pass)
}

/// Process every label independently on the rayon pool; results keep the input order.
pub fn process_all(
    labels: &[String],
    corr_dir: &Path,
    pass: &PassConfig<'_>,
) -> Vec<(String, Result<TypeOutcome, CorrError>)> {
    labels
        .par_iter()
        .map(|label| (label.clone(), process_label(label, corr_dir, pass)))
        .collect()
}
