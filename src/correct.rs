//! Antiperiodic temporal boundary correction.
//!
//! With antiperiodic fermion boundary conditions in time, a correlator whose sink time has
//! wrapped past the lattice edge picks up a minus sign. For each config the physical sink time
//! is followed along the studied separations; from the first separation at which it leaves
//! `[0, T)` onwards, the measured values are negated.

use crate::corrtype::{CorrelatorType, Direction};
use crate::error::CorrError;
use crate::matrix::{BoundaryCorrectedMatrix, TsepConfigMatrix};
use crate::reshape::TsepWindow;
use crate::resolve::ResolvedSourceTimes;

/// Result of correcting one correlator type.
#[derive(Clone, Debug)]
pub struct Correction {
    pub matrix: BoundaryCorrectedMatrix,
    /// First flipped separation index per config, `None` if the config never wraps.
    pub crossings: Vec<Option<usize>>,
}

/// Physical sink time at separation index `s`.
pub fn sink_time(direction: Direction, tsrc: i64, mintsep: i64, s: usize) -> i64 {
    match direction {
        Direction::Forward => tsrc + mintsep + s as i64,
        Direction::Backward => tsrc - mintsep - s as i64,
    }
}

fn is_wrapped(direction: Direction, t: i64, tott: i64) -> bool {
    match direction {
        Direction::Forward => t >= tott,
        Direction::Backward => t <= -1,
    }
}

/// First separation index whose sink time lies beyond the temporal boundary.
///
/// Returns `Err((first, back))` if the sink time comes back inside the lattice at `back`
/// after wrapping at `first`; the sign model only allows a single crossing.
pub fn find_crossing(
    direction: Direction,
    tsrc: i64,
    mintsep: i64,
    tseps: usize,
    tott: i64,
) -> Result<Option<usize>, (usize, usize)> {
    let first = (0..tseps).find(|&s| is_wrapped(direction, sink_time(direction, tsrc, mintsep, s), tott));
    let Some(first) = first else {
        return Ok(None);
    };
    if let Some(back) = (first..tseps).find(|&s| {
        let t = sink_time(direction, tsrc, mintsep, s);
        !is_wrapped(direction, t, tott)
    }) {
        return Err((first, back));
    }
    Ok(Some(first))
}

/// Apply the antiperiodic sign rule to every config column of one type.
///
/// Backward correlators are negated as a whole first (sign convention of the backward
/// contraction), then the wrapped tail of each column is negated. The input matrix is left
/// untouched; the result lives in a fresh buffer.
pub fn correct_boundary(
    matrix: &TsepConfigMatrix,
    ty: &CorrelatorType,
    source_times: &ResolvedSourceTimes,
    tott: i64,
    window: &TsepWindow,
) -> Result<Correction, CorrError> {
    let tseps = matrix.tseps();
    if tseps != window.tseps() {
        return Err(CorrError::shape(
            ty.label(),
            format!("matrix has {tseps} separations, window holds {}", window.tseps()),
        ));
    }
    if source_times.len() < matrix.configs() {
        return Err(CorrError::shape(
            ty.label(),
            format!(
                "{} configs in matrix but only {} resolved source times",
                matrix.configs(),
                source_times.len()
            ),
        ));
    }

    let mut corrected = matrix.to_corrected();
    let mut crossings = Vec::with_capacity(matrix.configs());
    for (config, resolved) in source_times.iter().take(matrix.configs()).enumerate() {
        let tsrc = resolved.tsrc[ty.tag.component()];

        if ty.direction == Direction::Backward {
            corrected.negate_tail(config, 0);
        }

        let crossing = find_crossing(ty.direction, tsrc, window.mintsep, tseps, tott).map_err(
            |(first, back)| CorrError::MultipleCrossings {
                label: ty.label().to_string(),
                config,
                first,
                back,
            },
        )?;
        if let Some(s0) = crossing {
            corrected.negate_tail(config, s0);
        }
        crossings.push(crossing);
    }

    Ok(Correction {
        matrix: corrected,
        crossings,
    })
}
