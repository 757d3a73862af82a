use crate::error::CorrError;
use crate::table::SourceTimeTable;

/// How the studied configs sit in the ensemble: `cnfg_abs = start + configi * stride`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigLayout {
    pub start: i64,
    pub stride: i64,
    pub totconfigs: usize,
}

impl ConfigLayout {
    pub fn absolute_id(&self, relative: usize) -> i64 {
        self.start + relative as i64 * self.stride
    }

    /// Inverse of [`ConfigLayout::absolute_id`]; the division must be exact.
    pub fn relative_index(&self, absolute: i64) -> Result<usize, CorrError> {
        if self.stride <= 0 {
            return Err(CorrError::lookup(
                absolute,
                format!("config stride must be positive, got {}", self.stride),
            ));
        }
        let offset = absolute - self.start;
        if offset < 0 {
            return Err(CorrError::lookup(
                absolute,
                format!("below the first studied config {}", self.start),
            ));
        }
        if offset % self.stride != 0 {
            return Err(CorrError::lookup(
                absolute,
                format!(
                    "({absolute} - {}) / {} is not an integer; check the config stride",
                    self.start, self.stride
                ),
            ));
        }
        let relative = (offset / self.stride) as usize;
        if relative >= self.totconfigs {
            return Err(CorrError::lookup(
                absolute,
                format!("relative index {relative} exceeds {} studied configs", self.totconfigs),
            ));
        }
        Ok(relative)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub relative: usize,
    pub absolute: i64,
    pub tsrc: [i64; 2],
}

/// Source times for every studied config, indexed by relative config index.
#[derive(Clone, Debug, Default)]
pub struct ResolvedSourceTimes {
    configs: Vec<ResolvedConfig>,
}

impl ResolvedSourceTimes {
    #[cfg(test)]
    pub fn from_configs(configs: Vec<ResolvedConfig>) -> Self {
        Self { configs }
    }

    /// Shorthand for tests and synthetic runs: config `i` gets `tsrc` on both components.
    #[cfg(test)]
    pub fn uniform(times: &[i64]) -> Self {
        Self::from_configs(
            times
                .iter()
                .enumerate()
                .map(|(i, &t)| ResolvedConfig {
                    relative: i,
                    absolute: i as i64,
                    tsrc: [t, t],
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedConfig> {
        self.configs.iter()
    }

    #[cfg(test)]
    pub fn get(&self, relative: usize) -> Option<&ResolvedConfig> {
        self.configs.get(relative)
    }
}

/// Look up the source times of every studied config and check the absolute/relative mapping.
///
/// Both source times of a config must lie on the lattice, `0 <= tsrc < tott`.
pub fn resolve_source_times(
    layout: &ConfigLayout,
    table: &SourceTimeTable,
    tott: i64,
) -> Result<ResolvedSourceTimes, CorrError> {
    let range = table.id_range();
    let mut configs = Vec::with_capacity(layout.totconfigs);
    let mut previous: Option<i64> = None;
    for relative in 0..layout.totconfigs {
        let absolute = layout.absolute_id(relative);
        if let Some(prev) = previous {
            if absolute <= prev {
                return Err(CorrError::lookup(
                    absolute,
                    format!("absolute ids are not strictly increasing (previous {prev})"),
                ));
            }
        }
        previous = Some(absolute);

        let tsrc = table.get(absolute).ok_or_else(|| {
            let detail = match range {
                Some((lo, hi)) => format!("not in source-time table (ids {lo}..={hi})"),
                None => "source-time table is empty".to_string(),
            };
            CorrError::lookup(absolute, detail)
        })?;
        if let Some(t) = tsrc.iter().find(|&&t| !(0..tott).contains(&t)) {
            return Err(CorrError::lookup(
                absolute,
                format!("source time {t} outside the lattice [0, {tott})"),
            ));
        }
        let back = layout.relative_index(absolute)?;
        if back != relative {
            return Err(CorrError::lookup(
                absolute,
                format!("maps back to relative index {back}, expected {relative}"),
            ));
        }
        configs.push(ResolvedConfig {
            relative,
            absolute,
            tsrc,
        });
    }
    Ok(ResolvedSourceTimes { configs })
}
