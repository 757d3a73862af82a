use std::fmt;

use crate::error::CorrError;

/// Source operator the correlator was measured with. Selects the source-time column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceTag {
    T00,
    T01,
}

impl SourceTag {
    /// Index into the `[tsrc00, tsrc01]` pair of the source-time table.
    pub fn component(self) -> usize {
        match self {
            SourceTag::T00 => 0,
            SourceTag::T01 => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::T00 => "t00",
            SourceTag::T01 => "t01",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "fwd",
            Direction::Backward => "bwd",
        }
    }
}

/// A correlator type, classified once from its label (e.g. `t01_bwd_row1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelatorType {
    pub tag: SourceTag,
    pub direction: Direction,
    pub row: String,
    label: String,
}

impl CorrelatorType {
    #[cfg(test)]
    pub fn new(tag: SourceTag, direction: Direction, row: &str) -> Self {
        let label = format!("{}_{}_{}", tag.as_str(), direction.as_str(), row);
        Self {
            tag,
            direction,
            row: row.to_string(),
            label,
        }
    }

    /// Classify a type label by its `t00`/`t01` and `fwd`/`bwd` components.
    ///
    /// A label matching both or neither alternative of either axis is rejected; there is no
    /// default tag or direction.
    pub fn from_label(label: &str) -> Result<Self, CorrError> {
        let label = label.trim();
        let fail = |detail: &str| CorrError::Classification {
            label: label.to_string(),
            detail: detail.to_string(),
        };

        let tag = match (label.contains("t00"), label.contains("t01")) {
            (true, false) => SourceTag::T00,
            (false, true) => SourceTag::T01,
            (false, false) => return Err(fail("neither a t00 nor a t01 source")),
            (true, true) => return Err(fail("both t00 and t01 present")),
        };
        let direction = match (label.contains("fwd"), label.contains("bwd")) {
            (true, false) => Direction::Forward,
            (false, true) => Direction::Backward,
            (false, false) => return Err(fail("neither a fwd nor a bwd correlator")),
            (true, true) => return Err(fail("both fwd and bwd present")),
        };
        let row = label
            .split('_')
            .find(|part| part.starts_with("row"))
            .unwrap_or("")
            .to_string();

        Ok(Self {
            tag,
            direction,
            row,
            label: label.to_string(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the raw input file for this type.
    pub fn input_file_name(&self) -> String {
        format!("corr_{}.dat", self.label)
    }

    /// Stem shared by the corrected outputs (`.png` document, `.dat` dump).
    pub fn output_stem(&self) -> String {
        format!("corr_{}_sign", self.label)
    }
}

impl fmt::Display for CorrelatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

pub const DEFAULT_TYPES: [&str; 8] = [
    "t00_fwd_row0",
    "t00_fwd_row1",
    "t00_bwd_row0",
    "t00_bwd_row1",
    "t01_fwd_row0",
    "t01_fwd_row1",
    "t01_bwd_row0",
    "t01_bwd_row1",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_labels_classify_into_all_four_variants() {
        let types: Vec<CorrelatorType> = DEFAULT_TYPES
            .iter()
            .map(|l| CorrelatorType::from_label(l).unwrap())
            .collect();
        assert_eq!(types[0].tag, SourceTag::T00);
        assert_eq!(types[0].direction, Direction::Forward);
        assert_eq!(types[0].row, "row0");
        assert_eq!(types[3].direction, Direction::Backward);
        assert_eq!(types[5].tag, SourceTag::T01);
        assert_eq!(types[7].tag.component(), 1);
        assert_eq!(types[7].label(), "t01_bwd_row1");
    }

    #[test]
    fn missing_source_tag_is_a_classification_error() {
        let err = CorrelatorType::from_label("t02_fwd_row0").unwrap_err();
        assert!(matches!(err, CorrError::Classification { ref label, .. } if label == "t02_fwd_row0"));
    }

    #[test]
    fn missing_direction_is_a_classification_error() {
        let err = CorrelatorType::from_label("t00_xyz_row0").unwrap_err();
        assert!(matches!(err, CorrError::Classification { .. }));
        assert!(err.to_string().contains("fwd"));
    }

    #[test]
    fn ambiguous_label_is_rejected() {
        assert!(CorrelatorType::from_label("t00_t01_fwd_row0").is_err());
        assert!(CorrelatorType::from_label("t00_fwd_bwd_row0").is_err());
    }

    #[test]
    fn constructed_type_round_trips_through_its_label() {
        let ty = CorrelatorType::new(SourceTag::T01, Direction::Backward, "row1");
        assert_eq!(ty.to_string(), "t01_bwd_row1");
        assert_eq!(CorrelatorType::from_label(ty.label()).unwrap(), ty);
        assert_eq!(ty.input_file_name(), "corr_t01_bwd_row1.dat");
        assert_eq!(ty.output_stem(), "corr_t01_bwd_row1_sign");
    }
}
