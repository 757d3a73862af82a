use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::CorrError;
use crate::matrix::{BoundaryCorrectedMatrix, TsepConfigMatrix};

/// One (raw time-separation label, value) row of a correlator file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub tsep: f64,
    pub value: f64,
}

/// Flat samples of one correlator type, all configs back to back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSeries {
    pub samples: Vec<Sample>,
}

impl RawSeries {
    #[cfg(test)]
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            samples: pairs
                .iter()
                .map(|&(tsep, value)| Sample { tsep, value })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Absolute config id -> `[tsrc00, tsrc01]`.
#[derive(Clone, Debug, Default)]
pub struct SourceTimeTable {
    rows: Vec<(i64, [i64; 2])>,
    by_id: HashMap<i64, usize>,
}

impl SourceTimeTable {
    /// Index the rows by absolute id. An id listed twice is a lookup error, not an override.
    pub fn from_rows(rows: Vec<(i64, [i64; 2])>) -> Result<Self, CorrError> {
        let mut by_id = HashMap::with_capacity(rows.len());
        for (pos, &(id, tsrc)) in rows.iter().enumerate() {
            match by_id.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(pos);
                }
                Entry::Occupied(slot) => {
                    let first = rows[*slot.get()].1;
                    return Err(CorrError::lookup(
                        id,
                        format!(
                            "listed twice in source-time table (rows {} and {}: {first:?} vs {tsrc:?})",
                            slot.get() + 1,
                            pos + 1
                        ),
                    ));
                }
            }
        }
        Ok(Self { rows, by_id })
    }

    pub fn get(&self, absolute: i64) -> Option<[i64; 2]> {
        self.by_id.get(&absolute).map(|&pos| self.rows[pos].1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn id_range(&self) -> Option<(i64, i64)> {
        let min = self.rows.iter().map(|r| r.0).min()?;
        let max = self.rows.iter().map(|r| r.0).max()?;
        Some((min, max))
    }
}

fn open(path: &Path) -> Result<BufReader<File>, CorrError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CorrError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    path: &Path,
    line: usize,
    what: &str,
) -> Result<T, CorrError> {
    let text = field.ok_or_else(|| CorrError::Parse {
        path: path.to_path_buf(),
        line,
        detail: format!("missing {what} column"),
    })?;
    text.parse::<T>().map_err(|_| CorrError::Parse {
        path: path.to_path_buf(),
        line,
        detail: format!("invalid {what} '{text}'"),
    })
}

/// Read a correlator file: one header row, then `tsep value [...]` rows.
pub fn read_raw_series(path: &Path) -> Result<RawSeries, CorrError> {
    let reader = open(path)?;
    let mut samples = Vec::new();
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line.map_err(|source| CorrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line_no = idx + 1;
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else { continue };
        let tsep = parse_field::<f64>(Some(first), path, line_no, "time separation")?;
        let value = parse_field::<f64>(fields.next(), path, line_no, "correlator value")?;
        samples.push(Sample { tsep, value });
    }
    Ok(RawSeries { samples })
}

/// Read the source-time file: `cnfg_abs tsrc00 tsrc01` integer rows, no header.
pub fn read_source_times(path: &Path) -> Result<SourceTimeTable, CorrError> {
    let reader = open(path)?;
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CorrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line_no = idx + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let mut fields = content.split_whitespace();
        let id = parse_field::<i64>(fields.next(), path, line_no, "config id")?;
        let t00 = parse_field::<i64>(fields.next(), path, line_no, "t00 source time")?;
        let t01 = parse_field::<i64>(fields.next(), path, line_no, "t01 source time")?;
        rows.push((id, [t00, t01]));
    }
    SourceTimeTable::from_rows(rows)
}

/// Write the corrected matrix back out in the raw layout (header, then per-config blocks).
pub fn write_corrected_series(
    path: &Path,
    label: &str,
    tsep_labels: &TsepConfigMatrix,
    corrected: &BoundaryCorrectedMatrix,
) -> Result<(), CorrError> {
    let io_err = |source| CorrError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "# {label} tsep corr (antiperiodic sign applied)").map_err(io_err)?;
    for config in 0..corrected.configs() {
        for tsep in 0..corrected.tseps() {
            writeln!(
                writer,
                "{} {:.17e}",
                tsep_labels.get(tsep, config),
                corrected.get(tsep, config)
            )
            .map_err(io_err)?;
        }
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn raw_series_skips_header_and_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tsep corr").unwrap();
        writeln!(file, "0 0.0").unwrap();
        writeln!(file, "1 -1.5e-3 7").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "2 4.25").unwrap();
        let series = read_raw_series(file.path()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.samples[1], Sample { tsep: 1.0, value: -1.5e-3 });
        assert_eq!(series.samples[2].value, 4.25);
    }

    #[test]
    fn raw_series_reports_bad_value_with_line_number() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header").unwrap();
        writeln!(file, "0 1.0").unwrap();
        writeln!(file, "1 nope").unwrap();
        let err = read_raw_series(file.path()).unwrap_err();
        match err {
            CorrError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn source_times_are_keyed_by_absolute_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# cnfg tsrc00 tsrc01").unwrap();
        writeln!(file, "10 5 69").unwrap();
        writeln!(file, "20 127 63").unwrap();
        let table = read_source_times(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(20), Some([127, 63]));
        assert_eq!(table.get(30), None);
        assert_eq!(table.id_range(), Some((10, 20)));
    }

    #[test]
    fn repeated_config_id_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10 5 5").unwrap();
        writeln!(file, "20 6 6").unwrap();
        writeln!(file, "10 120 120").unwrap();
        let err = read_source_times(file.path()).unwrap_err();
        match err {
            CorrError::Lookup { absolute, detail } => {
                assert_eq!(absolute, 10);
                assert!(detail.contains("rows 1 and 3"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source_times(&dir.path().join("absent.dat")).unwrap_err();
        assert!(matches!(err, CorrError::Io { .. }));
    }

    #[test]
    fn corrected_dump_has_one_row_per_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.dat");
        let labels = TsepConfigMatrix::from_columns(&[vec![2.0, 3.0], vec![2.0, 3.0]]);
        let values = TsepConfigMatrix::from_columns(&[vec![1.0, -2.0], vec![0.5, 0.25]]);
        write_corrected_series(&path, "t00_fwd_row0", &labels, &values.to_corrected()).unwrap();

        let reread = read_raw_series(&path).unwrap();
        assert_eq!(reread.len(), 4);
        assert_eq!(reread.samples[1], Sample { tsep: 3.0, value: -2.0 });
        assert_eq!(reread.samples[2], Sample { tsep: 2.0, value: 0.5 });
    }
}
