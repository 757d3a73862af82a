use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::args::{
    parse_type_list, Args, DEFAULT_CFG_START, DEFAULT_CFG_STRIDE, DEFAULT_MAXTSEP,
    DEFAULT_MINTSEP, DEFAULT_TOTCONFIGS, DEFAULT_TOTT,
};
use crate::corrtype::DEFAULT_TYPES;
use crate::reshape::TsepWindow;
use crate::resolve::ConfigLayout;
use crate::utils::DynError;

/// Values read from a `key = value` parameter file. Absent keys stay `None`.
#[derive(Debug, Clone, Default)]
pub struct ParamFile {
    pub totconfigs: Option<usize>,
    pub mintsep: Option<i64>,
    pub maxtsep: Option<i64>,
    pub skip: Option<usize>,
    pub cfg_start: Option<i64>,
    pub cfg_stride: Option<i64>,
    pub tott: Option<i64>,
    pub types: Option<Vec<String>>,
    pub corr_dir: Option<PathBuf>,
    pub source_times: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

fn parse_optional<T>(params: &HashMap<String, String>, keys: &[&str]) -> Result<Option<T>, DynError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    for key in keys {
        if let Some(value) = params.get(*key) {
            return Ok(Some(value.trim().parse::<T>().map_err(|e| {
                format!("parameter '{key}' = '{value}': {e}")
            })?));
        }
    }
    Ok(None)
}

fn optional_path(params: &HashMap<String, String>, keys: &[&str], base: &Path) -> Option<PathBuf> {
    keys.iter().find_map(|key| params.get(*key)).map(|value| {
        let path = PathBuf::from(value);
        if path.is_relative() {
            base.join(path)
        } else {
            path
        }
    })
}

/// Parse a parameter file. Keys are case-insensitive and ignore `_`/`-`; relative paths are
/// taken relative to the file's directory.
pub fn parse_param_file(path: &Path) -> Result<ParamFile, DynError> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);
    let mut params = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.splitn(2, '#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(index) = line.find('=') {
            let (key, value) = line.split_at(index);
            let key = key.trim().to_ascii_lowercase().replace(['_', '-'], "");
            let value = value
                .trim_start_matches('=')
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            params.insert(key, value);
        }
    }
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    Ok(ParamFile {
        totconfigs: parse_optional(&params, &["totconfigs", "nconfigs"])?,
        mintsep: parse_optional(&params, &["mintsep", "tsepmin"])?,
        maxtsep: parse_optional(&params, &["maxtsep", "tsepmax"])?,
        skip: parse_optional(&params, &["skip", "skiprows"])?,
        cfg_start: parse_optional(&params, &["cfgstart", "cnfgabsstart", "start"])?,
        cfg_stride: parse_optional(&params, &["cfgstride", "cnfgabsinterval", "stride"])?,
        tott: parse_optional(&params, &["tott", "nt"])?,
        types: params.get("types").map(|v| parse_type_list(v)),
        corr_dir: optional_path(&params, &["corrdir", "data"], base),
        source_times: optional_path(&params, &["sourcetimes", "tsrcfile"], base),
        output: optional_path(&params, &["output", "outdir"], base),
    })
}

/// Fully resolved run parameters.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub types: Vec<String>,
    pub window: TsepWindow,
    pub layout: ConfigLayout,
    pub tott: i64,
    pub corr_dir: PathBuf,
    pub source_times: PathBuf,
    pub output: PathBuf,
}

impl RunParams {
    /// Merge command line, parameter file and defaults, in that order of precedence.
    pub fn resolve(args: &Args, file: Option<&ParamFile>) -> Result<Self, DynError> {
        let file = file.cloned().unwrap_or_default();

        let totconfigs = args.totconfigs.or(file.totconfigs).unwrap_or(DEFAULT_TOTCONFIGS);
        let mintsep = args.mintsep.or(file.mintsep).unwrap_or(DEFAULT_MINTSEP);
        let maxtsep = args.maxtsep.or(file.maxtsep).unwrap_or(DEFAULT_MAXTSEP);
        let cfg_start = args.cfg_start.or(file.cfg_start).unwrap_or(DEFAULT_CFG_START);
        let cfg_stride = args.cfg_stride.or(file.cfg_stride).unwrap_or(DEFAULT_CFG_STRIDE);
        let tott = args.tott.or(file.tott).unwrap_or(DEFAULT_TOTT);

        if totconfigs == 0 {
            return Err("totconfigs must be at least 1".into());
        }
        if mintsep < 0 {
            return Err("mintsep must be non-negative".into());
        }
        if maxtsep < mintsep {
            return Err(format!("maxtsep ({maxtsep}) must not be below mintsep ({mintsep})").into());
        }
        if cfg_stride <= 0 {
            return Err("config stride must be at least 1".into());
        }
        if tott <= 0 {
            return Err("tott must be at least 1".into());
        }

        let mut window = TsepWindow::new(mintsep, maxtsep);
        if let Some(skip) = args.skip.or(file.skip) {
            window = window.with_skip(skip);
        }

        let types = match (args.types.as_deref(), file.types) {
            (Some(list), _) => parse_type_list(list),
            (None, Some(list)) => list,
            (None, None) => DEFAULT_TYPES.iter().map(|s| s.to_string()).collect(),
        };
        if types.is_empty() {
            return Err("no correlator types selected".into());
        }

        let corr_dir = args
            .corr_dir
            .clone()
            .or(file.corr_dir)
            .ok_or("correlator directory missing (--corr-dir or corr_dir in --params)")?;
        let source_times = args
            .source_times
            .clone()
            .or(file.source_times)
            .ok_or("source-time table missing (--source-times or source_times in --params)")?;
        let output = args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            types,
            window,
            layout: ConfigLayout {
                start: cfg_start,
                stride: cfg_stride,
                totconfigs,
            },
            tott,
            corr_dir,
            source_times,
            output,
        })
    }
}
