use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_TOTCONFIGS: usize = 101;
pub const DEFAULT_MINTSEP: i64 = 2;
pub const DEFAULT_MAXTSEP: i64 = 20;
pub const DEFAULT_CFG_START: i64 = 10;
pub const DEFAULT_CFG_STRIDE: i64 = 10;
pub const DEFAULT_TOTT: i64 = 128;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Apply the antiperiodic temporal boundary sign to two-point correlator data",
    long_about = None,
    arg_required_else_help = true,
    after_help = "Examples:\n  corr_bc --corr-dir Ops3_converted --source-times source_times_N451.dat\n  corr_bc --params n451.params --output signed --dump\n  corr_bc --params n451.params --types t00_fwd_row0,t00_bwd_row0 --tott 128 --no-plot\n"
)]
pub struct Args {
    /// Parameter file (key = value lines); explicit command-line options take precedence
    #[arg(long, visible_alias = "ifile")]
    pub params: Option<PathBuf>,

    /// Directory holding corr_<type>.dat files
    #[arg(long = "corr-dir", visible_alias = "data")]
    pub corr_dir: Option<PathBuf>,

    /// Source-time table (cnfg_abs tsrc00 tsrc01 per row)
    #[arg(long = "source-times", visible_alias = "tsrc")]
    pub source_times: Option<PathBuf>,

    /// Comma-separated correlator types (default: all t00/t01 fwd/bwd row0/row1)
    #[arg(long)]
    pub types: Option<String>,

    /// Number of studied configs [default: 101]
    #[arg(long)]
    pub totconfigs: Option<usize>,

    /// Smallest studied time separation [default: 2]
    #[arg(long, allow_hyphen_values = true)]
    pub mintsep: Option<i64>,

    /// Largest studied time separation [default: 20]
    #[arg(long)]
    pub maxtsep: Option<i64>,

    /// Leading rows dropped from every config block [default: mintsep]
    #[arg(long)]
    pub skip: Option<usize>,

    /// Absolute id of the first studied config [default: 10]
    #[arg(long = "cfg-start", visible_alias = "start")]
    pub cfg_start: Option<i64>,

    /// Absolute id step between studied configs [default: 10]
    #[arg(long = "cfg-stride", visible_alias = "stride")]
    pub cfg_stride: Option<i64>,

    /// Number of time slices on the lattice [default: 128]
    #[arg(long, visible_alias = "nt")]
    pub tott: Option<i64>,

    /// Output directory for corrected plots and dumps
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write corr_<type>_sign.dat with the corrected values
    #[arg(long)]
    pub dump: bool,

    /// Skip rendering the per-type plot documents
    #[arg(long)]
    pub no_plot: bool,

    /// Number of parallel worker threads
    #[arg(long, default_value_t = 2)]
    pub cpu: usize,

    /// Print the crossing index of every config
    #[arg(long)]
    pub debug: bool,
}

/// Split a comma-separated type list, dropping empty entries.
pub fn parse_type_list(list: &str) -> Vec<String> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn explicit_options_are_captured() {
        let args = Args::try_parse_from([
            "corr_bc",
            "--corr-dir",
            "data",
            "--mintsep",
            "3",
            "--tott",
            "64",
            "--types",
            "t00_fwd_row0,t01_bwd_row1",
            "--dump",
        ])
        .unwrap();
        assert_eq!(args.mintsep, Some(3));
        assert_eq!(args.tott, Some(64));
        assert_eq!(args.maxtsep, None);
        assert!(args.dump);
        assert_eq!(args.cpu, 2);
    }

    #[test]
    fn type_list_accepts_commas_and_spaces() {
        assert_eq!(
            parse_type_list("t00_fwd_row0, t00_bwd_row0,,t01_fwd_row1"),
            vec!["t00_fwd_row0", "t00_bwd_row0", "t01_fwd_row1"]
        );
    }
}
