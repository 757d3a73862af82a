mod args;
mod correct;
mod corrtype;
mod error;
mod matrix;
mod params;
mod pipeline;
mod plot;
mod reshape;
mod resolve;
mod table;
mod utils;
mod validate;

use std::path::Path;

use clap::{CommandFactory, Parser};

use error::CorrError;
use params::{parse_param_file, RunParams};
use pipeline::{process_all, PassConfig, TypeOutcome};
use plot::plot_corrected_configs;
use resolve::resolve_source_times;
use table::{read_source_times, write_corrected_series};
use utils::{available_cores, format_crossing, DynError};

fn print_banner(params: &RunParams, args: &args::Args) {
    println!("Starting antiperiodic boundary correction with the following parameters:");
    println!("--------------------------------------------------");
    println!("  corr-dir:     {}", params.corr_dir.display());
    println!("  source-times: {}", params.source_times.display());
    println!("  output:       {}", params.output.display());
    println!("  totconfigs:   {}", params.layout.totconfigs);
    println!(
        "  tsep:         {}..={} ({} seps, {} skipped rows, period {})",
        params.window.mintsep,
        params.window.maxtsep,
        params.window.tseps(),
        params.window.skip,
        params.window.period()
    );
    println!(
        "  cnfg_abs:     {} + configi * {}",
        params.layout.start, params.layout.stride
    );
    println!("  tott:         {} (last slice t={})", params.tott, params.tott - 1);
    println!("  cpu:          {}", args.cpu);
    println!("  plots:        {}", if args.no_plot { "off" } else { "png" });
    println!("  dump:         {}", if args.dump { "on" } else { "off" });
    println!("--------------------------------------------------");
    println!("The correlators are:");
    for label in &params.types {
        println!("  corr_{label}.dat");
    }
}

fn emit_outputs(outcome: &TypeOutcome, output_dir: &Path, args: &args::Args) -> Result<(), DynError> {
    let stem = outcome.ty.output_stem();
    if !args.no_plot {
        plot_corrected_configs(
            &output_dir.join(format!("{stem}.png")),
            outcome.ty.label(),
            &outcome.tsep_labels,
            &outcome.corrected,
        )?;
    }
    if args.dump {
        let path = output_dir.join(format!("{stem}.dat"));
        write_corrected_series(&path, outcome.ty.label(), &outcome.tsep_labels, &outcome.corrected)?;
        println!("[info] Wrote corrected data to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), DynError> {
    if std::env::args_os().len() == 1 {
        args::Args::command().print_help()?;
        println!();
        return Ok(());
    }

    let args = args::Args::parse();
    let param_file = match &args.params {
        Some(path) => Some(parse_param_file(path)?),
        None => None,
    };
    let params = RunParams::resolve(&args, param_file.as_ref())?;

    let available = available_cores();
    if args.cpu == 0 {
        return Err("--cpu must be at least 1".into());
    }
    if args.cpu > available {
        return Err(format!(
            "--cpu value ({}) exceeds the number of available cores ({})",
            args.cpu, available
        )
        .into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.cpu)
        .build_global()
        .map_err(|_| "Failed to initialise rayon thread pool")?;

    print_banner(&params, &args);
    std::fs::create_dir_all(&params.output)
        .map_err(|e| format!("cannot create output directory {}: {e}", params.output.display()))?;

    let table = read_source_times(&params.source_times)?;
    println!(
        "[info] Read {} source-time rows from {}",
        table.len(),
        params.source_times.display()
    );
    let source_times = resolve_source_times(&params.layout, &table, params.tott)?;

    let pass = PassConfig {
        window: &params.window,
        totconfigs: params.layout.totconfigs,
        tott: params.tott,
        source_times: &source_times,
    };
    println!("[info] The program is running...");
    let results = process_all(&params.types, &params.corr_dir, &pass);

    let mut failures: Vec<String> = Vec::new();
    let mut summary: Vec<(String, &'static str)> = Vec::with_capacity(results.len());
    for (label, result) in &results {
        match result {
            Ok(outcome) => {
                println!(
                    "[info] {label}: {} of {} configs cross the temporal boundary",
                    outcome.flipped_configs(),
                    outcome.crossings.len()
                );
                if args.debug {
                    println!(
                        "[debug] {label}: source {}, direction {}, row '{}'",
                        outcome.ty.tag.as_str(),
                        outcome.ty.direction.as_str(),
                        outcome.ty.row
                    );
                    for (crossing, resolved) in outcome.crossings.iter().zip(source_times.iter()) {
                        let config = resolved.relative;
                        let absolute = resolved.absolute;
                        let tsrc = resolved.tsrc[outcome.ty.tag.component()];
                        let edge = crossing.map_or(String::new(), |s0| {
                            format!(
                                " ({:.6e} -> {:.6e})",
                                outcome.original.get(s0, config),
                                outcome.corrected.get(s0, config)
                            )
                        });
                        println!(
                            "[debug] {label} config {config} (cnfg_abs {absolute}, tsrc {tsrc}): {}{edge}",
                            format_crossing(*crossing)
                        );
                    }
                }
                if let Err(e) = emit_outputs(outcome, &params.output, &args) {
                    eprintln!("[error] {label}: failed to write outputs: {e}");
                    failures.push(label.clone());
                }
                summary.push((label.clone(), outcome.validation.status_line()));
            }
            Err(e) => {
                eprintln!("[error] {e}");
                let status = match e {
                    CorrError::ConsistencyViolation { .. } => "ERROR",
                    _ => "failed",
                };
                summary.push((label.clone(), status));
                failures.push(label.clone());
            }
        }
    }

    println!("Magnitude check (|corrected| == |original|):");
    for (label, status) in &summary {
        println!("  {label:<16} {status}");
    }

    if !failures.is_empty() {
        return Err(format!(
            "{} of {} correlator types failed: {}",
            failures.len(),
            results.len(),
            failures.join(", ")
        )
        .into());
    }
    println!("[info] All {} correlator types corrected.", results.len());
    Ok(())
}
