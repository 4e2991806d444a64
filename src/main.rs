// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use code_query::{QueryMode, QueryOptions};

/// Answer questions about source code.
///
/// Modes:
///
///   • callers → who calls the function at --pos
///
///   • callees → what the function at --pos calls
///
///   • callstack → one call path from a root of the call graph to --pos
///
///   • callgraph → every function in the scope with its direct callees
///
///   • describe → what the syntax element at --pos is
///
/// Every line of plain output has the form "pos: text", where pos = "-"
/// if unknown. Supports Rust, Go, Python, JavaScript/TypeScript.
#[derive(Parser)]
#[command(
    name = "cq",
    version,
    override_usage = "cq --mode MODE [--pos FILE:OFFSET] [<path> ...]"
)]
struct Args {
    /// Files or directories that define the analysis scope
    paths: Vec<String>,

    /// Query to run
    #[arg(long, value_enum)]
    mode: QueryMode,

    /// Filename and byte offset or extent of the syntax element to query,
    /// e.g. foo.go:123 or foo.go:123-456
    #[arg(long)]
    pos: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    format: Format,

    /// Location of the analysis log file, or empty to disable logging
    #[arg(long, value_name = "FILE")]
    analysis_log: Option<PathBuf>,

    /// Write a CPU profile (flamegraph) to this file
    #[arg(long, value_name = "FILE")]
    cpuprofile: Option<PathBuf>,

    /// Call chain depth for callers/callees queries. 1 = direct only
    #[arg(short = 'd', long, default_value_t = 1)]
    depth: u32,

    /// Directory recursion limit. 0 = unlimited
    #[arg(short = 'm', long, default_value_t = 0)]
    max_depth: u32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Plain,
    Json,
}

const USAGE: &str = "\
Source code query tool.
Usage: cq --mode MODE [--pos FILE:OFFSET] [<path> ...]
Use --help to display options.

Examples:
% cq --mode describe --pos hello.go:123 hello.go
% cq --mode callers --pos 'src/lib.rs:840-851' src/
";

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                print!("{e}");
                process::exit(0);
            }
            eprintln!("{e}");
            eprint!("{USAGE}");
            process::exit(1);
        }
    };

    if args.paths.is_empty() {
        eprint!("{USAGE}");
        process::exit(1);
    }

    init_logger(args.verbose);

    // Set up the analysis log file.
    let mut trace_sink = match &args.analysis_log {
        Some(path) => match File::create(path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                eprintln!("cannot create analysis log {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => None,
    };

    // Profiling support.
    let profiler = args.cpuprofile.as_ref().map(|_| {
        match pprof::ProfilerGuard::new(100) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("cannot start cpu profiler: {e}");
                process::exit(1);
            }
        }
    });

    let cwd = std::env::current_dir()
        .expect("Failed to get current directory")
        .to_string_lossy()
        .to_string();

    let opts = QueryOptions {
        mode: args.mode,
        pos: args.pos.clone(),
        depth: args.depth,
        max_depth: args.max_depth,
    };

    // Ask the engine.
    let result = code_query::query(
        &args.paths,
        &opts,
        trace_sink.as_mut().map(|w| w as &mut dyn Write),
        &cwd,
    );

    if let Some(sink) = trace_sink.as_mut() {
        let _ = sink.flush();
    }
    if let (Some(guard), Some(path)) = (profiler, &args.cpuprofile) {
        write_cpu_profile(guard, path);
    }

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Print the result.
    match args.format {
        Format::Plain => {
            let stdout = io::stdout();
            if let Err(e) = result.write_plain(&mut stdout.lock()) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        Format::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("JSON error: {e}");
                process::exit(1);
            }
        },
    }
}

fn init_logger(verbose: bool) {
    let env = env_logger::Env::new()
        .filter_or("CQ_LOG", "warn")
        .write_style("CQ_LOG_STYLE");

    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn write_cpu_profile(guard: pprof::ProfilerGuard<'_>, path: &Path) {
    let report = match guard.report().build() {
        Ok(report) => report,
        Err(e) => {
            log::warn!("cpu profile report failed: {e}");
            return;
        }
    };
    match File::create(path) {
        Ok(file) => {
            if let Err(e) = report.flamegraph(file) {
                log::warn!("cannot write cpu profile: {e}");
            }
        }
        Err(e) => {
            eprintln!("cannot create cpu profile {}: {e}", path.display());
            process::exit(1);
        }
    }
}
