//! Source line counter
//!
//! Walks the given paths, identifies each file's language and reports blank,
//! comment and code line totals per language.

use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clocrs::counter::{self, CountRun};
use clocrs::discovery::{self, WalkOptions};
use clocrs::error::Result;
use clocrs::metrics::Throughput;
use clocrs::report::{self, OutputFormat};
use colored::*;
use log::debug;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Count blank, comment and code lines per language",
    long_about = "Count blank, comment and code lines per language. Languages are identified by file name, extension or shebang; binary files are skipped."
)]
struct Args {
    /// Files or directories to count
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Directory name to skip (repeatable), in addition to .git, .svn, .hg,
    /// __pycache__, node_modules and vendor
    #[arg(long = "exclude-dir", action = ArgAction::Append)]
    exclude_dir: Vec<String>,

    /// Only count files whose name or relative path matches this glob
    #[arg(short = 'f', long)]
    filespec: Option<String>,

    #[arg(short = 'd', long, default_value = "100")]
    max_depth: usize,

    #[arg(short = 'n', long)]
    non_recursive: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print one CSV row per file instead of the per-language report
    #[arg(long)]
    by_file: bool,

    /// Worker threads
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    #[arg(long)]
    no_color: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    run_with_args(std::env::args_os())
}

fn run_with_args<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::parse_from(args);
    init_logging(args.verbose);
    if args.no_color {
        control::set_override(false);
    }
    let stdout = io::stdout();
    match run(&args, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {}", "error".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let options = WalkOptions {
        max_depth: args.max_depth,
        non_recursive: args.non_recursive,
        ..WalkOptions::default()
    }
    .exclude(args.exclude_dir.iter().cloned())
    .with_filespec(args.filespec.as_deref())?;

    let throughput = Throughput::new();
    let found = discovery::discover(&args.paths, &options)?;
    debug!(
        "{} files to examine, {} unreadable entries",
        found.files.len(),
        found.errors
    );

    let run = count_with_jobs(&found.files, &throughput, args.jobs)?;
    let rendered = if args.by_file {
        report::render_by_file(&run.reports)
    } else {
        report::render(args.format, &run.aggregate, &throughput.snapshot())?
    };
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn count_with_jobs(files: &[PathBuf], throughput: &Throughput, jobs: Option<usize>) -> Result<CountRun> {
    match jobs {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            Ok(pool.install(|| counter::count_all(files, throughput)))
        }
        None => Ok(counter::count_all(files, throughput)),
    }
}
