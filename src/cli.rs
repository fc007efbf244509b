use crate::{constants::DEFAULT_THREADS, core::config::Mode};
use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

/// Crate version with the git description appended when the build had one.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0` - built outside a git checkout
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    match option_env!("VERGEN_GIT_DESCRIBE") {
        Some(git_describe) if !git_describe.is_empty() => {
            format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
        }
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
});

#[derive(Parser, Debug)]
#[command(name="jvcf",
          version=&**FULL_VERSION,
          about="Validating parser and classifier for variant call submissions",
          long_about = None,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Validate(ValidateArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Validate(_) => "validate",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct ValidateArgs {
    /// VCF files to validate (plain or gzip compressed)
    #[arg(
        long = "vcf",
        value_name = "VCF",
        num_args = 1..,
        required = true,
        value_parser = check_file_exists
    )]
    pub vcfs: Vec<PathBuf>,

    /// Variant class the files contain
    #[arg(long = "mode", value_name = "MODE", value_enum)]
    pub mode: Mode,

    /// Assembly report TSV (accession, db_name, ucsc_name, refseq, genbank)
    #[arg(
        long = "assembly-report",
        value_name = "TSV",
        value_parser = check_file_exists
    )]
    pub assembly_report: PathBuf,

    /// Sequence report TSV (assembly, name, ucsc_name, refseq, genbank, role, length)
    #[arg(
        long = "sequence-report",
        value_name = "TSV",
        value_parser = check_file_exists
    )]
    pub sequence_report: PathBuf,

    /// Indexed FASTA named by accession, used to compare REF bases
    #[arg(
        long = "reference",
        value_name = "FASTA",
        value_parser = check_file_exists
    )]
    pub reference: Option<PathBuf>,

    /// FASTA index of a downloaded reference, consulted for unknown chromosomes
    #[arg(
        long = "fallback-fai",
        value_name = "FAI",
        value_parser = check_file_exists,
        help_heading = "Advanced"
    )]
    pub fallback_fai: Option<PathBuf>,

    /// Directory receiving the normalized output, log and report
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = "."
    )]
    pub output_dir: PathBuf,

    /// Number of files validated in parallel
    #[arg(
        short = '@',
        value_name = "THREADS",
        default_value_t = DEFAULT_THREADS,
        value_parser = threads_in_range
    )]
    pub num_threads: usize,
}

/// Sets up `env_logger` with a level chosen by the number of `-v` flags.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match level {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse::<usize>()
        .map_err(|_| anyhow!("`{}` is not a valid thread number", s))?;
    if thread == 0 {
        return Err(anyhow!("Number of threads must be >= 1"));
    }
    Ok(thread)
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}
