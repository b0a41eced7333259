use anyhow::{Context, Result};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use bgn::*;
use bgn_util::{read_generator_config, GenerationMode};

use clap::{Parser, ValueEnum};
use tracing::debug;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Verbosity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    Source,
    Metadata,
}

#[derive(Parser)]
struct Args {
    /// Declaration index (JSON) written by the header indexer
    #[clap(value_parser)]
    index: PathBuf,

    /// Generator configuration (JSON)
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Directory to write the bridge file and target output into
    #[clap(short, long, value_parser, default_value = ".")]
    out_dir: PathBuf,

    /// Package of the generated declarations, overriding the configuration
    #[clap(short, long, value_parser)]
    package: Option<String>,

    /// What to generate, overriding the configuration
    #[clap(short, long, arg_enum, value_parser)]
    mode: Option<Mode>,

    /// Name of a main-like function forwarding to the runtime
    #[clap(short, long, value_parser)]
    entry_point: Option<String>,

    /// Functions to leave out
    #[clap(short = 'x', long, value_parser)]
    exclude: Vec<String>,

    /// Verbosity of the output
    #[clap(short, long, arg_enum, value_parser)]
    verbosity: Option<Verbosity>,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verbosity::Trace => {
                write!(f, "trace")
            }
            Verbosity::Debug => {
                write!(f, "debug")
            }
            Verbosity::Info => {
                write!(f, "info")
            }
            Verbosity::Warn => {
                write!(f, "warn")
            }
            Verbosity::Error => {
                write!(f, "error")
            }
        }
    }
}

/// The configuration at `path`, or the defaults when there is none
fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => read_generator_config(path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Failed to read config \"{}\"", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.verbosity {
        Some(v) => bgn_util::init_log_with_filter(&v.to_string()),
        None => bgn_util::init_log_with_filter("warn"),
    }

    let mut config = load_config(args.config.as_deref())?;

    if let Some(package) = args.package {
        config.package = Some(package);
    }
    if let Some(entry_point) = args.entry_point {
        config.entry_point = Some(entry_point);
    }
    match args.mode {
        Some(Mode::Source) => config.mode = GenerationMode::SourceCode,
        Some(Mode::Metadata) => config.mode = GenerationMode::Metadata,
        None => (),
    }
    config.excluded_functions.extend(args.exclude);

    let index = DeclarationIndex::read(&args.index)?;
    debug!("read {}", args.index.display());

    let output = generate_default(&index, config, &args.out_dir)?;

    for warning in &output.warnings {
        eprintln!("skipped {warning}");
    }

    println!("{}", output.bridge_file.display());
    for path in &output.outputs {
        println!("{}", path.display());
    }

    Ok(())
}
