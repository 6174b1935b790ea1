use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hparams",
    about = "Hierarchical parameter files: load, resolve, inspect",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Character separating keypath segments
    #[arg(long, global = true, default_value = ".")]
    pub separator: char,

    /// Skip malformed or conflicting lines instead of failing
    #[arg(long, global = true)]
    pub skip_invalid: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve effective values along a path
    Resolve(ResolveArgs),
    /// Print the value bound at an exact keypath
    Get(GetArgs),
    /// Print every parameter
    Dump(DumpArgs),
    /// Load files strictly and report what they contain
    Check(CheckArgs),
}

/// Parameter files, applied in order; later files override earlier ones.
#[derive(Args)]
pub struct SourceArgs {
    #[arg(short, long = "file", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Descent path, segments joined by the separator (e.g. tasks.sieve)
    #[arg(short, long)]
    pub path: Option<String>,
    /// Parameter names; all names along the path when omitted
    pub keys: Vec<String>,
}

#[derive(Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    pub keypath: String,
}

#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
