use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "foldscore CLI - score protein conformations incrementally and suggest nudge moves.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel candidate evaluation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a conformation, or the conformation after the request's diff.
    Score(ScoreArgs),
    /// Suggest a single move that is likely to improve the score.
    Nudge(NudgeArgs),
    /// Rescore submitted coordinates from scratch and check a claimed score.
    Verify(VerifyArgs),
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to the score request JSON file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the JSON response. Printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the scoring parameter file from the config file.
    #[arg(short = 'p', long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S weights.clash=2.0
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `nudge` subcommand.
#[derive(Args, Debug)]
pub struct NudgeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to a linear delta model (JSON) used to rank candidates.
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Ignore any configured delta model and evaluate every candidate exactly.
    #[arg(long, conflicts_with = "model")]
    pub no_model: bool,

    /// Override the number of worst residues to search around.
    #[arg(short = 'k', long, value_name = "INT")]
    pub top_k: Option<usize>,

    /// Override the maximum number of candidates.
    #[arg(long, value_name = "INT")]
    pub max_candidates: Option<usize>,

    /// Override how many model-ranked candidates are rescored exactly.
    #[arg(long, value_name = "INT")]
    pub verify_top: Option<usize>,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// The score the client claims for the submitted coordinates.
    #[arg(long, required = true, value_name = "FLOAT", allow_negative_numbers = true)]
    pub claimed: f64,

    /// Override the accepted gap between claimed and recomputed scores.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,
}
