//! CLI argument definitions for fuzzjoin.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use fuzzjoin_cli::logging::LogFormat;
use fuzzjoin_match::{Blocking, Cardinality, Direction, Metric};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "fuzzjoin",
    version,
    about = "Join CSV files on approximately equal keys",
    long_about = "Join CSV files on keys that are not exactly equal.\n\n\
                  Keys are normalized and scored with an edit-distance, token-set or\n\
                  phonetic metric; pairs above the threshold are assigned one-to-one,\n\
                  one-to-many or many-to-many and written as joined rows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Join a left CSV file to one or more right CSV files.
    Join(JoinArgs),

    /// Print the similarity of two keys.
    Score(ScoreArgs),

    /// Inspect or create the configuration file.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct JoinArgs {
    /// Left input CSV file.
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Right input CSV files; several files are concatenated.
    #[arg(value_name = "RIGHT", required = true, num_args = 1..)]
    pub right: Vec<PathBuf>,

    /// Left key field, or comma-separated fields for a composite key.
    #[arg(long = "left-key", value_name = "FIELDS")]
    pub left_key: String,

    /// Right key field(s) (default: same as --left-key).
    #[arg(long = "right-key", value_name = "FIELDS")]
    pub right_key: Option<String>,

    /// Config file to start from (default: the user config file).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Blocking strategy used to prune candidate pairs.
    #[arg(long = "blocking", value_enum)]
    pub blocking: Option<BlockingArg>,

    /// Prefix length for prefix and token blocking.
    #[arg(long = "block-length", value_name = "N")]
    pub block_length: Option<usize>,

    /// Keep left records without a match.
    #[arg(long = "keep-left")]
    pub keep_left: bool,

    /// Keep right records without a match.
    #[arg(long = "keep-right")]
    pub keep_right: bool,

    /// Name of the score column.
    #[arg(long = "score-field", value_name = "NAME")]
    pub score_field: Option<String>,

    /// Wall-clock budget in seconds; a partial result is written when exceeded.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Fail on empty or missing keys instead of leaving them unmatched.
    #[arg(long = "strict-keys")]
    pub strict_keys: bool,

    /// Write joined rows to this CSV file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write the full match result as JSON.
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Text written for missing cells in CSV output.
    #[arg(long = "na-rep", value_name = "TEXT", default_value = "")]
    pub na_rep: String,
}

/// Scoring and assignment options of `join`; they override the config file.
#[derive(Parser)]
pub struct MatchingArgs {
    /// Similarity metric.
    #[arg(long = "metric", value_enum)]
    pub metric: Option<MetricArg>,

    /// Minimum accepted score in [0, 1].
    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// How many matches a record may take part in.
    #[arg(long = "cardinality", value_enum)]
    pub cardinality: Option<CardinalityArg>,

    /// Which side may repeat under one-to-many.
    #[arg(long = "direction", value_enum)]
    pub direction: Option<DirectionArg>,

    /// Compare keys as written, without normalization.
    #[arg(long = "no-normalize")]
    pub no_normalize: bool,
}

#[derive(Parser)]
pub struct ScoreArgs {
    /// First key.
    pub a: String,

    /// Second key.
    pub b: String,

    /// Similarity metric.
    #[arg(long = "metric", value_enum, default_value = "edit-distance")]
    pub metric: MetricArg,

    /// Compare keys as written, without normalization.
    #[arg(long = "no-normalize")]
    pub no_normalize: bool,

    /// Fail when either key is empty instead of scoring 0.
    #[arg(long = "strict-keys")]
    pub strict_keys: bool,
}

#[derive(Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,

    /// Config file to use (default: the user config file).
    #[arg(long = "path", value_name = "PATH", global = true)]
    pub path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file location.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Write the default configuration.
    Init {
        /// Overwrite an existing file.
        #[arg(long = "force")]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    EditDistance,
    TokenSet,
    Phonetic,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::EditDistance => Metric::EditDistance,
            MetricArg::TokenSet => Metric::TokenSet,
            MetricArg::Phonetic => Metric::Phonetic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CardinalityArg {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl From<CardinalityArg> for Cardinality {
    fn from(arg: CardinalityArg) -> Self {
        match arg {
            CardinalityArg::OneToOne => Cardinality::OneToOne,
            CardinalityArg::OneToMany => Cardinality::OneToMany,
            CardinalityArg::ManyToMany => Cardinality::ManyToMany,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    LeftToRight,
    RightToLeft,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::LeftToRight => Direction::LeftToRight,
            DirectionArg::RightToLeft => Direction::RightToLeft,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BlockingArg {
    Exhaustive,
    Prefix,
    Token,
}

impl From<BlockingArg> for Blocking {
    fn from(arg: BlockingArg) -> Self {
        match arg {
            BlockingArg::Exhaustive => Blocking::Exhaustive,
            BlockingArg::Prefix => Blocking::Prefix,
            BlockingArg::Token => Blocking::Token,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn score_takes_its_own_options() {
        let cli = Cli::parse_from(["fuzzjoin", "score", "Jon", "...", "--strict-keys"]);
        let Command::Score(args) = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(args.b, "...");
        assert!(args.strict_keys);
        assert!(matches!(args.metric, MetricArg::EditDistance));

        let err = Cli::try_parse_from(["fuzzjoin", "score", "a", "b", "--threshold", "0.5"]);
        assert!(err.is_err());
    }
}
