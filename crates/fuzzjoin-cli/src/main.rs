//! fuzzjoin CLI.

use clap::{ColorChoice, Parser};
use fuzzjoin_cli::logging::{LogConfig, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_config, run_join, run_score};
use crate::summary::print_summary;

/// Exit code of a join whose time budget ran out before every record was
/// matched.
const EXIT_TRUNCATED: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Join(args) => match run_join(&args) {
            Ok((outcome, config)) => {
                print_summary(&outcome, &config);
                if outcome.result.truncated {
                    EXIT_TRUNCATED
                } else {
                    0
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Score(args) => exit_code(run_score(&args)),
        Command::Config(args) => exit_code(run_config(&args)),
    };
    std::process::exit(exit_code);
}

fn exit_code(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Logging setup from the global flags. An explicit `--log-level` or `-v/-q`
/// disables `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = cli
        .log_level
        .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from);
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        ..LogConfig::default()
    }
    .with_level_filter(level_filter)
    .with_format(cli.log_format.into())
    .with_ansi(with_ansi)
    .with_log_file(cli.log_file.clone())
}
