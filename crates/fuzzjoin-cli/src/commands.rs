use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fuzzjoin_cli::pipeline::{JoinOutcome, JoinRequest, parse_key, run_join as run_join_request};
use fuzzjoin_cli::settings;
use fuzzjoin_match::{EmptyKeyPolicy, JoinConfig, KeyScorer, Metric};
use tracing::{debug, warn};

use crate::cli::{ConfigAction, ConfigArgs, JoinArgs, MatchingArgs, ScoreArgs};

pub fn run_join(args: &JoinArgs) -> Result<(JoinOutcome, JoinConfig)> {
    let config = build_config(args)?;
    let left_key = parse_key(&args.left_key).context("parse --left-key")?;
    let right_key = match &args.right_key {
        Some(spec) => parse_key(spec).context("parse --right-key")?,
        None => left_key.clone(),
    };
    let request = JoinRequest {
        left: args.left.clone(),
        right: args.right.clone(),
        left_key,
        right_key,
        config: config.clone(),
        csv_output: args.output.clone(),
        json_output: args.json.clone(),
        na_rep: args.na_rep.clone(),
    };
    let outcome = run_join_request(&request)?;
    Ok((outcome, config))
}

pub fn run_score(args: &ScoreArgs) -> Result<()> {
    let score = score_keys(args)?;
    println!("{score:.4}");
    Ok(())
}

fn score_keys(args: &ScoreArgs) -> Result<f64> {
    let metric: Metric = args.metric.into();
    let scorer = KeyScorer::new(Arc::new(metric), !args.no_normalize);
    let policy = if args.strict_keys {
        EmptyKeyPolicy::Error
    } else {
        EmptyKeyPolicy::NeverMatch
    };
    let score = scorer.try_score(&args.a, &args.b, policy)?;
    Ok(score)
}

pub fn run_config(args: &ConfigArgs) -> Result<()> {
    let path = args
        .path
        .clone()
        .unwrap_or_else(settings::default_config_path);
    match args.action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Show => {
            let config = if path.exists() {
                settings::load_from(&path)?
            } else {
                JoinConfig::default()
            };
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Init { force } => {
            settings::init(&path, force)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Config file values with command-line overrides applied.
fn build_config(args: &JoinArgs) -> Result<JoinConfig> {
    let mut config = match &args.config {
        Some(path) => settings::load_from(path)?,
        None => load_user_config(&settings::default_config_path()),
    };
    apply_matching_args(&mut config, &args.matching);
    if let Some(blocking) = args.blocking {
        config.blocking = blocking.into();
    }
    if let Some(block_length) = args.block_length {
        config.block_length = block_length;
    }
    config.keep_unmatched_left |= args.keep_left;
    config.keep_unmatched_right |= args.keep_right;
    if let Some(name) = &args.score_field {
        config.score_field_name = name.clone();
    }
    if let Some(seconds) = args.timeout {
        config.timeout_seconds = Some(seconds);
    }
    if args.strict_keys {
        config.empty_keys = EmptyKeyPolicy::Error;
    }
    config.validate().context("invalid join configuration")?;
    debug!(?config, "effective configuration");
    Ok(config)
}

fn apply_matching_args(config: &mut JoinConfig, args: &MatchingArgs) {
    if let Some(metric) = args.metric {
        config.metric = metric.into();
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(cardinality) = args.cardinality {
        config.cardinality = cardinality.into();
    }
    if let Some(direction) = args.direction {
        config.direction = direction.into();
    }
    if args.no_normalize {
        config.normalize = false;
    }
}

/// The user config file, created on first use. Falls back to the defaults
/// when the file cannot be created or read.
fn load_user_config(path: &Path) -> JoinConfig {
    settings::load_or_init(path).unwrap_or_else(|error| {
        warn!(path = %path.display(), "using default configuration: {error:#}");
        JoinConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MetricArg;

    fn score_args(a: &str, b: &str, strict_keys: bool) -> ScoreArgs {
        ScoreArgs {
            a: a.to_string(),
            b: b.to_string(),
            metric: MetricArg::EditDistance,
            no_normalize: false,
            strict_keys,
        }
    }

    #[test]
    fn score_normalizes_keys() {
        assert_eq!(score_keys(&score_args("JON SMITH", "jon-smith", false)).unwrap(), 1.0);
    }

    #[test]
    fn empty_key_scores_zero_unless_strict() {
        assert_eq!(score_keys(&score_args("Jon", "--", false)).unwrap(), 0.0);

        let err = score_keys(&score_args("Jon", "--", true)).unwrap_err();
        assert_eq!(err.to_string(), "invalid right key: key is empty");
    }
}
