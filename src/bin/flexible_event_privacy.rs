//! Privacy calculator for flexible event-level configurations.
//!
//! Reads a source registration JSON file, or per-trigger-data window and
//! bucket counts from the command line, and prints how many output states
//! the configuration encodes, the flip probability at the given epsilon and
//! the maximum information gain of one source. Warns when the information
//! gain exceeds the limit for the source type.
//!
//! Usage:
//!   flexible-event-privacy -w 3,3,3 -b 3,3,3 -m 3
//!   flexible-event-privacy -f registration.json -t event

use std::{fs, path::PathBuf};

use anyhow::{ensure, Context};
use clap::Parser;
use flexible_event::{
    budget::{
        config::{AttributionScopes, ConfigData, PerTriggerDataConfig},
        limits::{PolicyViolation, VendorLimits},
    },
    constants::{DEFAULT_MAX_EVENT_STATES, MAX_SETTABLE_EVENT_LEVEL_REPORTS},
    registration::privacy_config_from_json,
    PrivacyConfig, SourceType,
};
use log::{debug, LevelFilter};
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use serde::Serialize;

/// Flexible event-level privacy calculator
#[derive(Parser, Debug)]
#[command(name = "flexible-event-privacy")]
#[command(version)]
#[command(about = "Computes privacy parameters of flexible event-level configurations")]
#[command(long_about = "Ingests configurations for the flexible event-level reports in \
    the Attribution Reporting API and prints how many output states they encode, the \
    flip probability for an epsilon and the maximum information gain of one source.\n\n\
    JSON input is not completely validated. It is minimally processed to count the \
    number of windows and buckets per trigger spec.")]
struct Cli {
    /// Maximum number of event-level reports, used with --windows/--buckets
    #[arg(short, long, default_value_t = MAX_SETTABLE_EVENT_LEVEL_REPORTS)]
    max_event_level_reports: u32,

    /// Epsilon of the randomized response
    #[arg(short, long, default_value_t = 14.0)]
    epsilon: f64,

    /// Whether this is a navigation or an event source
    #[arg(short = 't', long, default_value_t = SourceType::Navigation)]
    source_type: SourceType,

    /// Comma separated number of report windows for each trigger data
    #[arg(short, long, value_delimiter = ',')]
    windows: Vec<u32>,

    /// Comma separated maximum number of summary buckets for each trigger data
    #[arg(short, long, value_delimiter = ',')]
    buckets: Vec<u32>,

    /// Source registration JSON file
    #[arg(short = 'f', long, conflicts_with_all = ["windows", "buckets"])]
    json_file: Option<PathBuf>,

    /// Attribution scope limit, overrides the registration's
    #[arg(long)]
    attribution_scope_limit: Option<u32>,

    /// Max event states, used with --attribution-scope-limit
    #[arg(long, default_value_t = DEFAULT_MAX_EVENT_STATES)]
    max_event_states: u32,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    source_type: SourceType,
    epsilon: f64,
    #[serde(flatten)]
    data: &'a ConfigData,
    violations: &'a [PolicyViolation],
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    })?;

    let limits = VendorLimits::chromium();
    let config = build_config(&cli)?;
    check_settable(&limits, cli.epsilon, &config)?;
    debug!("Computing config data for {config:?}");

    let info_gain_max = limits.info_gain_max(cli.source_type);
    let data = config.compute_config_data(cli.epsilon, info_gain_max);
    let violations = limits.violations(cli.source_type, &config, &data);

    if cli.json {
        let output = Output {
            source_type: cli.source_type,
            epsilon: cli.epsilon,
            data: &data,
            violations: &violations,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Number of possible different output states: {}",
        data.num_states
    );
    println!("Information gain: {:.2} bits", data.info_gain);
    println!("Flip percent: {:.5}%", 100.0 * data.flip_prob);
    if let Some(info_gain) = data.attribution_scopes_info_gain {
        println!(
            "Information gain for attribution scope: {info_gain:.2} bits"
        );
    }

    if let Some(excessive) = &data.excessive {
        println!(
            "WARNING: info gain > {:.2} for {} sources. Would require a \
             {:.5}% flip chance (effective epsilon = {:.3}) to resolve.",
            info_gain_max,
            cli.source_type,
            100.0 * excessive.new_flip_prob,
            excessive.new_epsilon
        );
    }

    for violation in &violations {
        if !matches!(violation, PolicyViolation::InfoGain { .. }) {
            println!("WARNING: {violation}");
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<PrivacyConfig, anyhow::Error> {
    let mut config = match &cli.json_file {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| {
                format!("Failed to read {}", path.display())
            })?;
            privacy_config_from_json(&json, cli.source_type)?
        }
        None => {
            ensure!(
                cli.windows.len() == cli.buckets.len(),
                "windows and buckets must have same length"
            );
            ensure!(
                !cli.windows.is_empty(),
                "either --json-file or --windows and --buckets are required"
            );
            let per_trigger_data = cli
                .windows
                .iter()
                .zip(&cli.buckets)
                .map(|(&windows, &buckets)| {
                    PerTriggerDataConfig::new(windows, buckets)
                })
                .collect::<Result<Vec<_>, _>>()?;
            PrivacyConfig::new(cli.max_event_level_reports, per_trigger_data)
        }
    };

    if let Some(limit) = cli.attribution_scope_limit {
        config = config.with_attribution_scopes(AttributionScopes {
            limit,
            max_event_states: cli.max_event_states,
        });
    }

    Ok(config)
}

/// Rejects parameters a source could not register with.
fn check_settable(
    limits: &VendorLimits,
    epsilon: f64,
    config: &PrivacyConfig,
) -> Result<(), anyhow::Error> {
    let max_epsilon = limits.max_settable_event_level_epsilon;
    ensure!(
        (0.0..=max_epsilon).contains(&epsilon),
        "epsilon must be in [0, {max_epsilon}], got {epsilon}"
    );
    ensure!(
        config.max_event_level_reports <= MAX_SETTABLE_EVENT_LEVEL_REPORTS,
        "max event-level reports must be <= {}, got {}",
        MAX_SETTABLE_EVENT_LEVEL_REPORTS,
        config.max_event_level_reports
    );
    Ok(())
}

fn init_logging(level: LevelFilter) -> Result<(), anyhow::Error> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} {t} - {m}{n}")))
        .build();
    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_settable() {
        let limits = VendorLimits::chromium();
        let config = PrivacyConfig::default_for(SourceType::Navigation);

        assert!(check_settable(&limits, 0.0, &config).is_ok());
        assert!(check_settable(&limits, 14.0, &config).is_ok());
        for epsilon in [-1.0, 14.5, f64::INFINITY, f64::NAN] {
            assert!(
                check_settable(&limits, epsilon, &config).is_err(),
                "epsilon {epsilon}"
            );
        }

        let config = PrivacyConfig::new(
            MAX_SETTABLE_EVENT_LEVEL_REPORTS + 1,
            vec![PerTriggerDataConfig::new(1, 1).unwrap()],
        );
        assert!(check_settable(&limits, 14.0, &config).is_err());
    }

    #[test]
    fn test_cli_parses_epsilon_and_windows() {
        let cli = Cli::try_parse_from([
            "flexible-event-privacy",
            "-e",
            "inf",
            "-w",
            "3,3",
            "-b",
            "3,3",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.per_trigger_data.len(), 2);
        assert!(check_settable(&VendorLimits::chromium(), cli.epsilon, &config)
            .is_err());
    }
}
