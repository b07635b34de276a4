//! Primitive speed suite CLI
//!
//! Runs the calibrated benchmark tables for each selected backend and prints
//! one line per case.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use speed_core::config::PolicyKind;
use speed_core::input::input_rng;
use speed_core::{check_verification, MonotonicClock, Reporter, SpeedConfig, SpeedReport, SuiteRunner};
use speed_primitives::{parse_backends, Backend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "speed")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Calibrated speed comparison of cryptographic primitive libraries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark tables (default)
    Run(RunArgs),

    /// List backends and their cases
    List,
}

#[derive(Args, Clone)]
struct RunArgs {
    /// TOML configuration file
    #[arg(short, long, env = "SPEED_CONFIG")]
    config: Option<PathBuf>,

    /// Backend to run (repeatable): rustcrypto, ring
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// Calibration policy: window or fixed
    #[arg(long)]
    policy: Option<PolicyKind>,

    /// Measurement window per case, in milliseconds
    #[arg(long)]
    window_ms: Option<u64>,

    /// Calls per case under the fixed policy
    #[arg(long)]
    iterations: Option<u64>,

    /// Seed for the input generator
    #[arg(long)]
    seed: Option<u64>,

    /// Only run cases whose name contains this text
    #[arg(long)]
    only: Option<String>,

    /// Also write a JSON report here
    #[arg(long)]
    json: Option<PathBuf>,
}

fn init_logging(verbose: bool, level: &str) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    // stdout carries the report; logs go to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();
}

fn load_config(args: &RunArgs) -> anyhow::Result<SpeedConfig> {
    let mut config = match &args.config {
        Some(path) => SpeedConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SpeedConfig::default(),
    };

    if !args.backends.is_empty() {
        config.backends = args.backends.clone();
    }
    if let Some(policy) = args.policy {
        config.calibration.policy = policy;
    }
    if let Some(window_ms) = args.window_ms {
        config.calibration.window_ms = window_ms;
    }
    if let Some(iterations) = args.iterations {
        config.calibration.iterations = iterations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.json.is_some() {
        config.output.json = args.json.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run(args: RunArgs, verbose: bool) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    init_logging(verbose, &config.logging.level);

    let backends = parse_backends(config.backends.as_slice())?;
    let calibration = config.calibration();
    tracing::info!(?backends, ?calibration, seed = ?config.seed, "starting run");

    let clock = MonotonicClock::new();
    let mut rng = input_rng(config.seed);
    let mut report = SpeedReport::new(calibration);

    for backend in &backends {
        let cases = backend.select(args.only.as_deref());
        if cases.is_empty() {
            tracing::warn!(backend = backend.name(), "no cases match the filter");
            continue;
        }
        let mut reporter = Reporter::stdout().fit_names(cases.iter().map(|c| c.name));
        let mut runner = SuiteRunner::new(&mut rng, &clock, calibration);
        let backend_report = runner
            .run(backend.name(), backend.title(), &cases, &mut reporter)
            .with_context(|| format!("{} suite aborted", backend.title()))?;
        report.add_backend(backend_report);
    }

    if let Some(path) = &config.output.json {
        report
            .save_json(path)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "JSON report written");
    }

    for backend in &report.backends {
        check_verification(&backend.results, config.max_verification_failures)
            .with_context(|| format!("{} verification", backend.title))?;
    }
    Ok(())
}

fn list() {
    for backend in Backend::ALL {
        println!("{} ({})", backend.title(), backend.name());
        for case in backend.cases() {
            println!("  {:<20} {}", case.name, case.unit.noun());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => run(args, cli.verbose),
        Some(Commands::List) => {
            list();
            Ok(())
        }
        None => run(cli.run, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "speed", "run", "--backend", "ring", "--policy", "fixed", "--iterations", "7", "--seed", "3",
        ])
        .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.backends, vec!["ring".to_string()]);
        assert_eq!(config.calibration.policy, PolicyKind::Fixed);
        assert_eq!(config.calibration.iterations, 7);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["speed", "--window-ms", "50"]).unwrap();
        assert!(cli.command.is_none());
        let config = load_config(&cli.run).unwrap();
        assert_eq!(config.calibration.window_ms, 50);
        assert_eq!(config.backends.len(), 2);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::try_parse_from(["speed", "--window-ms", "0"]).unwrap();
        assert!(load_config(&cli.run).is_err());
    }
}
