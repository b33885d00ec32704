//! opcheck CLI - dependency-ordered cluster operator health checks

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use opcheck::component::validate_id;
use opcheck::report::DEFAULT_SUITE_NAME;
use opcheck::{
    CheckError, ClusterSnapshot, DependencyConfig, DependencyMap, FixSuggestion, HealthPolicy,
    HealthValidation, JunitReport, OutcomeKind, OutcomeRecord, OutcomeSummary, SnapshotProbe,
};

#[derive(Parser)]
#[command(name = "opcheck")]
#[command(about = "Dependency-ordered health checks for cluster operators")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DepsArgs {
    /// Dependency config file (defaults to the built-in operator table)
    #[arg(short, long)]
    deps: Option<PathBuf>,

    /// Directory of *.deps.yaml fragments merged into the config
    #[arg(long)]
    deps_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the transitive dependency map
    Expand {
        #[command(flatten)]
        deps: DepsArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the order components are checked in
    Order {
        #[command(flatten)]
        deps: DepsArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check operator health from a status snapshot
    Check {
        #[command(flatten)]
        deps: DepsArgs,

        /// Operator status snapshot (YAML)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Do not count Progressing=True against an operator
        #[arg(long)]
        allow_progressing: bool,

        /// Also check snapshot operators absent from the dependency config
        #[arg(long)]
        all_operators: bool,

        /// Write a JUnit XML report to this path
        #[arg(long)]
        junit: Option<PathBuf>,

        /// Test suite name used in the JUnit report
        #[arg(long, default_value = DEFAULT_SUITE_NAME)]
        suite_name: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the built-in dependency table
    Defaults,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so structured output on stdout stays clean.
    // -v/-vv override RUST_LOG; without them RUST_LOG wins over the warn default.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Expand { deps, format } => expand_command(&deps, format),
        Commands::Order { deps, format } => order_command(&deps, format),
        Commands::Check {
            deps,
            snapshot,
            allow_progressing,
            all_operators,
            junit,
            suite_name,
            format,
        } => check_command(CheckOptions {
            deps,
            snapshot,
            policy: HealthPolicy { allow_progressing },
            all_operators,
            junit,
            suite_name,
            format,
        }),
        Commands::Defaults => defaults_command(),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.downcast_ref::<CheckError>().and_then(|c| c.fix_suggestion()) {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

fn load_dependencies(args: &DepsArgs) -> Result<DependencyMap> {
    let mut config = match &args.deps {
        Some(path) => DependencyConfig::from_file(path)
            .with_context(|| format!("Failed to load dependency config {}", path.display()))?,
        None => DependencyConfig::builtin()?,
    };

    if let Some(dir) = &args.deps_dir {
        let merged = config.merge_fragments(dir)?;
        info!(fragments = merged, dir = %dir.display(), "merged dependency fragments");
    }

    Ok(config.to_dependency_map()?)
}

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => {}
    }
    Ok(())
}

fn expand_command(args: &DepsArgs, format: OutputFormat) -> Result<bool> {
    let direct = load_dependencies(args)?;
    let expanded = opcheck::expand(&direct);

    if format != OutputFormat::Text {
        print_structured(&expanded, format)?;
        return Ok(true);
    }

    for (id, deps) in expanded.iter() {
        if deps.is_empty() {
            println!("{}: {}", id.cyan(), "(none)".dimmed());
        } else {
            let list: Vec<&str> = deps.iter().map(|d| d.as_ref()).collect();
            println!("{}: {}", id.cyan(), list.join(", "));
        }
    }
    Ok(true)
}

fn order_command(args: &DepsArgs, format: OutputFormat) -> Result<bool> {
    let plan = HealthValidation::new(load_dependencies(args)?).plan()?;

    if format != OutputFormat::Text {
        print_structured(&plan.order, format)?;
        return Ok(true);
    }

    for (i, id) in plan.order.iter().enumerate() {
        println!("{:>3}. {}", i + 1, id);
    }
    Ok(true)
}

struct CheckOptions {
    deps: DepsArgs,
    snapshot: PathBuf,
    policy: HealthPolicy,
    all_operators: bool,
    junit: Option<PathBuf>,
    suite_name: String,
    format: OutputFormat,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    summary: OutcomeSummary,
    records: &'a [OutcomeRecord],
}

/// Returns false when at least one operator failed
fn check_command(options: CheckOptions) -> Result<bool> {
    let direct = load_dependencies(&options.deps)?;
    let snapshot = ClusterSnapshot::from_file(&options.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", options.snapshot.display()))?;

    let mut validation = HealthValidation::new(direct);
    if options.all_operators {
        let extra: Vec<String> = snapshot
            .operator_names()
            .filter(|name| match validate_id(name) {
                Ok(()) => true,
                Err(e) => {
                    warn!(operator = *name, error = %e, "ignoring snapshot operator with invalid name");
                    false
                }
            })
            .map(str::to_string)
            .collect();
        validation = validation.with_components(extra);
    }

    let probe = SnapshotProbe::new(snapshot, options.policy);
    let report = validation.run(&probe)?;

    if let Some(path) = &options.junit {
        JunitReport::from_outcomes(options.suite_name.as_str(), &report)
            .write_to_file(path)
            .with_context(|| format!("Failed to write JUnit report {}", path.display()))?;
        info!(path = %path.display(), "wrote JUnit report");
    }

    if options.format != OutputFormat::Text {
        print_structured(
            &CheckOutput {
                summary: report.summary(),
                records: report.records(),
            },
            options.format,
        )?;
        return Ok(report.is_success());
    }

    let width = report
        .records()
        .iter()
        .map(|r| r.component().len())
        .max()
        .unwrap_or(0);

    for record in &report {
        let marker = match record.kind() {
            OutcomeKind::Passed => "✓".green(),
            OutcomeKind::Failed => "✗".red(),
            OutcomeKind::SkippedMissing | OutcomeKind::SkippedDependencyFailed => "○".yellow(),
        };
        let name = format!("{:width$}", record.component(), width = width);
        match record.diagnostic() {
            Some(diagnostic) => println!("{} {}  {}: {}", marker, name, record.kind(), diagnostic),
            None => println!("{} {}  {}", marker, name, record.kind()),
        }
    }

    let summary = report.summary();
    if report.is_success() {
        println!("\n{} {}", "✓".green(), summary);
    } else {
        println!("\n{} {}", "✗".red(), summary);
    }

    Ok(report.is_success())
}

fn defaults_command() -> Result<bool> {
    print!("{}", DependencyConfig::builtin()?.to_yaml()?);
    Ok(true)
}
