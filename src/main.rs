use anyhow::{Context, Result};
use artifact_regen::config::load_or_default;
use artifact_regen::{
    render, write_artifact, ArtifactSource, AugmentationPayload, FileSource, HttpSource,
    RegenConfig, RegenError, RewritePlan, StepTrace,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Parser)]
#[command(name = "artifact-regen")]
#[command(
    about = "Regenerate the abstract FileConfiguration base class from upstream",
    long_about = None
)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, rewrite and write the artifact (the default)
    Run(RunArgs),

    /// Regenerate in memory and report whether the file on disk is current
    Check(SourceArgs),

    /// List the rewrite rules in application order
    Rules {
        /// Alternative TOML configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
struct SourceArgs {
    /// Project root the configured paths are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Alternative TOML configuration (defaults to the built-in constants)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the upstream artifact from a local file instead of the network
    #[arg(long, value_name = "FILE")]
    from_file: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Dry run - show what would be written without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff against the current file
    #[arg(short, long)]
    diff: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => cmd_run(args),
        Some(Commands::Check(args)) => cmd_check(args),
        Some(Commands::Rules { config }) => cmd_rules(config),
        None => cmd_run(cli.run),
    }
}

fn load_config(path: Option<&Path>) -> Result<RegenConfig> {
    load_or_default(path).context("failed to load configuration")
}

fn open_source(from_file: Option<&Path>) -> Result<Box<dyn ArtifactSource>> {
    let source: Box<dyn ArtifactSource> = match from_file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new()?),
    };
    Ok(source)
}

/// Attach the failing stage to a pipeline error.
fn stage_error(error: RegenError) -> anyhow::Error {
    let stage = error.stage();
    anyhow::Error::new(error).context(format!("{} failed", stage))
}

/// Helper: Show unified diff between current and regenerated content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (current)", file.display()).dimmed());
    println!("{}", format!("+++ {} (regenerated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_trace(trace: &[StepTrace]) {
    for step in trace {
        println!(
            "{} {} ({}): {}",
            "✓".green(),
            step.name,
            step.kind,
            step.outcome
        );
    }
}

/// Current contents of the destination; `None` when it does not exist yet.
fn read_previous(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read current {}", path.display())),
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let config = load_config(args.source.config.as_deref())?;
    let source = open_source(args.source.from_file.as_deref())?;

    println!("Upstream: {}", config.url);
    println!("Destination: {}", config.destination_file(&args.source.root).display());
    println!();

    if args.dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
    }

    let rendered = render(&config, &args.source.root, source.as_ref()).map_err(stage_error)?;
    print_trace(&rendered.trace);

    if args.diff {
        let before = read_previous(&rendered.destination)?.unwrap_or_default();
        if before != rendered.text {
            display_diff(&rendered.destination, &before, &rendered.text);
        }
    }

    println!();
    if args.dry_run {
        println!(
            "Would write {} bytes to {}",
            rendered.text.len(),
            rendered.destination.display()
        );
        return Ok(());
    }

    write_artifact(&rendered.destination, &rendered.text)
        .map_err(|e| stage_error(RegenError::from(e)))?;
    println!(
        "{} Wrote {} bytes to {}",
        "✓".green(),
        rendered.text.len(),
        rendered.destination.display()
    );
    Ok(())
}

fn cmd_check(args: SourceArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = open_source(args.from_file.as_deref())?;

    println!("{}", "Checking artifact...".bold());
    let rendered = render(&config, &args.root, source.as_ref()).map_err(stage_error)?;
    let expected_hash = xxh3_64(rendered.text.as_bytes());

    match read_previous(&rendered.destination)? {
        Some(current) if current == rendered.text => {
            println!(
                "{} {}: up to date (xxh3 {:016x})",
                "✓".green(),
                rendered.destination.display(),
                expected_hash
            );
            Ok(())
        }
        Some(current) => {
            eprintln!("{} {}: STALE", "✗".red(), rendered.destination.display());
            eprintln!("  On disk:     xxh3 {:016x}", xxh3_64(current.as_bytes()));
            eprintln!("  Regenerated: xxh3 {:016x}", expected_hash);
            std::process::exit(1);
        }
        None => {
            eprintln!("{} {}: MISSING", "✗".red(), rendered.destination.display());
            std::process::exit(1);
        }
    }
}

fn cmd_rules(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let plan = RewritePlan::standard(&config, &AugmentationPayload::default());

    println!("{}", "Rewrite rules (in order):".bold());
    for (idx, step) in plan.steps().iter().enumerate() {
        println!(
            "  {}. {} [{}] {}",
            idx + 1,
            step.name,
            step.rule.kind().to_string().cyan(),
            format!("{:?}", step.rule.anchor()).dimmed()
        );
    }
    Ok(())
}
