use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tag_auditor::logging::{init_logging, LogConfig};
use tag_auditor::{Analyzer, Config, Reporter};

#[derive(Parser)]
#[command(name = "tag-auditor")]
#[command(about = "Audit infrastructure-as-code files for resources missing required tags")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree for untagged resources
    Scan {
        /// Root directory to scan [default: target_directory from the config, else "."]
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit findings as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Exit 0 even when untagged resources are found
        #[arg(long)]
        warn_only: bool,

        /// Only audit resource types starting with this provider prefix (e.g. "aws")
        #[arg(long)]
        provider: Option<String>,

        /// Only audit this exact resource type (e.g. "aws_s3_bucket")
        #[arg(long)]
        resource: Option<String>,

        /// Also write the JSON findings to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose logging
        #[arg(long)]
        debug: bool,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the config file (defaults to ~/.tag-auditor.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct ScanArgs {
    path: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
    warn_only: bool,
    provider: Option<String>,
    resource: Option<String>,
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Scan { debug: true, .. });
    if let Err(e) = init_logging(LogConfig { debug }) {
        eprintln!("{e:#}");
    }

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            json,
            warn_only,
            provider,
            resource,
            output,
            debug: _,
        } => scan(ScanArgs {
            path,
            config,
            json,
            warn_only,
            provider,
            resource,
            output,
        }),
        Commands::Config { output } => generate_config(output).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn scan(args: ScanArgs) -> anyhow::Result<ExitCode> {
    let start_time = Instant::now();

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::load()?,
    };

    // Command-line flags override the config file
    if let Some(path) = args.path {
        config.target_directory = path;
    }
    if !config.target_directory.exists() {
        tracing::error!("Path not found: {}", config.target_directory.display());
        return Ok(ExitCode::FAILURE);
    }
    config.output.json |= args.json;
    config.output.warn_only |= args.warn_only;
    if args.provider.is_some() {
        config.filters.provider = args.provider;
    }
    if args.resource.is_some() {
        config.filters.resource_type = args.resource;
    }

    let analyzer = Analyzer::new(config.clone())?;
    let report = analyzer.analyze_project()?;

    let reporter = Reporter::new();
    println!("{}", reporter.render(&report, config.output.json)?);

    if let Some(output_path) = &args.output {
        let written = reporter.export_report(&report, output_path)?;
        tracing::info!("Findings exported to {}", written.display());
    }

    tracing::debug!(
        "Scanned {} file(s) in {:.2}s ({} skipped)",
        report.files_scanned,
        start_time.elapsed().as_secs_f64(),
        report.skipped.len()
    );

    if !report.has_findings() {
        return Ok(ExitCode::SUCCESS);
    }

    let count = report.findings.len();
    if config.output.warn_only {
        tracing::warn!("{} resource(s) are missing required tags", count);
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("{} resource(s) are missing required tags", count);
        Ok(ExitCode::FAILURE)
    }
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = match output_path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    std::fs::write(&config_path, Config::create_documented_config())?;
    println!("Configuration file created: {}", config_path.display());

    Ok(())
}
