use a11yscan::batch::{BatchManifest, BatchOptions, BatchScanner};
use a11yscan::{
    check_heading_hierarchy, classify, DocumentFeatureVector, ScanConfig, ScanReport, Scanner,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "a11yscan",
    about = "Accessibility triage for PDF documents",
    version,
    author
)]
struct Cli {
    /// Scan configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log debug detail to stderr
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one document
    Scan {
        /// Validator report (veraPDF JSON)
        #[arg(short, long)]
        report: PathBuf,

        /// Document snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Exit with status 2 when the document requires review
        #[arg(long)]
        fail_on_review: bool,
    },

    /// Scan every document listed in a manifest
    Batch {
        /// Manifest file listing snapshots and validator reports
        manifest: PathBuf,

        /// Number of parallel workers
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Classify a feature vector without scanning
    Classify {
        /// Feature vector file (JSON)
        features: PathBuf,
    },

    /// Check a sequence of heading levels
    Headings {
        /// Heading levels in document order (e.g. 1 2 3 2)
        levels: Vec<u8>,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: u8) {
    let default_filter = if verbose > 0 {
        "a11yscan=debug"
    } else {
        "a11yscan=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_scan_report(report: &ScanReport) {
    let features = &report.features;
    let classification = &report.classification;

    println!(
        "Priority: {} ({})",
        classification.tier,
        classification.color()
    );
    println!("Reason: {}", classification.rule);
    println!("Requires review: {}", if report.requires_review() { "yes" } else { "no" });
    println!();
    println!("Validation:");
    println!("  Violations: {}", features.violation_count);
    println!("  Failed checks: {}", features.failed_check_count);
    println!("  Errors per page: {}", classification.errors_per_page);
    println!("Document:");
    println!("  Pages: {}", features.page_count);
    println!("  Tagged: {}", features.tagged);
    println!("  Content: {}", features.text_type);
    println!("  Form: {}", features.has_form);
    println!("  Bookmarks: {}", features.has_bookmarks);
    println!("  Title set: {}", features.title_set);
    println!("  Language set: {}", features.language_set);
    println!("  Approved generator: {}", features.approved_generator);
    println!("Structure:");
    println!(
        "  Images with alt text: {} of {}",
        features.images_with_alt,
        features.images_with_alt + features.images_without_alt
    );
    match &report.heading_issue {
        None => println!("  Headings: valid {:?}", report.structure.headings),
        Some(issue) => println!("  Headings: {issue}"),
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  {warning}");
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!("configuration: {:?}", config);

    match cli.command {
        Commands::Scan {
            report,
            snapshot,
            fail_on_review,
        } => {
            let scanner = Scanner::new(config);
            let scan = scanner
                .scan_files(&report, &snapshot)
                .with_context(|| format!("Failed to scan {}", snapshot.display()))?;

            match cli.format {
                OutputFormat::Json => print_json(&scan)?,
                OutputFormat::Text => print_scan_report(&scan),
            }

            if fail_on_review && scan.requires_review() {
                std::process::exit(2);
            }
        }

        Commands::Batch { manifest, jobs } => {
            let manifest = BatchManifest::load(&manifest)
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

            let mut options = BatchOptions::default();
            if let Some(jobs) = jobs {
                options = options.with_parallelism(jobs);
            }

            let mut batch = BatchScanner::new(Scanner::new(config), options);
            batch.add_jobs(manifest.documents);
            let summary = batch.execute();

            match cli.format {
                OutputFormat::Json => print_json(&summary)?,
                OutputFormat::Text => {
                    for outcome in &summary.results {
                        println!("{outcome}");
                    }
                    println!();
                    print!("{}", summary.format_report());
                }
            }
        }

        Commands::Classify { features } => {
            let json = std::fs::read_to_string(&features)
                .with_context(|| format!("Failed to read {}", features.display()))?;
            let vector: DocumentFeatureVector =
                serde_json::from_str(&json).context("Invalid feature vector")?;
            let classification = classify(&vector);

            match cli.format {
                OutputFormat::Json => print_json(&classification)?,
                OutputFormat::Text => {
                    println!(
                        "{} ({}): {}",
                        classification.tier,
                        classification.color(),
                        classification.rule
                    );
                    println!("Errors per page: {}", classification.errors_per_page);
                }
            }
        }

        Commands::Headings { levels } => {
            let result = check_heading_hierarchy(&levels);
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "levels": levels,
                    "valid": result.is_ok(),
                    "issue": result.err(),
                }))?,
                OutputFormat::Text => match result {
                    Ok(()) => println!("✓ Heading hierarchy is valid"),
                    Err(issue) => println!("✗ {issue}"),
                },
            }
            if result.is_err() {
                std::process::exit(1);
            }
        }

        Commands::Config => print_json(&config)?,
    }

    Ok(())
}
