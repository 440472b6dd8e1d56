use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sdt_core::wml::PartReport;
use sdt_core::{InjectionPair, InjectionSettings, PartTarget, SdtDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdt-inject")]
#[command(about = "Wrap document content in Word content controls", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a batch of content controls to a document.
    Inject {
        #[arg(short, long)]
        input: PathBuf,

        /// JSON array of `{ "element": ..., "config": ... }`.
        #[arg(short, long)]
        batch: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// JSON injection settings.
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the content controls in one part.
    List {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "body")]
        part: PartTarget,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn open(path: &Path) -> Result<SdtDocument> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    SdtDocument::from_bytes(&bytes).with_context(|| format!("opening {}", path.display()))
}

fn print_part(report: &PartReport) {
    println!(
        "  {:<10} {} wrapped, {} by position",
        report.part.to_string(),
        report.wrapped,
        report.fallbacks
    );
}

fn inject(input: &Path, batch: &Path, output: &Path, settings: Option<&Path>, json: bool) -> Result<()> {
    let mut document = open(input)?;
    let batch: Vec<InjectionPair> = read_json(batch)?;
    let settings: InjectionSettings = match settings {
        Some(path) => read_json(path)?,
        None => InjectionSettings::default(),
    };

    let report = document.inject_all_with_settings(&batch, &settings)?;
    fs::write(output, document.to_bytes()?).with_context(|| format!("writing {}", output.display()))?;
    info!(output = %output.display(), wrapped = report.wrapped_total(), "document written");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Wrapped {} element(s):", report.wrapped_total());
    for part in &report.parts {
        print_part(part);
    }
    for part in &report.skipped_parts {
        println!("  {:<10} skipped (not in document)", part.to_string());
    }
    for failure in &report.failed_parts {
        eprintln!("  {:<10} failed: {}", failure.part.to_string(), failure.error);
    }
    if report.deduplicated > 0 {
        println!("Ignored {} repeated pair(s)", report.deduplicated);
    }
    Ok(())
}

fn list(input: &Path, part: PartTarget) -> Result<()> {
    let document = open(input)?;
    let controls = document.content_controls(part)?;
    if controls.is_empty() {
        println!("No content controls in {part}");
        return Ok(());
    }
    for control in controls {
        println!(
            "{:>10}  {:<12} {:<16} {:<16} {}",
            control.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            control.sdt_type.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            control.tag.as_deref().unwrap_or("-"),
            control.alias.as_deref().unwrap_or("-"),
            control.lock.map(|l| l.to_string()).unwrap_or_else(|| "none".to_string()),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inject {
            input,
            batch,
            output,
            settings,
            json,
        } => inject(&input, &batch, &output, settings.as_deref(), json),
        Commands::List { input, part } => list(&input, part),
    }
}
