use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster_import::config::Config;
use roster_import::constants::DEFAULT_CONFIG_FILE;
use roster_import::infra::ReqwestHttp;
use roster_import::logging;
use roster_import::pipeline::{self, AcquireSummary, TransformSummary, TsvLayout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "roster_import")]
#[command(about = "Convert a roster TSV into JSON and cache the referenced images")]
#[command(version)]
struct Cli {
    /// Optional TOML config; built-in defaults apply when it does not exist
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the TSV into a JSON array
    Transform {
        /// Tab-separated input (no header row)
        #[arg(long)]
        input: Option<PathBuf>,
        /// JSON output (defaults depend on the layout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Column layout of the input and shape of the output
        #[arg(long, value_enum, default_value_t = TsvLayout::Flat)]
        layout: TsvLayout,
        /// Height written into every flat record
        #[arg(long)]
        height_cm: Option<f64>,
    },
    /// Download face/body images listed in a flat JSON file
    Download {
        /// Flat JSON produced by `transform --layout flat`
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory the images are stored in
        #[arg(long)]
        img_dir: Option<PathBuf>,
    },
    /// Flat transform followed by download
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Intermediate flat JSON
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        img_dir: Option<PathBuf>,
    },
}

fn print_transform(summary: &TransformSummary) {
    println!("\n📊 Transform results ({}):", summary.layout.as_str());
    println!("   Rows read: {}", summary.rows);
    println!("   Records written: {}", summary.records);
    println!("   Output file: {}", summary.output_file.display());
}

fn print_download(summary: &AcquireSummary) {
    println!("\n📊 Download results:");
    println!("   Downloaded: {}", summary.downloaded);
    println!("   Assumed png: {}", summary.assumed_png);
    println!("   Skipped (already present): {}", summary.skipped);
    println!("   Failed: {}", summary.failed.len());
    if !summary.failed.is_empty() {
        println!("\n⚠️  Failures (retried on the next run):");
        for failure in &summary.failed {
            println!("   - {}", failure);
        }
    }
}

fn transform(input: &Path, output: &Path, layout: TsvLayout, height_cm: f64) -> Result<()> {
    info!("Transforming {} ({} layout)", input.display(), layout.as_str());
    let summary = pipeline::run_transform(input, output, layout, height_cm)
        .with_context(|| format!("Failed to transform {}", input.display()))?;
    print_transform(&summary);
    Ok(())
}

fn download(input: &Path, img_dir: &Path) -> Result<()> {
    let http = ReqwestHttp::new();
    let summary = pipeline::run_download(input, img_dir, &http)
        .with_context(|| format!("Failed to download images listed in {}", input.display()))?;
    print_download(&summary);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    match cli.command {
        Commands::Transform {
            input,
            output,
            layout,
            height_cm,
        } => {
            let input = input.unwrap_or_else(|| config.transform.input.clone());
            let output = output.unwrap_or_else(|| match layout {
                TsvLayout::Flat => config.transform.flat_output.clone(),
                TsvLayout::Grouped => config.transform.grouped_output.clone(),
            });
            let height_cm = height_cm.unwrap_or(config.transform.default_height_cm);
            transform(&input, &output, layout, height_cm)
        }
        Commands::Download { input, img_dir } => {
            let input = input.unwrap_or_else(|| config.transform.flat_output.clone());
            let img_dir = img_dir.unwrap_or_else(|| config.download.img_dir.clone());
            download(&input, &img_dir)
        }
        Commands::Run {
            input,
            json,
            img_dir,
        } => {
            let input = input.unwrap_or_else(|| config.transform.input.clone());
            let json = json.unwrap_or_else(|| config.transform.flat_output.clone());
            let img_dir = img_dir.unwrap_or_else(|| config.download.img_dir.clone());

            println!("\n📥 Step 1: Transforming...");
            transform(&input, &json, TsvLayout::Flat, config.transform.default_height_cm).and_then(
                |()| {
                    println!("\n🖼️  Step 2: Downloading images...");
                    download(&json, &img_dir)
                },
            )
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    // Logged once; the guard flushes the file when main returns.
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
