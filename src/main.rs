use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use model_fetch::{config::Config, FetchConfig, Fetcher, ReqwestTransport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "model-fetch", about = "Fetch the YOLOv8n TensorFlow.js web model from the first mirror that works")]
struct Cli {
    /// Optional TOML file overriding sources, timeouts or the auth token
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where model.json and the weight shards are written
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            println!("\n{}", "❌ Every download attempt failed.".red().bold());
            println!("Please download the model files manually, or check your network connection.");
            println!("Alternatively, use the smaller COCO-SSD model instead of YOLOv8.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> model_fetch::Result<bool> {
    let mut config = FetchConfig::new(FetchConfig::default_output_dir());
    if let Some(path) = &cli.config {
        config = config.apply(Config::load(path)?);
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    println!("{}", "Fetching YOLOv8n TensorFlow.js model files...".bold());
    let transport = ReqwestTransport::new(&config)?;
    let fetcher = Fetcher::new(transport, config);
    match fetcher.run().await? {
        Some(report) => {
            println!("{} files in {}:", report.files.len(), fetcher.config().output_dir.display());
            for file in &report.files {
                println!("  {}", file);
            }
            Ok(true)
        }
        None => Ok(false),
    }
}
