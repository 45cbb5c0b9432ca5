//! Sculpt CLI - turn images into themed, animated 3D assets

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sculpt::prelude::*;
use sculpt::protocol::TcpConnector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sculpt CLI - image to 3D asset generation
#[derive(Parser)]
#[command(name = "sculpt")]
#[command(about = "Generate themed, animated 3D assets from images", long_about = None)]
struct Cli {
    /// Scene engine host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Scene engine port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Root directory for exported assets
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BuildArgs {
    /// Theme the assets are grouped under
    #[arg(long, default_value = "default")]
    theme: String,

    /// Animation applied to each asset (dance, bounce, spin, pulse)
    #[arg(long, default_value = "dance")]
    animation: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an image and print its descriptor
    Classify {
        /// Image file
        image: PathBuf,
    },
    /// Build one asset from an image
    Process {
        /// Image file
        image: PathBuf,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Build an asset from every image in a directory
    Batch {
        /// Directory of png/jpg images
        dir: PathBuf,
        #[command(flatten)]
        build: BuildArgs,
        /// Write the JSON batch report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run a script file inside the scene engine
    Script {
        /// Script source file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Classify { image } => {
            let descriptor = silhouette::classify(image)?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Commands::Process { image, build } => {
            let pipeline = Pipeline::new(engine_settings(&cli)?);
            let report = pipeline
                .process_image(image, &build.theme, build.animation())
                .await?;
            print_report(&report);
        }
        Commands::Batch { dir, build, report } => {
            let pipeline = Pipeline::new(engine_settings(&cli)?);
            let batch = pipeline
                .process_directory(dir, &build.theme, build.animation())
                .await?;
            print_report(&batch);
            if let Some(path) = report {
                write_report(&batch, path)?;
            }
        }
        Commands::Script { file } => {
            let code = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read script {}", file.display()))?;
            let settings = engine_settings(&cli)?;
            let mut engine = TcpConnector::from_settings(&settings).connect().await?;
            let result = engine.execute(Command::execute_script(code)).await;
            engine.close().await;
            let response = result?;
            if let Some(payload) = response.payload {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
    }

    Ok(())
}

impl BuildArgs {
    fn animation(&self) -> AnimationKind {
        AnimationKind::parse_or_default(&self.animation)
    }
}

/// Environment settings with command-line overrides, for commands that talk to the engine
fn engine_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(host) = &cli.host {
        settings.engine.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.engine.port = port;
    }
    if let Some(output) = &cli.output {
        settings.output_dir = output.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn print_report(report: &BatchReport) {
    println!("{report}");
    for job in &report.jobs {
        let source = job.source.display();
        match (&job.artifact, &job.error) {
            (Some(artifact), _) => {
                println!("  ok    {source} -> {}", artifact.display());
                if let Some(descriptor) = &job.descriptor {
                    println!(
                        "        {}, aspect {:.2}, coverage {:.0}%",
                        descriptor.silhouette,
                        descriptor.aspect_ratio(),
                        descriptor.coverage() * 100.0
                    );
                }
            }
            (None, Some(error)) => println!("  fail  {source}: {error}"),
            (None, None) => println!("  ?     {source}"),
        }
        for note in &job.notes {
            println!("        note: {note}");
        }
    }
}

fn write_report(report: &BatchReport, path: &Path) -> anyhow::Result<()> {
    let json = report.to_json()?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    println!("Report written to {}", path.display());
    Ok(())
}
