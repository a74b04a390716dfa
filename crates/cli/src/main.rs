use clap::{Parser, Subcommand};

mod commands;

use commands::AnalyzeArgs;

#[derive(Parser)]
#[command(name = "meterwatch")]
#[command(about = "Utility-meter consumption anomaly detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a meter log and report anomalous readings
    Analyze(AnalyzeArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => commands::run_analyze(args),
    }
}
