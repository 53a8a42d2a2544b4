use clap::Parser;
use tracing::error;

use std::path::PathBuf;
use std::process::ExitCode;

use vsboosts::config::PipelineConfig;
use vsboosts::pipeline::Pipeline;


/// Train a stacked boosting ensemble for virtual screening.
#[derive(Debug, Parser)]
#[command(name = "vsboosts", version, about)]
struct Cli {
    /// Path to the JSON configuration.
    config: PathBuf,
}


fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let run = PipelineConfig::from_path(&cli.config)
        .and_then(|config| Pipeline::new(config).run());

    match run {
        Ok(output) => {
            println!("{}", output.reports.result.display());
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!(error = %e, "screening run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}
