use anyhow::Result;
use clap::Parser;
use selector::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let report = run(&cli)?;
    if !report.feasible {
        tracing::warn!("no feasible keyword set; adjust hyperparameters and retry");
    }
    Ok(())
}
