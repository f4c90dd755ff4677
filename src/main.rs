use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use physlab::{app::LabApp, config::LabConfig, state::SimulationMode};

/// Interactive rigid-body sandbox and double pendulum.
#[derive(Debug, Parser)]
#[command(name = "physlab", version, about)]
struct Args {
    /// TOML launch configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset to start in; overrides the config file.
    #[arg(long, value_enum)]
    preset: Option<SimulationMode>,

    /// Force vertical sync on.
    #[arg(long)]
    vsync: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LabConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LabConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if args.vsync {
        config.window.vsync = true;
    }
    log::info!("starting in {} mode", config.preset);

    let app = LabApp::new(config).context("creating application")?;
    app.run().context("running event loop")?;
    Ok(())
}
