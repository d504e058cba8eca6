//! MRET XRC session simulator
//!
//! Runs an author and an observer against the in-process loopback engine and
//! reports whether the observer's mirror converged on the published scene.
//!
//! Usage:
//!   mret-xrc-sim --frames 20 --frame-ms 25 --scene scene.json

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result, bail};
use clap::Parser;
use mret_xrc::XrcConfig;
use mret_xrc_sim::{SimOptions, run};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "mret-xrc-sim")]
#[command(about = "Simulate a two-participant MRET collaboration session")]
struct Args {
    /// JSON XRC configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON scene file (defaults to a built-in demo scene)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Number of author frames
    #[arg(short, long, default_value = "12")]
    frames: usize,

    /// Milliseconds between author frames
    #[arg(long, default_value = "50")]
    frame_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = match &args.config {
        Some(path) => XrcConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => XrcConfig::default(),
    };
    info!("MRET XRC simulator starting...");

    let report = run(SimOptions {
        config,
        scene: args.scene,
        frames: args.frames,
        frame_interval: Duration::from_millis(args.frame_ms),
    })
    .await?;

    println!("\n========================================");
    println!("  MRET XRC Simulation");
    println!("========================================");
    println!("  Session:       {}", report.session_id);
    println!("  Frames:        {}", report.frames);
    println!("  Published:     {}", report.published);
    println!("  Edits:         {}", report.edits);
    println!("  Observed:      {}", report.observed_entities);
    println!("  Participants:  {}", report.observed_participants);
    println!("  Events:        {}", report.events_applied);
    println!("  Converged:     {}", report.converged());
    println!("========================================\n");

    if !report.converged() {
        bail!(
            "Observer diverged on {} of {} entities",
            report.mismatched.len(),
            report.published
        );
    }
    Ok(())
}
