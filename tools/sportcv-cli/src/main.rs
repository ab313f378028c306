//! SportCV CLI: landing analysis of pre-recorded jump videos.
//!
//! Usage:
//!   sportcv analyze <VIDEO> --poses <JSONL>   Detect landings in a video
//!   sportcv probe <VIDEO>                     Show duration and sampling plan
//!   sportcv check                             Check decoder availability
//!   sportcv config show|init                  Print or write the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sportcv_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "sportcv",
    about = "Landing detection and joint kinematics for jump videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect landings in a video
    Analyze {
        /// Path to the video file
        video: PathBuf,

        /// Recorded pose estimator output (JSONL, one record per sampled frame)
        #[arg(short, long)]
        poses: PathBuf,

        /// Sampling rate in frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Joint whose vertical position is tracked
        #[arg(long)]
        joint: Option<String>,

        /// Body side for the joint angle: left|right
        #[arg(long)]
        side: Option<String>,

        /// Limb whose middle joint carries the angle: leg|arm
        #[arg(long)]
        limb: Option<String>,

        /// Acceleration magnitude a landing must exceed (px/frame²)
        #[arg(long)]
        threshold: Option<f64>,

        /// Minimum accepted video duration (seconds)
        #[arg(long)]
        min_duration: Option<f64>,

        /// Position smoothing: none|ema|moving-average
        #[arg(long)]
        smoothing: Option<String>,

        /// EMA smoothing strength [0.0, 1.0]
        #[arg(long, default_value = "0.3")]
        smoothing_strength: f64,

        /// Moving-average window (samples)
        #[arg(long, default_value = "3")]
        smoothing_window: usize,

        /// Print the full result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show video duration and the planned samples
    Probe {
        /// Path to the video file
        video: PathBuf,

        /// Sampling rate in frames per second
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Check that the video decoder is usable
    Check,

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    sportcv_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            video,
            poses,
            fps,
            joint,
            side,
            limb,
            threshold,
            min_duration,
            smoothing,
            smoothing_strength,
            smoothing_window,
            json,
        } => {
            let options = commands::analyze::AnalyzeOptions {
                fps,
                joint,
                side,
                limb,
                threshold,
                min_duration,
                smoothing,
                smoothing_strength,
                smoothing_window,
                json,
            };
            commands::analyze::run(video, poses, options, &config).await
        }
        Commands::Probe { video, fps } => {
            commands::probe::run(video, fps.unwrap_or(config.analysis.fps), &config)
        }
        Commands::Check => commands::check::run(),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config),
            ConfigAction::Init { force } => commands::config_cmd::init(force),
        },
    }
}
