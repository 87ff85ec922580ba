// SPDX-License-Identifier: GPL-3.0-only

use bactrack::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "bactrack")]
#[command(about = "Webcam posture monitor with a live rating feed")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor and its HTTP/WebSocket server (default)
    Serve(ServeArgs),

    /// List available cameras
    List,

    /// Print the effective configuration
    Config {
        /// Config file to read (default: ~/.config/bactrack/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the effective configuration to the default location
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Config file to read (default: ~/.config/bactrack/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// V4L2 device node, e.g. /dev/video0
    #[arg(long)]
    camera: Option<String>,

    /// Replay an image file or directory instead of a webcam
    #[arg(long)]
    image_source: Option<PathBuf>,

    /// Pose helper command line, e.g. --extractor python3 pose_helper.py
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    extractor: Option<Vec<String>>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(camera) = self.camera {
            config.camera_device = camera;
        }
        if let Some(source) = self.image_source {
            config.image_source = Some(source);
        }
        if let Some(extractor) = self.extractor {
            config.extractor_command = extractor;
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> bactrack::AppResult<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=bactrack=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bactrack=info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Config { config, save }) => {
            cli::print_config(load_config(config.as_ref())?, save)
        }
        Some(Commands::Serve(args)) => run_server(args),
        None => run_server(ServeArgs::default()),
    }
}

fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(args.config.as_ref())?;
    args.apply(&mut config);

    // Network handlers share one thread; the frame pipeline has its own
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(bactrack::server::run(config))?;

    Ok(())
}
