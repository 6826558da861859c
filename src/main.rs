//! # Hex
//!
//! Terminal Hex client. Logs go to a file because the terminal belongs to
//! the UI; set `RUST_LOG` or `--log-level` to change verbosity.
//!
//! ## Usage
//! Run with `cargo run --release --bin play` for a responsive opponent.

use clap::Parser;
use hex_engine::MctsStrategy;
use hexgame::audio::{AudioSink, TerminalAudio};
use hexgame::{App, AppError, HexConfig, SessionFactory, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Base configuration file.
    #[clap(short, long, default_value = "hex_config.json")]
    config: PathBuf,

    /// Where the user's settings are read and saved.
    #[clap(short, long, default_value = "hex_settings.json")]
    user_settings: PathBuf,

    /// Seed for seat assignment and AI playouts.
    #[clap(short, long)]
    seed: Option<u64>,

    /// Search threads; overrides the configuration file.
    #[clap(short = 't', long)]
    ai_threads: Option<usize>,

    #[clap(long, default_value = "hex.log")]
    log_file: PathBuf,

    #[clap(long, default_value = "info")]
    log_level: String,
}

fn init_logging(args: &Args) -> Result<(), AppError> {
    let log_file = std::fs::File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    // Don't fail if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    init_logging(&args)?;
    info!(config = %args.config.display(), "starting hex");

    let mut config = HexConfig::load_or_default(&args.config)?;
    if let Some(threads) = args.ai_threads {
        config.ai.threads = threads;
    }
    let store = SettingsStore::new(&args.user_settings);
    let settings = store.load(&config.defaults);

    let strategy = Arc::new(MctsStrategy::new(config.ai.to_mcts(args.seed))?);
    let audio: Arc<dyn AudioSink> = Arc::new(TerminalAudio::new(
        config.audio.terminal_bell,
        settings.music_volume,
        settings.sfx_volume,
    ));
    let factory = SessionFactory::new(args.seed, strategy, audio);

    let mut app = App::new(config, settings, factory);
    let outcome = hexgame::tui::run(&mut app);

    if let Err(err) = store.save(app.settings()) {
        warn!(%err, "could not save settings");
    }
    info!("bye");
    outcome
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("hex: {err}");
        std::process::exit(1);
    }
}
