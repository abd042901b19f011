use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use vesper::backend::GeminiClient;
use vesper::config::SessionConfig;
use vesper::content;
use vesper::input::ConsoleInput;
use vesper::narration::{CommandSpeech, NarrationChannel};
use vesper::oracle::BackendJudge;
use vesper::orchestrator::SessionRunner;
use vesper::ui;

#[derive(Parser)]
#[command(name = "vesper")]
#[command(version, about = "Spoken end-of-day reflection companion")]
struct Cli {
    /// Note files: none to just talk, one for today's notes, two to
    /// compare yesterday's against today's.
    #[arg(value_name = "NOTES")]
    files: Vec<PathBuf>,

    /// Trace raw judge replies.
    #[arg(long)]
    debug: bool,

    /// Echo narration without speaking it aloud.
    #[arg(long)]
    no_voice: bool,

    /// Directory for session logs. Defaults to the working directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Language backend model name.
    #[arg(long)]
    model: Option<String>,

    /// Speech command line, e.g. "say -v Samantha".
    #[arg(long)]
    tts_cmd: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = SessionConfig::new(
        cli.log_dir,
        cli.model,
        cli.tts_cmd,
        !cli.no_voice,
        cli.debug,
    )?;
    config.ensure_log_dir()?;

    let content = content::resolve(&cli.files);

    let backend =
        GeminiClient::from_env(config.model.as_str()).context("language backend unavailable")?;
    let judge = BackendJudge::new(backend.clone(), config.debug);

    let engine = CommandSpeech::new(&config.speech_cmd).context("invalid speech command")?;
    let narrator = NarrationChannel::new(Arc::new(engine), config.voice_enabled);

    ui::banner();

    let runner = SessionRunner::new(config, content, backend, judge, ConsoleInput, narrator);
    runner.run().await?;

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "vesper=debug" } else { "vesper=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
