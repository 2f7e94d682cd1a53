//! Pitchcast - batch text-to-speech synthesis and merging.
//!
//! Reads a JSON script of work items (or a single text), synthesizes each
//! item chunk by chunk with one reproducible voice per run, writes one WAV
//! clip per chunk, and merges every item's clips into a single file with
//! ffmpeg's concat demuxer.

mod audio;
mod config;
mod engine;
mod pipeline;
mod script;
mod text;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use audio::ClipWriter;
use config::{AppConfig, Command, SingleArgs};
use engine::{SpeechModel, ToneEngine};
use pipeline::{BatchReport, MergeOrchestrator, RunToken, SynthesisPipeline};
use script::load_work_items;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Initialize logging with time-only format
    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .unwrap();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🎙️ Pitchcast v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }
    config.log_config();

    // Assemble the pipeline
    let synth = config.synth();
    let model: Arc<dyn SpeechModel> = Arc::new(ToneEngine::new());
    info!("🎤 Synthesis engine: {}", model.name());

    let writer = ClipWriter::create(&synth.output_dir, RunToken::new())?;
    let merger = MergeOrchestrator::new(&synth.ffmpeg_bin, Duration::from_secs(synth.merge_timeout_secs));
    let pipeline = SynthesisPipeline::new(model, writer, merger, config.pipeline_options());

    match &config.command {
        Command::Batch(args) => {
            let items = load_work_items(&args.script)?;
            info!("📦 Loaded {} work item(s) from {}", items.len(), args.script.display());

            let report = pipeline.run_batch(synth.seed, &items).await?;
            summarize(&report);
            if !report.failures.is_empty() {
                std::process::exit(1);
            }
        }
        Command::Single(args) => {
            let text = resolve_text(args)?;
            let merged = pipeline.run_single(synth.seed, &text).await?;
            info!("✅ Merged output: {}", merged.display());
        }
    }

    Ok(())
}

/// Resolve the text of a single-mode run from its two possible sources.
fn resolve_text(args: &SingleArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(file) = &args.text_file {
        return std::fs::read_to_string(file).with_context(|| format!("reading text file {}", file.display()));
    }
    bail!("either --text or --text-file is required");
}

/// Log the end-of-batch report, one line per item.
fn summarize(report: &BatchReport) {
    for outcome in &report.outcomes {
        info!("  {} -> {} ({} clip(s))", outcome.id, outcome.merged.display(), outcome.clips.len());
    }
    for failure in &report.failures {
        warn!("  {} -> FAILED: {:#}", failure.id, failure.error);
    }
    info!("✅ Batch finished: {} merged, {} failed", report.outcomes.len(), report.failures.len());
}
