//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::StyleTags;
use crate::pipeline::{DEFAULT_MERGE_TIMEOUT_SECS, FailurePolicy, PipelineOptions, command_exists};
use crate::text::DEFAULT_MAX_CHARS;

/// Batch speech synthesis application configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "pitchcast")]
#[command(author, version, about = "Batch text-to-speech synthesis and merging", long_about = None)]
pub struct AppConfig {
    /// Enable verbose (debug) logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Synthesize every work item in a JSON script, merging each into its own file
    Batch(BatchArgs),
    /// Synthesize one text and merge it into a single file
    Single(SingleArgs),
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct BatchArgs {
    /// JSON script mapping work item ids to sentence lists
    #[arg(long, short = 's')]
    pub script: PathBuf,

    /// What to do when a work item fails
    #[arg(long, value_enum, default_value = "abort")]
    pub on_error: FailurePolicy,

    /// Speech speed level (1-10)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub speed: u8,

    #[command(flatten)]
    pub synth: SynthArgs,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct SingleArgs {
    /// Text to speak
    #[arg(long, short = 't', conflicts_with = "text_file", required_unless_present = "text_file")]
    pub text: Option<String>,

    /// Read the text to speak from a file instead
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// Speech speed level (1-10)
    #[arg(long, default_value = "8", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub speed: u8,

    #[command(flatten)]
    pub synth: SynthArgs,
}

/// Synthesis options shared by both subcommands.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct SynthArgs {
    /// Directory for clips and merged output
    #[arg(long, short = 'o', env = "PITCHCAST_OUT", default_value = "tts-output")]
    pub output_dir: PathBuf,

    /// Voice sampling seed
    #[arg(long, default_value = "1367")]
    pub seed: u64,

    /// Decoder sampling temperature (0.0 - 2.0)
    #[arg(long, default_value = "0.2", value_parser = parse_temperature)]
    pub temperature: f32,

    /// Conversational filler level (0-9)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=9))]
    pub oral: u8,

    /// Laughter insertion level (0-2)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=2))]
    pub laugh: u8,

    /// Pause insertion level (0-7)
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(0..=7))]
    pub break_level: u8,

    /// Maximum characters per synthesized chunk
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    pub max_chars: usize,

    /// Merge tool binary name or path
    #[arg(long, env = "FFMPEG_BIN", default_value = "ffmpeg")]
    pub ffmpeg_bin: String,

    /// Seconds to wait for one merge before giving up
    #[arg(long, default_value_t = DEFAULT_MERGE_TIMEOUT_SECS)]
    pub merge_timeout_secs: u64,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Synthesis options of whichever subcommand was chosen.
    pub fn synth(&self) -> &SynthArgs {
        match &self.command {
            Command::Batch(args) => &args.synth,
            Command::Single(args) => &args.synth,
        }
    }

    /// Speech speed level. Batch mode defaults to 5, single mode to 8.
    pub fn speed(&self) -> u8 {
        match &self.command {
            Command::Batch(args) => args.speed,
            Command::Single(args) => args.speed,
        }
    }

    pub fn style_tags(&self) -> StyleTags {
        let synth = self.synth();
        StyleTags { oral: synth.oral, laugh: synth.laugh, break_level: synth.break_level }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let synth = self.synth();
        let failure_policy = match &self.command {
            Command::Batch(args) => args.on_error,
            // A single text is one item; there is nothing to continue past.
            Command::Single(_) => FailurePolicy::Abort,
        };
        PipelineOptions {
            temperature: synth.temperature,
            speed: self.speed(),
            style: self.style_tags(),
            max_chars: synth.max_chars,
            failure_policy,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Batch(args) => {
                if !args.script.is_file() {
                    anyhow::bail!("Script file not found: {}", args.script.display());
                }
            }
            Command::Single(args) => {
                if let Some(file) = &args.text_file
                    && !file.is_file()
                {
                    anyhow::bail!("Text file not found: {}", file.display());
                }
            }
        }

        let synth = self.synth();
        if synth.max_chars == 0 {
            anyhow::bail!("Max chars must be at least 1");
        }
        if synth.merge_timeout_secs == 0 {
            anyhow::bail!("Merge timeout must be at least 1 second");
        }
        if synth.output_dir.is_file() {
            anyhow::bail!("Output directory is an existing file: {}", synth.output_dir.display());
        }

        // Missing ffmpeg only breaks the merge step, so warn instead of failing.
        if !command_exists(&synth.ffmpeg_bin) {
            warn!("⚠️ Merge tool '{}' not found; merging will fail", synth.ffmpeg_bin);
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        let synth = self.synth();
        info!("Configuration:");
        match &self.command {
            Command::Batch(args) => {
                info!("  Mode: batch ({})", args.script.display());
                info!("  On error: {:?}", args.on_error);
            }
            Command::Single(args) => match (&args.text, &args.text_file) {
                (Some(text), _) => info!("  Mode: single ({} chars inline)", text.chars().count()),
                (None, Some(file)) => info!("  Mode: single ({})", file.display()),
                (None, None) => info!("  Mode: single"),
            },
        }
        info!("  Output dir: {}", synth.output_dir.display());
        info!("  Seed: {}", synth.seed);
        info!("  Temperature: {}", synth.temperature);
        info!("  Speed: {}", self.speed());
        info!("  Style: {}", self.style_tags().prompt());
        info!("  Max chars: {}", synth.max_chars);
        info!("  Merge tool: {} (timeout {}s)", synth.ffmpeg_bin, synth.merge_timeout_secs);
    }
}

/// Parse and validate temperature value (0.0-2.0).
fn parse_temperature(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid float", s))?;
    if (0.0..=2.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("temperature must be between 0.0 and 2.0, got {}", value))
    }
}
