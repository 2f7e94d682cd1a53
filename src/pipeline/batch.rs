//! Batch controller: one voice per run, one merge per work item.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::audio::{Clip, ClipWriter, sanitize_id};
use crate::engine::{GenerationParams, SAMPLE_RATE, SpeechModel, StyleTags, VoiceProfile};
use crate::pipeline::{MergeOrchestrator, PipelineError, synthesize_utterances};
use crate::script::WorkItem;
use crate::text::chunk_script;

/// What to do when a work item fails mid-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the batch at the first failing item
    #[default]
    Abort,
    /// Log the failure, keep going, and collect it in the report
    Continue,
}

/// Tunables shared by every work item in a run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub temperature: f32,              // Decoder sampling temperature
    pub speed: u8,                     // Speech speed level (1-10)
    pub style: StyleTags,              // Refine-stage style tag levels
    pub max_chars: usize,              // Chunking limit per utterance
    pub failure_policy: FailurePolicy, // Batch behavior on item failure
}

/// Everything produced for one successfully merged work item.
#[derive(Debug)]
pub struct ItemOutcome {
    pub id: String,       // Work item id
    pub clips: Vec<Clip>, // Clips in chunk order
    pub merged: PathBuf,  // Merged output file
}

/// A work item that failed, kept for the end-of-run report.
#[derive(Debug)]
pub struct ItemFailure {
    pub id: String,
    pub error: anyhow::Error,
}

/// Summary of a whole batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub failures: Vec<ItemFailure>,
}

/// Drives work items through chunking, synthesis, clip writing and merging.
///
/// The voice is sampled exactly once per run, so every item a batch produces
/// speaks with the same timbre.
pub struct SynthesisPipeline {
    model: Arc<dyn SpeechModel>, // Synthesis backend
    writer: ClipWriter,          // Clip output
    merger: MergeOrchestrator,   // Concat step
    options: PipelineOptions,
}

impl SynthesisPipeline {
    pub fn new(model: Arc<dyn SpeechModel>, writer: ClipWriter, merger: MergeOrchestrator, options: PipelineOptions) -> Self {
        Self { model, writer, merger, options }
    }

    /// Process `items` in order with a single voice sampled from `seed`.
    ///
    /// Under [`FailurePolicy::Abort`] the first failing item ends the run
    /// with an error; later items are not touched. Under
    /// [`FailurePolicy::Continue`] failures are logged and collected, and
    /// the report carries both sides.
    pub async fn run_batch(&self, seed: u64, items: &[WorkItem]) -> Result<BatchReport> {
        let profile = VoiceProfile::sample(self.model.as_ref(), seed)?;
        let mut report = BatchReport::default();

        for item in items {
            info!("📦 Processing \"{}\" ({} sentence(s))", item.id, item.sentences.len());
            match self.process_item(&profile, item).await {
                Ok(outcome) => {
                    let secs = outcome.clips.iter().map(|c| c.samples).sum::<usize>() as f32 / SAMPLE_RATE as f32;
                    info!("✅ \"{}\" merged into {} ({:.1}s of audio)", outcome.id, outcome.merged.display(), secs);
                    report.outcomes.push(outcome);
                }
                Err(error) => match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(error.context(format!("work item \"{}\"", item.id))),
                    FailurePolicy::Continue => {
                        error!("❌ Work item \"{}\" failed: {:#}", item.id, error);
                        report.failures.push(ItemFailure { id: item.id.clone(), error });
                    }
                },
            }
        }

        Ok(report)
    }

    /// Synthesize one text and merge it into `{token}_merge.wav` at the top
    /// of the output directory.
    pub async fn run_single(&self, seed: u64, text: &str) -> Result<PathBuf> {
        let profile = VoiceProfile::sample(self.model.as_ref(), seed)?;
        let item = WorkItem { id: "single".to_string(), sentences: vec![text.to_string()] };
        let merged = self.writer.dir().join(format!("{}_merge.wav", self.writer.token()));
        self.process_item_to(&profile, &item, merged.clone()).await?;
        Ok(merged)
    }

    /// Batch items merge into `merge/{id}_{token}_merge.wav`.
    async fn process_item(&self, profile: &VoiceProfile, item: &WorkItem) -> Result<ItemOutcome> {
        let merged = self
            .writer
            .dir()
            .join("merge")
            .join(format!("{}_{}_merge.wav", sanitize_id(&item.id), self.writer.token()));
        self.process_item_to(profile, item, merged).await
    }

    async fn process_item_to(&self, profile: &VoiceProfile, item: &WorkItem, merged: PathBuf) -> Result<ItemOutcome> {
        let utterances = chunk_script(&item.sentences, self.options.max_chars);
        if utterances.is_empty() {
            return Err(PipelineError::EmptyScript.into());
        }

        let params =
            GenerationParams::new(profile.embedding().clone(), self.options.style, self.options.temperature, self.options.speed);
        debug!("Generation params: {}", params.describe());
        let waveforms = synthesize_utterances(self.model.as_ref(), &utterances, &params).await?;

        let mut clips = Vec::with_capacity(waveforms.len());
        for (index, samples) in waveforms.iter().enumerate() {
            clips.push(self.writer.write(&item.id, index, samples)?);
        }

        self.merger.merge(&clips, &merged).await?;
        Ok(ItemOutcome { id: item.id.clone(), clips, merged })
    }
}
