//! Model invocation and waveform normalization.

use anyhow::Result;
use tracing::debug;

use crate::engine::{GenerationParams, SpeechModel};
use crate::pipeline::PipelineError;

/// Run the model over a batch of utterances and normalize its output.
///
/// The returned waveforms are flat mono buffers in utterance order. A model
/// that produces nothing for a non-empty batch yields
/// [`PipelineError::EmptySynthesis`]; a count disagreement yields
/// [`PipelineError::WaveformCountMismatch`]. Both checks run here so the
/// rest of the pipeline can rely on one waveform per utterance.
pub async fn synthesize_utterances(
    model: &dyn SpeechModel,
    utterances: &[String],
    params: &GenerationParams,
) -> Result<Vec<Vec<f32>>> {
    let raw = model.synthesize(utterances, params).await?;
    if raw.is_empty() && !utterances.is_empty() {
        return Err(PipelineError::EmptySynthesis { utterances: utterances.len() }.into());
    }
    if raw.len() != utterances.len() {
        return Err(PipelineError::WaveformCountMismatch { expected: utterances.len(), got: raw.len() }.into());
    }
    debug!("Model returned {} waveform(s)", raw.len());
    Ok(raw.into_iter().map(|w| w.into_mono()).collect())
}
