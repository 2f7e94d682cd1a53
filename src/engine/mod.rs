//! Speech engine boundary.
//!
//! Defines the trait the pipeline drives and the data that crosses it:
//! speaker embeddings, generation parameters, and raw waveforms.

mod params;
mod tone;
mod voice;

pub use params::{GenerationParams, InferCodeParams, RefineTextParams, StyleTags};
pub use tone::ToneEngine;
pub use voice::VoiceProfile;

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;

/// Output sample rate of every engine, in Hz.
pub const SAMPLE_RATE: u32 = 24_000;

/// Dimension of a speaker embedding vector.
pub const SPEAKER_EMBEDDING_DIM: usize = 768;

/// A fixed-size vector representing one synthesized speaker's timbre.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerEmbedding(Vec<f32>);

impl SpeakerEmbedding {
    /// Wrap raw embedding values, checking the dimension.
    ///
    /// # Errors
    /// Returns an error if `values` is not [`SPEAKER_EMBEDDING_DIM`] long.
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.len() != SPEAKER_EMBEDDING_DIM {
            anyhow::bail!("speaker embedding must have {} values, got {}", SPEAKER_EMBEDDING_DIM, values.len());
        }
        Ok(Self(values))
    }

    /// Raw embedding values.
    pub fn values(&self) -> &[f32] {
        &self.0
    }
}

/// Waveform shape an engine may return for one utterance.
///
/// Decoders differ on whether they emit a flat mono buffer or channel-major
/// planes. The pipeline collapses either to mono once, at the synthesis
/// boundary, so everything downstream sees a single documented shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawWaveform {
    /// Flat mono samples
    Mono(Vec<f32>),
    /// One inner vector per channel
    Channels(Vec<Vec<f32>>),
}

impl RawWaveform {
    /// Collapse to flat mono samples, averaging across channels when needed.
    pub fn into_mono(self) -> Vec<f32> {
        match self {
            RawWaveform::Mono(samples) => samples,
            RawWaveform::Channels(mut planes) => match planes.len() {
                0 => Vec::new(),
                1 => planes.swap_remove(0),
                n => {
                    // Planes may disagree on length; truncate to the shortest
                    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
                    let scale = 1.0 / n as f32;
                    (0..frames).map(|i| planes.iter().map(|plane| plane[i]).sum::<f32>() * scale).collect()
                }
            },
        }
    }
}

/// Contract between the pipeline and a speech-generation model.
///
/// Implementations must return exactly one waveform per utterance, in input
/// order, sampled at [`SAMPLE_RATE`]. The pipeline verifies both properties
/// at its synthesis boundary.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Draw one speaker identity from the model's voice space.
    ///
    /// The RNG is the caller's: the same seeded generator must yield the
    /// same embedding, which is what makes voice selection reproducible.
    fn sample_speaker(&self, rng: &mut StdRng) -> Result<SpeakerEmbedding>;

    /// Synthesize one waveform per utterance using the given parameters.
    async fn synthesize(&self, utterances: &[String], params: &GenerationParams) -> Result<Vec<RawWaveform>>;
}
