//! Built-in deterministic speech engine.
//!
//! Renders each utterance as a sine sketch whose pitch contour is derived
//! from the speaker embedding and the utterance text. The output is not
//! speech, but it is stable: the same embedding, text, and parameters always
//! produce the same samples, which makes the full pipeline runnable and
//! verifiable without model weights. Real model bindings implement
//! [`SpeechModel`] instead.

use std::f32::consts::PI;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use super::{GenerationParams, RawWaveform, SAMPLE_RATE, SPEAKER_EMBEDDING_DIM, SpeakerEmbedding, SpeechModel};

/// Peak amplitude of rendered tones.
const AMPLITUDE: f32 = 0.35;

/// Seconds of audio per input character at speed level 5.
const SECS_PER_CHAR: f32 = 0.045;

/// Floor on utterance duration so even one-character inputs are audible.
const MIN_UTTERANCE_SECS: f32 = 0.25;

/// Deterministic sine-sketch engine.
#[derive(Debug, Default)]
pub struct ToneEngine;

impl ToneEngine {
    pub fn new() -> Self {
        Self
    }

    /// Render one utterance: each character becomes a short tone pitched a
    /// few semitones around a base frequency taken from the embedding.
    fn render(&self, text: &str, params: &GenerationParams) -> Vec<f32> {
        let embedding = params.infer_code.speaker.values();
        let speed = speed_level(&params.infer_code.prompt).unwrap_or(5).clamp(1, 10);

        let chars: Vec<char> = text.chars().collect();
        let char_count = chars.len().max(1);

        let secs = (char_count as f32 * SECS_PER_CHAR * 5.0 / speed as f32).max(MIN_UTTERANCE_SECS);
        let total = (secs * SAMPLE_RATE as f32) as usize;
        let per_char = (total / char_count).max(1);

        let base_freq = 150.0 + 70.0 * embedding[0];
        let vibrato_rate = 4.5 + 1.5 * embedding[1];
        let vibrato_depth = 2.0 + 6.0 * params.infer_code.temperature;

        let dt = 1.0 / SAMPLE_RATE as f32;
        let mut samples = Vec::with_capacity(total);
        let mut phase = 0.0f32;

        for (i, &c) in chars.iter().enumerate() {
            let semitones = (c as u32 % 12) as f32 - 6.0;
            let freq = base_freq * (semitones / 12.0).exp2();

            let start = i * per_char;
            let end = if i + 1 == char_count { total } else { ((i + 1) * per_char).min(total) };
            let segment = (end.saturating_sub(start)).max(1) as f32;

            for n in start..end {
                let t = n as f32 * dt;
                let pos = (n - start) as f32 / segment;
                // Short ramps in and out of each character keep segment joins click-free
                let envelope = (pos * 20.0).min((1.0 - pos) * 20.0).clamp(0.0, 1.0);
                let f = freq + vibrato_depth * (2.0 * PI * vibrato_rate * t).sin();
                phase += 2.0 * PI * f * dt;
                samples.push(AMPLITUDE * envelope * phase.sin());
            }
        }

        samples
    }
}

#[async_trait]
impl SpeechModel for ToneEngine {
    fn name(&self) -> &str {
        "tone"
    }

    fn sample_speaker(&self, rng: &mut StdRng) -> Result<SpeakerEmbedding> {
        let values = (0..SPEAKER_EMBEDDING_DIM).map(|_| rng.random_range(-1.0f32..1.0)).collect();
        SpeakerEmbedding::new(values)
    }

    async fn synthesize(&self, utterances: &[String], params: &GenerationParams) -> Result<Vec<RawWaveform>> {
        let mut waveforms = Vec::with_capacity(utterances.len());
        for utterance in utterances {
            let samples = self.render(utterance, params);
            debug!("Rendered {} samples for \"{}\"", samples.len(), utterance);
            waveforms.push(RawWaveform::Mono(samples));
        }
        Ok(waveforms)
    }
}

/// Parse the numeric level out of a `[speed_N]` tag.
fn speed_level(prompt: &str) -> Option<u8> {
    prompt.strip_prefix("[speed_")?.strip_suffix(']')?.parse().ok()
}
