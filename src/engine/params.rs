//! Generation parameter bundles passed to the speech model.

use super::SpeakerEmbedding;

/// Default nucleus-sampling threshold for text refinement.
pub const DEFAULT_TOP_P: f32 = 0.7;

/// Default top-k cutoff for text refinement.
pub const DEFAULT_TOP_K: u32 = 20;

/// Token budget for the refine-text pass.
pub const REFINE_MAX_NEW_TOKENS: u32 = 384;

/// Token budget for the code-inference pass.
pub const INFER_MAX_NEW_TOKENS: u32 = 2048;

/// Levels for the style tags embedded in the refine-text prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTags {
    pub oral: u8,        // Conversational filler level (0-9)
    pub laugh: u8,       // Laughter insertion level (0-2)
    pub break_level: u8, // Pause insertion level (0-7)
}

impl Default for StyleTags {
    fn default() -> Self {
        Self { oral: 2, laugh: 0, break_level: 6 }
    }
}

impl StyleTags {
    /// Render the tag prompt, e.g. `[oral_2][laugh_0][break_6]`.
    pub fn prompt(&self) -> String {
        format!("[oral_{}][laugh_{}][break_{}]", self.oral, self.laugh, self.break_level)
    }
}

/// Sampling controls for the model's text-refinement pass.
#[derive(Debug, Clone)]
pub struct RefineTextParams {
    pub prompt: String,      // Style tag prompt
    pub top_p: f32,          // Nucleus sampling threshold
    pub top_k: u32,          // Top-k cutoff
    pub max_new_tokens: u32, // Token budget
    pub temperature: f32,    // Sampling temperature
}

/// Sampling controls for the model's audio-code inference pass.
#[derive(Debug, Clone)]
pub struct InferCodeParams {
    pub speaker: SpeakerEmbedding, // Voice identity, shared across the run
    pub prompt: String,            // Speed tag prompt, e.g. `[speed_5]`
    pub max_new_tokens: u32,       // Token budget
    pub temperature: f32,          // Sampling temperature
}

/// Everything one synthesis call needs beyond the utterance text.
///
/// Rebuilt per work item (speed and temperature may differ between runs),
/// but the speaker embedding inside is always cloned from the run's single
/// [`super::VoiceProfile`], never re-sampled.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub refine_text: RefineTextParams,
    pub infer_code: InferCodeParams,
    pub skip_refine_text: bool,
    pub do_text_normalization: bool,
    pub do_homophone_replacement: bool,
}

impl GenerationParams {
    /// Compact one-line summary for debug logs.
    pub fn describe(&self) -> String {
        format!(
            "refine {}{} (top_p {}, top_k {}, max {}, temp {}), infer {} (max {}, temp {}), normalize {}, homophones {}",
            self.refine_text.prompt,
            if self.skip_refine_text { " [skipped]" } else { "" },
            self.refine_text.top_p,
            self.refine_text.top_k,
            self.refine_text.max_new_tokens,
            self.refine_text.temperature,
            self.infer_code.prompt,
            self.infer_code.max_new_tokens,
            self.infer_code.temperature,
            self.do_text_normalization,
            self.do_homophone_replacement,
        )
    }

    /// Assemble the per-item parameter set around a shared speaker embedding.
    pub fn new(speaker: SpeakerEmbedding, style: StyleTags, temperature: f32, speed: u8) -> Self {
        Self {
            refine_text: RefineTextParams {
                prompt: style.prompt(),
                top_p: DEFAULT_TOP_P,
                top_k: DEFAULT_TOP_K,
                max_new_tokens: REFINE_MAX_NEW_TOKENS,
                temperature,
            },
            infer_code: InferCodeParams {
                speaker,
                prompt: format!("[speed_{speed}]"),
                max_new_tokens: INFER_MAX_NEW_TOKENS,
                temperature,
            },
            skip_refine_text: true,
            do_text_normalization: false,
            do_homophone_replacement: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SPEAKER_EMBEDDING_DIM;

    fn embedding() -> SpeakerEmbedding {
        SpeakerEmbedding::new(vec![0.0; SPEAKER_EMBEDDING_DIM]).unwrap()
    }

    #[test]
    fn default_style_prompt_matches_driver_defaults() {
        assert_eq!(StyleTags::default().prompt(), "[oral_2][laugh_0][break_6]");
    }

    #[test]
    fn custom_style_levels_render_in_order() {
        let tags = StyleTags { oral: 7, laugh: 2, break_level: 0 };
        assert_eq!(tags.prompt(), "[oral_7][laugh_2][break_0]");
    }

    #[test]
    fn params_carry_speed_tag_and_shared_defaults() {
        let params = GenerationParams::new(embedding(), StyleTags::default(), 0.2, 8);
        assert_eq!(params.infer_code.prompt, "[speed_8]");
        assert_eq!(params.refine_text.top_p, DEFAULT_TOP_P);
        assert_eq!(params.refine_text.top_k, DEFAULT_TOP_K);
        assert_eq!(params.refine_text.max_new_tokens, REFINE_MAX_NEW_TOKENS);
        assert_eq!(params.infer_code.max_new_tokens, INFER_MAX_NEW_TOKENS);
        assert_eq!(params.refine_text.temperature, 0.2);
        assert_eq!(params.infer_code.temperature, 0.2);
    }

    #[test]
    fn invocation_switches_match_driver_defaults() {
        let params = GenerationParams::new(embedding(), StyleTags::default(), 0.3, 5);
        assert!(params.skip_refine_text);
        assert!(!params.do_text_normalization);
        assert!(params.do_homophone_replacement);
    }

    #[test]
    fn describe_covers_both_passes() {
        let summary = GenerationParams::new(embedding(), StyleTags::default(), 0.2, 5).describe();
        assert!(summary.contains("[oral_2][laugh_0][break_6] [skipped]"), "summary: {summary}");
        assert!(summary.contains("[speed_5]"), "summary: {summary}");
    }
}
