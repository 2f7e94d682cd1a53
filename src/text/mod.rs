//! Text preparation for synthesis.
//!
//! Turns raw script sentences into utterance units sized for the model.

mod chunker;

pub use chunker::{DEFAULT_MAX_CHARS, chunk_script, split_sentences};
