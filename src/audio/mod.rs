//! WAV clip output.

mod writer;

pub use writer::{Clip, ClipWriter, sanitize_id};
