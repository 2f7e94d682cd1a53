//! Clip files: one mono 16-bit WAV per synthesized chunk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::engine::SAMPLE_RATE;
use crate::pipeline::RunToken;

/// One WAV file produced for one chunk of a work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub index: usize,   // Position of the chunk within its work item
    pub path: PathBuf,  // Where the WAV was written
    pub samples: usize, // Number of mono samples in the file
}

/// Writes clips into a run-scoped output directory.
///
/// File names follow `{id}_{index}_{token}.wav`, so clips from the same item
/// sort by chunk order and runs never collide with each other.
#[derive(Debug, Clone)]
pub struct ClipWriter {
    dir: PathBuf,    // Output directory, created on construction
    token: RunToken, // Run token mixed into every file name
}

impl ClipWriter {
    /// Create the output directory and return a writer bound to it.
    pub fn create(dir: impl Into<PathBuf>, token: RunToken) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir, token })
    }

    /// Write one chunk's samples to disk and describe the resulting clip.
    pub fn write(&self, item_id: &str, index: usize, samples: &[f32]) -> Result<Clip> {
        let path = self.dir.join(format!("{}_{}_{}.wav", sanitize_id(item_id), index, self.token));
        write_wav(&path, samples)?;
        debug!("Wrote {} ({} samples)", path.display(), samples.len());
        Ok(Clip { index, path, samples: samples.len() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn token(&self) -> &RunToken {
        &self.token
    }
}

/// Replace filesystem-hostile characters in a work item id.
///
/// Alphanumerics plus `.`, `_` and `-` pass through unchanged; anything else
/// becomes `_`. An empty id falls back to `item`.
pub fn sanitize_id(id: &str) -> String {
    if id.is_empty() {
        return "item".to_string();
    }
    id.chars().map(|c| if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' }).collect()
}

/// Write `samples` as a mono 16-bit PCM WAV at [`SAMPLE_RATE`].
fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = WavSpec { channels: 1, sample_rate: SAMPLE_RATE, bits_per_sample: 16, sample_format: SampleFormat::Int };
    let mut writer = WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize().with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}
