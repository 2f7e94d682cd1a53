//! Typed pipeline failures.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failures the pipeline reports in a typed form.
///
/// Everything still travels as [`anyhow::Error`]; callers that need to react
/// to a specific condition can downcast to this enum.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The model returned no waveforms for a non-empty utterance batch.
    #[error("synthesis produced no audio for {utterances} utterance(s)")]
    EmptySynthesis { utterances: usize },

    /// The model returned a different number of waveforms than requested.
    #[error("synthesis returned {got} waveform(s) for {expected} utterance(s)")]
    WaveformCountMismatch { expected: usize, got: usize },

    /// A work item had no synthesizable text left after chunking.
    #[error("no synthesizable text after chunking")]
    EmptyScript,

    /// The merge tool could not be spawned at all.
    #[error("merge tool '{bin}' could not be started")]
    MergeToolUnavailable {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    /// The merge tool ran but exited with a non-zero status.
    #[error("merge tool exited with {status}: {stderr}")]
    MergeToolFailed { status: ExitStatus, stderr: String },

    /// The merge tool did not finish within the configured timeout.
    #[error("merge tool did not finish within {timeout:?}")]
    MergeTimeout { timeout: Duration },
}
