//! Run orchestration: chunked synthesis, clip output and audio merging.

mod batch;
mod error;
mod merge;
mod synthesis;
mod token;


pub use batch::{BatchReport, FailurePolicy, ItemFailure, ItemOutcome, PipelineOptions, SynthesisPipeline};
pub use error::PipelineError;
pub use merge::{DEFAULT_MERGE_TIMEOUT_SECS, MergeOrchestrator, command_exists};
pub use synthesis::synthesize_utterances;
pub use token::RunToken;
