//! Retrieval-augmented answering: the per-question pipeline and the final
//! answer synthesis step.

pub mod pipeline;
pub mod synthesize;

pub use pipeline::{AnswerPipeline, PipelineSettings};
pub use synthesize::{build_context, AnswerSynthesizer};
