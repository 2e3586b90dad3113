//! Question answering over the verse corpus: citation lookup first, then
//! retrieval plus a hosted completion model.

pub mod pipeline;
pub mod synthesizer;

pub use pipeline::Pipeline;
pub use synthesizer::{build_prompt, Synthesizer};
