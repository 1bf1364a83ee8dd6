// src/core/mod.rs — Aggregation core

pub mod arbiter;
pub mod pipeline;
pub mod source;
pub mod types;

pub use arbiter::Arbiter;
pub use pipeline::AggregationPipeline;
pub use source::AnswerSource;
pub use types::{AggregationOutcome, AggregationReport, GenerationRequest, GenerationResult};
