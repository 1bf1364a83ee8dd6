// src/core/arbiter.rs — Merge two candidate answers into one

use minijinja::{context, Environment};

use super::source::AnswerSource;
use super::types::GenerationRequest;
use crate::infra::errors::AggregatorError;

/// Characters compared by the near-duplicate short-circuit.
pub const PREFIX_CHARS: usize = 100;

/// Nominal duration reported when the short-circuit fires.
pub const FAST_PATH_DURATION: f64 = 0.1;

const SYNTHESIS_TEMPLATE: &str = "\
You are an expert who analyzes AI answers.

Question: {{ question }}

ANSWER 1:
{{ answer1 }}

ANSWER 2:
{{ answer2 }}

Task:
Using the two answers above, produce one single, high-quality and concise final answer. \
Do not explain your reasoning, do not compare the answers, and do not mention which parts \
you selected. Simply provide the best possible final answer.

FINAL ANSWER:
";

pub struct Arbiter {
    source: AnswerSource,
}

impl Arbiter {
    pub fn new(source: AnswerSource) -> Self {
        Self { source }
    }

    pub fn source_id(&self) -> &str {
        self.source.id()
    }

    /// Return the final answer and the time spent producing it.
    pub async fn arbitrate(
        &self,
        question: &str,
        answer1: &str,
        answer2: &str,
    ) -> Result<(String, f64), AggregatorError> {
        if same_prefix(answer1, answer2) {
            tracing::debug!("answers share a {PREFIX_CHARS}-char prefix, skipping synthesis");
            return Ok((answer1.to_string(), FAST_PATH_DURATION));
        }

        let prompt = self
            .synthesis_prompt(question, answer1, answer2)
            .map_err(|e| AggregatorError::ArbitrationFailure {
                source: Box::new(e),
            })?;

        let result = self
            .source
            .generate(&GenerationRequest::new(prompt))
            .await
            .map_err(|e| AggregatorError::ArbitrationFailure {
                source: Box::new(e),
            })?;

        Ok((result.answer_text, result.duration))
    }

    pub fn synthesis_prompt(
        &self,
        question: &str,
        answer1: &str,
        answer2: &str,
    ) -> Result<String, AggregatorError> {
        let env = Environment::new();
        let prompt = env
            .render_str(SYNTHESIS_TEMPLATE, context! { question, answer1, answer2 })
            .map_err(|e| anyhow::anyhow!("rendering synthesis prompt: {e}"))?;
        Ok(prompt)
    }
}

/// Exact comparison of the first `PREFIX_CHARS` characters only; texts that
/// diverge later still count as duplicates.
pub fn same_prefix(a: &str, b: &str) -> bool {
    a.chars().take(PREFIX_CHARS).eq(b.chars().take(PREFIX_CHARS))
}
