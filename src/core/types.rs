// src/core/types.rs — Aggregation data types

use serde::{Deserialize, Serialize};

use crate::infra::errors::AggregatorError;
use crate::provider::{Message, Role};

/// History tag recorded for the arbiter's output.
pub const JUDGE_TAG: &str = "judge";

/// One earlier exchange carried into a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A question plus optional prior turns.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    question: String,
    prior_turns: Vec<Turn>,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            prior_turns: Vec::new(),
        }
    }

    pub fn with_prior_turns(mut self, turns: Vec<Turn>) -> Self {
        self.prior_turns = turns;
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn prior_turns(&self) -> &[Turn] {
        &self.prior_turns
    }

    /// Prior turns in order, then the question as the final user message.
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .prior_turns
            .iter()
            .map(|t| Message {
                role: t.role,
                content: t.content.clone(),
            })
            .collect();
        messages.push(Message::user(self.question.clone()));
        messages
    }
}

/// Output of one source invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub source_id: String,
    pub answer_text: String,
    /// Seconds, never negative.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationOutcome {
    pub question: String,
    pub first: GenerationResult,
    pub second: GenerationResult,
    pub final_answer: String,
    pub final_duration: f64,
    /// Sum of the three stage durations, not the wall-clock span.
    pub total_duration: f64,
}

impl AggregationOutcome {
    pub fn new(
        question: impl Into<String>,
        first: GenerationResult,
        second: GenerationResult,
        final_answer: String,
        final_duration: f64,
    ) -> Self {
        let total_duration = first.duration + second.duration + final_duration;
        Self {
            question: question.into(),
            first,
            second,
            final_answer,
            final_duration,
            total_duration,
        }
    }
}

/// What `aggregate` hands back: the outcome, plus any failure to record it.
#[derive(Debug)]
pub struct AggregationReport {
    pub outcome: AggregationOutcome,
    pub persistence_error: Option<AggregatorError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, d: f64) -> GenerationResult {
        GenerationResult {
            source_id: id.into(),
            answer_text: format!("answer from {id}"),
            duration: d,
        }
    }

    #[test]
    fn test_total_duration_is_sum_of_stages() {
        let outcome =
            AggregationOutcome::new("q", result("a", 1.5), result("b", 2.0), "final".into(), 0.5);
        assert!((outcome.total_duration - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_messages_end_with_question() {
        let req = GenerationRequest::new("And Germany?").with_prior_turns(vec![
            Turn::user("Capital of France?"),
            Turn::assistant("Paris."),
        ]);
        let msgs = req.to_messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0].role, Role::User);
        assert_eq!(msgs[1].role, Role::Assistant);
        assert_eq!(msgs[2], Message::user("And Germany?"));
        assert_eq!(req.prior_turns().len(), 2);
    }

    #[test]
    fn test_plain_request_has_single_message() {
        let req = GenerationRequest::new("hi");
        assert_eq!(req.question(), "hi");
        assert_eq!(req.to_messages(), vec![Message::user("hi")]);
    }
}
