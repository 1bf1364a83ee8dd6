// src/core/pipeline.rs — Two sources, one judge, three history rows

use std::sync::Arc;

use super::arbiter::Arbiter;
use super::source::AnswerSource;
use super::types::{
    AggregationOutcome, AggregationReport, GenerationRequest, GenerationResult, JUDGE_TAG,
};
use crate::infra::config::Config;
use crate::infra::errors::AggregatorError;
use crate::memory::{HistoryStore, NewHistoryRecord};
use crate::provider::ModelProvider;

pub struct AggregationPipeline {
    first: AnswerSource,
    second: AnswerSource,
    arbiter: Arbiter,
    history: Arc<dyn HistoryStore>,
}

impl AggregationPipeline {
    pub fn new(
        first: AnswerSource,
        second: AnswerSource,
        arbiter: Arbiter,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            first,
            second,
            arbiter,
            history,
        }
    }

    pub fn from_config(
        provider: Arc<dyn ModelProvider>,
        config: &Config,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let (first, second, judge) = AnswerSource::from_config(provider, config);
        Self::new(first, second, Arbiter::new(judge), history)
    }

    /// Identifiers of the two primaries and the judge, in that order.
    pub fn source_ids(&self) -> [&str; 3] {
        [self.first.id(), self.second.id(), self.arbiter.source_id()]
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Ask both primaries, merge their answers, record all three stages.
    ///
    /// Either primary failing aborts the whole aggregation and nothing is
    /// recorded. A failure to record a finished aggregation does not discard
    /// it; it is reported in [`AggregationReport::persistence_error`].
    pub async fn aggregate(&self, question: &str) -> Result<AggregationReport, AggregatorError> {
        if question.trim().is_empty() {
            return Err(AggregatorError::InvalidRequest(
                "question cannot be empty".into(),
            ));
        }

        let request = GenerationRequest::new(question);
        let (first, second) = tokio::try_join!(
            Self::primary(&self.first, &request),
            Self::primary(&self.second, &request),
        )?;

        let (final_answer, final_duration) = self
            .arbiter
            .arbitrate(question, &first.answer_text, &second.answer_text)
            .await?;

        let outcome = AggregationOutcome::new(question, first, second, final_answer, final_duration);
        tracing::info!(
            first_s = outcome.first.duration,
            second_s = outcome.second.duration,
            judge_s = outcome.final_duration,
            total_s = outcome.total_duration,
            "aggregation complete"
        );

        let persistence_error = self.record(&outcome).await.err();
        if let Some(ref e) = persistence_error {
            tracing::warn!("aggregation finished but was not fully recorded: {e}");
        }

        Ok(AggregationReport {
            outcome,
            persistence_error,
        })
    }

    async fn primary(
        source: &AnswerSource,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, AggregatorError> {
        source.generate(request).await.map_err(|e| {
            tracing::warn!(source = source.id(), "primary generation failed: {e}");
            AggregatorError::PartialGenerationFailure {
                source_id: source.id().to_string(),
                source: Box::new(e),
            }
        })
    }

    /// Three independent appends; the first failure stops the rest.
    async fn record(&self, outcome: &AggregationOutcome) -> Result<(), AggregatorError> {
        let rows = [
            NewHistoryRecord::new(
                &outcome.question,
                &outcome.first.source_id,
                &outcome.first.answer_text,
                outcome.first.duration,
            ),
            NewHistoryRecord::new(
                &outcome.question,
                &outcome.second.source_id,
                &outcome.second.answer_text,
                outcome.second.duration,
            ),
            NewHistoryRecord::new(
                &outcome.question,
                JUDGE_TAG,
                &outcome.final_answer,
                outcome.final_duration,
            ),
        ];
        for row in rows {
            self.history.append(row).await?;
        }
        Ok(())
    }
}
