// src/core/source.rs — One generation identity on top of a provider

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::types::{GenerationRequest, GenerationResult};
use crate::infra::config::Config;
use crate::infra::errors::AggregatorError;
use crate::provider::{ChatRequest, ModelProvider};

/// A model identifier bound to a provider, an output cap and a deadline.
#[derive(Clone)]
pub struct AnswerSource {
    provider: Arc<dyn ModelProvider>,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    timeout: Duration,
}

impl AnswerSource {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
            system: None,
            timeout,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// The two primaries and the judge, as described by the config.
    pub fn from_config(
        provider: Arc<dyn ModelProvider>,
        config: &Config,
    ) -> (AnswerSource, AnswerSource, AnswerSource) {
        let generation = &config.generation;
        let primary = |model: &str| {
            AnswerSource::new(
                provider.clone(),
                model,
                generation.primary_max_tokens,
                generation.timeout(),
            )
            .with_system(generation.system_prompt.clone())
        };
        let first = primary(&config.sources.first);
        let second = primary(&config.sources.second);
        let judge = AnswerSource::new(
            provider.clone(),
            config.sources.judge.clone(),
            generation.judge_max_tokens,
            generation.timeout(),
        );
        (first, second, judge)
    }

    pub fn id(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Run one completion and time it.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, AggregatorError> {
        let chat = ChatRequest {
            model: self.model.clone(),
            messages: request.to_messages(),
            max_tokens: Some(self.max_tokens),
            temperature: None,
            system: self.system.clone(),
        };

        let start = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.provider.chat(chat))
            .await
            .map_err(|_| AggregatorError::SourceTimeout {
                source_id: self.model.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| match e {
                // The transport layer does not know our deadline.
                AggregatorError::SourceTimeout { source_id, .. } => AggregatorError::SourceTimeout {
                    source_id,
                    timeout_ms: self.timeout.as_millis() as u64,
                },
                other => other,
            })?;
        let duration = start.elapsed().as_secs_f64();

        tracing::debug!(
            source = %self.model,
            duration_s = duration,
            tokens = response.usage.total(),
            "generation finished"
        );

        Ok(GenerationResult {
            source_id: self.model.clone(),
            answer_text: response.content,
            duration,
        })
    }
}

impl std::fmt::Debug for AnswerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerSource")
            .field("provider", &self.provider.id())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Turn;
    use crate::provider::{ChatResponse, Message, Role, TokenUsage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last request and answers after an optional delay.
    struct RecordingProvider {
        delay: Duration,
        last: Mutex<Option<ChatRequest>>,
    }

    impl RecordingProvider {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                last: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for RecordingProvider {
        fn id(&self) -> &str {
            "recording"
        }

        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AggregatorError> {
            *self.last.lock().unwrap() = Some(request.clone());
            tokio::time::sleep(self.delay).await;
            Ok(ChatResponse {
                content: format!("echo: {}", request.messages.last().unwrap().content),
                usage: TokenUsage::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_generate_applies_cap_and_system_prompt() {
        let provider = Arc::new(RecordingProvider::new(Duration::ZERO));
        let source = AnswerSource::new(provider.clone(), "model-a", 200, Duration::from_secs(5))
            .with_system("You are a useful assistant.");

        let req = GenerationRequest::new("Why is the sky blue?")
            .with_prior_turns(vec![Turn::user("hello"), Turn::assistant("hi")]);
        let result = source.generate(&req).await.unwrap();

        assert_eq!(result.source_id, "model-a");
        assert_eq!(result.answer_text, "echo: Why is the sky blue?");
        assert!(result.duration >= 0.0);

        let sent = provider.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.model, "model-a");
        assert_eq!(sent.max_tokens, Some(200));
        assert_eq!(sent.system.as_deref(), Some("You are a useful assistant."));
        assert_eq!(sent.messages.len(), 3);
        assert_eq!(sent.messages[2], Message::user("Why is the sky blue?"));
        assert_eq!(sent.messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let provider = Arc::new(RecordingProvider::new(Duration::from_secs(5)));
        let source = AnswerSource::new(provider, "slow-model", 200, Duration::from_millis(20));

        let err = source
            .generate(&GenerationRequest::new("q"))
            .await
            .unwrap_err();
        match err {
            AggregatorError::SourceTimeout {
                source_id,
                timeout_ms,
            } => {
                assert_eq!(source_id, "slow-model");
                assert_eq!(timeout_ms, 20);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_config_caps() {
        let provider = Arc::new(RecordingProvider::new(Duration::ZERO));
        let config = Config::default();
        let (first, second, judge) = AnswerSource::from_config(provider, &config);
        assert_eq!(first.id(), config.sources.first);
        assert_eq!(second.id(), config.sources.second);
        assert_eq!(judge.id(), config.sources.judge);
        assert_eq!(first.max_tokens(), 200);
        assert_eq!(judge.max_tokens(), 500);
        assert!(judge.system.is_none());
    }
}
