// tests/common/mod.rs — Shared mocks for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aggregator::core::{AggregationPipeline, AnswerSource, Arbiter};
use aggregator::infra::errors::AggregatorError;
use aggregator::memory::{self, StoreHandle};
use aggregator::provider::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use async_trait::async_trait;

pub const FIRST: &str = "mock/first";
pub const SECOND: &str = "mock/second";
pub const JUDGE: &str = "mock/judge";

/// What a mocked model does when asked.
#[derive(Clone)]
pub enum Behavior {
    Answer(String),
    AnswerAfter(String, Duration),
    Fail(String),
}

/// A provider that answers per model id without making any network calls.
pub struct ScriptedProvider {
    script: HashMap<String, Behavior>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: &[(&str, Behavior)]) -> Arc<Self> {
        Arc::new(Self {
            script: script
                .iter()
                .map(|(m, b)| (m.to_string(), b.clone()))
                .collect(),
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        })
    }

    pub fn calls_to(&self, model: &str) -> usize {
        self.calls.lock().unwrap().get(model).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AggregatorError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.model.clone())
            .or_default() += 1;

        let behavior = self
            .script
            .get(&request.model)
            .cloned()
            .unwrap_or_else(|| Behavior::Fail(format!("no script for {}", request.model)));

        let content = match behavior {
            Behavior::Answer(text) => text,
            Behavior::AnswerAfter(text, delay) => {
                tokio::time::sleep(delay).await;
                text
            }
            Behavior::Fail(message) => {
                return Err(AggregatorError::SourceUnavailable {
                    source_id: request.model,
                    message,
                })
            }
        };

        Ok(ChatResponse {
            content,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        })
    }
}

/// In-memory history behind a live store task.
pub fn memory_store() -> StoreHandle {
    let store = memory::open_in_memory().unwrap();
    let (handle, _join) = memory::spawn_store_server(store);
    handle
}

pub fn pipeline_with(
    provider: Arc<ScriptedProvider>,
    history: Arc<dyn memory::HistoryStore>,
    timeout: Duration,
) -> AggregationPipeline {
    let source = |id: &str, cap: u32| AnswerSource::new(provider.clone(), id, cap, timeout);
    AggregationPipeline::new(
        source(FIRST, 200).with_system("You are a useful assistant."),
        source(SECOND, 200).with_system("You are a useful assistant."),
        Arbiter::new(source(JUDGE, 500)),
        history,
    )
}
