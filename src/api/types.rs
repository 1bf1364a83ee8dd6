// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::core::{AggregationReport, GenerationResult};
use crate::memory::{HistoryRecord, SourceStatistics, StatisticsSummary};

/// Durations go over the wire as seconds with two decimals and a unit.
pub fn format_duration(seconds: f64) -> String {
    if seconds.is_finite() && seconds > 0.0 {
        format!("{seconds:.2}s")
    } else {
        "0.00s".into()
    }
}

/// Request body for `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Accepted for compatibility; the configured sources are always used.
    #[serde(default)]
    pub model1: Option<String>,
    #[serde(default)]
    pub model2: Option<String>,
    /// Accepted for compatibility; the judge always runs.
    #[serde(default)]
    pub use_judge: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnswer {
    pub name: String,
    pub answer: String,
    pub duration: String,
}

impl From<&GenerationResult> for ModelAnswer {
    fn from(result: &GenerationResult) -> Self {
        Self {
            name: result.source_id.clone(),
            answer: result.answer_text.clone(),
            duration: format_duration(result.duration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskSuccess {
    pub question: String,
    pub model1: ModelAnswer,
    pub model2: ModelAnswer,
    pub final_answer: String,
    pub total_duration: String,
    /// Set when the answer was produced but could not be recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Response for `POST /ask`: always a body, never a transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AskResponse {
    Success(AskSuccess),
    Error { error: String },
}

impl From<&AggregationReport> for AskResponse {
    fn from(report: &AggregationReport) -> Self {
        let outcome = &report.outcome;
        AskResponse::Success(AskSuccess {
            question: outcome.question.clone(),
            model1: ModelAnswer::from(&outcome.first),
            model2: ModelAnswer::from(&outcome.second),
            final_answer: outcome.final_answer.clone(),
            total_duration: format_duration(outcome.total_duration),
            warning: report.persistence_error.as_ref().map(|e| e.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsEntry {
    pub model: String,
    pub request_count: u64,
    pub avg_duration: String,
    pub min_duration: String,
    pub max_duration: String,
}

impl From<&SourceStatistics> for StatsEntry {
    fn from(s: &SourceStatistics) -> Self {
        Self {
            model: s.model_name.clone(),
            request_count: s.request_count,
            avg_duration: format_duration(s.avg_duration),
            min_duration: format_duration(s.min_duration),
            max_duration: format_duration(s.max_duration),
        }
    }
}

/// Response for `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub statistics: Vec<StatsEntry>,
    pub total_requests: u64,
}

impl From<&StatisticsSummary> for StatsResponse {
    fn from(summary: &StatisticsSummary) -> Self {
        Self {
            statistics: summary.statistics.iter().map(StatsEntry::from).collect(),
            total_requests: summary.total_requests,
        }
    }
}

/// Query string for `GET /history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub question: String,
    pub model: String,
    pub duration: String,
}

impl From<&HistoryRecord> for HistoryEntry {
    fn from(r: &HistoryRecord) -> Self {
        Self {
            timestamp: r.timestamp.clone(),
            question: r.question.clone(),
            model: r.model_name.clone(),
            duration: format_duration(r.duration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}

/// Static service description for `GET /info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub available_models: Vec<String>,
    pub features: Vec<String>,
}

impl InfoResponse {
    pub fn new(available_models: Vec<String>) -> Self {
        Self {
            name: "AI Aggregator API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            available_models,
            features: vec![
                "Parallel queries to two models".into(),
                "Automatic response validation".into(),
                "Storage in SQLite database".into(),
                "Detailed statistics".into(),
            ],
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
