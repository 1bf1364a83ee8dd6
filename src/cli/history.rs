// src/cli/history.rs — Stats, history and clear commands

use crate::api::types::{format_duration, HistoryEntry, HistoryResponse, InfoResponse, StatsResponse};
use crate::infra::config::Config;
use crate::memory::{HistoryLimit, HistoryRecord, HistoryStore, StatisticsSummary};

pub async fn show_stats(store: &dyn HistoryStore, json: bool) -> anyhow::Result<()> {
    let summary = store.statistics().await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&StatsResponse::from(&summary))?
        );
    } else {
        print!("{}", render_stats(&summary));
    }
    Ok(())
}

pub async fn show_history(
    store: &dyn HistoryStore,
    config: &Config,
    limit: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let requested = limit.unwrap_or(config.history.default_limit as i64);
    let limit = HistoryLimit::new(requested, config.history.max_limit)?;
    let records = store.recent(limit).await?;

    if json {
        let resp = HistoryResponse {
            history: records.iter().map(HistoryEntry::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        print!("{}", render_history(&records));
    }
    Ok(())
}

pub async fn clear_history(store: &dyn HistoryStore, yes: bool) -> anyhow::Result<()> {
    let count = store.count().await?;
    if count == 0 {
        println!("History is already empty.");
        return Ok(());
    }

    if !yes {
        let confirmed = inquire::Confirm::new(&format!("Delete all {count} history records?"))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.clear().await?;
    println!("History was cleared");
    Ok(())
}

pub fn show_info(config: &Config) -> anyhow::Result<()> {
    let info = InfoResponse::new(config.available_models());
    println!("{} v{}", info.name, info.version);
    println!();
    println!("  Models:");
    for model in &info.available_models {
        println!("    {model}");
    }
    println!("  Features:");
    for feature in &info.features {
        println!("    - {feature}");
    }
    println!("  Database:   {}", config.history.db_path().display());
    Ok(())
}

pub fn render_stats(summary: &StatisticsSummary) -> String {
    if summary.statistics.is_empty() {
        return "No requests recorded yet.\n".into();
    }

    let width = summary
        .statistics
        .iter()
        .map(|s| s.model_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Model".len());

    let mut out = format!(
        "{:<width$}  {:>8}  {:>8}  {:>8}  {:>8}\n",
        "Model",
        "Requests",
        "Avg",
        "Min",
        "Max",
        width = width
    );
    for s in &summary.statistics {
        out.push_str(&format!(
            "{:<width$}  {:>8}  {:>8}  {:>8}  {:>8}\n",
            s.model_name,
            s.request_count,
            format_duration(s.avg_duration),
            format_duration(s.min_duration),
            format_duration(s.max_duration),
            width = width
        ));
    }
    out.push_str(&format!("\nTotal requests: {}\n", summary.total_requests));
    out
}

pub fn render_history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "No history yet.\n".into();
    }
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{}  {:<8} {}  {}\n",
            r.timestamp,
            format_duration(r.duration),
            r.model_name,
            truncate(&r.question, 50),
        ));
    }
    out
}

/// Cut to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}
