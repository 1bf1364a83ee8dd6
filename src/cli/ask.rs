// src/cli/ask.rs — One-shot aggregation from the command line

use crate::api::types::{format_duration, AskResponse};
use crate::core::{AggregationPipeline, AggregationReport};

pub async fn run_ask(pipeline: &AggregationPipeline, question: &str, json: bool) -> anyhow::Result<()> {
    let report = pipeline.aggregate(question).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&AskResponse::from(&report))?
        );
    } else {
        print!("{}", render_report(&report));
    }

    if let Some(ref e) = report.persistence_error {
        eprintln!("warning: answer not saved to history: {e}");
    }
    Ok(())
}

/// Final answer first, then each source's raw answer.
pub fn render_report(report: &AggregationReport) -> String {
    let o = &report.outcome;
    let mut out = String::new();

    out.push_str("── Final answer ──\n");
    out.push_str(o.final_answer.trim_end());
    out.push('\n');
    out.push_str(&format!(
        "  (judge {}, total {})\n",
        format_duration(o.final_duration),
        format_duration(o.total_duration)
    ));

    for result in [&o.first, &o.second] {
        out.push_str(&format!("\n── {} ──\n", result.source_id));
        out.push_str(result.answer_text.trim_end());
        out.push('\n');
        out.push_str(&format!("  ({})\n", format_duration(result.duration)));
    }
    out
}
