//! Prompt construction for the AI gateway.
//!
//! The system message grounds the model in the dataset's precomputed stats
//! and pins down the reply layout the parser relies on: plain prose, an
//! optional fenced JSON chart, and a closing `Follow-up questions:` block.

use crate::datasets::{Dataset, Stat};

/// Render stats grouped by category.
///
/// A blank-line-prefixed `## CATEGORY` heading is emitted whenever the
/// category differs from the previous stat's, followed by one `- name: value`
/// line per stat. Stats are not re-sorted, so a category that reappears later
/// gets a second heading.
pub fn format_stats(stats: &[Stat]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for stat in stats {
        if current != Some(stat.category.as_str()) {
            out.push_str(&format!("\n## {}\n", stat.category.to_uppercase()));
            current = Some(stat.category.as_str());
        }
        out.push_str(&format!("- {}: {}\n", stat.name, stat.value));
    }

    out.trim().to_string()
}

/// Dataset description sent to providers that take context rather than a
/// chat transcript (the automation webhook).
pub fn dataset_info(dataset: &Dataset) -> String {
    let stats = format_stats(&dataset.stats);
    if stats.is_empty() {
        format!("{}\n{}", dataset.name, dataset.summary)
    } else {
        format!("{}\n{}\n\n{}", dataset.name, dataset.summary, stats)
    }
}

/// Build the system message for a dataset.
pub fn build_system_prompt(dataset: &Dataset) -> String {
    let stats = format_stats(&dataset.stats);
    let stats = if stats.is_empty() {
        "(no precomputed statistics available)".to_string()
    } else {
        stats
    };

    format!(
        "You are a data analyst answering questions about the dataset \"{name}\".\n\
         {summary}\n\n\
         Use ONLY the statistics below. If they don't answer the question, say so \
         plainly instead of guessing.\n\n\
         STATISTICS:\n{stats}\n\n\
         FORMATTING RULES:\n\
         - Write plain text. No markdown headings, no bold, no tables.\n\
         - Keep the answer short: a few sentences or a short list.\n\
         - Only when the user asks for a chart, graph or plot, add ONE fenced block \
         tagged json in exactly this shape:\n\
         ```json\n\
         {{\"chart_type\": \"bar\", \"title\": \"...\", \"data\": {{\"labels\": [\"...\"], \"values\": [0]}}, \
         \"x_label\": \"...\", \"y_label\": \"...\"}}\n\
         ```\n\
         chart_type is one of bar, line, pie, scatter. labels and values must have \
         the same length and values must be numbers.\n\
         - End EVERY answer with exactly 3 follow-up questions about the data, in \
         this format:\n\
         Follow-up questions:\n\
         1. <question about the data>?\n\
         2. <question about the data>?\n\
         3. <question about the data>?\n\
         - Follow-up questions must ask about the data itself, never about the \
         user's preferences (no \"Would you like...\" or \"Do you want...\").",
        name = dataset.name,
        summary = dataset.summary,
    )
}
