//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `datachat ask "question"`: one-shot question against a dataset
//! - `datachat chat`: interactive terminal session
//! - `datachat datasets`: list the registry
//! - `datachat stats` / `datachat analyze --days N`: interaction log reports
//! - `datachat health`: provider, registry, config and log checks
//! - `datachat config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::analytics::logger;
use crate::analytics::reporter::{self, Stats, TrendEntry};
use crate::assistant::{Assistant, Reply};
use crate::chart::Chart;
use crate::config;
use crate::router::Intent;

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn load_assistant() -> Result<Assistant> {
    Assistant::from_config(&config::load())
}

// ---------------------------------------------------------------------------
// datachat ask
// ---------------------------------------------------------------------------

/// Answer one question and exit.
pub fn run_ask(question: &str, dataset: Option<&str>, format: OutputFormat) -> Result<()> {
    let assistant = load_assistant()?;
    let mut session = assistant.start_session(dataset)?;
    let reply = assistant.handle(&mut session, question)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
        _ => print_reply(&reply),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// datachat chat
// ---------------------------------------------------------------------------

const CHAT_HELP: &str = "\
  /datasets        list datasets
  /dataset <id>    switch dataset (clears the conversation)
  /clear           clear the conversation
  /1 /2 /3         ask a suggested follow-up
  /quit            exit";

/// Interactive loop on stdin. The loop owns the session.
pub fn run_chat(dataset: Option<&str>) -> Result<()> {
    let assistant = load_assistant()?;
    let mut session = assistant.start_session(dataset)?;
    let mut followups: Vec<String> = Vec::new();

    println!("{}", "datachat".bold().cyan());
    print_active_dataset(&assistant, session.dataset_id());
    println!("{}", "Type a question, or /help for commands.".dimmed());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", ">".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let question = match parse_chat_command(input) {
            ChatCommand::Quit => break,
            ChatCommand::Help => {
                println!("{CHAT_HELP}");
                continue;
            }
            ChatCommand::Datasets => {
                print_dataset_table(&assistant, session.dataset_id());
                continue;
            }
            ChatCommand::Switch(id) => {
                match assistant.switch_dataset(&mut session, id) {
                    Ok(()) => {
                        followups.clear();
                        print_active_dataset(&assistant, session.dataset_id());
                    }
                    Err(e) => eprintln!("{} {e:#}", "warning:".yellow().bold()),
                }
                continue;
            }
            ChatCommand::Clear => {
                session = session.clear();
                followups.clear();
                println!("{}", "Conversation cleared.".dimmed());
                continue;
            }
            ChatCommand::Followup(n) => match followups.get(n.wrapping_sub(1)) {
                Some(q) => {
                    println!("{} {q}", ">".dimmed());
                    q.clone()
                }
                None => {
                    eprintln!("{} no follow-up #{n}", "warning:".yellow().bold());
                    continue;
                }
            },
            ChatCommand::Unknown(cmd) => {
                eprintln!("{} unknown command {cmd} (try /help)", "warning:".yellow().bold());
                continue;
            }
            ChatCommand::Ask(q) => q.to_string(),
        };

        match assistant.handle(&mut session, &question) {
            Ok(reply) => {
                println!();
                print_reply(&reply);
                println!();
                followups = reply.followups;
            }
            Err(e) => eprintln!("{} {e:#}", "warning:".yellow().bold()),
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Ask(&'a str),
    Quit,
    Help,
    Datasets,
    Switch(&'a str),
    Clear,
    Followup(usize),
    Unknown(&'a str),
}

fn parse_chat_command(input: &str) -> ChatCommand<'_> {
    let Some(rest) = input.strip_prefix('/') else {
        return ChatCommand::Ask(input);
    };

    let (cmd, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(c, a)| (c, a.trim()))
        .unwrap_or((rest, ""));

    match cmd {
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "help" | "?" => ChatCommand::Help,
        "datasets" => ChatCommand::Datasets,
        "dataset" if !arg.is_empty() => ChatCommand::Switch(arg),
        "clear" => ChatCommand::Clear,
        _ => match cmd.parse::<usize>() {
            Ok(n) => ChatCommand::Followup(n),
            Err(_) => ChatCommand::Unknown(input),
        },
    }
}

fn print_active_dataset(assistant: &Assistant, id: &str) {
    if let Some(dataset) = assistant.registry().get(id) {
        println!(
            "  {} {} {}",
            "Dataset:".bold(),
            dataset.name,
            format!("({})", dataset.id).dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// Reply rendering
// ---------------------------------------------------------------------------

fn print_reply(reply: &Reply) {
    println!("{}", reply.display);

    if let Some(chart) = &reply.chart {
        println!();
        print_chart(chart);
    }

    if let Some(dashboard) = &reply.dashboard {
        println!();
        println!("  {} {}", "Dashboard:".bold().cyan(), dashboard.name);
        println!("  {}", dashboard.url.dimmed());
    }

    if !reply.followups.is_empty() {
        println!();
        println!("{}", "Follow-up questions".bold().cyan());
        for (i, q) in reply.followups.iter().enumerate() {
            println!("  {} {q}", format!("/{}", i + 1).green());
        }
    }

    let source = match reply.intent {
        Intent::DashboardRequest => "dashboard".to_string(),
        Intent::AnalyticQuestion if reply.fallback => {
            format!("{} (fallback)", reply.provider)
        }
        Intent::AnalyticQuestion => reply.provider.clone(),
    };
    println!("{}", format!("[{source}]").dimmed());
}

/// Horizontal bar rendering of the first trace.
fn print_chart(chart: &Chart) {
    const WIDTH: f64 = 30.0;

    println!(
        "  {} {}",
        format!("{} chart:", chart.chart_type).bold().cyan(),
        chart.layout.title.text
    );

    let rows = chart_rows(chart);
    let max = rows.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0).min(24);

    for (label, value) in &rows {
        let len = if max > 0.0 {
            ((value.abs() / max) * WIDTH).round() as usize
        } else {
            0
        };
        println!(
            "  {:<width$} {} {}",
            truncate(label, 24),
            "█".repeat(len).green(),
            format_value(*value),
            width = label_width,
        );
    }
}

fn chart_rows(chart: &Chart) -> Vec<(String, f64)> {
    let Some(trace) = chart.data.first() else {
        return Vec::new();
    };
    let (labels, values) = match (&trace.x, &trace.y, &trace.labels, &trace.values) {
        (Some(x), Some(y), _, _) => (x, y),
        (_, _, Some(l), Some(v)) => (l, v),
        _ => return Vec::new(),
    };
    labels.iter().cloned().zip(values.iter().copied()).collect()
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        let n = v.abs() as usize;
        let sign = if v < 0.0 { "-" } else { "" };
        format!("{sign}{}", format_number(n))
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// datachat datasets
// ---------------------------------------------------------------------------

/// List registered datasets.
pub fn run_datasets(format: OutputFormat) -> Result<()> {
    let assistant = load_assistant()?;
    let registry = assistant.registry();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(registry.datasets())?);
        }
        OutputFormat::Csv => {
            println!("id,name,stats,dashboards");
            for d in registry.datasets() {
                println!("{},{},{},{}", d.id, d.name, d.stats.len(), d.dashboards.len());
            }
        }
        OutputFormat::Table => {
            let first = registry.first().map(|d| d.id.clone()).unwrap_or_default();
            print_dataset_table(&assistant, &first);
        }
    }
    Ok(())
}

fn print_dataset_table(assistant: &Assistant, active: &str) {
    println!("{}", "Datasets".bold().cyan());
    println!(
        "  {:<2}{:<24} {:<32} {:>6} {:>10}",
        "", "ID", "Name", "Stats", "Dashboards"
    );
    println!("  {}", "-".repeat(76));
    for d in assistant.registry().datasets() {
        let marker = if d.id == active { "* " } else { "  " };
        println!(
            "  {}{:<24} {:<32} {:>6} {:>10}",
            marker.green().bold(),
            truncate(&d.id, 24),
            truncate(&d.name, 32),
            d.stats.len(),
            d.dashboards.len(),
        );
    }
}

// ---------------------------------------------------------------------------
// datachat stats
// ---------------------------------------------------------------------------

/// Summarize the interaction log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let stats = reporter::compute_stats(days);

    if stats.total_questions == 0 {
        println!(
            "{}",
            "No data yet. Ask some questions to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "datachat Interaction Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Questions:   ".bold(), format_number(stats.total_questions));
    println!(
        "  {} {} ({:.0}%)  {} {} ({:.0}%)",
        "Dashboard:".bold(),
        stats.intents.dashboard,
        stats.intents.pct(stats.intents.dashboard),
        "Analytic:".bold(),
        stats.intents.analytic,
        stats.intents.pct(stats.intents.analytic),
    );
    println!(
        "  {} {} ({:.1}% of analytic)",
        "Fallbacks:   ".bold(),
        stats.fallbacks,
        stats.fallback_pct()
    );
    println!("  {} {}", "Charts:      ".bold(), stats.charts);
    println!("  {} {:.0}ms", "Avg latency: ".bold(), stats.avg_latency_ms);
    println!();

    if !stats.providers.is_empty() {
        println!("{}", "Providers".bold().cyan());
        println!("  {:<32} {:>6} {:>12}", "Provider", "Count", "Avg latency");
        println!("  {}", "-".repeat(52));
        for (i, p) in stats.providers.iter().enumerate() {
            let line = format!(
                "  {:<32} {:>6} {:>10.0}ms",
                truncate(&p.provider, 32),
                p.count,
                p.avg_latency_ms
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
        println!();
    }

    if !stats.datasets.is_empty() {
        println!("{}", "Datasets".bold().cyan());
        println!("  {:<28} {:>6} {:>10} {:>7}", "Dataset", "Count", "Dashboard", "Charts");
        println!("  {}", "-".repeat(54));
        for d in &stats.datasets {
            println!(
                "  {:<28} {:>6} {:>10} {:>7}",
                truncate(&d.dataset_id, 28),
                d.count,
                d.dashboard_requests,
                d.charts
            );
        }
    }
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "total_questions": stats.total_questions,
        "intents": {
            "dashboard": stats.intents.dashboard,
            "analytic": stats.intents.analytic,
        },
        "fallbacks": stats.fallbacks,
        "fallback_pct": stats.fallback_pct(),
        "charts": stats.charts,
        "avg_latency_ms": stats.avg_latency_ms,
        "providers": stats.providers.iter().map(|p| serde_json::json!({
            "provider": p.provider,
            "count": p.count,
            "avg_latency_ms": p.avg_latency_ms,
        })).collect::<Vec<_>>(),
        "datasets": stats.datasets.iter().map(|d| serde_json::json!({
            "dataset_id": d.dataset_id,
            "count": d.count,
            "dashboard_requests": d.dashboard_requests,
            "charts": d.charts,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!("dataset_id,count,dashboard_requests,charts");
    for d in &stats.datasets {
        println!("{},{},{},{}", d.dataset_id, d.count, d.dashboard_requests, d.charts);
    }
}

// ---------------------------------------------------------------------------
// datachat analyze
// ---------------------------------------------------------------------------

/// Daily question counts.
pub fn run_analyze(days: u32, format: OutputFormat) -> Result<()> {
    let trends = reporter::compute_trends(days);

    if trends.is_empty() {
        println!("{}", format!("No data in the last {days} days.").yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_trends_json(&trends)?,
        OutputFormat::Csv => print_trends_csv(&trends),
        OutputFormat::Table => print_trends_table(&trends, days),
    }

    Ok(())
}

fn print_trends_table(trends: &[TrendEntry], days: u32) {
    println!("{}", format!("datachat Trends, last {days} days").bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {:<12} {:>10} {:>10}", "Date", "Questions", "Fallbacks");
    println!("  {}", "-".repeat(36));
    for t in trends {
        let fallbacks = if t.fallbacks > 0 {
            t.fallbacks.to_string().yellow()
        } else {
            t.fallbacks.to_string().normal()
        };
        println!("  {:<12} {:>10} {:>10}", t.date, t.questions, fallbacks);
    }
}

fn print_trends_json(trends: &[TrendEntry]) -> Result<()> {
    let value: Vec<_> = trends
        .iter()
        .map(|t| {
            serde_json::json!({
                "date": t.date,
                "questions": t.questions,
                "fallbacks": t.fallbacks,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_trends_csv(trends: &[TrendEntry]) {
    println!("date,questions,fallbacks");
    for t in trends {
        println!("{},{},{}", t.date, t.questions, t.fallbacks);
    }
}

// ---------------------------------------------------------------------------
// datachat health
// ---------------------------------------------------------------------------

/// Check config files, the registry, the provider and the log file.
pub fn run_health() -> Result<()> {
    println!("{}", "datachat Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.datachat/config.toml found"
        } else {
            "not found (run `datachat config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".datachat.toml found"
        } else {
            "none (optional)"
        },
    );

    let cfg = config::load();
    let assistant = match Assistant::from_config(&cfg) {
        Ok(a) => a,
        Err(e) => {
            print_health_item("Datasets", false, &format!("{e:#}"));
            return Ok(());
        }
    };
    print_health_item(
        "Datasets",
        true,
        &format!("{} registered", assistant.registry().datasets().len()),
    );

    let gateway = assistant.gateway();
    match gateway.unavailable_reason() {
        Some(reason) => print_health_item(
            "Provider",
            false,
            &format!("{} ({reason}); answers are simulated", cfg.provider.kind),
        ),
        None => {
            let reachable = gateway.is_reachable();
            let detail = if reachable {
                format!("{} reachable", gateway.provider_name())
            } else {
                format!("{} not reachable; answers will be simulated", gateway.provider_name())
            };
            print_health_item("Provider", reachable, &detail);
        }
    }

    let log_path = logger::interaction_log_path();
    let log_entries = log_path
        .as_deref()
        .filter(|p| p.exists())
        .map(|p| logger::read_entries(p).len());
    print_health_item(
        "Interaction log",
        log_entries.is_some(),
        &match log_entries {
            Some(n) => format!("{n} entries"),
            None if !cfg.logging.enabled => "disabled".to_string(),
            None => "no log file yet".to_string(),
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// datachat config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective datachat Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.datachat/config.toml");
    print_source(project_exists, ".datachat.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "DATACHAT_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.datachat/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Set [provider] kind and api_key to use a real model.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartSpec, ChartType, build};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ÄÖÜäöü", 3), "ÄÖ…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }

    #[test]
    fn chat_commands() {
        assert_eq!(parse_chat_command("why?"), ChatCommand::Ask("why?"));
        assert_eq!(parse_chat_command("/quit"), ChatCommand::Quit);
        assert_eq!(parse_chat_command("/dataset sample_sales"), ChatCommand::Switch("sample_sales"));
        assert_eq!(parse_chat_command("/dataset"), ChatCommand::Unknown("/dataset"));
        assert_eq!(parse_chat_command("/2"), ChatCommand::Followup(2));
        assert_eq!(parse_chat_command("/clear"), ChatCommand::Clear);
        assert_eq!(parse_chat_command("/bogus"), ChatCommand::Unknown("/bogus"));
    }

    #[test]
    fn chart_rows_read_bar_and_pie_traces() {
        let mut spec = ChartSpec {
            chart_type: ChartType::Bar,
            title: "t".to_string(),
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![1.0, 2.0],
            x_label: String::new(),
            y_label: String::new(),
        };
        let rows = chart_rows(&build(&spec).unwrap());
        assert_eq!(rows, vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)]);

        spec.chart_type = ChartType::Pie;
        assert_eq!(chart_rows(&build(&spec).unwrap()).len(), 2);
    }

    #[test]
    fn format_value_integers_get_separators() {
        assert_eq!(format_value(219541.0), "219,541");
        assert_eq!(format_value(-1200.0), "-1,200");
        assert_eq!(format_value(2.5), "2.50");
    }
}
