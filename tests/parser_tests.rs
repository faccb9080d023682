/// Response parser and chart builder tests.
///
/// Exercises the parser passes together on realistic assistant replies and
/// feeds the extracted spec into the chart builder.
use datachat::chart::{self, ChartType};
use datachat::parser::{FollowupOptions, ResponseParser, clean_display, extract_followups};

const REPLY_WITH_CHART: &str = "\
Average resale prices climb steadily with flat size.

```json
{
  \"chart_type\": \"bar\",
  \"title\": \"Average price by flat type\",
  \"data\": {\"labels\": [\"3 ROOM\", \"4 ROOM\", \"5 ROOM\"], \"values\": [124352, 228502, 328741]},
  \"x_label\": \"Flat type\",
  \"y_label\": \"Price (SGD)\"
}
```

EXECUTIVE flats were the most expensive overall.

Follow-up questions:
1. How did 4 ROOM prices change between 1990 and 1999?
2. Which town had the most 5 ROOM transactions?
3. What share of sales were EXECUTIVE flats?";

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[test]
fn valid_block_builds_requested_chart() {
    let parsed = ResponseParser::default().parse(REPLY_WITH_CHART);
    let spec = parsed.chart.expect("chart spec");
    assert_eq!(spec.chart_type, ChartType::Bar);
    assert_eq!(spec.labels.len(), spec.values.len());

    let chart = chart::build(&spec).expect("chart");
    assert_eq!(chart.chart_type, ChartType::Bar);
    assert_eq!(chart.layout.title.text, "Average price by flat type");
}

#[test]
fn unknown_chart_type_builds_bar() {
    let raw = "```json\n{\"chart_type\": \"radar\", \"title\": \"x\", \
               \"data\": {\"labels\": [\"a\"], \"values\": [1]}}\n```";
    let spec = ResponseParser::default().parse(raw).chart.unwrap();
    assert_eq!(chart::build(&spec).unwrap().chart_type, ChartType::Bar);
}

#[test]
fn each_chart_type_round_trips_to_a_figure() {
    for (label, kind) in [
        ("bar", ChartType::Bar),
        ("line", ChartType::Line),
        ("pie", ChartType::Pie),
        ("scatter", ChartType::Scatter),
    ] {
        let raw = format!(
            "```json\n{{\"chart_type\": \"{label}\", \"title\": \"t\", \
             \"data\": {{\"labels\": [\"a\", \"b\"], \"values\": [1, 2.5]}}}}\n```"
        );
        let spec = ResponseParser::default().parse(&raw).chart.unwrap();
        let chart = chart::build(&spec).unwrap();
        assert_eq!(chart.chart_type, kind);

        let figure = serde_json::to_value(&chart).unwrap();
        assert!(figure["data"].is_array());
        assert!(figure["layout"].is_object());
    }
}

#[test]
fn invalid_json_yields_no_chart() {
    let raw = "Here you go\n```json\n{\"chart_type\": \"bar\", \"data\": {\"labels\": [\"a\"],}\n```";
    let parsed = ResponseParser::default().parse(raw);
    assert!(parsed.chart.is_none());
    assert_eq!(parsed.display, "Here you go");
}

#[test]
fn empty_labels_yield_no_chart() {
    let raw = "```json\n{\"chart_type\": \"pie\", \"data\": {\"labels\": [], \"values\": []}}\n```";
    let parsed = ResponseParser::default().parse(raw);
    let built = parsed.chart.as_ref().and_then(chart::build);
    assert!(built.is_none());
}

#[test]
fn mismatched_lengths_are_dropped_at_parse() {
    let raw = "```json\n{\"chart_type\": \"bar\", \"data\": {\"labels\": [\"a\", \"b\"], \"values\": [1]}}\n```";
    assert!(ResponseParser::default().parse(raw).chart.is_none());
}

// ---------------------------------------------------------------------------
// Follow-ups
// ---------------------------------------------------------------------------

#[test]
fn followups_cap_at_three_in_order() {
    let raw = "Answer.\n\nFollow-up questions:\n\
               1. Which town had the highest prices?\n\
               2. How many 3 ROOM flats were sold?\n\
               3. What was the cheapest flat type?\n\
               4. How did volumes change in 1998?";
    let followups = extract_followups(raw, FollowupOptions::default());
    assert_eq!(
        followups,
        vec![
            "Which town had the highest prices?",
            "How many 3 ROOM flats were sold?",
            "What was the cheapest flat type?",
        ]
    );
}

#[test]
fn second_person_lines_are_rejected_without_using_the_cap() {
    let raw = "Follow up questions:\n\
               - Would you like a chart of prices?\n\
               - Do you want to compare towns?\n\
               - Which flat type sold the most units?\n\
               - Let me know if you'd like more detail?\n\
               - How did prices move after 1997?\n\
               - What was the median floor area?";
    let followups = extract_followups(raw, FollowupOptions::default());
    assert_eq!(
        followups,
        vec![
            "Which flat type sold the most units?",
            "How did prices move after 1997?",
            "What was the median floor area?",
        ]
    );
}

#[test]
fn reject_list_can_be_disabled() {
    let raw = "Follow-up questions:\n1. Would you like a chart of prices?";
    let options = FollowupOptions {
        max: 3,
        reject_second_person: false,
    };
    assert_eq!(
        extract_followups(raw, options),
        vec!["Would you like a chart of prices?"]
    );
}

#[test]
fn loose_scan_without_heading() {
    let raw = "Prices peaked in 1997.\n\
               Why did prices fall in 1998?\n\
               Why did prices fall in 1998?\n\
               Short one?\n\
               Which towns recovered first?";
    let followups = extract_followups(raw, FollowupOptions::default());
    assert_eq!(
        followups,
        vec!["Why did prices fall in 1998?", "Which towns recovered first?"]
    );
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[test]
fn display_never_keeps_blocks_or_followup_section() {
    let samples = [
        REPLY_WITH_CHART,
        "Text\n```json\n{}\n```\nMore\n```json\n[1]\n```\nEnd",
        "Intro\n\n\n\n\nFOLLOW UP QUESTIONS\n1. x?",
        "",
    ];
    for raw in samples {
        let display = clean_display(raw);
        let lower = display.to_lowercase();
        assert!(!display.contains("```json"), "{raw:?} -> {display:?}");
        assert!(!lower.contains("follow-up questions"), "{raw:?}");
        assert!(!lower.contains("follow up questions"), "{raw:?}");
        assert!(!display.contains("\n\n\n"), "{raw:?}");
    }
}

#[test]
fn display_keeps_prose_around_chart() {
    let display = clean_display(REPLY_WITH_CHART);
    assert!(display.starts_with("Average resale prices climb"));
    assert!(display.ends_with("EXECUTIVE flats were the most expensive overall."));
}

#[test]
fn dashboard_marker_is_extracted_and_hidden() {
    let raw = "Here is the dashboard.\n\n[DASHBOARD:https://example.org/d1]";
    let parsed = ResponseParser::default().parse(raw);
    assert_eq!(parsed.dashboard_url.as_deref(), Some("https://example.org/d1"));
    assert_eq!(parsed.display, "Here is the dashboard.");
}
