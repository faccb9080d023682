/// End-to-end pipeline tests: registry → router → gateway → parser → chart.
///
/// All tests run with the simulated gateway and interaction logging off, so
/// nothing touches the network or the home directory.
use datachat::assistant::Assistant;
use datachat::datasets::Registry;
use datachat::llm::{CompletionRequest, Gateway, Provider};
use datachat::parser::ResponseParser;
use datachat::router::{Intent, Router};
use datachat::session::Role;

const REGISTRY: &str = r#"
[[datasets]]
id = "hdb"
name = "Flat Resale"
summary = "HDB resale transactions."

[[datasets]]
id = "sales"
name = "Sales"
summary = "Demo sales."

[[stats]]
dataset_id = "hdb"
category = "Price"
name = "Average resale price"
value = "$219,541"

[[stats]]
dataset_id = "hdb"
category = "Flat Type"
name = "3 ROOM average price"
value = "$124,352"

[[stats]]
dataset_id = "hdb"
category = "Flat Type"
name = "4 ROOM average price"
value = "$228,502"

[[stats]]
dataset_id = "ghost"
category = "Price"
name = "Orphan"
value = "1"

[[dashboards]]
dataset_id = "hdb"
name = "Resale Overview"
embed_url = "https://example.org/d1"
"#;

fn assistant_with(gateway: Gateway) -> Assistant {
    Assistant::new(
        Registry::from_toml_str(REGISTRY).unwrap(),
        Router::default(),
        gateway,
        ResponseParser::default(),
    )
}

fn assistant() -> Assistant {
    assistant_with(Gateway::simulated())
}

/// Provider that always answers with a fixed chart reply.
struct ChartProvider;

impl Provider for ChartProvider {
    fn name(&self) -> String {
        "chart".to_string()
    }

    fn complete(&self, _request: &CompletionRequest<'_>) -> anyhow::Result<String> {
        Ok("4 ROOM flats cost more.\n\n\
            ```json\n{\"chart_type\": \"line\", \"title\": \"Prices\", \
            \"data\": {\"labels\": [\"3 ROOM\", \"4 ROOM\"], \"values\": [124352, 228502]}}\n```\n\n\
            Follow-up questions:\n\
            1. How did 5 ROOM prices compare?\n\
            2. Would you like a table instead?\n\
            3. Which town had the cheapest 4 ROOM flats?"
            .to_string())
    }
}

#[test]
fn registry_groups_rows_and_ignores_orphans() {
    let registry = Registry::from_toml_str(REGISTRY).unwrap();
    let hdb = registry.get("hdb").unwrap();
    assert_eq!(hdb.stats.len(), 3);
    assert_eq!(hdb.stats[1].name, "3 ROOM average price");
    assert_eq!(hdb.default_dashboard().unwrap().embed_url, "https://example.org/d1");
    assert!(registry.get("ghost").is_none());
    assert!(registry.get("sales").unwrap().stats.is_empty());
}

#[test]
fn dashboard_request_round_trip() {
    let assistant = assistant();
    let mut session = assistant.start_session(Some("hdb")).unwrap();
    let reply = assistant.handle(&mut session, "show me a dashboard").unwrap();

    assert_eq!(reply.intent, Intent::DashboardRequest);
    assert!(reply.content.contains("[DASHBOARD:https://example.org/d1]"));
    assert!(!reply.display.contains("[DASHBOARD:"));
    let dashboard = reply.dashboard.unwrap();
    assert_eq!(dashboard.url, "https://example.org/d1");
    assert_eq!(dashboard.name, "Resale Overview");

    let stored = &session.messages()[1];
    assert_eq!(stored.role, Role::Assistant);
    assert_eq!(stored.content, reply.content);
}

#[test]
fn provider_reply_is_parsed_into_parts() {
    let assistant = assistant_with(Gateway::with_provider(Box::new(ChartProvider)));
    let mut session = assistant.start_session(Some("hdb")).unwrap();
    let reply = assistant.handle(&mut session, "plot 3 vs 4 room prices").unwrap();

    assert_eq!(reply.provider, "chart");
    assert_eq!(reply.display, "4 ROOM flats cost more.");
    assert_eq!(
        reply.followups,
        vec![
            "How did 5 ROOM prices compare?",
            "Which town had the cheapest 4 ROOM flats?",
        ]
    );
    let chart = reply.chart.unwrap();
    assert_eq!(chart.chart_type.to_string(), "line");
    assert!(reply.dashboard.is_none());
}

#[test]
fn history_is_append_only_per_dataset() {
    let assistant = assistant();
    let mut session = assistant.start_session(None).unwrap();
    assert_eq!(session.dataset_id(), "hdb");

    assistant.handle(&mut session, "average price?").unwrap();
    assistant.handle(&mut session, "and by flat type?").unwrap();

    let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(session.messages()[2].content, "and by flat type?");

    assistant.switch_dataset(&mut session, "sales").unwrap();
    assert!(session.is_empty());
    assert_eq!(session.dataset_id(), "sales");
}

#[test]
fn rejected_questions_leave_history_alone() {
    let assistant = assistant();
    let mut session = assistant.start_session(Some("hdb")).unwrap();
    assert!(assistant.handle(&mut session, "").is_err());
    assert!(assistant.handle(&mut session, " \n\t").is_err());
    assert!(session.is_empty());
    assert!(assistant.switch_dataset(&mut session, "nope").is_err());
    assert_eq!(session.dataset_id(), "hdb");
}

#[test]
fn stored_messages_render_like_the_live_reply() {
    let assistant = assistant();
    let mut session = assistant.start_session(Some("hdb")).unwrap();
    let reply = assistant.handle(&mut session, "what about flat types?").unwrap();

    let dataset = assistant.registry().get("hdb").unwrap();
    let rendered = assistant.render(dataset, &session.messages()[1].content);
    assert_eq!(rendered.display, reply.display);
    assert_eq!(rendered.followups, reply.followups);
}

#[test]
fn dataset_without_dashboard_gets_plain_text() {
    let assistant = assistant();
    let mut session = assistant.start_session(Some("sales")).unwrap();
    let reply = assistant.handle(&mut session, "open the Power BI view").unwrap();
    assert_eq!(reply.intent, Intent::DashboardRequest);
    assert!(reply.dashboard.is_none());
    assert!(!reply.content.contains("[DASHBOARD:"));
}
