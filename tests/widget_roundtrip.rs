//! The chat widget driven against a live server over HTTP.

use async_trait::async_trait;
use query_chat::AppState;
use query_chat::agent::QueryAgent;
use query_chat::config::AppConfig;
use query_chat::db;
use query_chat::llm::{CompletionModel, CompletionRequest};
use query_chat::widget::{
    ChatWidget, ERROR_MESSAGE, HttpTransport, InputField, MemoryInput, MemoryTranscript, Role,
    SendOutcome,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, _req: CompletionRequest) -> anyhow::Result<String> {
        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("model unavailable"))
    }
}

/// Serve the app on an ephemeral port and return its base URL.
async fn spawn_server(replies: &[&str]) -> String {
    let pool = db::connect("sqlite::memory:", 1).await.expect("connect");
    db::seed_demo(&pool).await.expect("seed");
    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
    });
    let agent = QueryAgent::new(model, pool, 0.1).await.expect("agent");
    let config = AppConfig::load_from_args(["query-chat"]).expect("config");

    let app = query_chat::server::build_router(AppState {
        agent: Arc::new(agent),
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn widget(base_url: &str) -> ChatWidget<MemoryTranscript, MemoryInput, HttpTransport> {
    ChatWidget::new(
        MemoryTranscript::new(),
        MemoryInput::new(),
        HttpTransport::new(base_url).expect("transport"),
    )
}

#[tokio::test]
async fn test_data_answer_renders_as_sections() {
    let base = spawn_server(&["true", "SELECT vip_address FROM vip WHERE port = 80;"]).await;
    let w = widget(&base);

    w.input().set("  Which VIP serves port 80?  ");
    assert_eq!(w.handle_key("Enter").await, Some(SendOutcome::Answered));
    assert_eq!(w.input().value(), "");

    let messages = w.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].sections, ["Which VIP serves port 80?"]);

    assert_eq!(messages[1].role, Role::Ai);
    assert_eq!(
        messages[1].sections,
        [
            "SQL Query:",
            "SELECT vip_address\nFROM vip\nWHERE port = 80;",
            "Result:\n{\"vip_address\":\"10.0.0.1\"}",
        ]
    );
    assert!(w.transcript().is_scrolled_to_bottom());
}

#[tokio::test]
async fn test_schema_answer_one_section_per_table() {
    let base = spawn_server(&[]).await;
    let w = widget(&base);

    w.input().set("show tables");
    assert_eq!(w.send_message().await, SendOutcome::Answered);

    let reply = w.transcript().last().expect("reply");
    assert_eq!(reply.sections.len(), 3);
    assert!(reply.sections[0].starts_with("Table: load_balancer"));
    assert!(reply.sections[2].starts_with("Table: vip_member"));
}

#[tokio::test]
async fn test_other_keys_and_blank_input_send_nothing() {
    let base = spawn_server(&[]).await;
    let w = widget(&base);

    w.input().set("show tables");
    assert_eq!(w.handle_key("a").await, None);
    assert_eq!(w.input().value(), "show tables");

    w.input().set("   ");
    assert_eq!(w.handle_key("Enter").await, Some(SendOutcome::Skipped));
    assert!(w.transcript().is_empty());
}

#[tokio::test]
async fn test_error_body_without_response_is_blank_reply() {
    // The model's reply holds no SELECT, so the server answers 400 {"error": ...}.
    let base = spawn_server(&["true", "I would rather not."]).await;
    let w = widget(&base);

    w.input().set("count vips");
    assert_eq!(w.send_message().await, SendOutcome::Answered);

    let reply = w.transcript().last().expect("reply");
    assert_eq!(reply.role, Role::Ai);
    assert!(reply.sections.is_empty());
    assert_eq!(w.transcript().len(), 2);
}

#[tokio::test]
async fn test_unreachable_server_shows_error_message() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let w = widget(&format!("http://{addr}"));
    w.input().set("count vips");
    assert_eq!(w.send_message().await, SendOutcome::Failed);

    let messages = w.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), "count vips");
    assert_eq!(messages[1].role, Role::Ai);
    assert_eq!(messages[1].text(), ERROR_MESSAGE);
    assert_eq!(w.input().value(), "");
}
