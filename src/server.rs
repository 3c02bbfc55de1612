use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, info};

use crate::AppState;
use crate::agent::QueryAgent;
use crate::api::{QUERY_PATH, QueryResponse};
use crate::config::AppConfig;
use crate::db;
use crate::error::QueryError;
use crate::llm::{ChatCompletionsClient, LlmSettings};
use crate::ui;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Connect to the database, build the agent and serve until the listener fails.
pub async fn start_server(config: Arc<AppConfig>, settings: LlmSettings) -> anyhow::Result<()> {
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = settings.provider.name(),
        "LLM configuration loaded"
    );

    let pool = db::connect(&config.database.url, config.database.max_connections).await?;
    let client = ChatCompletionsClient::new(settings);
    debug!(name: "llm.client.ready", url = %client.url(), "Chat completions endpoint resolved");
    let model = Arc::new(client);
    let agent = QueryAgent::new(model, pool, config.agent.temperature).await?;

    let state = AppState {
        agent: Arc::new(agent),
        config: Arc::clone(&config),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Routes and middleware for the chat application.
pub fn build_router(state: AppState) -> Router {
    let resilience = &state.config.resilience;
    let timeout = (!resilience.timeout_disabled)
        .then(|| Duration::from_secs(resilience.request_timeout_secs));

    let mut app = Router::new()
        .route("/", get(index))
        .route(QUERY_PATH, post(api_query))
        .nest_service("/static", ServeDir::new(&state.config.server.static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if let Some(duration) = timeout {
        app = app.layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => {
                        tracing::warn!(timeout_secs = duration.as_secs(), "Request timed out");
                        (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                    }
                }
            },
        ));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// GET / - the chat page.
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(ui::render_page(&state.config.ui.title))
}

/// POST /api/query - answer one question.
///
/// Anything other than a JSON object with a non-blank string `query` is
/// rejected as an empty query.
async fn api_query(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<QueryResponse>, QueryError> {
    let body = match body {
        Ok(Json(value)) => Some(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(QueryError::PayloadTooLarge);
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable query body");
            None
        }
    };
    let question = body
        .as_ref()
        .and_then(|v| v.get("query"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_owned)
        .ok_or(QueryError::EmptyQuery)?;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("query", %request_id);

    async move {
        info!(question = %question, "Received query");
        let response = state.agent.run_with_reasoning(&question).await?;
        info!(response_length = response.len(), "Query answered");
        Ok::<_, QueryError>(Json(QueryResponse { response }))
    }
    .instrument(span)
    .await
}
