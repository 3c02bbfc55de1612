//! Natural-language questions answered against the SQLite database.
//!
//! [`QueryAgent::run`] routes a question one of three ways:
//!
//! 1. schema questions ("what tables are there?") are answered from the
//!    in-memory [`SchemaCatalog`] without calling the model;
//! 2. questions the model classifies as not needing data get a plain answer;
//! 3. everything else becomes a `SELECT` generated from the relevant part of
//!    the schema, executed, and returned with its rows.

pub mod prompt;
pub mod relevance;
pub mod schema;
pub mod sql;

use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::error::QueryError;
use crate::llm::{CompletionModel, CompletionRequest, Message};

pub use schema::SchemaCatalog;

/// Phrases that mark a question about the schema itself.
pub const SCHEMA_KEYWORDS: [&str; 7] = [
    "schema",
    "tables",
    "columns",
    "structure",
    "what tables",
    "show tables",
    "list tables",
];

/// Outcome of running a generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rows(Vec<Map<String, Value>>),
    /// The database rejected the statement; holds the error text.
    Failed(String),
}

impl QueryResult {
    fn render(&self) -> String {
        match self {
            Self::Rows(rows) => sql::format_rows(rows),
            Self::Failed(error) => format!("Error executing query: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentAnswer {
    Schema(String),
    General(String),
    Data { sql: String, result: QueryResult },
}

impl AgentAnswer {
    /// Text shown to the user. Data answers carry the statement and its rows
    /// as separate paragraphs.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Schema(text) | Self::General(text) => text.clone(),
            Self::Data { sql, result } => format!(
                "SQL Query:\n{}\n\nResult:\n{}",
                sql::format_sql(sql),
                result.render()
            ),
        }
    }
}

/// Text-to-SQL agent over one SQLite database.
#[derive(Debug)]
pub struct QueryAgent {
    model: Arc<dyn CompletionModel>,
    pool: SqlitePool,
    catalog: RwLock<SchemaCatalog>,
    temperature: f32,
}

impl QueryAgent {
    /// Create the agent and load the schema catalog.
    pub async fn new(
        model: Arc<dyn CompletionModel>,
        pool: SqlitePool,
        temperature: f32,
    ) -> Result<Self, sqlx::Error> {
        let agent = Self {
            model,
            pool,
            catalog: RwLock::new(SchemaCatalog::default()),
            temperature,
        };
        agent.refresh_schema().await?;
        Ok(agent)
    }

    /// Re-read the schema from the database.
    pub async fn refresh_schema(&self) -> Result<(), sqlx::Error> {
        let catalog = SchemaCatalog::load(&self.pool).await?;
        tracing::info!(tables = catalog.tables().len(), "Schema catalog refreshed");
        *self.catalog.write().await = catalog;
        Ok(())
    }

    /// Snapshot of the current catalog.
    pub async fn catalog(&self) -> SchemaCatalog {
        self.catalog.read().await.clone()
    }

    #[must_use]
    pub fn is_schema_request(question: &str) -> bool {
        let lower = question.to_lowercase();
        SCHEMA_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// Ask the model whether answering `question` needs a database query.
    pub async fn is_sql_request(&self, question: &str) -> anyhow::Result<bool> {
        let verdict = self.ask(prompt::CLASSIFIER_PROMPT, question).await?;
        let needs_sql = verdict.trim().eq_ignore_ascii_case("true");
        tracing::debug!(verdict = %verdict.trim(), needs_sql, "Question classified");
        Ok(needs_sql)
    }

    pub async fn run(&self, question: &str) -> Result<AgentAnswer, QueryError> {
        if Self::is_schema_request(question) {
            tracing::info!("Answering from schema catalog");
            let info = self.catalog.read().await.format_schema_info();
            return Ok(AgentAnswer::Schema(info));
        }

        if !self.is_sql_request(question).await? {
            tracing::info!("Answering as general question");
            let reply = self.ask(prompt::GENERAL_PROMPT, question).await?;
            return Ok(AgentAnswer::General(reply.trim().to_string()));
        }

        let system = {
            let catalog = self.catalog.read().await;
            let relevant = relevance::relevant_tables(&catalog, question);
            prompt::sql_prompt(&catalog, &relevant)
        };
        let reply = self.ask(&system, question).await?;
        let sql = sql::clean_sql(&reply).map_err(|e| QueryError::InvalidSql(e.to_string()))?;
        tracing::info!(sql = %sql, "Executing generated SQL");

        let result = match sql::execute(&self.pool, &sql).await {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "Query executed");
                QueryResult::Rows(rows)
            }
            Err(e) => {
                tracing::error!(error = %e, sql = %sql, "SQL execution failed");
                QueryResult::Failed(e.to_string())
            }
        };

        Ok(AgentAnswer::Data { sql, result })
    }

    /// [`run`](Self::run), rendered as the text sent back to the chat.
    pub async fn run_with_reasoning(&self, question: &str) -> Result<String, QueryError> {
        self.run(question).await.map(|answer| answer.render())
    }

    async fn ask(&self, system: &str, question: &str) -> anyhow::Result<String> {
        let request = CompletionRequest::new(
            vec![Message::system(system), Message::user(question)],
            self.temperature,
        );
        self.model.complete(request).await
    }
}
