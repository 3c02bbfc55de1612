//! Query Chat
//!
//! A chat front end for asking natural-language questions of a SQLite
//! database, with the text-to-SQL server it talks to.
//!
//! # Architecture
//!
//! - **Widget**: transcript rendering and the send flow, generic over its
//!   view, input and transport; compiled to WebAssembly for the browser
//! - **Server**: Axum app serving the chat page (Leptos SSR), static assets
//!   and `POST /api/query`
//! - **Agent**: schema-aware text-to-SQL over SQLite (sqlx)
//! - **LLM**: non-streaming Chat Completions client
//!
//! # Modules
//!
//! - [`api`]: wire types shared by the widget and the server
//! - [`widget`]: chat widget core and its browser binding
//! - `agent`, `server`, `llm`, `db`, `config`: server side (feature `ssr`)

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod widget;

#[cfg(feature = "ssr")]
pub mod agent;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod db;
#[cfg(feature = "ssr")]
pub mod error;
#[cfg(feature = "ssr")]
pub mod llm;
#[cfg(feature = "ssr")]
pub mod server;
#[cfg(feature = "ssr")]
pub mod telemetry;
#[cfg(feature = "ssr")]
pub mod ui;

/// Application state shared across all handlers.
#[cfg(feature = "ssr")]
#[derive(Clone, Debug)]
pub struct AppState {
    /// Text-to-SQL agent answering `/api/query`.
    pub agent: std::sync::Arc<agent::QueryAgent>,
    /// Global Configuration
    pub config: std::sync::Arc<config::AppConfig>,
}
