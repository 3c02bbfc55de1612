//! Server-rendered HTML.
//!
//! Only the static shell is rendered here; the chat itself runs in the
//! browser (see [`crate::widget`]).

pub mod page;

pub use page::{ChatPage, render_page};
