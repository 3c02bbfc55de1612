//! The chat page.

use leptos::prelude::*;

/// Chat page: transcript container, input box and the widget bundle.
///
/// The ids are the ones the browser widget looks up when it mounts.
#[component]
pub fn ChatPage(
    /// Page and header title.
    title: String,
) -> impl IntoView {
    view! {
        <!doctype html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title.clone()}</title>
                <link rel="stylesheet" href="/static/app.css"/>
                <script type="module" src="/static/bootstrap.js"></script>
            </head>
            <body>
                <div class="container">
                    <h1>{title}</h1>
                    <div id="chatHistory" class="chat-history"></div>
                    <div class="input-area">
                        <input
                            type="text"
                            id="userInput"
                            placeholder="Ask a question about your database..."
                            autocomplete="off"
                            autofocus
                        />
                    </div>
                    <p class="hint">"Press Enter to send"</p>
                </div>
            </body>
        </html>
    }
}

/// Server-render the full chat page.
#[must_use]
pub fn render_page(title: &str) -> String {
    let title = title.to_string();
    view! { <ChatPage title=title/> }.to_html()
}
