//! Browser binding of the chat widget.
//!
//! Expects the hosting page to contain `#chatHistory` (scrollable container)
//! and `#userInput` (text input). Build for `wasm32-unknown-unknown` with
//! `--no-default-features --features csr`.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlInputElement, KeyboardEvent};

use super::{ChatWidget, HttpTransport, InputField, RenderedMessage, TranscriptView};

/// Id of the transcript container.
pub const CHAT_HISTORY_ID: &str = "chatHistory";

/// Id of the text input.
pub const USER_INPUT_ID: &str = "userInput";

/// Widget wired to the page's DOM.
pub type DomChatWidget = ChatWidget<DomTranscript, DomInput, HttpTransport>;

/// [`TranscriptView`] over `#chatHistory`.
#[derive(Debug, Clone)]
pub struct DomTranscript {
    document: Document,
    container: HtmlElement,
}

impl DomTranscript {
    /// Wrap an existing container element.
    pub fn new(document: Document, container: HtmlElement) -> Self {
        Self {
            document,
            container,
        }
    }

    fn build(&self, message: &RenderedMessage) -> Result<web_sys::Element, JsValue> {
        let container = self.document.create_element("div")?;
        container.set_class_name(&message.role.container_class());

        for section in &message.sections {
            let block = self.document.create_element("div")?;
            block.set_class_name("message-section");

            let pre = self.document.create_element("pre")?;
            pre.set_text_content(Some(section));

            block.append_child(&pre)?;
            container.append_child(&block)?;
        }

        Ok(container)
    }
}

impl TranscriptView for DomTranscript {
    fn append(&self, message: &RenderedMessage) {
        let appended = self
            .build(message)
            .and_then(|node| self.container.append_child(&node));
        if let Err(e) = appended {
            tracing::error!(error = ?e, role = %message.role, "Failed to render message");
        }
    }

    fn scroll_to_bottom(&self) {
        self.container.set_scroll_top(self.container.scroll_height());
    }
}

/// [`InputField`] over `#userInput`.
#[derive(Debug, Clone)]
pub struct DomInput {
    element: HtmlInputElement,
}

impl DomInput {
    /// Wrap an existing input element.
    pub fn new(element: HtmlInputElement) -> Self {
        Self { element }
    }
}

impl InputField for DomInput {
    fn value(&self) -> String {
        self.element.value()
    }

    fn clear(&self) {
        self.element.set_value("");
    }
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

/// Build the widget from the current page and bind Enter on the input.
///
/// Requests go to `/api/query` on the page's origin.
pub fn mount() -> Result<Rc<DomChatWidget>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let history: HtmlElement = element_by_id(&document, CHAT_HISTORY_ID)?;
    let input: HtmlInputElement = element_by_id(&document, USER_INPUT_ID)?;

    let origin = window.location().origin()?;
    let transport =
        HttpTransport::new(&origin).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let widget = Rc::new(ChatWidget::new(
        DomTranscript::new(document, history),
        DomInput::new(input.clone()),
        transport,
    ));

    let handler_widget = Rc::clone(&widget);
    let on_keypress = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let widget = Rc::clone(&handler_widget);
        let key = event.key();
        wasm_bindgen_futures::spawn_local(async move {
            widget.handle_key(&key).await;
        });
    });
    input.add_event_listener_with_callback("keypress", on_keypress.as_ref().unchecked_ref())?;
    // The listener lives as long as the page.
    on_keypress.forget();

    tracing::info!(endpoint = %widget_endpoint(&widget), "Chat widget mounted");
    Ok(widget)
}

fn widget_endpoint(widget: &DomChatWidget) -> String {
    widget.transport().endpoint().to_string()
}

/// wasm entry point.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    if let Err(e) = mount() {
        web_sys::console::error_2(&JsValue::from_str("Chat widget failed to mount:"), &e);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::widget::Role;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;
    use web_sys::KeyboardEventInit;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("document")
    }

    /// Attach a short scrollable container to the page body.
    fn attach(document: &Document, id: &str) -> HtmlElement {
        let el: HtmlElement = document
            .create_element("div")
            .expect("div")
            .dyn_into()
            .expect("html element");
        el.set_id(id);
        el.set_attribute("style", "height: 40px; overflow-y: auto;")
            .expect("style");
        document
            .body()
            .expect("body")
            .append_child(&el)
            .expect("attach");
        el
    }

    /// Yield to the event loop so spawned tasks can run.
    async fn next_tick() {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            web_sys::window()
                .expect("window")
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 10)
                .expect("timeout");
        });
        JsFuture::from(promise).await.expect("tick");
    }

    #[wasm_bindgen_test]
    fn test_append_renders_one_pre_per_section() {
        let doc = document();
        let container = attach(&doc, "transcript-sections");
        let view = DomTranscript::new(doc, container.clone());

        view.append(&RenderedMessage::new(Role::Ai, "A\n\nB"));

        let message = container.first_element_child().expect("message");
        assert_eq!(message.class_name(), "message ai-message");

        let blocks = message
            .query_selector_all(".message-section > pre")
            .expect("selector");
        assert_eq!(blocks.length(), 2);
        let texts: Vec<String> = (0..blocks.length())
            .filter_map(|i| blocks.item(i))
            .filter_map(|node| node.text_content())
            .collect();
        assert_eq!(texts, ["A", "B"]);

        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_empty_text_renders_empty_container() {
        let doc = document();
        let container = attach(&doc, "transcript-empty");
        let view = DomTranscript::new(doc, container.clone());

        view.append(&RenderedMessage::new(Role::Ai, ""));

        let message = container.first_element_child().expect("message");
        assert_eq!(message.class_name(), "message ai-message");
        assert_eq!(message.child_element_count(), 0);

        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_scrolls_to_bottom_after_append() {
        let doc = document();
        let container = attach(&doc, "transcript-scroll");
        let view = DomTranscript::new(doc, container.clone());

        for i in 0..8 {
            view.append(&RenderedMessage::new(Role::User, &format!("line {i}\n\nmore")));
            view.scroll_to_bottom();
        }

        // The browser clamps scrollTop to scrollHeight - clientHeight.
        assert!(container.scroll_height() > container.client_height());
        assert!(container.scroll_top() > 0);
        assert!(
            container.scroll_top() + container.client_height() >= container.scroll_height() - 1
        );

        container.remove();
    }

    #[wasm_bindgen_test]
    async fn test_enter_keypress_sends_input() {
        let doc = document();
        let history = attach(&doc, CHAT_HISTORY_ID);
        let input: HtmlInputElement = doc
            .create_element("input")
            .expect("input")
            .dyn_into()
            .expect("input element");
        input.set_id(USER_INPUT_ID);
        doc.body()
            .expect("body")
            .append_child(&input)
            .expect("attach input");

        let _widget = mount().expect("mount");

        let press = |key: &str| {
            let init = KeyboardEventInit::new();
            init.set_key(key);
            let event = KeyboardEvent::new_with_keyboard_event_init_dict("keypress", &init)
                .expect("event");
            input.dispatch_event(&event).expect("dispatch");
        };

        input.set_value("count vips");
        press("a");
        next_tick().await;
        assert_eq!(history.child_element_count(), 0);
        assert_eq!(input.value(), "count vips");

        press("Enter");
        for _ in 0..50 {
            if history.child_element_count() > 0 {
                break;
            }
            next_tick().await;
        }

        let first = history.first_element_child().expect("user message");
        assert_eq!(first.class_name(), "message user-message");
        assert_eq!(first.text_content().as_deref(), Some("count vips"));
        assert_eq!(input.value(), "");

        history.remove();
        input.remove();
    }
}
