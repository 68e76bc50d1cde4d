/// chat-stash - Chrome side panel extension for organizing AI chat bookmarks
/// Built with Rust + WASM + Yew

mod bookmark_data;
mod detect;
mod messages;
mod page;
mod store;
mod tools;
mod view;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod background;

use wasm_bindgen::prelude::*;

/// chrome.storage.local keys for the persisted documents
pub const STORE_KEY: &str = "chatStashData";
pub const SETTINGS_KEY: &str = "chatStashSettings";
pub const TOOLS_KEY: &str = "chatStashTools";

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export tool detection over the built-in registry for JavaScript access
#[wasm_bindgen]
pub fn detect_tool(url: &str) -> Option<String> {
    let registry = tools::ToolRegistry::builtin();
    detect::detect_tool(&registry, url).map(str::to_string)
}

// Capture page metadata for the content script bridge
#[wasm_bindgen]
pub fn capture_page_info(url: &str, title: &str) -> JsValue {
    let registry = tools::ToolRegistry::builtin();
    let patterns = page::ConversationPatterns::builtin();
    match page::PageInfo::capture(&registry, &patterns, url, title) {
        Some(info) => serde_wasm_bindgen::to_value(&info).unwrap_or(JsValue::NULL),
        None => JsValue::NULL,
    }
}

// Start the Yew app for the side panel
#[wasm_bindgen]
pub fn start_sidepanel() {
    yew::Renderer::<ui::sidepanel::SidePanel>::new().render();
}
