/// Background (service worker) surface: runtime message dispatch, tab
/// watching, and storage bootstrap. All Chrome API access goes through the
/// JS bridge below.
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

use crate::bookmark_data::Settings;
use crate::messages::{Message, Response, TabInfo};
use crate::page;
use crate::store::StoreData;
use crate::tools::{ToolRegistry, UserTools};

const DEFAULT_NOTIFICATION_TITLE: &str = "Chat Stash";
const DEFAULT_NOTIFICATION_ICON: &str = "icons/icon48.png";

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateActiveTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn showNotification(title: &str, message: &str, icon_url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn broadcastMessage(message: JsValue) -> Result<(), JsValue>;
}

/// Install/update bootstrap: make sure every persisted document exists and
/// is well formed before anything else touches storage.
#[wasm_bindgen]
pub async fn initialize_storage() {
    let store = load_store().await;
    if let Err(e) = save_json(crate::STORE_KEY, &store).await {
        warn!("failed to write bookmark document: {}", e);
    }

    let settings = load_settings().await;
    if let Err(e) = save_json(crate::SETTINGS_KEY, &settings).await {
        warn!("failed to write settings document: {}", e);
    }

    let registry = load_registry().await;
    if let Err(e) = save_json(crate::TOOLS_KEY, &registry.user_tools()).await {
        warn!("failed to write user tools document: {}", e);
    }
}

/// Entry point for chrome.runtime.onMessage. Always answers: recognized
/// messages get their effect, anything else gets a failed response.
#[wasm_bindgen]
pub async fn handle_runtime_message(message: JsValue) -> JsValue {
    let response = match serde_wasm_bindgen::from_value::<Message>(message) {
        Ok(message) => dispatch(message).await,
        Err(e) => Response::err(format!("unknown message type: {}", e)),
    };
    to_js(&response)
}

/// Entry point for tab update/activation events. Re-runs tool detection
/// for the navigated URL and broadcasts the switch to the side panel.
#[wasm_bindgen]
pub async fn handle_tab_navigation(tab_id: i32, url: String, title: String) -> JsValue {
    let settings = load_settings().await;
    if !settings.auto_detect_tool {
        return to_js(&Response::ok_empty());
    }

    let registry = load_registry().await;
    let mut store = load_store().await;
    let Some(tool_id) = page::on_navigation(&mut store, &registry, &url, &title) else {
        return to_js(&Response::ok_empty());
    };

    if let Err(e) = save_json(crate::STORE_KEY, &store).await {
        warn!("failed to persist current tool: {}", e);
    }

    broadcast(Message::ToolDetected {
        tool_id: tool_id.clone(),
        tab_info: TabInfo {
            id: tab_id,
            title,
            url,
        },
    })
    .await;

    to_js(&Response::ok(json!({ "toolId": tool_id })))
}

/// Relay a chrome.storage.onChanged event to any open side panel
#[wasm_bindgen]
pub async fn notify_storage_changed(changes: JsValue) {
    let changes: Value = serde_wasm_bindgen::from_value(changes).unwrap_or(Value::Null);
    broadcast(Message::StorageChanged { changes }).await;
}

async fn dispatch(message: Message) -> Response {
    match message {
        Message::GetCurrentTabInfo => match getActiveTab().await {
            Ok(tab) if tab.is_null() || tab.is_undefined() => Response::ok(Value::Null),
            Ok(tab) => match serde_wasm_bindgen::from_value::<Value>(tab) {
                Ok(value) => Response::ok(value),
                Err(e) => Response::err(format!("malformed tab payload: {}", e)),
            },
            Err(e) => Response::err(format!("tab query failed: {:?}", e)),
        },

        Message::OpenUrl { url, new_tab } => {
            let result = if new_tab {
                createTab(&url).await
            } else {
                updateActiveTab(&url).await
            };
            match result {
                Ok(()) => Response::ok_empty(),
                Err(e) => Response::err(format!("failed to open {}: {:?}", url, e)),
            }
        }

        Message::ShowNotification {
            title,
            message,
            icon_url,
        } => {
            let settings = load_settings().await;
            if !settings.show_notifications {
                debug!("notifications disabled, dropping: {}", message);
                return Response::ok_empty();
            }
            let title = title.as_deref().unwrap_or(DEFAULT_NOTIFICATION_TITLE);
            let icon = icon_url.as_deref().unwrap_or(DEFAULT_NOTIFICATION_ICON);
            match showNotification(title, &message, icon).await {
                Ok(()) => Response::ok_empty(),
                Err(e) => Response::err(format!("notification failed: {:?}", e)),
            }
        }

        Message::GetStorageData { keys } => {
            let mut data = serde_json::Map::new();
            for key in keys {
                let value = match getStorage(&key).await {
                    Ok(js) if js.is_null() || js.is_undefined() => Value::Null,
                    Ok(js) => serde_wasm_bindgen::from_value(js).unwrap_or(Value::Null),
                    Err(e) => return Response::err(format!("storage read failed: {:?}", e)),
                };
                data.insert(key, value);
            }
            Response::ok(Value::Object(data))
        }

        Message::SetStorageData { data } => {
            let Some(entries) = data.as_object() else {
                return Response::err("storage payload must be an object");
            };
            for (key, value) in entries {
                let js = match serde_wasm_bindgen::to_value(value) {
                    Ok(js) => js,
                    Err(e) => return Response::err(format!("unserializable value: {}", e)),
                };
                if let Err(e) = setStorage(key, js).await {
                    return Response::err(format!("storage write failed: {:?}", e));
                }
            }
            Response::ok_empty()
        }

        Message::PageInfoDetected { page_info } => {
            debug!(
                "page info from {}: tool={} conversation={:?}",
                page_info.url, page_info.tool_id, page_info.conversation_id
            );
            Response::ok_empty()
        }

        // These originate here; receiving one back is a caller bug
        Message::ToolDetected { .. } | Message::StorageChanged { .. } => {
            Response::err("broadcast messages are not handled by the background context")
        }
    }
}

async fn broadcast(message: Message) {
    match serde_wasm_bindgen::to_value(&message) {
        // The side panel may simply not be open; that is not an error
        Ok(js) => {
            if let Err(e) = broadcastMessage(js).await {
                debug!("no listeners for broadcast: {:?}", e);
            }
        }
        Err(e) => warn!("failed to encode broadcast: {}", e),
    }
}

async fn load_store() -> StoreData {
    let mut store: StoreData = load_json(crate::STORE_KEY).await.unwrap_or_default();
    store.repair();
    store
}

async fn load_settings() -> Settings {
    load_json(crate::SETTINGS_KEY).await.unwrap_or_default()
}

async fn load_registry() -> ToolRegistry {
    let user: UserTools = load_json(crate::TOOLS_KEY).await.unwrap_or_default();
    ToolRegistry::with_user_tools(&user)
}

async fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let js = getStorage(key).await.ok()?;
    if js.is_null() || js.is_undefined() {
        return None;
    }
    match serde_wasm_bindgen::from_value(js) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("corrupt document under \"{}\": {}", key, e);
            None
        }
    }
}

async fn save_json<T: Serialize>(key: &str, value: &T) -> Result<(), String> {
    let js = serde_wasm_bindgen::to_value(value).map_err(|e| e.to_string())?;
    setStorage(key, js).await.map_err(|e| format!("{:?}", e))
}

fn to_js(response: &Response) -> JsValue {
    serde_wasm_bindgen::to_value(response).unwrap_or(JsValue::NULL)
}
