/// Cross-context message protocol (panel <-> background <-> content script)
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::page::PageInfo;

/// The active browser tab, as reported by the background context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabInfo {
    pub id: i32,
    pub title: String,
    pub url: String,
}

/// Every message that may cross a context boundary.
///
/// The wire shape is a `type`-tagged object. Deserialization is the closed
/// set below; a payload with an unrecognized tag fails to parse and the
/// dispatcher answers with a failed [`Response`] instead of dropping it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Message {
    /// Background -> panel: the active tab belongs to a tool
    #[serde(rename = "AI_TOOL_DETECTED", rename_all = "camelCase")]
    ToolDetected { tool_id: String, tab_info: TabInfo },

    /// Background -> panel: the persisted document changed underneath us
    #[serde(rename = "STORAGE_CHANGED")]
    StorageChanged { changes: Value },

    /// Panel -> background: which tab is active?
    #[serde(rename = "GET_CURRENT_TAB_INFO")]
    GetCurrentTabInfo,

    /// Panel -> background: navigate to a bookmark
    #[serde(rename = "OPEN_URL", rename_all = "camelCase")]
    OpenUrl {
        url: String,
        #[serde(default)]
        new_tab: bool,
    },

    /// Panel -> background: show a desktop notification
    #[serde(rename = "SHOW_NOTIFICATION", rename_all = "camelCase")]
    ShowNotification {
        #[serde(default)]
        title: Option<String>,
        message: String,
        #[serde(default)]
        icon_url: Option<String>,
    },

    /// Read keys from the persisted document
    #[serde(rename = "GET_STORAGE_DATA")]
    GetStorageData { keys: Vec<String> },

    /// Write keys into the persisted document
    #[serde(rename = "SET_STORAGE_DATA")]
    SetStorageData { data: Value },

    /// Content script -> background: page metadata for the tab it runs in
    #[serde(rename = "PAGE_INFO_DETECTED", rename_all = "camelCase")]
    PageInfoDetected { page_info: PageInfo },
}

/// Uniform reply for request/response message pairs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(data: Value) -> Response {
        Response {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn ok_empty() -> Response {
        Response {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Response {
        Response {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
