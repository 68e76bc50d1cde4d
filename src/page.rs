/// Page observation: what the active tab tells us about the current tool
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detect::detect_tool;
use crate::store::StoreData;
use crate::tools::ToolRegistry;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Main,
    Conversation,
}

/// Metadata captured for a page on a recognized tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub tool_id: String,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub kind: PageKind,
}

impl PageInfo {
    /// Classify a URL and, when it points at a conversation, pull out the
    /// conversation id. `None` when the URL belongs to no registered tool.
    pub fn capture(
        registry: &ToolRegistry,
        patterns: &ConversationPatterns,
        url: &str,
        title: &str,
    ) -> Option<PageInfo> {
        let tool_id = detect_tool(registry, url)?.to_string();
        let conversation_id = patterns.conversation_id(&tool_id, url);
        let kind = if conversation_id.is_some() {
            PageKind::Conversation
        } else {
            PageKind::Main
        };

        Some(PageInfo {
            tool_id,
            url: url.to_string(),
            title: title.to_string(),
            conversation_id,
            kind,
        })
    }
}

/// Per-tool patterns locating the conversation id inside a page URL
pub struct ConversationPatterns {
    patterns: Vec<(String, Regex)>,
}

impl ConversationPatterns {
    pub fn builtin() -> ConversationPatterns {
        let sources = [
            ("chatgpt", r"/c/([A-Za-z0-9-]+)"),
            ("claude", r"/chat/([A-Za-z0-9-]+)"),
            ("gemini", r"/chat/([A-Za-z0-9-]+)"),
            ("poe", r"poe\.com/([A-Za-z0-9-]+)"),
        ];
        ConversationPatterns {
            patterns: sources
                .iter()
                .filter_map(|(id, src)| Regex::new(src).ok().map(|re| (id.to_string(), re)))
                .collect(),
        }
    }

    /// Conversation id for a tool's URL, if the tool has a pattern and the
    /// URL matches it
    pub fn conversation_id(&self, tool_id: &str, url: &str) -> Option<String> {
        let (_, re) = self.patterns.iter().find(|(id, _)| id == tool_id)?;
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for ConversationPatterns {
    fn default() -> Self {
        Self::builtin()
    }
}

/// React to a navigation event on the active tab.
///
/// Re-runs tool detection and, when the resolved tool differs from the
/// store's current tool, switches to it and returns the new id. URLs that
/// resolve to no tool leave the current tool untouched.
pub fn on_navigation(
    store: &mut StoreData,
    registry: &ToolRegistry,
    url: &str,
    title: &str,
) -> Option<String> {
    let tool_id = detect_tool(registry, url)?;
    if store.current_tool() == tool_id {
        return None;
    }

    debug!("tool detected on \"{}\": {}", title, tool_id);
    store.set_current_tool(tool_id);
    Some(tool_id.to_string())
}
