/// Data structures for chat-stash
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved page within a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: f64,
}

impl Bookmark {
    pub fn new(title: String, url: String) -> Bookmark {
        Bookmark {
            id: new_id(),
            title,
            url,
            created_at: now_ms(),
        }
    }
}

/// A named collection of bookmarks, scoped to one tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub tool_id: String,
    pub bookmarks: Vec<Bookmark>,
    pub created_at: f64,
}

impl Group {
    pub fn new(tool_id: String, name: String) -> Group {
        Group {
            id: new_id(),
            name,
            tool_id,
            bookmarks: Vec::new(),
            created_at: now_ms(),
        }
    }
}

/// User preferences, persisted as their own document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub auto_detect_tool: bool,
    #[serde(default = "default_true")]
    pub show_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: default_theme(),
            auto_detect_tool: true,
            show_notifications: true,
        }
    }
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_true() -> bool {
    true
}

/// Generate a fresh id for a group or bookmark
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as epoch milliseconds
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_creation() {
        let bookmark = Bookmark::new(
            "Rust borrow checker".to_string(),
            "https://chatgpt.com/c/abc-123".to_string(),
        );

        assert!(!bookmark.id.is_empty());
        assert_eq!(bookmark.title, "Rust borrow checker");
        assert_eq!(bookmark.url, "https://chatgpt.com/c/abc-123");
        assert!(bookmark.created_at > 0.0);
    }

    #[test]
    fn test_group_starts_empty() {
        let group = Group::new("claude".to_string(), "Work".to_string());

        assert_eq!(group.tool_id, "claude");
        assert_eq!(group.name, "Work");
        assert!(group.bookmarks.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn test_group_serialization_uses_camel_case() {
        let group = Group {
            id: "g-1".to_string(),
            name: "Research".to_string(),
            tool_id: "gemini".to_string(),
            bookmarks: vec![Bookmark {
                id: "b-1".to_string(),
                title: "Paper summary".to_string(),
                url: "https://gemini.google.com/chat/xyz".to_string(),
                created_at: 1698508200000.0,
            }],
            created_at: 1698508200000.0,
        };

        let json = serde_json::to_string(&group).unwrap();
        assert!(json.contains("\"toolId\":\"gemini\""));
        assert!(json.contains("\"createdAt\""));

        let back: Group = serde_json::from_str(&json).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "dark");
        assert!(settings.auto_detect_tool);
        assert!(settings.show_notifications);
    }

    #[test]
    fn test_settings_missing_fields_fall_back() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());

        let settings: Settings =
            serde_json::from_str(r#"{"theme":"light","autoDetectTool":false}"#).unwrap();
        assert_eq!(settings.theme, "light");
        assert!(!settings.auto_detect_tool);
        assert!(settings.show_notifications);
    }
}
