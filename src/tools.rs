/// Tool registry: the AI chat sites the extension recognizes
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ids of the tools that ship with the extension, in registry order
pub const BUILTIN_TOOL_IDS: [&str; 4] = ["chatgpt", "claude", "gemini", "poe"];

/// Tool selected when nothing has been detected yet
pub const DEFAULT_TOOL_ID: &str = "chatgpt";

/// An AI chat site the extension integrates with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub domains: Vec<String>,
}

impl Tool {
    pub fn new(id: &str, name: &str, icon: &str, domains: &[&str]) -> Tool {
        Tool {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Persisted shape of a user-registered tool; the id is the map key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub name: String,
    pub icon: String,
    pub domains: Vec<String>,
}

/// The `{ id -> tool }` document user-registered tools round-trip through
pub type UserTools = BTreeMap<String, ToolConfig>;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("a tool with id \"{0}\" already exists")]
    DuplicateId(String),
    #[error("tool id and name must not be empty")]
    EmptyField,
    #[error("built-in tool \"{0}\" cannot be removed")]
    BuiltinTool(String),
}

/// Ordered collection of recognized tools.
///
/// Iteration order is part of the contract: built-ins first, then user
/// tools in registration order. URL detection relies on it to break ties
/// between tools with overlapping domains.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Registry holding only the built-in tools
    pub fn builtin() -> ToolRegistry {
        ToolRegistry {
            tools: vec![
                Tool::new("chatgpt", "ChatGPT", "🤖", &["chat.openai.com", "chatgpt.com"]),
                Tool::new("claude", "Claude AI", "🧠", &["claude.ai"]),
                Tool::new("gemini", "Google Gemini", "💎", &["gemini.google.com", "bard.google.com"]),
                Tool::new("poe", "Poe", "🔮", &["poe.com"]),
            ],
        }
    }

    /// Built-ins plus the tools loaded from the persisted user-tool document.
    /// Entries that collide with a built-in id or fail validation are skipped.
    pub fn with_user_tools(user: &UserTools) -> ToolRegistry {
        let mut registry = ToolRegistry::builtin();
        for (id, config) in user {
            let tool = Tool {
                id: id.clone(),
                name: config.name.clone(),
                icon: config.icon.clone(),
                domains: config.domains.clone(),
            };
            if let Err(e) = registry.register(tool) {
                log::warn!("skipping saved tool \"{}\": {}", id, e);
            }
        }
        registry
    }

    pub fn register(&mut self, mut tool: Tool) -> Result<(), RegistryError> {
        tool.id = tool.id.trim().to_string();
        tool.name = tool.name.trim().to_string();
        if tool.id.is_empty() || tool.name.is_empty() {
            return Err(RegistryError::EmptyField);
        }
        if self.get(&tool.id).is_some() {
            return Err(RegistryError::DuplicateId(tool.id));
        }

        // Hostname matching is lowercase, so store domains that way
        tool.domains = tool
            .domains
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        self.tools.push(tool);
        Ok(())
    }

    /// Remove a user-registered tool. Built-ins are protected; removing an
    /// unknown id is a no-op reported as `Ok(false)`.
    pub fn unregister(&mut self, id: &str) -> Result<bool, RegistryError> {
        if Self::is_builtin(id) {
            return Err(RegistryError::BuiltinTool(id.to_string()));
        }
        let before = self.tools.len();
        self.tools.retain(|t| t.id != id);
        Ok(self.tools.len() < before)
    }

    pub fn get(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn list(&self) -> &[Tool] {
        &self.tools
    }

    pub fn is_builtin(id: &str) -> bool {
        BUILTIN_TOOL_IDS.contains(&id)
    }

    /// The user-registered subset, in the persisted document shape
    pub fn user_tools(&self) -> UserTools {
        self.tools
            .iter()
            .filter(|t| !Self::is_builtin(&t.id))
            .map(|t| {
                (
                    t.id.clone(),
                    ToolConfig {
                        name: t.name.clone(),
                        icon: t.icon.clone(),
                        domains: t.domains.clone(),
                    },
                )
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = ToolRegistry::builtin();
        let ids: Vec<&str> = registry.list().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, BUILTIN_TOOL_IDS);
    }

    #[test]
    fn test_register_appends_after_builtins() {
        let mut registry = ToolRegistry::builtin();
        registry
            .register(Tool::new("kimi", "Kimi", "🌙", &["kimi.moonshot.cn"]))
            .unwrap();

        let last = registry.list().last().unwrap();
        assert_eq!(last.id, "kimi");
        assert_eq!(registry.list().len(), BUILTIN_TOOL_IDS.len() + 1);
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let mut registry = ToolRegistry::builtin();
        let result = registry.register(Tool::new("claude", "Claude clone", "🧠", &["claude.ai"]));
        assert_eq!(result, Err(RegistryError::DuplicateId("claude".to_string())));
    }

    #[test]
    fn test_register_rejects_blank_fields() {
        let mut registry = ToolRegistry::builtin();
        assert_eq!(
            registry.register(Tool::new("  ", "Name", "x", &[])),
            Err(RegistryError::EmptyField)
        );
        assert_eq!(
            registry.register(Tool::new("id", "   ", "x", &[])),
            Err(RegistryError::EmptyField)
        );
    }

    #[test]
    fn test_register_normalizes_domains() {
        let mut registry = ToolRegistry::builtin();
        registry
            .register(Tool::new("deepseek", "DeepSeek", "🐋", &[" Chat.DeepSeek.com ", ""]))
            .unwrap();

        let tool = registry.get("deepseek").unwrap();
        assert_eq!(tool.domains, vec!["chat.deepseek.com"]);
    }

    #[test]
    fn test_unregister_builtin_is_rejected() {
        let mut registry = ToolRegistry::builtin();
        assert_eq!(
            registry.unregister("chatgpt"),
            Err(RegistryError::BuiltinTool("chatgpt".to_string()))
        );
        assert!(registry.get("chatgpt").is_some());
    }

    #[test]
    fn test_unregister_user_tool() {
        let mut registry = ToolRegistry::builtin();
        registry
            .register(Tool::new("kimi", "Kimi", "🌙", &["kimi.moonshot.cn"]))
            .unwrap();

        assert_eq!(registry.unregister("kimi"), Ok(true));
        assert!(registry.get("kimi").is_none());
        assert_eq!(registry.unregister("kimi"), Ok(false));
    }

    #[test]
    fn test_user_tools_round_trip() {
        let mut registry = ToolRegistry::builtin();
        registry
            .register(Tool::new("kimi", "Kimi", "🌙", &["kimi.moonshot.cn"]))
            .unwrap();
        registry
            .register(Tool::new("deepseek", "DeepSeek", "🐋", &["chat.deepseek.com"]))
            .unwrap();

        let saved = registry.user_tools();
        assert_eq!(saved.len(), 2);

        let reloaded = ToolRegistry::with_user_tools(&saved);
        assert!(reloaded.get("kimi").is_some());
        assert!(reloaded.get("deepseek").is_some());
        assert_eq!(reloaded.list().len(), BUILTIN_TOOL_IDS.len() + 2);
        // Built-ins always come first
        assert_eq!(reloaded.list()[0].id, "chatgpt");
    }

    #[test]
    fn test_with_user_tools_skips_builtin_collisions() {
        let mut user = UserTools::new();
        user.insert(
            "claude".to_string(),
            ToolConfig {
                name: "Fake Claude".to_string(),
                icon: "x".to_string(),
                domains: vec!["evil.example".to_string()],
            },
        );

        let registry = ToolRegistry::with_user_tools(&user);
        assert_eq!(registry.get("claude").unwrap().name, "Claude AI");
        assert_eq!(registry.list().len(), BUILTIN_TOOL_IDS.len());
    }
}
