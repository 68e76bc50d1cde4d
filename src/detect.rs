/// Tool detection from page URLs
use url::Url;

use crate::tools::ToolRegistry;

/// Resolve which registered tool owns a URL.
///
/// The hostname is lowercased and checked against each tool's domains by
/// substring containment, in registry order; the first match wins. Malformed
/// URLs and URLs without a hostname return `None` rather than an error.
pub fn detect_tool<'a>(registry: &'a ToolRegistry, url: &str) -> Option<&'a str> {
    let hostname = extract_hostname(url)?;

    registry
        .list()
        .iter()
        .find(|tool| tool.domains.iter().any(|domain| hostname.contains(domain.as_str())))
        .map(|tool| tool.id.as_str())
}

/// Lowercased hostname of a URL, if it parses and has one
fn extract_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed.host_str().map(|host| host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;

    #[test]
    fn test_detects_builtin_tools() {
        let registry = ToolRegistry::builtin();

        assert_eq!(detect_tool(&registry, "https://chatgpt.com/c/abc"), Some("chatgpt"));
        assert_eq!(detect_tool(&registry, "https://chat.openai.com/"), Some("chatgpt"));
        assert_eq!(detect_tool(&registry, "https://claude.ai/chat/xyz"), Some("claude"));
        assert_eq!(detect_tool(&registry, "https://gemini.google.com/app"), Some("gemini"));
        assert_eq!(detect_tool(&registry, "https://bard.google.com/"), Some("gemini"));
        assert_eq!(detect_tool(&registry, "https://poe.com/Claude-3"), Some("poe"));
    }

    #[test]
    fn test_hostname_is_lowercased() {
        let registry = ToolRegistry::builtin();
        assert_eq!(detect_tool(&registry, "https://Claude.AI/chat/1"), Some("claude"));
    }

    #[test]
    fn test_substring_match_covers_subdomains() {
        let registry = ToolRegistry::builtin();
        assert_eq!(detect_tool(&registry, "https://www.chatgpt.com/"), Some("chatgpt"));
    }

    #[test]
    fn test_unrecognized_url_is_none() {
        let registry = ToolRegistry::builtin();
        assert_eq!(detect_tool(&registry, "https://example.com/"), None);
        assert_eq!(detect_tool(&registry, "https://github.com/rust-lang/rust"), None);
    }

    #[test]
    fn test_malformed_url_is_none() {
        let registry = ToolRegistry::builtin();
        assert_eq!(detect_tool(&registry, ""), None);
        assert_eq!(detect_tool(&registry, "not a url"), None);
        assert_eq!(detect_tool(&registry, "chatgpt.com/c/abc"), None);
    }

    #[test]
    fn test_overlapping_domains_first_in_registry_order_wins() {
        let mut registry = ToolRegistry::builtin();
        // Shares a domain substring with the built-in "poe" entry, but is
        // registered after it
        registry
            .register(Tool::new("poe-mirror", "Poe Mirror", "🔮", &["poe.com"]))
            .unwrap();

        assert_eq!(detect_tool(&registry, "https://poe.com/some-bot"), Some("poe"));
    }

    #[test]
    fn test_user_tool_detection() {
        let mut registry = ToolRegistry::builtin();
        registry
            .register(Tool::new("kimi", "Kimi", "🌙", &["kimi.moonshot.cn"]))
            .unwrap();

        assert_eq!(detect_tool(&registry, "https://kimi.moonshot.cn/chat/1"), Some("kimi"));
    }
}
