/// Pure projection of store state into what the side panel renders.
/// Keeps rendering decisions testable without a DOM.
use crate::store::StoreData;
use crate::tools::ToolRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkView {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub bookmark_count: usize,
    pub bookmarks: Vec<BookmarkView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidePanelView {
    pub tools: Vec<ToolOption>,
    pub groups: Vec<GroupView>,
    pub is_empty: bool,
}

/// Build the panel view for the store's current tool
pub fn project(store: &StoreData, registry: &ToolRegistry) -> SidePanelView {
    let tools = registry
        .list()
        .iter()
        .map(|tool| ToolOption {
            id: tool.id.clone(),
            label: format!("{} {}", tool.icon, tool.name),
            selected: tool.id == store.current_tool(),
        })
        .collect();

    let groups: Vec<GroupView> = store
        .groups_for(store.current_tool())
        .map(|group| GroupView {
            id: group.id.clone(),
            name: group.name.clone(),
            bookmark_count: group.bookmarks.len(),
            bookmarks: group
                .bookmarks
                .iter()
                .map(|b| BookmarkView {
                    id: b.id.clone(),
                    title: b.title.clone(),
                    url: b.url.clone(),
                })
                .collect(),
        })
        .collect();

    SidePanelView {
        tools,
        is_empty: groups.is_empty(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_projects_empty_state() {
        let store = StoreData::new();
        let registry = ToolRegistry::builtin();

        let view = project(&store, &registry);
        assert!(view.is_empty);
        assert!(view.groups.is_empty());
        assert_eq!(view.tools.len(), registry.list().len());
    }

    #[test]
    fn test_selected_tool_is_flagged() {
        let mut store = StoreData::new();
        store.set_current_tool("gemini");
        let registry = ToolRegistry::builtin();

        let view = project(&store, &registry);
        let selected: Vec<&str> = view
            .tools
            .iter()
            .filter(|t| t.selected)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(selected, vec!["gemini"]);
        assert_eq!(view.tools[2].label, "💎 Google Gemini");
    }

    #[test]
    fn test_only_current_tool_groups_are_visible() {
        let mut store = StoreData::new();
        let visible = store.create_group("chatgpt", "Work").unwrap();
        store.create_group("claude", "Hidden").unwrap();
        store
            .add_bookmark(&visible.id, "Chat", "https://chatgpt.com/c/abc")
            .unwrap();
        let registry = ToolRegistry::builtin();

        let view = project(&store, &registry);
        assert!(!view.is_empty);
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].name, "Work");
        assert_eq!(view.groups[0].bookmark_count, 1);
        assert_eq!(view.groups[0].bookmarks[0].title, "Chat");
    }

    #[test]
    fn test_group_and_bookmark_order_is_preserved() {
        let mut store = StoreData::new();
        let first = store.create_group("chatgpt", "First").unwrap();
        store.create_group("chatgpt", "Second").unwrap();
        store
            .add_bookmark(&first.id, "A", "https://chatgpt.com/c/a")
            .unwrap();
        store
            .add_bookmark(&first.id, "B", "https://chatgpt.com/c/b")
            .unwrap();
        let registry = ToolRegistry::builtin();

        let view = project(&store, &registry);
        let group_names: Vec<&str> = view.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, vec!["First", "Second"]);
        let titles: Vec<&str> = view.groups[0]
            .bookmarks
            .iter()
            .map(|b| b.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_current_tool_shows_nothing() {
        // A dangling current tool (user tool unregistered) renders as empty
        // rather than failing
        let mut store = StoreData::new();
        store.create_group("chatgpt", "Work").unwrap();
        store.set_current_tool("gone");
        let registry = ToolRegistry::builtin();

        let view = project(&store, &registry);
        assert!(view.is_empty);
        assert!(view.tools.iter().all(|t| !t.selected));
    }
}
