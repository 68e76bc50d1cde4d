/// Grouped bookmark store, persisted as a single chrome.storage.local document
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::bookmark_data::{Bookmark, Group};
use crate::tools::DEFAULT_TOOL_ID;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("group name must not be empty")]
    EmptyName,
    #[error("a group named \"{0}\" already exists for this tool")]
    DuplicateName(String),
    #[error("\"{0}\" is not a valid URL")]
    InvalidUrl(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("group not found")]
    GroupNotFound,
}

/// Root persisted document: all groups plus the tool the panel is filtered to.
///
/// Mutations apply to the in-memory copy immediately; writing the document
/// back to storage is the caller's fire-and-forget concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default = "default_tool_id")]
    pub current_tool_id: String,
}

fn default_tool_id() -> String {
    DEFAULT_TOOL_ID.to_string()
}

impl StoreData {
    pub fn new() -> StoreData {
        StoreData {
            groups: Vec::new(),
            current_tool_id: default_tool_id(),
        }
    }

    /// Create a group for a tool. Names are trimmed and must be unique
    /// within that tool.
    pub fn create_group(&mut self, tool_id: &str, name: &str) -> Result<Group, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.group_name_taken(tool_id, name, None) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let group = Group::new(tool_id.to_string(), name.to_string());
        self.groups.push(group.clone());
        Ok(group)
    }

    /// Rename a group, with the same checks as creation but excluding the
    /// group itself. A stale id is a no-op reported as `Ok(false)`.
    pub fn rename_group(&mut self, group_id: &str, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let Some(index) = self.groups.iter().position(|g| g.id == group_id) else {
            return Ok(false);
        };
        let tool_id = self.groups[index].tool_id.clone();
        if self.group_name_taken(&tool_id, name, Some(group_id)) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        self.groups[index].name = name.to_string();
        Ok(true)
    }

    /// Remove a group and everything in it. Irreversible; confirmation is a
    /// UI concern.
    pub fn delete_group(&mut self, group_id: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != group_id);
        self.groups.len() < before
    }

    /// Append a bookmark to a group. The URL must parse as an absolute URL;
    /// dead links are not detected.
    pub fn add_bookmark(
        &mut self,
        group_id: &str,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::MissingField("title"));
        }
        if group_id.trim().is_empty() {
            return Err(StoreError::MissingField("groupId"));
        }
        let url = url.trim();
        if Url::parse(url).is_err() {
            return Err(StoreError::InvalidUrl(url.to_string()));
        }

        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(StoreError::GroupNotFound)?;

        let bookmark = Bookmark::new(title.to_string(), url.to_string());
        group.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    /// Remove a bookmark by id, wherever it lives. Unknown ids are a no-op.
    pub fn delete_bookmark(&mut self, bookmark_id: &str) -> bool {
        for group in &mut self.groups {
            if let Some(index) = group.bookmarks.iter().position(|b| b.id == bookmark_id) {
                group.bookmarks.remove(index);
                return true;
            }
        }
        false
    }

    pub fn find_bookmark(&self, bookmark_id: &str) -> Option<&Bookmark> {
        self.groups
            .iter()
            .flat_map(|g| g.bookmarks.iter())
            .find(|b| b.id == bookmark_id)
    }

    pub fn get_group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn set_current_tool(&mut self, tool_id: &str) {
        self.current_tool_id = tool_id.to_string();
    }

    pub fn current_tool(&self) -> &str {
        &self.current_tool_id
    }

    /// Groups belonging to a tool, in creation order
    pub fn groups_for<'a>(&'a self, tool_id: &'a str) -> impl Iterator<Item = &'a Group> {
        self.groups.iter().filter(move |g| g.tool_id == tool_id)
    }

    /// Normalize a document loaded from storage. Returns whether anything
    /// had to change.
    pub fn repair(&mut self) -> bool {
        if self.current_tool_id.trim().is_empty() {
            self.current_tool_id = default_tool_id();
            return true;
        }
        false
    }

    fn group_name_taken(&self, tool_id: &str, name: &str, exclude_id: Option<&str>) -> bool {
        self.groups
            .iter()
            .any(|g| g.tool_id == tool_id && g.name == name && Some(g.id.as_str()) != exclude_id)
    }
}

impl Default for StoreData {
    fn default() -> Self {
        Self::new()
    }
}
