use serde::Serialize;

pub type TabId = String;

/// One open directory view inside a leaf pane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: TabId,
    pub path: String,
    pub name: String,
}

impl Tab {
    /// Create a tab whose name is derived from the path.
    pub fn new(id: TabId, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = display_name(&path).to_string();
        Self { id, path, name }
    }

    pub fn with_name(id: TabId, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            name: name.into(),
        }
    }

    /// The same tab (same id) pointed at another directory.
    pub fn navigated(&self, path: impl Into<String>) -> Self {
        Self::new(self.id.clone(), path)
    }
}

/// Last path segment, or the whole path when that segment is empty.
pub fn display_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => path,
    }
}
