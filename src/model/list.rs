use serde::{Deserialize, Serialize};

use super::task::Task;

/// Sentinel id of the placeholder list shown when nothing else is left
pub const PLACEHOLDER_LIST_ID: &str = "tareas";
/// Display name of the placeholder list
pub const PLACEHOLDER_LIST_NAME: &str = "Tareas";

/// A list owned by the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// Unique across owned and shared lists
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl List {
    pub fn new(id: String, name: String) -> Self {
        List {
            id,
            name,
            tasks: Vec::new(),
        }
    }

    /// The fixed fallback list. Never stored in a profile collection.
    pub fn placeholder() -> Self {
        List::new(
            PLACEHOLDER_LIST_ID.to_string(),
            PLACEHOLDER_LIST_NAME.to_string(),
        )
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}

/// Another user a list is shared with (read-only reference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A list co-owned with a collaborator.
///
/// On disk this is a list object with an extra `sharedWith` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedList {
    #[serde(flatten)]
    pub list: List,
    pub shared_with: Collaborator,
}

/// Which profile collection a list lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Owned,
    Shared,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Owned => write!(f, "owned"),
            ListKind::Shared => write!(f, "shared"),
        }
    }
}

/// Borrowed view of whatever list is currently selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRef<'a> {
    Owned(&'a List),
    Shared(&'a SharedList),
    /// The fallback list; not backed by any profile collection
    Placeholder(&'a List),
}

impl<'a> ListRef<'a> {
    /// The plain list part, regardless of variant
    pub fn list(&self) -> &'a List {
        match self {
            ListRef::Owned(list) | ListRef::Placeholder(list) => list,
            ListRef::Shared(shared) => &shared.list,
        }
    }

    pub fn id(&self) -> &'a str {
        &self.list().id
    }

    pub fn name(&self) -> &'a str {
        &self.list().name
    }

    pub fn tasks(&self) -> &'a [Task] {
        &self.list().tasks
    }

    pub fn shared_with(&self) -> Option<&'a Collaborator> {
        match self {
            ListRef::Shared(shared) => Some(&shared.shared_with),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ListRef::Placeholder(_))
    }
}
