use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::list::{List, SharedList};

/// A message shown in the notifications dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    /// Absent on notifications created at sign-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The per-user record the session revolves around
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub shared_lists: Vec<SharedList>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Profile {
    /// A fresh profile with no lists
    pub fn new(id: String, name: String, email: String) -> Self {
        Profile {
            id,
            name,
            email,
            avatar_url: String::new(),
            lists: Vec::new(),
            shared_lists: Vec::new(),
            notifications: Vec::new(),
        }
    }

    /// True if any owned or shared list already uses `id`
    pub fn has_list_id(&self, id: &str) -> bool {
        self.lists.iter().any(|l| l.id == id) || self.shared_lists.iter().any(|s| s.list.id == id)
    }

    /// True if any task in any list already uses `id`
    pub fn has_task_id(&self, id: &str) -> bool {
        self.lists
            .iter()
            .chain(self.shared_lists.iter().map(|s| &s.list))
            .any(|l| l.tasks.iter().any(|t| t.id == id))
    }

    /// Apply a shallow patch: present fields replace the current ones wholesale.
    pub fn merge(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(avatar_url) = patch.avatar_url {
            self.avatar_url = avatar_url;
        }
        if let Some(lists) = patch.lists {
            self.lists = lists;
        }
        if let Some(shared_lists) = patch.shared_lists {
            self.shared_lists = shared_lists;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
    }
}

/// Partial profile update; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub lists: Option<Vec<List>>,
    pub shared_lists: Option<Vec<SharedList>>,
    pub notifications: Option<Vec<Notification>>,
}

impl ProfilePatch {
    pub fn lists(lists: Vec<List>) -> Self {
        ProfilePatch {
            lists: Some(lists),
            ..Default::default()
        }
    }

    pub fn shared_lists(shared_lists: Vec<SharedList>) -> Self {
        ProfilePatch {
            shared_lists: Some(shared_lists),
            ..Default::default()
        }
    }

    pub fn notifications(notifications: Vec<Notification>) -> Self {
        ProfilePatch {
            notifications: Some(notifications),
            ..Default::default()
        }
    }
}
