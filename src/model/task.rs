use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task inside a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within its list
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub starred: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_to_my_day: Option<bool>,
    /// Carried through untouched; nothing in the engine reads it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<bool>,
}

impl Task {
    /// Create a new open task. New tasks land in "My Day".
    pub fn new(id: String, title: String, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            title,
            completed: false,
            starred: false,
            created_at,
            due_date: None,
            added_to_my_day: Some(true),
            reminder: None,
            repeat: None,
        }
    }

    /// `addedToMyDay` with an absent flag read as false
    pub fn in_my_day(&self) -> bool {
        self.added_to_my_day.unwrap_or(false)
    }
}
