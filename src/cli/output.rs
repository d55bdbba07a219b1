use serde::Serialize;

use crate::model::list::{Collaborator, List, ListKind, ListRef};
use crate::model::profile::Notification;
use crate::model::task::Task;
use crate::ops::engine::TaskEngine;
use crate::ops::sort::SortCriterion;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentListJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    /// "owned", "shared" or "placeholder"
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<&'a Collaborator>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewJson<'a> {
    pub list: Option<CurrentListJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted_by: Option<SortCriterion>,
    pub active: &'a [Task],
    pub completed: &'a [Task],
    pub selected: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummaryJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub kind: ListKind,
    pub open: usize,
    pub completed: usize,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<&'a Collaborator>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListsJson<'a> {
    pub lists: Vec<ListSummaryJson<'a>>,
    pub shared_lists: Vec<ListSummaryJson<'a>>,
}

#[derive(Serialize)]
pub struct NotificationsJson<'a> {
    pub unread: Vec<&'a Notification>,
    pub read: Vec<&'a Notification>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn view_to_json(engine: &TaskEngine) -> ViewJson<'_> {
    let list = engine.current_list().map(|current| CurrentListJson {
        id: current.id(),
        name: current.name(),
        kind: match current {
            ListRef::Owned(_) => "owned",
            ListRef::Shared(_) => "shared",
            ListRef::Placeholder(_) => "placeholder",
        },
        shared_with: current.shared_with(),
    });
    ViewJson {
        list,
        sorted_by: engine.view().sorted_by(),
        active: engine.active(),
        completed: engine.completed(),
        selected: engine.selected().iter().map(String::as_str).collect(),
    }
}

fn summarize<'a>(
    kind: ListKind,
    list: &'a List,
    shared_with: Option<&'a Collaborator>,
    current_id: Option<&str>,
) -> ListSummaryJson<'a> {
    let open = list.tasks.iter().filter(|t| !t.completed).count();
    ListSummaryJson {
        id: &list.id,
        name: &list.name,
        kind,
        open,
        completed: list.tasks.len() - open,
        current: current_id == Some(list.id.as_str()),
        shared_with,
    }
}

pub fn lists_to_json(engine: &TaskEngine) -> ListsJson<'_> {
    let current_id = engine.current_list().map(|c| c.id());
    ListsJson {
        lists: engine
            .lists()
            .iter()
            .map(|l| summarize(ListKind::Owned, l, None, current_id))
            .collect(),
        shared_lists: engine
            .shared_lists()
            .iter()
            .map(|s| summarize(ListKind::Shared, &s.list, Some(&s.shared_with), current_id))
            .collect(),
    }
}

pub fn notifications_to_json(engine: &TaskEngine) -> NotificationsJson<'_> {
    NotificationsJson {
        unread: engine.unread_notifications(),
        read: engine.read_notifications(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One task line: `[ ] ID  Title *  (due YYYY-MM-DD)`
pub fn format_task_line(task: &Task, picked: bool) -> String {
    let mark = if task.completed {
        "[x]"
    } else if picked {
        "[>]"
    } else {
        "[ ]"
    };
    let mut line = format!("  {} {}  {}", mark, task.id, task.title);
    if task.starred {
        line.push_str(" *");
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!("  (due {})", due.format("%Y-%m-%d")));
    }
    line
}

fn format_collaborator(c: &Collaborator) -> String {
    format!("{} <{}>", c.name, c.email)
}

/// The current list as printed by `tareas show`
pub fn format_view(engine: &TaskEngine, show_completed: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(current) = engine.current_list() else {
        lines.push("No list selected. Create one with `tareas new-list <name>`.".to_string());
        return lines;
    };

    let mut header = format!("{} ({})", current.name(), current.id());
    if let Some(c) = current.shared_with() {
        header.push_str(&format!("  shared with {}", format_collaborator(c)));
    }
    if current.is_placeholder() {
        header.push_str("  default");
    }
    lines.push(header);
    if let Some(criterion) = engine.view().sorted_by() {
        lines.push(format!("sorted by {}", criterion));
    }

    if engine.active().is_empty() {
        lines.push("  (no open tasks)".to_string());
    }
    for task in engine.active() {
        lines.push(format_task_line(task, engine.selected().contains(&task.id)));
    }

    if show_completed && !engine.completed().is_empty() {
        lines.push(String::new());
        lines.push(format!("Completed ({})", engine.completed().len()));
        for task in engine.completed() {
            lines.push(format_task_line(task, false));
        }
    }
    lines
}

/// Owned and shared lists as printed by `tareas lists`
pub fn format_lists(engine: &TaskEngine) -> Vec<String> {
    let summary = lists_to_json(engine);
    let mut lines = Vec::new();

    let row = |s: &ListSummaryJson<'_>| {
        let marker = if s.current { "*" } else { " " };
        let mut line = format!("{} {}  {} ({} open)", marker, s.id, s.name, s.open);
        if let Some(c) = s.shared_with {
            line.push_str(&format!("  with {}", format_collaborator(c)));
        }
        line
    };

    lines.push("Lists".to_string());
    if summary.lists.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(summary.lists.iter().map(row));

    if !summary.shared_lists.is_empty() {
        lines.push(String::new());
        lines.push("Shared".to_string());
        lines.extend(summary.shared_lists.iter().map(row));
    }
    lines
}

/// Notifications as printed by `tareas notifications`
pub fn format_notifications(engine: &TaskEngine) -> Vec<String> {
    let unread = engine.unread_notifications();
    let read = engine.read_notifications();
    let mut lines = vec![format!("{} unread", unread.len())];
    for n in unread.iter().chain(read.iter()) {
        let mark = if n.read { " " } else { "*" };
        lines.push(format!(
            "{} {}  {}: {}",
            mark,
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.title,
            n.description
        ));
    }
    lines
}
