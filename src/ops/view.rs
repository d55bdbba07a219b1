use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::list::List;
use crate::model::task::Task;
use crate::ops::sort::SortCriterion;

/// What the working view is pointed at.
///
/// Owned and shared lists are referenced by id and resolved through the
/// profile, so the view never holds a stale copy of a list's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Owned(String),
    Shared(String),
    /// The fallback list, held by value because no collection owns it
    Placeholder(List),
}

impl Selection {
    pub fn id(&self) -> &str {
        match self {
            Selection::Owned(id) | Selection::Shared(id) => id,
            Selection::Placeholder(list) => &list.id,
        }
    }
}

/// The denormalized projection of the current list
#[derive(Debug, Clone, Default)]
pub struct WorkingView {
    pub(crate) current: Option<Selection>,
    /// Open tasks, in display order (may be resorted)
    pub(crate) active: Vec<Task>,
    /// Completed tasks, in storage order
    pub(crate) completed: Vec<Task>,
    /// Ids of active tasks picked for batch completion, in pick order
    pub(crate) selected: IndexSet<String>,
    /// Last sort applied since the list was shown
    pub(crate) sorted_by: Option<SortCriterion>,
}

impl WorkingView {
    /// Point the view at `selection`, re-partitioning `tasks` and clearing
    /// the pick set and sort.
    pub(crate) fn show(&mut self, selection: Selection, tasks: &[Task]) {
        let (active, completed) = partition(tasks);
        self.current = Some(selection);
        self.active = active;
        self.completed = completed;
        self.selected.clear();
        self.sorted_by = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = WorkingView::default();
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn active(&self) -> &[Task] {
        &self.active
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn selected(&self) -> &IndexSet<String> {
        &self.selected
    }

    pub fn sorted_by(&self) -> Option<SortCriterion> {
        self.sorted_by
    }

    pub(crate) fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.active
            .iter_mut()
            .chain(self.completed.iter_mut())
            .find(|t| t.id == task_id)
    }

    pub(crate) fn is_active(&self, task_id: &str) -> bool {
        self.active.iter().any(|t| t.id == task_id)
    }

    /// Capture enough of the view to rebuild it later against the same profile
    pub fn snapshot(&self) -> ViewSnapshot {
        let current = self.current.as_ref().map(|selection| match selection {
            Selection::Owned(id) => CurrentRef {
                kind: CurrentKind::Owned,
                id: id.clone(),
            },
            Selection::Shared(id) => CurrentRef {
                kind: CurrentKind::Shared,
                id: id.clone(),
            },
            Selection::Placeholder(list) => CurrentRef {
                kind: CurrentKind::Placeholder,
                id: list.id.clone(),
            },
        });
        ViewSnapshot {
            current,
            selected: self.selected.iter().cloned().collect(),
            sort: self.sorted_by,
        }
    }
}

/// Split tasks into (open, completed), preserving relative order
pub fn partition(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    tasks.iter().cloned().partition(|t| !t.completed)
}

/// Serializable form of the working view's selection state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    #[serde(default)]
    pub current: Option<CurrentRef>,
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub sort: Option<SortCriterion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRef {
    pub kind: CurrentKind,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentKind {
    Owned,
    Shared,
    Placeholder,
}
