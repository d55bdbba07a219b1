//! The task/list synchronization engine.
//!
//! Every mutation updates the working view first and then writes the owning
//! collection back into the profile mirror, so the two never disagree once a
//! call returns. Conditions that make an operation meaningless (blank title,
//! nothing picked, no list selected) are reported as [`Outcome::Skipped`]
//! rather than errors.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use log::{debug, error, info};

use crate::model::list::{List, ListRef, SharedList};
use crate::model::profile::{Notification, Profile, ProfilePatch};
use crate::model::task::Task;
use crate::ops::mirror::ProfileMirror;
use crate::ops::sort::{SortCriterion, sort_tasks};
use crate::ops::view::{CurrentKind, Selection, ViewSnapshot, WorkingView};

/// Why an operation declined to do anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    NoProfile,
    NoCurrentList,
    /// The fallback list has no owning collection to write to
    Placeholder,
    BlankTitle,
    BlankName,
    EmptySelection,
    UnknownList(String),
    UnknownTask(String),
    NothingUnread,
    /// The current list is missing from its collection. Indicates a bug.
    NotMirrored(String),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NoProfile => write!(f, "no profile loaded"),
            Skip::NoCurrentList => write!(f, "no list selected"),
            Skip::Placeholder => write!(f, "the default list cannot be changed; create a list first"),
            Skip::BlankTitle => write!(f, "task title is empty"),
            Skip::BlankName => write!(f, "list name is empty"),
            Skip::EmptySelection => write!(f, "no tasks picked"),
            Skip::UnknownList(id) => write!(f, "list not found: {}", id),
            Skip::UnknownTask(id) => write!(f, "task not found: {}", id),
            Skip::NothingUnread => write!(f, "no unread notifications"),
            Skip::NotMirrored(id) => write!(f, "list {} is missing from the profile", id),
        }
    }
}

/// Result of an engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(Skip),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

impl From<Skip> for Outcome {
    fn from(skip: Skip) -> Self {
        Outcome::Skipped(skip)
    }
}

/// Hooks the engine calls back into. Both default to doing nothing.
pub trait SessionObserver {
    /// A mutation was mirrored into the profile
    fn profile_changed(&mut self, _profile: &Profile) {}

    /// A shared list became the current list through `select_list`
    fn shared_list_selected(&mut self, _list: &SharedList) {}
}

/// Source of "now" for new ids and timestamps
pub type Clock = fn() -> DateTime<Utc>;

pub struct TaskEngine {
    mirror: ProfileMirror,
    view: WorkingView,
    initialized: bool,
    revision: u64,
    clock: Clock,
    observer: Option<Box<dyn SessionObserver>>,
}

impl Default for TaskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskEngine {
    pub fn new() -> Self {
        TaskEngine {
            mirror: ProfileMirror::new(),
            view: WorkingView::default(),
            initialized: false,
            revision: 0,
            clock: Utc::now,
            observer: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    // -----------------------------------------------------------------------
    // Session boundary
    // -----------------------------------------------------------------------

    /// React to the session's profile appearing (`Some`) or going away (`None`)
    pub fn set_session(&mut self, profile: Option<Profile>) {
        match profile {
            Some(profile) => self.load(profile),
            None => self.clear(),
        }
    }

    /// Load a profile. The first load picks the initial list; later loads
    /// keep the current list when it still exists.
    pub fn load(&mut self, profile: Profile) {
        let previous = self.view.current.clone();
        self.mirror.load(profile);

        if !self.initialized {
            self.initialized = true;
            self.select_initial();
            info!(
                "event=session_start module=engine current={}",
                self.view.current.as_ref().map_or("none", Selection::id)
            );
            return;
        }

        match previous {
            Some(Selection::Placeholder(list)) => self.view.show(Selection::Placeholder(list), &[]),
            Some(selection) => {
                if self.reshow(selection).is_none() {
                    self.select_initial();
                }
            }
            None => self.select_initial(),
        }
    }

    /// Sign-out: drop the profile and every bit of derived state
    pub fn clear(&mut self) {
        self.mirror.clear();
        self.view.reset();
        self.initialized = false;
        info!("event=session_end module=engine");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bumped on every mirrored write
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn profile(&self) -> Option<&Profile> {
        self.mirror.current()
    }

    pub fn mirror(&self) -> &ProfileMirror {
        &self.mirror
    }

    pub fn view(&self) -> &WorkingView {
        &self.view
    }

    pub fn lists(&self) -> &[List] {
        self.mirror.current().map_or(&[], |p| p.lists.as_slice())
    }

    pub fn shared_lists(&self) -> &[SharedList] {
        self.mirror.current().map_or(&[], |p| p.shared_lists.as_slice())
    }

    pub fn notifications(&self) -> &[Notification] {
        self.mirror.current().map_or(&[], |p| p.notifications.as_slice())
    }

    pub fn unread_notifications(&self) -> Vec<&Notification> {
        self.notifications().iter().filter(|n| !n.read).collect()
    }

    pub fn read_notifications(&self) -> Vec<&Notification> {
        self.notifications().iter().filter(|n| n.read).collect()
    }

    /// The current list, resolved through the profile
    pub fn current_list(&self) -> Option<ListRef<'_>> {
        match self.view.current.as_ref()? {
            Selection::Owned(id) => self.lists().iter().find(|l| l.id == *id).map(ListRef::Owned),
            Selection::Shared(id) => self
                .shared_lists()
                .iter()
                .find(|s| s.list.id == *id)
                .map(ListRef::Shared),
            Selection::Placeholder(list) => Some(ListRef::Placeholder(list)),
        }
    }

    pub fn active(&self) -> &[Task] {
        self.view.active()
    }

    pub fn completed(&self) -> &[Task] {
        self.view.completed()
    }

    pub fn selected(&self) -> &IndexSet<String> {
        self.view.selected()
    }

    // -----------------------------------------------------------------------
    // List selection
    // -----------------------------------------------------------------------

    /// Make the list with `list_id` current. Shared lists notify the observer.
    pub fn select_list(&mut self, list_id: &str) -> Outcome {
        let Some(profile) = self.mirror.current() else {
            return Skip::NoProfile.into();
        };

        if let Some(list) = profile.lists.iter().find(|l| l.id == list_id) {
            self.view.show(Selection::Owned(list.id.clone()), &list.tasks);
        } else if let Some(shared) = profile.shared_lists.iter().find(|s| s.list.id == list_id) {
            self.view
                .show(Selection::Shared(shared.list.id.clone()), &shared.list.tasks);
            if let Some(observer) = self.observer.as_mut() {
                observer.shared_list_selected(shared);
            }
        } else {
            return Skip::UnknownList(list_id.to_string()).into();
        }

        debug!("event=list_select module=engine list={}", list_id);
        Outcome::Applied
    }

    fn select_initial(&mut self) {
        let Some(profile) = self.mirror.current() else {
            self.view.reset();
            return;
        };
        if let Some(first) = profile.lists.first() {
            self.view.show(Selection::Owned(first.id.clone()), &first.tasks);
        } else if let Some(first) = profile.shared_lists.first() {
            self.view
                .show(Selection::Shared(first.list.id.clone()), &first.list.tasks);
        } else {
            self.view.reset();
        }
    }

    /// Re-partition `selection` from the profile. `None` if it no longer exists.
    fn reshow(&mut self, selection: Selection) -> Option<()> {
        if let Selection::Placeholder(_) = selection {
            self.view.show(selection, &[]);
            return Some(());
        }
        let profile = self.mirror.current()?;
        let tasks = match &selection {
            Selection::Owned(id) => &profile.lists.iter().find(|l| l.id == *id)?.tasks,
            Selection::Shared(id) => {
                &profile.shared_lists.iter().find(|s| s.list.id == *id)?.list.tasks
            }
            Selection::Placeholder(_) => return None,
        };
        self.view.show(selection.clone(), tasks);
        Some(())
    }

    // -----------------------------------------------------------------------
    // Task mutations
    // -----------------------------------------------------------------------

    /// Append a new open task to the current list
    pub fn add_task(&mut self, title: &str) -> Outcome {
        if title.trim().is_empty() {
            return Skip::BlankTitle.into();
        }
        if let Err(skip) = self.writable_target() {
            return skip.into();
        }

        let now = (self.clock)();
        let id = self.fresh_id(now, |engine, candidate| {
            engine
                .mirror
                .current()
                .is_some_and(|p| p.has_task_id(candidate))
        });
        let task = Task::new(id, title.to_string(), now);
        debug!("event=task_add module=engine task={}", task.id);

        self.view.active.push(task.clone());
        self.mirror_current(|list| list.tasks.push(task))
    }

    /// Pick or unpick an active task for batch completion
    pub fn set_selected(&mut self, task_id: &str, checked: bool) -> Outcome {
        if self.view.current.is_none() {
            return Skip::NoCurrentList.into();
        }
        if checked {
            if !self.view.is_active(task_id) {
                return Skip::UnknownTask(task_id.to_string()).into();
            }
            self.view.selected.insert(task_id.to_string());
        } else if !self.view.selected.shift_remove(task_id) {
            return Skip::UnknownTask(task_id.to_string()).into();
        }
        Outcome::Applied
    }

    /// Move every picked task to the completed section.
    ///
    /// Picked tasks keep their active order. The owning list is stored as
    /// `[remaining active] + [newly completed] + [previously completed]`, and
    /// the completed section follows that same order so reselecting the list
    /// shows exactly what is on screen now.
    pub fn complete_selected(&mut self) -> Outcome {
        if let Err(skip) = self.writable_target() {
            return skip.into();
        }
        if self.view.selected.is_empty() {
            return Skip::EmptySelection.into();
        }

        let selected = std::mem::take(&mut self.view.selected);
        let (mut newly_completed, remaining): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.view.active)
                .into_iter()
                .partition(|t| selected.contains(&t.id));
        for task in &mut newly_completed {
            task.completed = true;
        }
        debug!(
            "event=tasks_complete module=engine count={}",
            newly_completed.len()
        );

        let mut completed = newly_completed;
        completed.append(&mut self.view.completed);
        self.view.active = remaining;
        self.view.completed = completed;

        let stored: Vec<Task> = self
            .view
            .active
            .iter()
            .chain(self.view.completed.iter())
            .cloned()
            .collect();
        self.mirror_current(|list| list.tasks = stored)
    }

    /// Flip the star on a task of the current list
    pub fn toggle_star(&mut self, task_id: &str) -> Outcome {
        if let Err(skip) = self.writable_target() {
            return skip.into();
        }
        let Some(task) = self.view.task_mut(task_id) else {
            return Skip::UnknownTask(task_id.to_string()).into();
        };
        task.starred = !task.starred;
        let starred = task.starred;

        self.mirror_current(|list| {
            if let Some(stored) = list.find_task_mut(task_id) {
                stored.starred = starred;
            }
        })
    }

    /// Reorder the active tasks. View-only; the profile keeps storage order.
    pub fn sort(&mut self, criterion: SortCriterion) -> Outcome {
        if self.view.current.is_none() {
            return Skip::NoCurrentList.into();
        }
        sort_tasks(&mut self.view.active, criterion);
        self.view.sorted_by = Some(criterion);
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // List lifecycle
    // -----------------------------------------------------------------------

    /// Create an owned list and make it current
    pub fn create_list(&mut self, name: &str) -> Outcome {
        if name.trim().is_empty() {
            return Skip::BlankName.into();
        }
        let Some(profile) = self.mirror.current() else {
            return Skip::NoProfile.into();
        };

        let now = (self.clock)();
        let id = self.fresh_id(now, |engine, candidate| {
            engine
                .mirror
                .current()
                .is_some_and(|p| p.has_list_id(candidate))
        });
        let list = List::new(id, name.to_string());
        let mut lists = profile.lists.clone();
        lists.push(list.clone());
        info!("event=list_create module=engine list={}", list.id);

        self.view.show(Selection::Owned(list.id), &[]);
        self.mirror.apply(ProfilePatch::lists(lists));
        self.bump();
        Outcome::Applied
    }

    /// Rename the current list
    pub fn rename_list(&mut self, name: &str) -> Outcome {
        if let Err(skip) = self.writable_target() {
            return skip.into();
        }
        if name.trim().is_empty() {
            return Skip::BlankName.into();
        }
        debug!(
            "event=list_rename module=engine list={}",
            self.view.current.as_ref().map_or("", Selection::id)
        );
        self.mirror_current(|list| list.name = name.to_string())
    }

    /// Remove the current list, then fall back to the first remaining list of
    /// the same collection or to the placeholder.
    pub fn delete_list(&mut self) -> Outcome {
        if let Err(skip) = self.writable_target() {
            return skip.into();
        }
        let Some(profile) = self.mirror.current() else {
            return Skip::NoProfile.into();
        };

        let (patch, fallback) = match self.view.current.as_ref() {
            Some(Selection::Owned(id)) => {
                let lists: Vec<List> = profile.lists.iter().filter(|l| l.id != *id).cloned().collect();
                let fallback = lists
                    .first()
                    .map(|l| (Selection::Owned(l.id.clone()), l.tasks.clone()));
                (ProfilePatch::lists(lists), fallback)
            }
            Some(Selection::Shared(id)) => {
                let shared: Vec<SharedList> = profile
                    .shared_lists
                    .iter()
                    .filter(|s| s.list.id != *id)
                    .cloned()
                    .collect();
                let fallback = shared
                    .first()
                    .map(|s| (Selection::Shared(s.list.id.clone()), s.list.tasks.clone()));
                (ProfilePatch::shared_lists(shared), fallback)
            }
            // writable_target already rejected these
            Some(Selection::Placeholder(_)) => return Skip::Placeholder.into(),
            None => return Skip::NoCurrentList.into(),
        };
        info!(
            "event=list_delete module=engine list={}",
            self.view.current.as_ref().map_or("", Selection::id)
        );

        match fallback {
            Some((selection, tasks)) => self.view.show(selection, &tasks),
            None => self.view.show(Selection::Placeholder(List::placeholder()), &[]),
        }
        self.mirror.apply(patch);
        self.bump();
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub fn mark_all_notifications_read(&mut self) -> Outcome {
        let Some(profile) = self.mirror.current() else {
            return Skip::NoProfile.into();
        };
        if profile.notifications.iter().all(|n| n.read) {
            return Skip::NothingUnread.into();
        }
        let notifications = profile
            .notifications
            .iter()
            .cloned()
            .map(|mut n| {
                n.read = true;
                n
            })
            .collect();
        self.mirror.apply(ProfilePatch::notifications(notifications));
        self.bump();
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // Snapshot / restore
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot()
    }

    /// Rebuild the view from a snapshot taken against this profile.
    /// References that no longer resolve are dropped.
    pub fn restore(&mut self, snapshot: &ViewSnapshot) -> Outcome {
        let Some(current) = snapshot.current.as_ref() else {
            return Skip::NoCurrentList.into();
        };
        let outcome = match current.kind {
            CurrentKind::Placeholder => {
                self.view.show(Selection::Placeholder(List::placeholder()), &[]);
                Outcome::Applied
            }
            CurrentKind::Owned | CurrentKind::Shared => {
                let selection = match current.kind {
                    CurrentKind::Owned => Selection::Owned(current.id.clone()),
                    _ => Selection::Shared(current.id.clone()),
                };
                match self.reshow(selection) {
                    Some(()) => Outcome::Applied,
                    None => Skip::UnknownList(current.id.clone()).into(),
                }
            }
        };
        if !outcome.is_applied() {
            return outcome;
        }

        if let Some(criterion) = snapshot.sort {
            if let Outcome::Skipped(reason) = self.sort(criterion) {
                debug!(
                    "event=view_restore module=engine status=sort_dropped criterion={} reason={}",
                    criterion, reason
                );
            }
        }
        for task_id in &snapshot.selected {
            if let Outcome::Skipped(reason) = self.set_selected(task_id, true) {
                debug!(
                    "event=view_restore module=engine status=pick_dropped task={} reason={}",
                    task_id, reason
                );
            }
        }
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Check that the current list can be written back to its collection
    fn writable_target(&self) -> Result<(), Skip> {
        let profile = self.mirror.current().ok_or(Skip::NoProfile)?;
        let found = match self.view.current.as_ref() {
            None => return Err(Skip::NoCurrentList),
            Some(Selection::Placeholder(_)) => return Err(Skip::Placeholder),
            Some(Selection::Owned(id)) => profile.lists.iter().any(|l| l.id == *id),
            Some(Selection::Shared(id)) => profile.shared_lists.iter().any(|s| s.list.id == *id),
        };
        let id = self.view.current.as_ref().map_or("", Selection::id);
        if !found {
            error!(
                "event=mirror_divergence module=engine status=error list={}",
                id
            );
        }
        debug_assert!(found, "current list {} is missing from the profile", id);
        if found {
            Ok(())
        } else {
            Err(Skip::NotMirrored(id.to_string()))
        }
    }

    /// Edit the profile's copy of the current list and write the whole owning
    /// collection back. Callers check `writable_target` first.
    fn mirror_current(&mut self, edit: impl FnOnce(&mut List)) -> Outcome {
        let Some(profile) = self.mirror.current() else {
            return Skip::NoProfile.into();
        };
        let patch = match self.view.current.as_ref() {
            Some(Selection::Owned(id)) => {
                let mut lists = profile.lists.clone();
                let Some(list) = lists.iter_mut().find(|l| l.id == *id) else {
                    return Skip::NotMirrored(id.clone()).into();
                };
                edit(list);
                ProfilePatch::lists(lists)
            }
            Some(Selection::Shared(id)) => {
                let mut shared = profile.shared_lists.clone();
                let Some(entry) = shared.iter_mut().find(|s| s.list.id == *id) else {
                    return Skip::NotMirrored(id.clone()).into();
                };
                edit(&mut entry.list);
                ProfilePatch::shared_lists(shared)
            }
            Some(Selection::Placeholder(_)) => return Skip::Placeholder.into(),
            None => return Skip::NoCurrentList.into(),
        };
        self.mirror.apply(patch);
        self.bump();
        Outcome::Applied
    }

    fn bump(&mut self) {
        self.revision += 1;
        if let (Some(observer), Some(profile)) = (self.observer.as_mut(), self.mirror.current()) {
            observer.profile_changed(profile);
        }
    }

    /// Millisecond timestamp id, bumped until `taken` says it is free
    fn fresh_id(&self, now: DateTime<Utc>, taken: impl Fn(&Self, &str) -> bool) -> String {
        let mut n = now.timestamp_millis();
        loop {
            let candidate = n.to_string();
            if !taken(self, &candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::list::Collaborator;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
    }

    fn task(id: &str, completed: bool) -> Task {
        let mut t = Task::new(id.into(), format!("Task {}", id), fixed_clock());
        t.completed = completed;
        t
    }

    fn shared(id: &str, name: &str, tasks: Vec<Task>) -> SharedList {
        SharedList {
            list: List {
                id: id.into(),
                name: name.into(),
                tasks,
            },
            shared_with: Collaborator {
                id: "u2".into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                avatar_url: String::new(),
            },
        }
    }

    fn profile() -> Profile {
        let mut p = Profile::new("u1".into(), "Lucia".into(), "lucia@example.com".into());
        p.lists.push(List {
            id: "home".into(),
            name: "Home".into(),
            tasks: vec![task("T0", true), task("T1", false), task("T2", false), task("T3", false)],
        });
        p.lists.push(List {
            id: "work".into(),
            name: "Work".into(),
            tasks: vec![task("W1", false)],
        });
        p.shared_lists.push(shared("trip", "Trip", vec![task("S1", false)]));
        p
    }

    fn engine() -> TaskEngine {
        let mut engine = TaskEngine::new().with_clock(fixed_clock);
        engine.load(profile());
        engine
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn stored(engine: &TaskEngine, list_id: &str) -> Vec<(String, bool)> {
        let profile = engine.profile().unwrap();
        let list = profile
            .lists
            .iter()
            .find(|l| l.id == list_id)
            .or_else(|| profile.shared_lists.iter().map(|s| &s.list).find(|l| l.id == list_id))
            .unwrap();
        list.tasks.iter().map(|t| (t.id.clone(), t.completed)).collect()
    }

    #[derive(Default)]
    struct Recorder {
        changes: usize,
        shared: Vec<String>,
    }

    struct RecordingObserver(Rc<RefCell<Recorder>>);

    impl SessionObserver for RecordingObserver {
        fn profile_changed(&mut self, _profile: &Profile) {
            self.0.borrow_mut().changes += 1;
        }
        fn shared_list_selected(&mut self, list: &SharedList) {
            self.0.borrow_mut().shared.push(list.list.id.clone());
        }
    }

    // --- initialization ---

    #[test]
    fn first_load_selects_first_owned_list() {
        let engine = engine();
        assert_eq!(engine.current_list().unwrap().id(), "home");
        assert_eq!(ids(engine.active()), vec!["T1", "T2", "T3"]);
        assert_eq!(ids(engine.completed()), vec!["T0"]);
    }

    #[test]
    fn first_load_falls_back_to_shared_then_nothing() {
        let mut p = profile();
        p.lists.clear();
        let mut engine = TaskEngine::new();
        engine.load(p);
        assert_eq!(engine.current_list().unwrap().id(), "trip");

        let empty = Profile::new("u1".into(), "Lucia".into(), "l@example.com".into());
        let mut engine = TaskEngine::new();
        engine.load(empty);
        assert!(engine.current_list().is_none());
        assert!(engine.is_initialized());
        assert!(engine.lists().is_empty());
    }

    #[test]
    fn patches_do_not_reinitialize() {
        let mut engine = engine();
        engine.select_list("work");
        engine.add_task("Email boss");
        assert_eq!(engine.current_list().unwrap().id(), "work");
    }

    #[test]
    fn reload_keeps_current_list_and_resets_order() {
        let mut engine = engine();
        engine.select_list("work");
        engine.sort(SortCriterion::Alphabetical);
        let profile = engine.profile().unwrap().clone();
        engine.load(profile);
        assert_eq!(engine.current_list().unwrap().id(), "work");
        assert!(engine.view().sorted_by().is_none());
    }

    #[test]
    fn reload_without_current_list_uses_initial_precedence() {
        let mut engine = engine();
        engine.select_list("work");
        let mut p = profile();
        p.lists.retain(|l| l.id != "work");
        engine.load(p);
        assert_eq!(engine.current_list().unwrap().id(), "home");
    }

    // --- selection ---

    #[test]
    fn select_shared_list_notifies_observer() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut engine = TaskEngine::new().with_observer(Box::new(RecordingObserver(recorder.clone())));
        engine.load(profile());
        assert_eq!(engine.select_list("work"), Outcome::Applied);
        assert_eq!(engine.select_list("trip"), Outcome::Applied);
        assert_eq!(recorder.borrow().shared, vec!["trip".to_string()]);
        assert!(engine.current_list().unwrap().shared_with().is_some());
    }

    #[test]
    fn select_clears_picks() {
        let mut engine = engine();
        engine.set_selected("T1", true);
        engine.select_list("work");
        assert!(engine.selected().is_empty());
    }

    #[test]
    fn select_unknown_list_is_skipped() {
        let mut engine = engine();
        assert_eq!(
            engine.select_list("nope"),
            Outcome::Skipped(Skip::UnknownList("nope".into()))
        );
        assert_eq!(engine.current_list().unwrap().id(), "home");
    }

    // --- add task ---

    #[test]
    fn add_task_appends_to_view_and_mirror() {
        let mut engine = engine();
        let before = engine.revision();
        assert_eq!(engine.add_task("Buy bread"), Outcome::Applied);
        let added = engine.active().last().unwrap();
        assert_eq!(added.title, "Buy bread");
        assert!(!added.completed);
        assert!(!added.starred);
        assert_eq!(added.added_to_my_day, Some(true));
        assert_eq!(added.created_at, fixed_clock());
        assert_eq!(added.id, fixed_clock().timestamp_millis().to_string());
        assert_eq!(stored(&engine, "home").last().unwrap().0, added.id);
        assert_eq!(engine.revision(), before + 1);
    }

    #[test]
    fn add_task_ids_stay_unique_with_a_frozen_clock() {
        let mut engine = engine();
        engine.add_task("one");
        engine.add_task("two");
        let active = engine.active();
        let n = active.len();
        assert_ne!(active[n - 1].id, active[n - 2].id);
    }

    #[test]
    fn add_task_to_shared_list_mirrors_into_shared_lists() {
        let mut engine = engine();
        engine.select_list("trip");
        engine.add_task("Book hotel");
        assert_eq!(stored(&engine, "trip").len(), 2);
        assert_eq!(stored(&engine, "home").len(), 4);
    }

    #[test]
    fn add_task_skips_blank_title_and_missing_list() {
        let mut engine = engine();
        assert_eq!(engine.add_task("   "), Outcome::Skipped(Skip::BlankTitle));
        assert_eq!(engine.revision(), 0);

        let mut empty = TaskEngine::new();
        empty.load(Profile::new("u".into(), "n".into(), "e".into()));
        assert_eq!(empty.add_task("x"), Outcome::Skipped(Skip::NoCurrentList));
    }

    // --- completion ---

    #[test]
    fn complete_selected_ordering() {
        let mut engine = engine();
        engine.set_selected("T3", true);
        engine.set_selected("T1", true);
        assert_eq!(engine.complete_selected(), Outcome::Applied);

        assert_eq!(ids(engine.active()), vec!["T2"]);
        assert_eq!(ids(engine.completed()), vec!["T1", "T3", "T0"]);
        assert!(engine.completed().iter().all(|t| t.completed));
        assert!(engine.selected().is_empty());
        assert_eq!(
            stored(&engine, "home"),
            vec![
                ("T2".to_string(), false),
                ("T1".to_string(), true),
                ("T3".to_string(), true),
                ("T0".to_string(), true),
            ]
        );
    }

    #[test]
    fn complete_with_nothing_picked_is_skipped() {
        let mut engine = engine();
        assert_eq!(engine.complete_selected(), Outcome::Skipped(Skip::EmptySelection));
        assert_eq!(engine.revision(), 0);
    }

    #[test]
    fn picking_completed_or_unknown_task_is_skipped() {
        let mut engine = engine();
        assert_eq!(
            engine.set_selected("T0", true),
            Outcome::Skipped(Skip::UnknownTask("T0".into()))
        );
        assert_eq!(engine.set_selected("T1", true), Outcome::Applied);
        assert_eq!(engine.set_selected("T1", false), Outcome::Applied);
        assert!(engine.selected().is_empty());
    }

    // --- star ---

    #[test]
    fn toggle_star_updates_view_and_mirror() {
        let mut engine = engine();
        engine.toggle_star("T2");
        assert!(engine.active().iter().find(|t| t.id == "T2").unwrap().starred);
        let profile = engine.profile().unwrap();
        assert!(profile.lists[0].find_task("T2").unwrap().starred);

        engine.toggle_star("T2");
        assert!(!engine.profile().unwrap().lists[0].find_task("T2").unwrap().starred);
    }

    // --- sort ---

    #[test]
    fn sort_touches_active_only() {
        let mut engine = engine();
        engine.toggle_star("T3");
        let revision = engine.revision();
        engine.sort(SortCriterion::Importance);
        assert_eq!(ids(engine.active()), vec!["T3", "T1", "T2"]);
        assert_eq!(ids(engine.completed()), vec!["T0"]);
        // storage order is untouched
        let stored_ids: Vec<String> = stored(&engine, "home").into_iter().map(|(id, _)| id).collect();
        assert_eq!(stored_ids, vec!["T0", "T1", "T2", "T3"]);
        assert_eq!(engine.revision(), revision);
    }

    // --- list lifecycle ---

    #[test]
    fn create_list_becomes_current() {
        let mut engine = engine();
        engine.set_selected("T1", true);
        assert_eq!(engine.create_list("Trabajo"), Outcome::Applied);
        let current = engine.current_list().unwrap();
        assert_eq!(current.name(), "Trabajo");
        assert!(current.tasks().is_empty());
        assert!(engine.active().is_empty());
        assert!(engine.completed().is_empty());
        assert!(engine.selected().is_empty());
        assert_eq!(engine.lists().last().unwrap().name, "Trabajo");
        assert_eq!(engine.lists().len(), 3);
    }

    #[test]
    fn create_list_refuses_blank_name() {
        let mut engine = engine();
        assert_eq!(engine.create_list(""), Outcome::Skipped(Skip::BlankName));
        assert_eq!(engine.lists().len(), 2);
    }

    #[test]
    fn rename_updates_owning_collection() {
        let mut engine = engine();
        engine.select_list("trip");
        assert_eq!(engine.rename_list("Summer trip"), Outcome::Applied);
        assert_eq!(engine.current_list().unwrap().name(), "Summer trip");
        assert_eq!(engine.shared_lists()[0].list.name, "Summer trip");
        assert_eq!(engine.rename_list(" "), Outcome::Skipped(Skip::BlankName));
        assert_eq!(engine.shared_lists()[0].list.name, "Summer trip");
    }

    #[test]
    fn delete_falls_back_to_first_remaining_in_same_collection() {
        let mut engine = engine();
        engine.select_list("work");
        assert_eq!(engine.delete_list(), Outcome::Applied);
        assert_eq!(engine.current_list().unwrap().id(), "home");
        assert_eq!(ids(engine.active()), vec!["T1", "T2", "T3"]);
        assert_eq!(engine.lists().len(), 1);
    }

    #[test]
    fn deleting_last_shared_list_falls_back_to_placeholder() {
        let mut engine = engine();
        engine.select_list("trip");
        engine.delete_list();
        let current = engine.current_list().unwrap();
        assert!(current.is_placeholder());
        assert_eq!(current.id(), "tareas");
        assert_eq!(current.name(), "Tareas");
        // owned lists are not considered
        assert_eq!(engine.lists().len(), 2);
        assert!(engine.shared_lists().is_empty());
    }

    #[test]
    fn placeholder_rejects_mutations() {
        let mut engine = engine();
        engine.select_list("trip");
        engine.delete_list();
        let revision = engine.revision();
        assert_eq!(engine.add_task("x"), Outcome::Skipped(Skip::Placeholder));
        assert_eq!(engine.rename_list("y"), Outcome::Skipped(Skip::Placeholder));
        assert_eq!(engine.delete_list(), Outcome::Skipped(Skip::Placeholder));
        assert_eq!(engine.revision(), revision);
        assert!(!engine.profile().unwrap().has_list_id("tareas"));
    }

    // --- notifications ---

    #[test]
    fn mark_all_read_mirrors_notifications() {
        let mut p = profile();
        p.notifications.push(Notification {
            id: "n1".into(),
            title: "Shared".into(),
            description: "Ana shared Trip".into(),
            created_at: fixed_clock(),
            message: String::new(),
            read: false,
            timestamp: Some(fixed_clock()),
        });
        let mut engine = TaskEngine::new();
        engine.load(p);
        assert_eq!(engine.unread_notifications().len(), 1);
        assert_eq!(engine.mark_all_notifications_read(), Outcome::Applied);
        assert!(engine.unread_notifications().is_empty());
        assert_eq!(engine.read_notifications().len(), 1);
        assert_eq!(
            engine.mark_all_notifications_read(),
            Outcome::Skipped(Skip::NothingUnread)
        );
    }

    // --- session ---

    #[test]
    fn clear_resets_everything() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut engine = TaskEngine::new().with_observer(Box::new(RecordingObserver(recorder.clone())));
        engine.set_session(Some(profile()));
        engine.add_task("x");
        engine.set_selected("T1", true);
        engine.set_session(None);

        assert!(engine.profile().is_none());
        assert!(engine.current_list().is_none());
        assert!(engine.active().is_empty());
        assert!(engine.completed().is_empty());
        assert!(engine.selected().is_empty());
        assert!(engine.lists().is_empty());
        assert!(engine.shared_lists().is_empty());
        assert!(!engine.is_initialized());
        assert_eq!(engine.add_task("late"), Outcome::Skipped(Skip::NoProfile));
        assert_eq!(recorder.borrow().changes, 1);
    }

    #[test]
    fn restore_drops_picks_that_are_no_longer_open() {
        let mut engine = engine();
        engine.set_selected("T1", true);
        engine.set_selected("T2", true);
        let snap = engine.snapshot();

        // T1 was completed elsewhere, T2 is still open
        let mut p = engine.profile().unwrap().clone();
        p.lists[0].find_task_mut("T1").unwrap().completed = true;
        let mut fresh = TaskEngine::new();
        fresh.load(p);
        assert_eq!(fresh.restore(&snap), Outcome::Applied);
        assert_eq!(fresh.selected().iter().collect::<Vec<_>>(), vec!["T2"]);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut engine = engine();
        engine.select_list("trip");
        engine.add_task("Pack");
        engine.sort(SortCriterion::Alphabetical);
        engine.set_selected("S1", true);
        let snap = engine.snapshot();

        let mut fresh = TaskEngine::new();
        fresh.load(engine.profile().unwrap().clone());
        assert_eq!(fresh.restore(&snap), Outcome::Applied);
        assert_eq!(fresh.current_list().unwrap().id(), "trip");
        assert_eq!(ids(fresh.active()), ids(engine.active()));
        assert!(fresh.selected().contains("S1"));
        assert_eq!(fresh.view().sorted_by(), Some(SortCriterion::Alphabetical));
    }
}
