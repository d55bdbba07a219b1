use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Ordering policy for the active tasks of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriterion {
    /// Starred tasks first
    Importance,
    /// Earliest due date first; no due date counts as the Unix epoch
    DueDate,
    /// Tasks added to "My Day" first
    MyDay,
    /// By title, Spanish collation
    Alphabetical,
    /// Newest first
    CreationDate,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 5] = [
        SortCriterion::Importance,
        SortCriterion::DueDate,
        SortCriterion::MyDay,
        SortCriterion::Alphabetical,
        SortCriterion::CreationDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortCriterion::Importance => "importance",
            SortCriterion::DueDate => "dueDate",
            SortCriterion::MyDay => "myDay",
            SortCriterion::Alphabetical => "alphabetical",
            SortCriterion::CreationDate => "creationDate",
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort criterion: {0} (expected importance, dueDate, myDay, alphabetical or creationDate)")]
pub struct UnknownCriterion(String);

impl FromStr for SortCriterion {
    type Err = UnknownCriterion;

    /// Accepts the camelCase names plus kebab/snake spellings (`due-date`, `my_day`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "importance" => Ok(SortCriterion::Importance),
            "duedate" => Ok(SortCriterion::DueDate),
            "myday" => Ok(SortCriterion::MyDay),
            "alphabetical" => Ok(SortCriterion::Alphabetical),
            "creationdate" => Ok(SortCriterion::CreationDate),
            _ => Err(UnknownCriterion(s.to_string())),
        }
    }
}

/// Sort tasks in place. Every criterion is stable.
pub fn sort_tasks(tasks: &mut [Task], criterion: SortCriterion) {
    match criterion {
        SortCriterion::Importance => tasks.sort_by_key(|t| Reverse(t.starred)),
        SortCriterion::DueDate => tasks.sort_by_key(|t| t.due_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)),
        SortCriterion::MyDay => tasks.sort_by_key(|t| Reverse(t.in_my_day())),
        SortCriterion::Alphabetical => tasks.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortCriterion::CreationDate => tasks.sort_by_key(|t| Reverse(t.created_at)),
    }
}

thread_local! {
    static TITLE_COLLATOR: Option<Collator> = spanish_collator();
}

fn spanish_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&locale!("es").into(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!("event=collator_init module=sort status=error error={}", e);
            None
        }
    }
}

/// Spanish collation: accents sort with their base letter, `ñ` after `n`,
/// and on a case-only difference lowercase sorts first.
fn compare_titles(a: &str, b: &str) -> Ordering {
    TITLE_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| b.cmp(a)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn task(id: &str, title: &str) -> Task {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut t = Task::new(id.into(), title.into(), created);
        t.added_to_my_day = None;
        t
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn importance_puts_starred_first_and_keeps_ties_stable() {
        let mut tasks = vec![task("a", "A"), task("b", "B"), task("c", "C")];
        tasks[1].starred = true;
        sort_tasks(&mut tasks, SortCriterion::Importance);
        assert_eq!(ids(&tasks), vec!["b", "a", "c"]);
    }

    #[test]
    fn due_date_ascending_with_missing_as_epoch() {
        let mut tasks = vec![task("late", "x"), task("none", "y"), task("soon", "z")];
        tasks[0].due_date = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        tasks[2].due_date = Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        sort_tasks(&mut tasks, SortCriterion::DueDate);
        assert_eq!(ids(&tasks), vec!["none", "soon", "late"]);
    }

    #[test]
    fn my_day_first() {
        let mut tasks = vec![task("a", "A"), task("b", "B"), task("c", "C")];
        tasks[2].added_to_my_day = Some(true);
        tasks[0].added_to_my_day = Some(false);
        sort_tasks(&mut tasks, SortCriterion::MyDay);
        assert_eq!(ids(&tasks), vec!["c", "a", "b"]);
    }

    #[test]
    fn alphabetical_ignores_case() {
        let mut tasks = vec![task("1", "pears"), task("2", "Apples"), task("3", "bananas")];
        sort_tasks(&mut tasks, SortCriterion::Alphabetical);
        assert_eq!(ids(&tasks), vec!["2", "3", "1"]);
    }

    #[test]
    fn alphabetical_breaks_case_ties_lowercase_first() {
        let mut tasks = vec![task("upper", "Milk"), task("lower", "milk")];
        sort_tasks(&mut tasks, SortCriterion::Alphabetical);
        assert_eq!(ids(&tasks), vec!["lower", "upper"]);
    }

    #[test]
    fn alphabetical_sorts_accents_with_base_letter() {
        let mut tasks = vec![task("1", "zapato"), task("2", "árbol"), task("3", "banco")];
        sort_tasks(&mut tasks, SortCriterion::Alphabetical);
        assert_eq!(ids(&tasks), vec!["2", "3", "1"]);
    }

    #[test]
    fn alphabetical_puts_enye_after_n() {
        let mut tasks = vec![task("oso", "oso"), task("enye", "Ñandú"), task("n", "nube")];
        sort_tasks(&mut tasks, SortCriterion::Alphabetical);
        assert_eq!(ids(&tasks), vec!["n", "enye", "oso"]);
    }

    #[test]
    fn creation_date_newest_first() {
        let mut tasks = vec![task("old", "a"), task("new", "b"), task("mid", "c")];
        tasks[1].created_at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        tasks[2].created_at = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        sort_tasks(&mut tasks, SortCriterion::CreationDate);
        assert_eq!(ids(&tasks), vec!["new", "mid", "old"]);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("importance".parse::<SortCriterion>().unwrap(), SortCriterion::Importance);
        assert_eq!("dueDate".parse::<SortCriterion>().unwrap(), SortCriterion::DueDate);
        assert_eq!("due-date".parse::<SortCriterion>().unwrap(), SortCriterion::DueDate);
        assert_eq!("my_day".parse::<SortCriterion>().unwrap(), SortCriterion::MyDay);
        assert_eq!("creationDate".parse::<SortCriterion>().unwrap(), SortCriterion::CreationDate);
        assert!("priority".parse::<SortCriterion>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for criterion in SortCriterion::ALL {
            assert_eq!(criterion.to_string().parse::<SortCriterion>().unwrap(), criterion);
        }
    }
}
