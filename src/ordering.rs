//! Display order for task lists. Pure functions over a snapshot.

use std::cmp::Ordering;

use crate::models::Task;

/// Open before completed, important first, dated by due date before undated,
/// then newest first.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.important.cmp(&a.important))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Stable: tasks equal on every key keep their input order.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(compare_tasks);
    sorted
}

pub fn sorted_refs(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| compare_tasks(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn make_task(
        id: &str,
        completed: bool,
        important: bool,
        due_date: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task-{id}"),
            description: String::new(),
            category: "work".to_string(),
            due_date,
            completed,
            important,
            created_at,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn mixed_list_orders_open_important_dated_then_completed() {
        let tasks = vec![
            make_task("C", true, true, Some(day(1)), day(1)),
            make_task("D", false, false, None, day(2)),
            make_task("B", false, false, Some(day(1)), day(1)),
            make_task("A", false, true, Some(day(5)), day(1)),
        ];
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn completed_sorts_last_regardless_of_importance() {
        let tasks = vec![
            make_task("done", true, true, Some(day(1)), day(9)),
            make_task("open", false, false, None, day(1)),
        ];
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["open", "done"]);
    }

    #[test]
    fn earlier_due_date_wins_among_equals() {
        let tasks = vec![
            make_task("late", false, false, Some(day(9)), day(1)),
            make_task("early", false, false, Some(day(3)), day(1)),
        ];
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["early", "late"]);
    }

    #[test]
    fn newest_first_when_everything_else_ties() {
        let tasks = vec![
            make_task("old", false, false, None, day(1)),
            make_task("new", false, false, None, day(8)),
            make_task("mid", false, false, None, day(4)),
        ];
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["new", "mid", "old"]);

        // Same due date falls through to creation time.
        let tasks = vec![
            make_task("old", false, false, Some(day(3)), day(1)),
            make_task("new", false, false, Some(day(3)), day(2)),
        ];
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["new", "old"]);
    }

    #[test]
    fn fully_equal_tasks_keep_input_order() {
        let tasks: Vec<Task> = ["x", "y", "z"]
            .iter()
            .map(|id| make_task(id, false, true, Some(day(2)), day(1)))
            .collect();
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["x", "y", "z"]);

        let refs: Vec<&str> = sorted_refs(&tasks).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(refs, vec!["x", "y", "z"]);
    }

    #[test]
    fn sort_does_not_touch_input() {
        let tasks = vec![
            make_task("b", true, false, None, day(1)),
            make_task("a", false, false, None, day(1)),
        ];
        let _ = sort_tasks(&tasks);
        assert_eq!(ids(&tasks), vec!["b", "a"]);
    }
}
