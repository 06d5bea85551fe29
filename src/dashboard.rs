use crate::models::{List, Task};
use chrono::{Duration, NaiveDate};

/// How far ahead the "upcoming" panel looks.
pub const UPCOMING_DAYS: i64 = 7;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSummary {
    pub due_today: Vec<Task>,
    pub overdue: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub completed: usize,
    pub active: usize,
    /// Whole percent of non-archived tasks that are done.
    pub completion_percent: u16,
    pub list_count: usize,
}

impl DashboardSummary {
    /// Archived tasks are ignored entirely.
    pub fn compute(tasks: &[Task], lists: &[List], today: NaiveDate) -> Self {
        let horizon = today + Duration::days(UPCOMING_DAYS);
        let live: Vec<&Task> = tasks.iter().filter(|t| !t.archived).collect();

        let mut summary = DashboardSummary {
            list_count: lists.len(),
            ..DashboardSummary::default()
        };

        for task in &live {
            if task.completed {
                summary.completed += 1;
            } else {
                summary.active += 1;
            }
            let Some(date) = task.date else { continue };
            if date == today {
                summary.due_today.push((*task).clone());
            } else if date < today && !task.completed {
                summary.overdue.push((*task).clone());
            } else if date > today && date <= horizon && !task.completed {
                summary.upcoming.push((*task).clone());
            }
        }

        let by_schedule = |a: &Task, b: &Task| {
            (a.date, a.time.is_none(), a.time).cmp(&(b.date, b.time.is_none(), b.time))
        };
        summary.due_today.sort_by(by_schedule);
        summary.overdue.sort_by(by_schedule);
        summary.upcoming.sort_by(by_schedule);

        if !live.is_empty() {
            summary.completion_percent = ((summary.completed * 100) / live.len()) as u16;
        }
        summary
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn task(title: &str, offset: Option<i64>, completed: bool, archived: bool) -> Task {
        Task {
            id: title.to_string(),
            owner: "u".to_string(),
            title: title.to_string(),
            description: String::new(),
            completed,
            date: offset.map(|d| today() + Duration::days(d)),
            time: None,
            duration_minutes: None,
            archived,
            created_at: Utc::now(),
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_buckets() {
        let mut timed = task("standup", Some(0), false, false);
        timed.time = NaiveTime::from_hms_opt(9, 0, 0);
        let tasks = vec![
            task("review", Some(0), false, false),
            timed,
            task("late", Some(-2), false, false),
            task("late but done", Some(-2), true, false),
            task("soon", Some(3), false, false),
            task("sooner", Some(1), false, false),
            task("far", Some(30), false, false),
            task("someday", None, true, false),
            task("old", Some(-1), false, true),
        ];
        let summary = DashboardSummary::compute(&tasks, &[], today());

        assert_eq!(titles(&summary.due_today), vec!["standup", "review"]);
        assert_eq!(titles(&summary.overdue), vec!["late"]);
        assert_eq!(titles(&summary.upcoming), vec!["sooner", "soon"]);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.active, 6);
        assert_eq!(summary.completion_percent, 25);
        assert_eq!(summary.list_count, 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::compute(&[], &[], today());
        assert_eq!(summary.completion_percent, 0);
        assert!(summary.due_today.is_empty());
    }

    #[test]
    fn test_greeting_by_hour() {
        assert_eq!(greeting(6), "Good morning");
        assert_eq!(greeting(13), "Good afternoon");
        assert_eq!(greeting(23), "Good evening");
        assert_eq!(greeting(2), "Good evening");
    }
}
