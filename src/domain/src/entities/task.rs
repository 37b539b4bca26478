use chrono::Weekday;
use serde::{Deserialize, Serialize};
use shared::types::TaskId;
use std::cmp::Ordering;

/// A single routine entry as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `HH:MM`, 24-hour clock. Only used for display and ordering.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            time: None,
            completed: false,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Time to show, if any. Empty strings count as absent.
    pub fn display_time(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.is_empty())
    }

    pub fn display_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Format check only: two-digit hour 00-23, colon, two-digit minute 00-59.
    pub fn has_valid_time(&self) -> bool {
        self.display_time().map(is_hh_mm).unwrap_or(false)
    }
}

fn is_hh_mm(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hour = (digits[0] - b'0') * 10 + (digits[1] - b'0');
    let minute = (digits[2] - b'0') * 10 + (digits[3] - b'0');
    hour < 24 && minute < 60
}

/// Which of the two disjoint collections a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Weekdays,
    Weekends,
}

impl RoutineKind {
    pub fn for_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => RoutineKind::Weekends,
            _ => RoutineKind::Weekdays,
        }
    }
}

/// The persisted `{weekdays, weekends}` structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub weekdays: Vec<Task>,
    #[serde(default)]
    pub weekends: Vec<Task>,
}

impl Routine {
    pub fn collection(&self, kind: RoutineKind) -> &[Task] {
        match kind {
            RoutineKind::Weekdays => &self.weekdays,
            RoutineKind::Weekends => &self.weekends,
        }
    }

    fn collection_mut(&mut self, kind: RoutineKind) -> &mut Vec<Task> {
        match kind {
            RoutineKind::Weekdays => &mut self.weekdays,
            RoutineKind::Weekends => &mut self.weekends,
        }
    }

    pub fn len(&self) -> usize {
        self.weekdays.len() + self.weekends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tasks with a time first, ascending; untimed tasks keep insertion order.
    pub fn sorted(&self, kind: RoutineKind) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.collection(kind).iter().collect();
        tasks.sort_by(|a, b| match (a.display_time(), b.display_time()) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        tasks
    }

    /// Append a task, deriving its id from `now_millis` and bumping it until unique.
    pub fn add(&mut self, kind: RoutineKind, mut task: Task, now_millis: u64) -> TaskId {
        let mut id = now_millis;
        while self.find(id).is_some() {
            id += 1;
        }
        task.id = id;
        self.collection_mut(kind).push(task);
        id
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.weekdays
            .iter()
            .chain(self.weekends.iter())
            .find(|t| t.id == id)
    }

    /// Flip completion; returns the new state, or `None` when no task has that id.
    pub fn toggle(&mut self, id: TaskId) -> Option<bool> {
        let task = self
            .weekdays
            .iter_mut()
            .chain(self.weekends.iter_mut())
            .find(|t| t.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    /// Flattened view handed to the chat relay, weekday tasks first.
    pub fn flatten(&self) -> Vec<TaskSnapshot> {
        let weekdays = self
            .weekdays
            .iter()
            .map(|t| TaskSnapshot::from_task(t, false));
        let weekends = self
            .weekends
            .iter()
            .map(|t| TaskSnapshot::from_task(t, true));
        weekdays.chain(weekends).collect()
    }
}

/// Wire shape of a task inside a relay request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    #[serde(rename = "text", alias = "title", default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_weekend: bool,
}

impl TaskSnapshot {
    pub fn from_task(task: &Task, is_weekend: bool) -> Self {
        Self {
            title: task.title.clone(),
            time: task.time.clone(),
            completed: task.completed,
            description: task.description.clone(),
            is_weekend,
        }
    }

    pub fn display_time(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.is_empty())
    }

    pub fn display_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_routine() -> Routine {
        let mut routine = Routine::default();
        routine.add(RoutineKind::Weekdays, Task::new(0, "Leitura"), 10);
        routine.add(
            RoutineKind::Weekdays,
            Task::new(0, "Exercício").with_time("07:00"),
            10,
        );
        routine.add(
            RoutineKind::Weekends,
            Task::new(0, "Feira").with_time("09:30"),
            10,
        );
        routine
    }

    #[test]
    fn test_time_format() {
        assert!(Task::new(1, "a").with_time("07:00").has_valid_time());
        assert!(Task::new(1, "a").with_time("23:59").has_valid_time());
        assert!(!Task::new(1, "a").with_time("24:00").has_valid_time());
        assert!(!Task::new(1, "a").with_time("7:00").has_valid_time());
        assert!(!Task::new(1, "a").with_time("").has_valid_time());
        assert!(!Task::new(1, "a").has_valid_time());
    }

    #[test]
    fn test_ids_are_unique() {
        let routine = sample_routine();
        let titles: Vec<_> = routine.flatten().iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, vec!["Leitura", "Exercício", "Feira"]);
        assert_eq!(routine.weekdays[0].id, 10);
        assert_eq!(routine.weekdays[1].id, 11);
        assert_eq!(routine.weekends[0].id, 12);
    }

    #[test]
    fn test_sorted_puts_timed_tasks_first() {
        let routine = sample_routine();
        let titles: Vec<_> = routine
            .sorted(RoutineKind::Weekdays)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Exercício", "Leitura"]);
    }

    #[test]
    fn test_toggle_and_weekend_flag() {
        let mut routine = sample_routine();
        assert_eq!(routine.toggle(12), Some(true));
        assert_eq!(routine.toggle(999), None);

        let flat = routine.flatten();
        assert!(!flat[0].is_weekend);
        assert!(flat[2].is_weekend);
        assert!(flat[2].completed);
    }

    #[test]
    fn test_snapshot_wire_names() {
        let snapshot = TaskSnapshot::from_task(&Task::new(1, "Exercício").with_time("07:00"), true);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["text"], "Exercício");
        assert_eq!(json["isWeekend"], true);

        let parsed: TaskSnapshot =
            serde_json::from_str(r#"{"title":"Feira","completed":true,"time":null}"#).unwrap();
        assert_eq!(parsed.title, "Feira");
        assert!(parsed.completed);
        assert!(parsed.display_time().is_none());
    }

    #[test]
    fn test_routine_reads_stored_shape() {
        let stored = r#"{"weekdays":[{"id":1700000000000,"title":"Exercício","description":"","time":"07:00","completed":false}],"weekends":[]}"#;
        let routine: Routine = serde_json::from_str(stored).unwrap();
        assert_eq!(routine.len(), 1);
        assert!(routine.weekdays[0].display_description().is_none());
    }
}
