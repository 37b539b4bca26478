//! Task commands over the local store

use anyhow::{bail, Result};
use chrono::{Datelike, Local, Utc};
use colored::Colorize;

use domain::entities::{Routine, RoutineKind, Task};
use domain::services::TaskRepository;
use shared::types::TaskId;

fn kind_label(kind: RoutineKind) -> &'static str {
    match kind {
        RoutineKind::Weekdays => "Dias úteis (segunda a sexta)",
        RoutineKind::Weekends => "Fim de semana (sábado e domingo)",
    }
}

pub fn format_task(task: &Task) -> String {
    let status = if task.completed {
        "[x]".green()
    } else {
        "[ ]".normal()
    };
    let time = task.display_time().unwrap_or("--:--");
    let mut line = format!("{} {} {} {}", status, time.yellow(), task.title, format!("#{}", task.id).dimmed());
    if let Some(description) = task.display_description() {
        line.push_str(&format!("\n        {}", description.dimmed()));
    }
    line
}

pub fn list(store: &dyn TaskRepository) -> Result<()> {
    let routine = store.load()?;
    let today = RoutineKind::for_weekday(Local::now().weekday());

    for kind in [RoutineKind::Weekdays, RoutineKind::Weekends] {
        let title = kind_label(kind);
        if kind == today {
            println!("{} {}", title.bold(), "(hoje)".cyan());
        } else {
            println!("{}", title.bold());
        }

        let tasks = routine.sorted(kind);
        if tasks.is_empty() {
            println!("  {}", "Nenhuma tarefa".dimmed());
        }
        for task in tasks {
            println!("  {}", format_task(task));
        }
        println!();
    }
    Ok(())
}

pub fn add(
    store: &dyn TaskRepository,
    title: &str,
    time: Option<String>,
    description: Option<String>,
    weekend: bool,
) -> Result<TaskId> {
    let title = title.trim();
    if title.is_empty() {
        bail!("Task title must not be empty");
    }

    let mut task = Task::new(0, title);
    if let Some(time) = time {
        task = task.with_time(time);
        if !task.has_valid_time() {
            bail!("Invalid time {:?}, expected HH:MM", task.time.as_deref().unwrap_or(""));
        }
    }
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        task = task.with_description(description);
    }

    let kind = if weekend {
        RoutineKind::Weekends
    } else {
        RoutineKind::Weekdays
    };

    let mut routine = store.load()?;
    let id = routine.add(kind, task, Utc::now().timestamp_millis().max(0) as u64);
    store.save(&routine)?;

    tracing::info!(id, ?kind, "Task added");
    println!("{} {}", "Tarefa adicionada".green(), format!("#{}", id).dimmed());
    Ok(id)
}

pub fn toggle(store: &dyn TaskRepository, id: TaskId) -> Result<bool> {
    let mut routine: Routine = store.load()?;
    let Some(completed) = routine.toggle(id) else {
        bail!("No task with id {}", id);
    };
    store.save(&routine)?;

    if let Some(task) = routine.find(id) {
        println!("{}", format_task(task));
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        routine: Mutex<Routine>,
    }

    impl TaskRepository for MemoryStore {
        fn load(&self) -> Result<Routine, Error> {
            Ok(self.routine.lock().unwrap().clone())
        }

        fn save(&self, routine: &Routine) -> Result<(), Error> {
            *self.routine.lock().unwrap() = routine.clone();
            Ok(())
        }
    }

    #[test]
    fn test_add_then_toggle() {
        let store = MemoryStore::default();
        let id = add(&store, "Exercício", Some("07:00".to_string()), None, false).unwrap();

        let routine = store.load().unwrap();
        assert_eq!(routine.collection(RoutineKind::Weekdays).len(), 1);
        assert_eq!(routine.find(id).unwrap().time.as_deref(), Some("07:00"));

        assert!(toggle(&store, id).unwrap());
        assert!(store.load().unwrap().find(id).unwrap().completed);
        assert!(!toggle(&store, id).unwrap());
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let store = MemoryStore::default();
        assert!(add(&store, "  ", None, None, false).is_err());
        assert!(add(&store, "Feira", Some("25:99".to_string()), None, true).is_err());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_unknown_id() {
        let store = MemoryStore::default();
        assert!(toggle(&store, 42).is_err());
    }
}
