use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Label used in prompts and in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub priority: Priority,
    /// Estimate in minutes.
    pub estimated_duration: u32,
    pub is_complete: bool,
    /// Committed time in seconds. The live value of a running task is held
    /// by its timer until the next stop.
    pub time_spent: u64,
    pub is_running: bool,
}

impl Task {
    pub fn new(name: String, estimated_duration: u32, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            priority,
            estimated_duration,
            is_complete: false,
            time_spent: 0,
            is_running: false,
        }
    }

    /// Merges the fields set in `patch`. A completed task never keeps its
    /// running flag, whatever the patch asked for.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(duration) = patch.estimated_duration {
            self.estimated_duration = duration;
        }
        if let Some(complete) = patch.is_complete {
            self.is_complete = complete;
        }
        if let Some(time_spent) = patch.time_spent {
            self.time_spent = time_spent;
        }
        if let Some(running) = patch.is_running {
            self.is_running = running;
        }

        if self.is_complete {
            self.is_running = false;
        }
    }
}

/// Partial update for a task. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_duration: Option<u32>,
    pub is_complete: Option<bool>,
    pub time_spent: Option<u64>,
    pub is_running: Option<bool>,
}

impl TaskPatch {
    /// Marking complete (or reopening) always stops the timer.
    pub fn completion(complete: bool) -> Self {
        Self {
            is_complete: Some(complete),
            is_running: Some(false),
            ..Default::default()
        }
    }

    pub fn running(running: bool) -> Self {
        Self {
            is_running: Some(running),
            ..Default::default()
        }
    }

    pub fn time_spent(seconds: u64) -> Self {
        Self {
            time_spent: Some(seconds),
            ..Default::default()
        }
    }

    pub fn estimated_duration(minutes: u32) -> Self {
        Self {
            estimated_duration: Some(minutes),
            ..Default::default()
        }
    }

    pub fn with_time_spent(mut self, seconds: u64) -> Self {
        self.time_spent = Some(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Write report".to_string(), 60, Priority::High);
        assert!(!task.is_complete);
        assert!(!task.is_running);
        assert_eq!(task.time_spent, 0);
        assert_eq!(task.estimated_duration, 60);
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut task = Task::new("Write report".to_string(), 60, Priority::High);
        task.apply(&TaskPatch::estimated_duration(45));

        assert_eq!(task.estimated_duration, 45);
        assert_eq!(task.name, "Write report");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_completed_task_cannot_run() {
        let mut task = Task::new("Review".to_string(), 30, Priority::Low);
        task.apply(&TaskPatch::running(true));
        assert!(task.is_running);

        task.apply(&TaskPatch::completion(true));
        assert!(task.is_complete);
        assert!(!task.is_running);

        task.apply(&TaskPatch::running(true));
        assert!(!task.is_running);
    }

    #[test]
    fn test_priority_default_and_label() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Priority::High.label(), "High");
        assert_eq!(Priority::Low.to_string(), "Low");
    }
}
