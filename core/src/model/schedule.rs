use serde::{Deserialize, Serialize};

use crate::model::task::{Priority, Task};

pub const NO_TASKS_MESSAGE: &str = "Please add some tasks to generate a schedule.";
pub const ERROR_MESSAGE: &str =
    "Sorry, an error occurred while generating your schedule. Please try again.";

/// One entry of a schedule request: a value copy of the task fields the
/// generator needs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduleItem {
    pub name: String,
    pub priority: Priority,
    /// Minutes.
    pub duration: u32,
}

impl ScheduleItem {
    pub fn new(name: impl Into<String>, priority: Priority, duration: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            duration,
        }
    }
}

impl From<&Task> for ScheduleItem {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            priority: task.priority,
            duration: task.estimated_duration,
        }
    }
}

/// Why a generation attempt failed. Only used for logging and tests; the
/// user always sees [`ERROR_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleFailure {
    NotConfigured,
    Timeout,
    Network,
    Service { status: u16 },
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleResult {
    Generated(String),
    NoTasks,
    Failed(ScheduleFailure),
}

impl ScheduleResult {
    /// The single string shown to the user.
    pub fn message(&self) -> &str {
        match self {
            ScheduleResult::Generated(text) => text,
            ScheduleResult::NoTasks => NO_TASKS_MESSAGE,
            ScheduleResult::Failed(_) => ERROR_MESSAGE,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, ScheduleResult::Generated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ScheduleResult::NoTasks.message(), NO_TASKS_MESSAGE);
        assert_eq!(
            ScheduleResult::Failed(ScheduleFailure::Timeout).message(),
            ERROR_MESSAGE
        );
        let generated = ScheduleResult::Generated("09:00 Write report".to_string());
        assert_eq!(generated.message(), "09:00 Write report");
        assert!(generated.is_generated());
    }

    #[test]
    fn test_item_from_task() {
        let task = Task::new("Write report".to_string(), 60, Priority::High);
        let item = ScheduleItem::from(&task);
        assert_eq!(item, ScheduleItem::new("Write report", Priority::High, 60));
    }
}
