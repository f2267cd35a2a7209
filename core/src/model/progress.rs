use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Completion summary shown next to the task list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.is_complete).count();
        Self {
            completed,
            total: tasks.len(),
        }
    }

    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    /// Rounded completion percentage, 0 for an empty list.
    pub fn percentage(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Priority, TaskPatch};

    #[test]
    fn test_empty_progress() {
        let progress = Progress::from_tasks(&[]);
        assert!(progress.is_empty());
        assert_eq!(progress.percentage(), 0);
    }

    #[test]
    fn test_percentage_rounds() {
        let mut tasks = vec![
            Task::new("a".to_string(), 10, Priority::Low),
            Task::new("b".to_string(), 10, Priority::Low),
            Task::new("c".to_string(), 10, Priority::Low),
        ];
        tasks[0].apply(&TaskPatch::completion(true));
        tasks[1].apply(&TaskPatch::completion(true));

        let progress = Progress::from_tasks(&tasks);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.pending(), 1);
        assert_eq!(progress.percentage(), 67);
    }
}
