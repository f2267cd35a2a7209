use uuid::Uuid;

use crate::model::task::Task;
use crate::repository::traits::TaskRepository;

/// Session-only storage; the contents are gone when the process exits.
#[derive(Debug, Default, Clone)]
pub struct MemoryTaskRepository {
    tasks: Vec<Task>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn insert_front(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    fn get(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == *id)
    }

    fn remove(&mut self, id: &Uuid) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == *id)?;
        Some(self.tasks.remove(pos))
    }

    fn list(&self) -> &[Task] {
        &self.tasks
    }
}
