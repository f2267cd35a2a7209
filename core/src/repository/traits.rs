use uuid::Uuid;

use crate::model::task::Task;

/// Storage for the session's tasks. Lookups by an unknown id report
/// `false`/`None` instead of failing.
pub trait TaskRepository {
    /// Inserts at the head of the collection.
    fn insert_front(&mut self, task: Task);
    fn get(&self, id: &Uuid) -> Option<&Task>;
    fn get_mut(&mut self, id: &Uuid) -> Option<&mut Task>;
    fn remove(&mut self, id: &Uuid) -> Option<Task>;
    fn list(&self) -> &[Task];
}
