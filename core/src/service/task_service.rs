use uuid::Uuid;

use crate::model::progress::Progress;
use crate::model::schedule::ScheduleItem;
use crate::model::task::{Priority, Task, TaskPatch};
use crate::repository::TaskRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Added(Uuid),
    Updated(Uuid),
    Deleted(Uuid),
}

pub type Observer = Box<dyn FnMut(&StoreEvent)>;

/// The session's task list. Every mutation that changes something is
/// reported to the subscribed observers; operations on unknown ids are
/// silent no-ops.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    observers: Vec<Observer>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Input is expected to be validated by the caller.
    pub fn add_task(&mut self, name: String, estimated_duration: u32, priority: Priority) -> Task {
        let task = Task::new(name, estimated_duration, priority);
        tracing::debug!(task_id = %task.id, name = %task.name, "task added");
        self.repo.insert_front(task.clone());
        self.notify(StoreEvent::Added(task.id));
        task
    }

    pub fn update_task(&mut self, id: &Uuid, patch: &TaskPatch) {
        let Some(task) = self.repo.get_mut(id) else {
            tracing::debug!(task_id = %id, "update ignored, unknown task");
            return;
        };
        task.apply(patch);
        self.notify(StoreEvent::Updated(*id));
    }

    pub fn delete_task(&mut self, id: &Uuid) {
        if self.repo.remove(id).is_some() {
            tracing::debug!(task_id = %id, "task deleted");
            self.notify(StoreEvent::Deleted(*id));
        }
    }

    pub fn list_tasks(&self) -> &[Task] {
        self.repo.list()
    }

    pub fn get_task(&self, id: &Uuid) -> Option<&Task> {
        self.repo.get(id)
    }

    pub fn progress(&self) -> Progress {
        Progress::from_tasks(self.repo.list())
    }

    /// Value copy of the tasks still to be done, in list order.
    pub fn pending_schedule_items(&self) -> Vec<ScheduleItem> {
        self.repo
            .list()
            .iter()
            .filter(|t| !t.is_complete)
            .map(ScheduleItem::from)
            .collect()
    }

    fn notify(&mut self, event: StoreEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryTaskRepository;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn service() -> TaskService<MemoryTaskRepository> {
        TaskService::new(MemoryTaskRepository::new())
    }

    #[test]
    fn test_add_places_newest_first() {
        let mut store = service();
        let a = store.add_task("Write report".to_string(), 60, Priority::High);
        let b = store.add_task("Email team".to_string(), 15, Priority::Low);

        let ids: Vec<_> = store.list_tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert!(!b.is_complete);
        assert!(!b.is_running);
        assert_eq!(b.time_spent, 0);
    }

    #[test]
    fn test_add_update_delete_sequence() {
        let mut store = service();
        let a = store.add_task("a task".to_string(), 10, Priority::Low);
        let b = store.add_task("b task".to_string(), 20, Priority::Medium);
        let c = store.add_task("c task".to_string(), 30, Priority::High);

        store.update_task(&a.id, &TaskPatch::estimated_duration(25));
        store.update_task(&c.id, &TaskPatch::completion(true));
        store.delete_task(&b.id);
        store.update_task(&a.id, &TaskPatch::time_spent(42));

        let tasks = store.list_tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, c.id);
        assert!(tasks[0].is_complete);
        assert_eq!(tasks[1].id, a.id);
        assert_eq!(tasks[1].estimated_duration, 25);
        assert_eq!(tasks[1].time_spent, 42);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut store = service();
        store.add_task("keep me".to_string(), 10, Priority::Low);
        let before = store.list_tasks().to_vec();

        let unknown = Uuid::new_v4();
        store.update_task(&unknown, &TaskPatch::completion(true));
        store.delete_task(&unknown);

        assert_eq!(store.list_tasks(), before.as_slice());
    }

    #[test]
    fn test_observers_see_mutations_only() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = service();
        let sink = events.clone();
        store.subscribe(Box::new(move |e| sink.borrow_mut().push(*e)));

        let task = store.add_task("observe".to_string(), 10, Priority::Low);
        store.update_task(&task.id, &TaskPatch::running(true));
        store.update_task(&Uuid::new_v4(), &TaskPatch::running(true));
        let _ = store.list_tasks();
        store.delete_task(&task.id);
        store.delete_task(&task.id);

        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::Added(task.id),
                StoreEvent::Updated(task.id),
                StoreEvent::Deleted(task.id),
            ]
        );
    }

    #[test]
    fn test_pending_schedule_items_skip_completed() {
        let mut store = service();
        let done = store.add_task("done".to_string(), 10, Priority::Low);
        store.add_task("Write report".to_string(), 60, Priority::High);
        store.update_task(&done.id, &TaskPatch::completion(true));

        let items = store.pending_schedule_items();
        assert_eq!(items, vec![ScheduleItem::new("Write report", Priority::High, 60)]);
    }
}
