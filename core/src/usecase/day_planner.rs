use std::collections::HashMap;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::input::NewTask;
use crate::model::progress::Progress;
use crate::model::schedule::{ScheduleFailure, ScheduleResult};
use crate::model::task::{Task, TaskPatch};
use crate::model::timer::TaskTimer;
use crate::repository::TaskRepository;
use crate::schedule::ScheduleRequester;
use crate::service::task_service::{Observer, TaskService};
use crate::service::ticker::{TickGuard, Ticker};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSchedule {
    pub result: ScheduleResult,
    pub received_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Started,
    /// A request is already running; nothing new was sent.
    InFlight,
    /// Every task is complete (or there are none).
    NoTasks,
}

struct PendingSchedule {
    rx: oneshot::Receiver<ScheduleResult>,
    join: JoinHandle<()>,
}

impl Drop for PendingSchedule {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// State behind the planner view: the task store, one timer per task, the
/// tick tasks of running timers and the in-flight schedule request.
///
/// Lives on the event loop thread. Tick tasks and the schedule request run
/// on the tokio runtime and report back through channels drained by
/// [`DayPlanner::drain_ticks`] and [`DayPlanner::poll_schedule`].
pub struct DayPlanner<R: TaskRepository> {
    store: TaskService<R>,
    timers: HashMap<Uuid, TaskTimer>,
    ticks: HashMap<Uuid, TickGuard>,
    ticker: Ticker,
    tick_rx: UnboundedReceiver<Uuid>,
    handle: Handle,
    requester: ScheduleRequester,
    pending: Option<PendingSchedule>,
    schedule: Option<GeneratedSchedule>,
}

impl<R: TaskRepository> DayPlanner<R> {
    /// Must be called from within a tokio runtime.
    pub fn new(repo: R, requester: ScheduleRequester) -> Self {
        let (tx, tick_rx) = mpsc::unbounded_channel();
        Self::with_ticker(repo, requester, Ticker::new(tx), tick_rx)
    }

    fn with_ticker(
        repo: R,
        requester: ScheduleRequester,
        ticker: Ticker,
        tick_rx: UnboundedReceiver<Uuid>,
    ) -> Self {
        let store = TaskService::new(repo);
        let timers = store
            .list_tasks()
            .iter()
            .map(|t| (t.id, TaskTimer::new(t.time_spent)))
            .collect();
        Self {
            store,
            timers,
            ticks: HashMap::new(),
            ticker,
            tick_rx,
            handle: Handle::current(),
            requester,
            pending: None,
            schedule: None,
        }
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.store.subscribe(observer);
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.list_tasks()
    }

    pub fn progress(&self) -> Progress {
        self.store.progress()
    }

    /// Live seconds for a task: the running counter if there is one,
    /// otherwise the committed value.
    pub fn elapsed(&self, id: &Uuid) -> u64 {
        match self.timers.get(id) {
            Some(timer) => timer.elapsed(),
            None => self.store.get_task(id).map(|t| t.time_spent).unwrap_or(0),
        }
    }

    pub fn add_task(&mut self, new_task: NewTask) -> Task {
        let task = self
            .store
            .add_task(new_task.name, new_task.estimated_duration, new_task.priority);
        self.timers.insert(task.id, TaskTimer::new(task.time_spent));
        task
    }

    /// Generic partial update. A new `time_spent` resets the live counter
    /// and a change of the running flag starts or cancels the tick.
    pub fn update_task(&mut self, id: &Uuid, patch: &TaskPatch) {
        if self.store.get_task(id).is_none() {
            return;
        }
        if patch.time_spent.is_some() {
            // Ticks from before the overwrite must not land on the new value.
            self.drain_ticks();
        }
        self.store.update_task(id, patch);
        if let (Some(seconds), Some(timer)) = (patch.time_spent, self.timers.get_mut(id)) {
            timer.sync(seconds);
        }
        self.reconcile(id);
    }

    pub fn delete_task(&mut self, id: &Uuid) {
        self.ticks.remove(id);
        self.timers.remove(id);
        self.store.delete_task(id);
    }

    pub fn toggle_complete(&mut self, id: &Uuid) {
        let Some(task) = self.store.get_task(id) else {
            return;
        };
        let complete = !task.is_complete;
        let mut patch = TaskPatch::completion(complete);
        if let Some(seconds) = self.stop_timer(id) {
            patch = patch.with_time_spent(seconds);
        }
        self.store.update_task(id, &patch);
    }

    /// Returns whether the timer is running afterwards. Starting the timer
    /// of a completed task does nothing.
    pub fn toggle_running(&mut self, id: &Uuid) -> bool {
        let Some(task) = self.store.get_task(id) else {
            return false;
        };
        let (running, complete, committed) = (task.is_running, task.is_complete, task.time_spent);

        if running {
            let mut patch = TaskPatch::running(false);
            if let Some(seconds) = self.stop_timer(id) {
                patch = patch.with_time_spent(seconds);
            }
            self.store.update_task(id, &patch);
            return false;
        }

        let timer = self
            .timers
            .entry(*id)
            .or_insert_with(|| TaskTimer::new(committed));
        if !timer.start(complete) {
            return false;
        }
        self.ticks.insert(*id, self.ticker.start(*id));
        self.store.update_task(id, &TaskPatch::running(true));
        tracing::debug!(task_id = %id, from = committed, "timer started");
        true
    }

    /// Changes the estimate by `delta_minutes`, never going below 1.
    pub fn adjust_estimate(&mut self, id: &Uuid, delta_minutes: i64) {
        let Some(task) = self.store.get_task(id) else {
            return;
        };
        let minutes = (task.estimated_duration as i64 + delta_minutes).clamp(1, u32::MAX as i64);
        self.store
            .update_task(id, &TaskPatch::estimated_duration(minutes as u32));
    }

    pub fn reset_time(&mut self, id: &Uuid) {
        self.update_task(id, &TaskPatch::time_spent(0));
    }

    /// Applies the ticks received since the last call. Ticks for stopped
    /// or deleted tasks are dropped.
    pub fn drain_ticks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(id) = self.tick_rx.try_recv() {
            if let Some(timer) = self.timers.get_mut(&id) {
                if timer.is_running() {
                    timer.tick();
                    applied += 1;
                }
            }
        }
        applied
    }

    pub fn running_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn generate_schedule(&mut self) -> GenerateOutcome {
        if self.pending.is_some() {
            return GenerateOutcome::InFlight;
        }
        let items = self.store.pending_schedule_items();
        if items.is_empty() {
            return GenerateOutcome::NoTasks;
        }

        let (tx, rx) = oneshot::channel();
        let requester = self.requester.clone();
        let join = self.handle.spawn(async move {
            let result = requester.request_schedule(&items).await;
            let _ = tx.send(result);
        });
        self.pending = Some(PendingSchedule { rx, join });
        GenerateOutcome::Started
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Picks up a finished request. Returns `true` when a new result is
    /// available.
    pub fn poll_schedule(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => {
                tracing::error!("schedule request ended without a result");
                ScheduleResult::Failed(ScheduleFailure::Network)
            }
        };
        self.pending = None;
        self.schedule = Some(GeneratedSchedule {
            result,
            received_at: Local::now(),
        });
        true
    }

    pub fn schedule(&self) -> Option<&GeneratedSchedule> {
        self.schedule.as_ref()
    }

    /// Cancels every tick and the in-flight request. Live counters are
    /// committed first so no elapsed time is lost.
    pub fn shutdown(&mut self) {
        let running: Vec<Uuid> = self.ticks.keys().copied().collect();
        for id in running {
            let mut patch = TaskPatch::running(false);
            if let Some(seconds) = self.stop_timer(&id) {
                patch = patch.with_time_spent(seconds);
            }
            self.store.update_task(&id, &patch);
        }
        self.pending = None;
    }

    fn stop_timer(&mut self, id: &Uuid) -> Option<u64> {
        // Ticks already queued count towards the commit.
        self.drain_ticks();
        self.ticks.remove(id);
        let committed = self.timers.get_mut(id).and_then(|t| t.stop());
        if let Some(seconds) = committed {
            tracing::debug!(task_id = %id, seconds, "timer committed");
        }
        committed
    }

    fn reconcile(&mut self, id: &Uuid) {
        let Some(task) = self.store.get_task(id) else {
            return;
        };
        let (running, committed) = (task.is_running, task.time_spent);
        let has_tick = self.ticks.contains_key(id);

        if running && !has_tick {
            let timer = self
                .timers
                .entry(*id)
                .or_insert_with(|| TaskTimer::new(committed));
            timer.start(false);
            self.ticks.insert(*id, self.ticker.start(*id));
        } else if !running && has_tick {
            if let Some(seconds) = self.stop_timer(id) {
                self.store.update_task(id, &TaskPatch::time_spent(seconds));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schedule::ERROR_MESSAGE;
    use crate::model::task::Priority;
    use crate::repository::MemoryTaskRepository;
    use crate::schedule::{GenerationError, ScheduleGenerator};
    use async_trait::async_trait;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ScheduleGenerator for CountingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            if self.fail {
                return Err(GenerationError::Timeout("slow".to_string()));
            }
            let lines = prompt.lines().filter(|l| l.starts_with("- Name")).count();
            Ok(format!("{lines} tasks scheduled"))
        }
    }

    fn planner_with(fail: bool) -> (DayPlanner<MemoryTaskRepository>, Arc<CountingGenerator>) {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail,
        });
        let requester = ScheduleRequester::new(generator.clone());
        (DayPlanner::new(MemoryTaskRepository::new(), requester), generator)
    }

    fn new_task(name: &str) -> NewTask {
        NewTask {
            name: name.to_string(),
            estimated_duration: 30,
            priority: Priority::Medium,
        }
    }

    async fn wait_for_schedule(planner: &mut DayPlanner<MemoryTaskRepository>) {
        for _ in 0..100 {
            if planner.poll_schedule() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("schedule never arrived");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_commits_and_restart_resumes() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));

        assert!(planner.toggle_running(&task.id));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(planner.drain_ticks(), 3);
        assert_eq!(planner.elapsed(&task.id), 3);
        // Not committed until stopped.
        assert_eq!(planner.tasks()[0].time_spent, 0);

        assert!(!planner.toggle_running(&task.id));
        assert_eq!(planner.tasks()[0].time_spent, 3);
        assert!(!planner.tasks()[0].is_running);
        assert_eq!(planner.running_count(), 0);

        assert!(planner.toggle_running(&task.id));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        planner.drain_ticks();
        planner.toggle_running(&task.id);
        assert_eq!(planner.tasks()[0].time_spent, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_stops_running_timer() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));

        planner.toggle_running(&task.id);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        planner.drain_ticks();
        planner.toggle_complete(&task.id);

        let stored = &planner.tasks()[0];
        assert!(stored.is_complete);
        assert!(!stored.is_running);
        assert_eq!(stored.time_spent, 2);
        assert_eq!(planner.running_count(), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(planner.drain_ticks(), 0);
        assert_eq!(planner.elapsed(&task.id), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_on_completed_task_is_noop() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));
        planner.toggle_complete(&task.id);

        assert!(!planner.toggle_running(&task.id));
        assert!(!planner.tasks()[0].is_running);
        assert_eq!(planner.running_count(), 0);

        planner.update_task(&task.id, &TaskPatch::running(true));
        assert!(!planner.tasks()[0].is_running);
        assert_eq!(planner.running_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_cancels_tick() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));
        planner.toggle_running(&task.id);
        planner.delete_task(&task.id);

        assert!(planner.tasks().is_empty());
        assert_eq!(planner.running_count(), 0);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(planner.drain_ticks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_counts_queued_ticks() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));

        planner.toggle_running(&task.id);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        planner.toggle_running(&task.id);
        assert_eq!(planner.tasks()[0].time_spent, 2);
        assert!(!planner.tasks()[0].is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_counts_queued_ticks() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));

        planner.toggle_running(&task.id);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        planner.toggle_complete(&task.id);
        assert_eq!(planner.tasks()[0].time_spent, 1);
        assert!(planner.tasks()[0].is_complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_queued_ticks() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));

        planner.toggle_running(&task.id);
        tokio::time::sleep(Duration::from_millis(3500)).await;
        planner.reset_time(&task.id);
        assert_eq!(planner.drain_ticks(), 0);
        assert_eq!(planner.elapsed(&task.id), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_reconciles_live_counter() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));
        planner.toggle_running(&task.id);
        tokio::time::sleep(Duration::from_millis(4500)).await;
        planner.drain_ticks();

        planner.reset_time(&task.id);
        assert_eq!(planner.elapsed(&task.id), 0);
        assert!(planner.tasks()[0].is_running);

        tokio::time::sleep(Duration::from_secs(1)).await;
        planner.drain_ticks();
        planner.toggle_running(&task.id);
        assert_eq!(planner.tasks()[0].time_spent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_adjust_estimate_floors_at_one() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));
        planner.adjust_estimate(&task.id, 5);
        assert_eq!(planner.tasks()[0].estimated_duration, 35);
        planner.adjust_estimate(&task.id, -100);
        assert_eq!(planner.tasks()[0].estimated_duration, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_notified_on_timer_changes() {
        let (mut planner, _) = planner_with(false);
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        planner.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));

        let task = planner.add_task(new_task("Write report"));
        planner.toggle_running(&task.id);
        planner.toggle_running(&task.id);
        assert_eq!(count.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_uses_only_pending_tasks() {
        let (mut planner, generator) = planner_with(false);
        let done = planner.add_task(new_task("Finished thing"));
        planner.add_task(new_task("Write report"));
        planner.add_task(new_task("Email team"));
        planner.toggle_complete(&done.id);

        assert_eq!(planner.generate_schedule(), GenerateOutcome::Started);
        assert!(planner.is_generating());
        assert_eq!(planner.generate_schedule(), GenerateOutcome::InFlight);

        // Mutations after the snapshot do not leak into the request.
        planner.add_task(new_task("Late addition"));

        wait_for_schedule(&mut planner).await;
        assert!(!planner.is_generating());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        let schedule = planner.schedule().unwrap();
        assert_eq!(schedule.result.message(), "2 tasks scheduled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_without_pending_tasks() {
        let (mut planner, generator) = planner_with(false);
        let done = planner.add_task(new_task("Finished thing"));
        planner.toggle_complete(&done.id);

        assert_eq!(planner.generate_schedule(), GenerateOutcome::NoTasks);
        assert!(!planner.is_generating());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_generation_shows_fallback() {
        let (mut planner, _) = planner_with(true);
        planner.add_task(new_task("Write report"));
        planner.generate_schedule();
        wait_for_schedule(&mut planner).await;

        let schedule = planner.schedule().unwrap();
        assert_eq!(schedule.result.message(), ERROR_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_commits_and_cancels() {
        let (mut planner, _) = planner_with(false);
        let task = planner.add_task(new_task("Write report"));
        planner.toggle_running(&task.id);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        planner.drain_ticks();

        planner.shutdown();
        assert_eq!(planner.running_count(), 0);
        assert!(!planner.tasks()[0].is_running);
        assert_eq!(planner.tasks()[0].time_spent, 2);
    }
}
