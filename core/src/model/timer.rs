#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
}

/// Per-task stopwatch.
///
/// `elapsed` is the live counter advanced by ticks; `committed` mirrors the
/// task's `time_spent`. The two are reconciled on every state change and
/// whenever the committed value is overwritten from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTimer {
    state: TimerState,
    elapsed: u64,
    committed: u64,
}

impl TaskTimer {
    pub fn new(committed: u64) -> Self {
        Self {
            state: TimerState::Stopped,
            elapsed: committed,
            committed,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Returns `false` when the timer did not move to `Running`: either it
    /// already runs or the task is complete.
    pub fn start(&mut self, task_complete: bool) -> bool {
        if task_complete || self.is_running() {
            return false;
        }
        self.elapsed = self.committed;
        self.state = TimerState::Running;
        true
    }

    pub fn tick(&mut self) {
        if self.is_running() {
            self.elapsed += 1;
        }
    }

    /// Stops the timer and returns the value to commit when it differs from
    /// the committed one.
    pub fn stop(&mut self) -> Option<u64> {
        self.state = TimerState::Stopped;
        if self.elapsed == self.committed {
            return None;
        }
        self.committed = self.elapsed;
        Some(self.committed)
    }

    /// Called after `time_spent` was overwritten (e.g. reset).
    pub fn sync(&mut self, committed: u64) {
        self.committed = committed;
        self.elapsed = committed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_noop_on_completed_task() {
        let mut timer = TaskTimer::new(0);
        assert!(!timer.start(true));
        assert_eq!(timer.state(), TimerState::Stopped);
    }

    #[test]
    fn test_ticks_only_count_while_running() {
        let mut timer = TaskTimer::new(0);
        timer.tick();
        assert_eq!(timer.elapsed(), 0);

        assert!(timer.start(false));
        timer.tick();
        timer.tick();
        assert_eq!(timer.elapsed(), 2);
    }

    #[test]
    fn test_stop_commits_and_restart_resumes() {
        let mut timer = TaskTimer::new(10);
        timer.start(false);
        for _ in 0..5 {
            timer.tick();
        }
        assert_eq!(timer.stop(), Some(15));
        timer.tick();
        assert_eq!(timer.elapsed(), 15);

        timer.start(false);
        timer.tick();
        assert_eq!(timer.stop(), Some(16));
    }

    #[test]
    fn test_stop_without_ticks_commits_nothing() {
        let mut timer = TaskTimer::new(7);
        timer.start(false);
        assert_eq!(timer.stop(), None);
        assert_eq!(timer.elapsed(), 7);
    }

    #[test]
    fn test_sync_overrides_live_counter() {
        let mut timer = TaskTimer::new(30);
        timer.start(false);
        timer.tick();
        timer.sync(0);
        assert_eq!(timer.elapsed(), 0);
        timer.tick();
        assert_eq!(timer.stop(), Some(1));
    }

    #[test]
    fn test_double_start_rejected() {
        let mut timer = TaskTimer::new(0);
        assert!(timer.start(false));
        assert!(!timer.start(false));
    }
}
