pub mod progress;
pub mod schedule;
pub mod task;
pub mod timer;
