pub mod auth;
pub mod input;
pub mod model;
pub mod repository;
pub mod schedule;
pub mod service;
pub mod time;
pub mod usecase;

pub use model::task::{Priority, Task, TaskPatch};
pub use model::schedule::{ScheduleFailure, ScheduleItem, ScheduleResult};
pub use model::progress::Progress;
pub use repository::{MemoryTaskRepository, TaskRepository};
pub use input::{parse_args, expand_key, parse_new_task, parse_task_patch, NewTask};
pub use time::{format_elapsed, parse_minutes};
pub use service::task_service::{StoreEvent, TaskService};
pub use schedule::{ScheduleGenerator, ScheduleRequester};
pub use usecase::day_planner::{DayPlanner, GenerateOutcome};
