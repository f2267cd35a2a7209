pub mod task_service;
pub mod ticker;
