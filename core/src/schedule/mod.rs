//! Schedule generation: prompt building, the text-generation collaborator
//! and the requester that shields callers from its failures.

pub mod chat;
pub mod generator;
pub mod prompt;
pub mod requester;

pub use chat::{ChatCompletionsGenerator, GeneratorConfig};
pub use generator::{GenerationError, ScheduleGenerator};
pub use prompt::build_prompt;
pub use requester::ScheduleRequester;
