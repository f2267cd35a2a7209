use std::sync::Arc;

use crate::model::schedule::{ScheduleItem, ScheduleResult};

use super::generator::ScheduleGenerator;
use super::prompt::build_prompt;

/// Turns a task snapshot into a schedule. Never returns an error: every
/// failure of the generator is logged and mapped to
/// [`ScheduleResult::Failed`].
#[derive(Clone)]
pub struct ScheduleRequester {
    generator: Arc<dyn ScheduleGenerator>,
}

impl ScheduleRequester {
    pub fn new(generator: Arc<dyn ScheduleGenerator>) -> Self {
        Self { generator }
    }

    pub async fn request_schedule(&self, items: &[ScheduleItem]) -> ScheduleResult {
        if items.is_empty() {
            return ScheduleResult::NoTasks;
        }

        let prompt = build_prompt(items);
        tracing::info!(tasks = items.len(), "requesting schedule");

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                tracing::info!(chars = text.len(), "schedule generated");
                ScheduleResult::Generated(text)
            }
            Err(e) => {
                tracing::error!(error = %e, "error generating schedule");
                ScheduleResult::Failed(e.failure())
            }
        }
    }
}
