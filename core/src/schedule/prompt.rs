use std::fmt::Write;

use crate::model::schedule::ScheduleItem;

const PREAMBLE: &str = "\
You are an AI assistant that generates an optimized schedule for the user's day.
The schedule should take into account the priority and duration of each task.
Prioritize high priority tasks and schedule them earlier in the day.
Provide the schedule in a clear and easy-to-read format.
";

pub fn build_prompt(items: &[ScheduleItem]) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str("\nTasks:\n");
    for item in items {
        // Writing into a String cannot fail.
        let _ = writeln!(
            prompt,
            "- Name: {}, Priority: {}, Duration: {} minutes",
            item.name.trim(),
            item.priority.label(),
            item.duration
        );
    }
    prompt
}
