use anyhow::{Context, Result};
use dayplan_core::{parse_new_task, NewTask, ScheduleItem, ScheduleRequester};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Est (min)")]
    estimate: u32,
}

/// Each line uses the add-task syntax: `Write report est:1h pri:high`.
pub fn parse_tasks(lines: &[String]) -> Result<Vec<NewTask>> {
    lines
        .iter()
        .map(|line| parse_new_task(line).with_context(|| format!("invalid task '{}'", line)))
        .collect()
}

pub fn render_table(tasks: &[NewTask]) -> String {
    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|t| TaskRow {
            name: t.name.clone(),
            priority: t.priority.to_string(),
            estimate: t.estimated_duration,
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

pub async fn run(requester: &ScheduleRequester, lines: &[String]) -> Result<()> {
    let tasks = parse_tasks(lines)?;
    println!("{}", render_table(&tasks));

    let items: Vec<ScheduleItem> = tasks
        .iter()
        .map(|t| ScheduleItem::new(t.name.as_str(), t.priority, t.estimated_duration))
        .collect();

    println!("\nGenerating schedule...\n");
    let result = requester.request_schedule(&items).await;
    println!("{}", result.message());
    Ok(())
}
