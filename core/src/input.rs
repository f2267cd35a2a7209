use std::collections::HashMap;
use anyhow::{anyhow, Result};

use crate::model::task::{Priority, TaskPatch};
use crate::time::parse_minutes;

pub const TASK_KEYS: [&str; 2] = ["estimate", "priority"];
pub const MIN_NAME_LEN: usize = 3;
pub const DEFAULT_ESTIMATE: u32 = 30;

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// A validated task ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub estimated_duration: u32,
    pub priority: Priority,
}

/// Splits `key:value` tokens out of the name. Only keys that expand to one
/// of `known_keys` count as metadata; other tokens such as `10:30` or `Re:`
/// stay in the name. Metadata is stored under the expanded key.
pub fn parse_args(args: &[String], known_keys: &[&str]) -> ParsedInput {
    let mut name_parts = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                if let Ok(full_key) = expand_key(&key.to_lowercase(), known_keys) {
                    metadata.insert(full_key, value.to_string());
                    continue;
                }
            }
        }
        name_parts.push(arg.as_str());
    }

    ParsedInput {
        name: name_parts.join(" "),
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// `h`, `hi`, `High` all resolve to [`Priority::High`].
pub fn parse_priority(input: &str) -> Result<Priority> {
    let lowered = input.trim().to_lowercase();
    if lowered.is_empty() {
        return Err(anyhow!("Empty priority"));
    }
    match expand_key(&lowered, &["high", "medium", "low"])?.as_str() {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        _ => Ok(Priority::Low),
    }
}

fn split_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(|s| s.to_string()).collect()
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(anyhow!("Task name must be at least {} characters.", MIN_NAME_LEN));
    }
    Ok(())
}

fn validate_estimate(value: &str) -> Result<u32> {
    let minutes = parse_minutes(value)?;
    if minutes < 1 {
        return Err(anyhow!("Duration must be at least 1 minute."));
    }
    Ok(minutes)
}

/// Parses `Write report est:1h pri:high`. The estimate defaults to
/// [`DEFAULT_ESTIMATE`] minutes and the priority to medium.
pub fn parse_new_task(line: &str) -> Result<NewTask> {
    let ParsedInput { name, metadata } = parse_args(&split_line(line), &TASK_KEYS);
    validate_name(&name)?;

    let estimated_duration = match metadata.get("estimate") {
        Some(value) => validate_estimate(value)?,
        None => DEFAULT_ESTIMATE,
    };
    let priority = match metadata.get("priority") {
        Some(value) => parse_priority(value)?,
        None => Priority::default(),
    };

    Ok(NewTask {
        name: name.trim().to_string(),
        estimated_duration,
        priority,
    })
}

/// Same syntax as [`parse_new_task`], but every part is optional.
pub fn parse_task_patch(line: &str) -> Result<TaskPatch> {
    let ParsedInput { name, metadata } = parse_args(&split_line(line), &TASK_KEYS);
    let mut patch = TaskPatch::default();

    if !name.is_empty() {
        validate_name(&name)?;
        patch.name = Some(name.trim().to_string());
    }
    if let Some(value) = metadata.get("estimate") {
        patch.estimated_duration = Some(validate_estimate(value)?);
    }
    if let Some(value) = metadata.get("priority") {
        patch.priority = Some(parse_priority(value)?);
    }
    Ok(patch)
}
