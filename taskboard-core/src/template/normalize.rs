/// One-time normalization of fetched template structures.
///
/// Templates arrive with word-separated task keys (`task_schedule_type`).
/// The board works with joined camelCase keys (`taskScheduleType`), typed
/// schedule flags and backfilled lookup ids. Per task, in order:
///   1. keys containing `_`, `-` or a space are camelCased, others copied as-is
///   2. `taskScheduleType`: "ongoing" becomes false; anything else becomes
///      true and, without a `priorityLevel`, also gets an empty `planningTimeData`
///   3. missing `priorityLevel` / `taskProgress` get the configured defaults
/// Tasks are then stably sorted by position within each column, and columns
/// by position.
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::{RawColumn, RawTask, TemplateError};
use crate::config::TemplateDefaults;
use crate::types::{Column, Task};

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_\- ]+").unwrap());

const SCHEDULE_TYPE_KEY: &str = "taskScheduleType";
const PRIORITY_LEVEL_KEY: &str = "priorityLevel";
const TASK_PROGRESS_KEY: &str = "taskProgress";
const PLANNING_TIME_DATA_KEY: &str = "planningTimeData";
const ONGOING: &str = "ongoing";

/// `task_schedule_type` -> `taskScheduleType`. Keys without a separator, and
/// keys made only of separators, are returned unchanged.
pub fn to_camel_case(key: &str) -> String {
    if !SEPARATOR_RE.is_match(key) {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len());
    for (i, word) in SEPARATOR_RE
        .split(key)
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        return key.to_string();
    }
    out
}

fn is_absent(task: &Map<String, Value>, key: &str) -> bool {
    task.get(key).map_or(true, Value::is_null)
}

fn is_ongoing(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s == ONGOING,
        // Already normalized
        Some(Value::Bool(scheduled)) => !scheduled,
        _ => false,
    }
}

fn normalize_task_keys(raw: RawTask, defaults: &TemplateDefaults) -> Map<String, Value> {
    let mut task: Map<String, Value> = raw
        .into_iter()
        .map(|(key, value)| (to_camel_case(&key), value))
        .collect();

    if is_ongoing(task.get(SCHEDULE_TYPE_KEY)) {
        task.insert(SCHEDULE_TYPE_KEY.to_string(), Value::Bool(false));
    } else {
        task.insert(SCHEDULE_TYPE_KEY.to_string(), Value::Bool(true));
        if is_absent(&task, PRIORITY_LEVEL_KEY) {
            task.insert(
                PLANNING_TIME_DATA_KEY.to_string(),
                Value::Object(Map::new()),
            );
        }
    }

    if is_absent(&task, PRIORITY_LEVEL_KEY) {
        task.insert(
            PRIORITY_LEVEL_KEY.to_string(),
            Value::from(defaults.priority_level),
        );
    }
    if is_absent(&task, TASK_PROGRESS_KEY) {
        task.insert(
            TASK_PROGRESS_KEY.to_string(),
            Value::from(defaults.task_progress),
        );
    }
    task
}

fn normalize_column(
    mut raw: RawColumn,
    defaults: &TemplateDefaults,
) -> Result<Column, TemplateError> {
    let raw_tasks: Vec<RawTask> = match raw.remove("tasks") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value)?,
    };

    let mut tasks = raw_tasks
        .into_iter()
        .map(|t| serde_json::from_value::<Task>(Value::Object(normalize_task_keys(t, defaults))))
        .collect::<Result<Vec<_>, _>>()?;
    tasks.sort_by_key(|t| t.position);

    let mut column: Column = serde_json::from_value(Value::Object(raw))?;
    column.tasks = tasks;
    Ok(column)
}

/// Normalize with the built-in default lookup ids.
pub fn normalize(raw: Vec<RawColumn>) -> Result<Vec<Column>, TemplateError> {
    normalize_with(raw, &TemplateDefaults::default())
}

pub fn normalize_with(
    raw: Vec<RawColumn>,
    defaults: &TemplateDefaults,
) -> Result<Vec<Column>, TemplateError> {
    let mut columns = raw
        .into_iter()
        .map(|c| normalize_column(c, defaults))
        .collect::<Result<Vec<_>, _>>()?;
    columns.sort_by_key(|c| c.position);
    Ok(columns)
}
