use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// Titles of the columns a freshly reset board starts with.
pub const DEFAULT_COLUMN_TITLES: &[&str] = &["To Do", "In Progress", "Done"];

/// Completion sentinel: a task whose `progress` equals this is done.
pub const PROGRESS_DONE: &str = "100";
pub const PROGRESS_OPEN: &str = "0";

/// Lookup id of the "medium" priority level.
pub const DEFAULT_PRIORITY_LEVEL: u64 = 116;
/// Lookup id of the "0%" task progress entry.
pub const DEFAULT_TASK_PROGRESS: u64 = 91;

/// Pseudo field name used by an edit session targeting a column title.
pub const COLUMN_TITLE_FIELD: &str = "columnTitle";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoardError {
    #[error("Invalid value for field {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("Unknown move direction: {0}")]
    InvalidDirection(String),
}

/// Anything ranked among its siblings by a dense zero-based position.
pub trait Positioned {
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

/// Position for an item appended after `items`: one past the highest
/// existing position, or 0 for an empty list.
pub fn next_position<T: Positioned>(items: &[T]) -> usize {
    items
        .iter()
        .map(Positioned::position)
        .max()
        .map_or(0, |max| max + 1)
}

/// Rewrite positions to `0..N-1` in slice order.
pub fn renumber<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index);
    }
}

/// A work item. Well-known attributes are typed; anything a template or
/// caller adds beyond them lives in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub position: usize,
    /// Completion attribute, `"0"` or `"100"`. Numbers are accepted on input
    /// and kept as their decimal text.
    #[serde(
        default,
        deserialize_with = "deserialize_progress",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_progress: Option<u64>,
    /// `true` = scheduled with planning data, `false` = ongoing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_schedule_type: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_time_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.progress.as_deref() == Some(PROGRESS_DONE)
    }

    /// Flip between the open and done sentinels. Anything that isn't
    /// done (including no progress at all) becomes done.
    pub fn toggle_completion(&mut self) {
        let next = if self.is_completed() {
            PROGRESS_OPEN
        } else {
            PROGRESS_DONE
        };
        self.progress = Some(next.to_string());
    }

    /// Read an attribute by its camelCase name.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "position" => Some(Value::from(self.position)),
            "progress" => self.progress.clone().map(Value::String),
            "priorityLevel" => self.priority_level.map(Value::from),
            "taskProgress" => self.task_progress.map(Value::from),
            "taskScheduleType" => self.task_schedule_type.map(Value::Bool),
            "planningTimeData" => self.planning_time_data.clone().map(Value::Object),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// Write an attribute by its camelCase name. Typed attributes reject
    /// values of the wrong shape and leave the task untouched.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), BoardError> {
        match name {
            "position" => self.position = typed(name, value)?,
            "progress" => {
                let parsed: Option<ProgressValue> = typed(name, value)?;
                self.progress = parsed.map(ProgressValue::into_text);
            }
            "priorityLevel" => self.priority_level = typed(name, value)?,
            "taskProgress" => self.task_progress = typed(name, value)?,
            "taskScheduleType" => self.task_schedule_type = typed(name, value)?,
            "planningTimeData" => self.planning_time_data = typed(name, value)?,
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProgressValue {
    Text(String),
    Number(Number),
}

impl ProgressValue {
    fn into_text(self) -> String {
        match self {
            ProgressValue::Text(text) => text,
            ProgressValue::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_progress<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ProgressValue>::deserialize(deserializer)?.map(ProgressValue::into_text))
}

fn typed<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, BoardError> {
    serde_json::from_value(value).map_err(|e| BoardError::InvalidFieldValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

impl Positioned for Task {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// A named, ordered container of tasks (a "bucket").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn new(title: impl Into<String>, position: usize) -> Self {
        Self {
            title: title.into(),
            position,
            ..Self::default()
        }
    }
}

impl Positioned for Column {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// Input for `BoardStore::add_column`. The position is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewColumn {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl NewColumn {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditTarget {
    ColumnTitle,
    TaskField {
        #[serde(rename = "taskIndex")]
        task_index: usize,
        field: String,
    },
}

/// An in-progress single-field edit, committed or cancelled explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub column_index: usize,
    pub target: EditTarget,
    pub value: Value,
}

impl EditSession {
    /// `None` for a column-title edit.
    pub fn task_index(&self) -> Option<usize> {
        match &self.target {
            EditTarget::ColumnTitle => None,
            EditTarget::TaskField { task_index, .. } => Some(*task_index),
        }
    }

    pub fn field(&self) -> &str {
        match &self.target {
            EditTarget::ColumnTitle => COLUMN_TITLE_FIELD,
            EditTarget::TaskField { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Left,
    Right,
}

impl FromStr for MoveDirection {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(BoardError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// The root aggregate: columns, the active edit session and the
/// "completed" section visibility flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_session: Option<EditSession>,
    #[serde(default = "default_true")]
    pub completed_section_expanded: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Board {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            edit_session: None,
            completed_section_expanded: true,
        }
    }
}

impl Board {
    /// "To Do", "In Progress", "Done" at positions 0, 1, 2.
    pub fn with_default_columns() -> Self {
        Self {
            columns: DEFAULT_COLUMN_TITLES
                .iter()
                .enumerate()
                .map(|(position, title)| Column::new(*title, position))
                .collect(),
            ..Self::default()
        }
    }
}
