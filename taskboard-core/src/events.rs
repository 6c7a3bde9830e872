/// Change events published by `BoardStore` after every state-changing operation.
///
/// Renderers subscribe through `BoardStore::subscribe` and re-read the board
/// when an event arrives. Operations that turn out to be no-ops publish nothing.
use serde::{Deserialize, Serialize};

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoardEvent {
    ColumnsReplaced {
        column_count: usize,
    },
    ColumnAdded {
        column_index: usize,
    },
    ColumnDeleted {
        column_index: usize,
    },
    ColumnMoved {
        from: usize,
        to: usize,
    },
    TaskAdded {
        column_index: usize,
        task_index: usize,
    },
    TaskUpdated {
        column_index: usize,
        task_index: usize,
    },
    TaskDeleted {
        column_index: usize,
        task_index: usize,
    },
    TaskCompletionToggled {
        column_index: usize,
        task_index: usize,
        completed: bool,
    },
    EditStarted {
        column_index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        task_index: Option<usize>,
        field: String,
    },
    EditValueChanged,
    /// `applied` is false when the target vanished or rejected the value.
    EditCommitted {
        applied: bool,
    },
    EditCancelled,
    CompletedSectionToggled {
        expanded: bool,
    },
    Reset,
}
