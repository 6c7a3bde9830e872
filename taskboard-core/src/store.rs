/// In-memory working copy of a project task board.
///
/// Owns the columns, the single active edit session and the "completed"
/// section flag. Every mutation is synchronous. Operations addressed by an
/// out-of-range column/task index are no-ops that leave a debug log line
/// behind and never surface an error to the caller.
///
/// Position invariant: after add/delete/move of columns (and add/delete of
/// tasks within a column) positions are `0..N-1` in vector order, as long as
/// the collection was consistent before. `replace_all` takes columns verbatim.
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::events::{BoardEvent, EVENT_CHANNEL_CAPACITY};
use crate::storage::{SnapshotStore, StorageError};
use crate::types::{
    next_position, renumber, Board, Column, EditSession, EditTarget, MoveDirection, NewColumn,
    Task,
};

#[derive(Debug)]
pub struct BoardStore {
    board: Board,
    events: broadcast::Sender<BoardEvent>,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    /// An empty board: no columns, "completed" section expanded.
    pub fn new() -> Self {
        Self::from_board(Board::default())
    }

    /// A board holding the three default columns.
    pub fn with_default_columns() -> Self {
        Self::from_board(Board::with_default_columns())
    }

    pub fn from_board(board: Board) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { board, events }
    }

    /// Receive a `BoardEvent` after each state change.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: BoardEvent) {
        // No subscribers is the normal headless case.
        let _ = self.events.send(event);
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn columns(&self) -> &[Column] {
        &self.board.columns
    }

    pub fn column(&self, column_index: usize) -> Option<&Column> {
        self.board.columns.get(column_index)
    }

    pub fn task(&self, column_index: usize, task_index: usize) -> Option<&Task> {
        self.column(column_index)
            .and_then(|c| c.tasks.get(task_index))
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.board.edit_session.as_ref()
    }

    pub fn completed_section_expanded(&self) -> bool {
        self.board.completed_section_expanded
    }

    /// Tasks of a column that are not done, in order.
    pub fn open_tasks(&self, column_index: usize) -> Vec<&Task> {
        self.column(column_index)
            .map(|c| c.tasks.iter().filter(|t| !t.is_completed()).collect())
            .unwrap_or_default()
    }

    /// Tasks of a column shown in its "completed" section, in order.
    pub fn completed_tasks(&self, column_index: usize) -> Vec<&Task> {
        self.column(column_index)
            .map(|c| c.tasks.iter().filter(|t| t.is_completed()).collect())
            .unwrap_or_default()
    }

    fn task_mut(&mut self, column_index: usize, task_index: usize) -> Option<&mut Task> {
        self.board
            .columns
            .get_mut(column_index)
            .and_then(|c| c.tasks.get_mut(task_index))
    }

    // ── Bulk ────────────────────────────────────────────────────────────────

    /// Replace every column as given. Positions are not renumbered.
    pub fn replace_all(&mut self, columns: Vec<Column>) {
        let column_count = columns.len();
        self.board.columns = columns;
        self.emit(BoardEvent::ColumnsReplaced { column_count });
    }

    /// Back to "To Do" / "In Progress" / "Done", no edit session,
    /// "completed" section expanded.
    pub fn reset(&mut self) {
        self.board = Board::with_default_columns();
        self.emit(BoardEvent::Reset);
    }

    // ── Edit session ────────────────────────────────────────────────────────

    /// Start editing a column title, seeded with the current title.
    /// Replaces any open session. Out-of-range index: no-op.
    pub fn start_column_title_edit(&mut self, column_index: usize) {
        let Some(column) = self.board.columns.get(column_index) else {
            log::debug!(
                "[taskboard.store.start_column_title_edit] Column index {} out of range ({} columns)",
                column_index,
                self.board.columns.len()
            );
            return;
        };
        let session = EditSession {
            column_index,
            target: EditTarget::ColumnTitle,
            value: Value::String(column.title.clone()),
        };
        self.open_session(session);
    }

    /// Start editing one task attribute. The value is seeded from the caller,
    /// not re-read from the task, so derived values can be edited too.
    /// Indices are only checked on commit.
    pub fn start_task_field_edit(
        &mut self,
        column_index: usize,
        task_index: usize,
        field: impl Into<String>,
        initial_value: Value,
    ) {
        let session = EditSession {
            column_index,
            target: EditTarget::TaskField {
                task_index,
                field: field.into(),
            },
            value: initial_value,
        };
        self.open_session(session);
    }

    fn open_session(&mut self, session: EditSession) {
        let event = BoardEvent::EditStarted {
            column_index: session.column_index,
            task_index: session.task_index(),
            field: session.field().to_string(),
        };
        if let Some(previous) = self.board.edit_session.replace(session) {
            log::debug!(
                "[taskboard.store.edit] Discarding uncommitted edit of {} in column {}",
                previous.field(),
                previous.column_index
            );
        }
        self.emit(event);
    }

    pub fn set_edit_value(&mut self, value: Value) {
        match self.board.edit_session.as_mut() {
            Some(session) => {
                session.value = value;
                self.emit(BoardEvent::EditValueChanged);
            }
            None => log::debug!("[taskboard.store.set_edit_value] No active edit session"),
        }
    }

    /// Write the session value to its target and close the session.
    /// The session is closed even when the target no longer exists or
    /// rejects the value.
    pub fn commit_edit(&mut self) {
        let Some(session) = self.board.edit_session.take() else {
            return;
        };
        let column_index = session.column_index;

        let applied = match session.target {
            EditTarget::ColumnTitle => match self.board.columns.get_mut(column_index) {
                Some(column) => {
                    column.title = value_to_text(session.value);
                    true
                }
                None => {
                    log::debug!(
                        "[taskboard.store.commit_edit] Column index {} out of range, title not written",
                        column_index
                    );
                    false
                }
            },
            EditTarget::TaskField { task_index, field } => {
                match self.task_mut(column_index, task_index) {
                    Some(task) => match task.set_field(&field, session.value) {
                        Ok(()) => true,
                        Err(e) => {
                            log::warn!("[taskboard.store.commit_edit] {}", e);
                            false
                        }
                    },
                    None => {
                        log::debug!(
                            "[taskboard.store.commit_edit] Task {}/{} out of range, {} not written",
                            column_index,
                            task_index,
                            field
                        );
                        false
                    }
                }
            }
        };

        self.emit(BoardEvent::EditCommitted { applied });
    }

    /// Close the session without writing anything.
    pub fn cancel_edit(&mut self) {
        if self.board.edit_session.take().is_some() {
            self.emit(BoardEvent::EditCancelled);
        }
    }

    // ── Columns ─────────────────────────────────────────────────────────────

    /// Append a column after the highest existing position.
    /// Existing columns keep their positions.
    pub fn add_column(&mut self, new_column: NewColumn) {
        let position = next_position(&self.board.columns);
        self.board.columns.push(Column {
            title: new_column.title,
            position,
            tasks: new_column.tasks,
            extra: Map::new(),
        });
        self.emit(BoardEvent::ColumnAdded {
            column_index: self.board.columns.len() - 1,
        });
    }

    pub fn delete_column(&mut self, column_index: usize) {
        if column_index >= self.board.columns.len() {
            log::debug!(
                "[taskboard.store.delete_column] Column index {} out of range ({} columns)",
                column_index,
                self.board.columns.len()
            );
            return;
        }
        self.board.columns.remove(column_index);
        renumber(&mut self.board.columns);
        self.emit(BoardEvent::ColumnDeleted { column_index });
    }

    /// Swap a column with its neighbour. The pair exchanges position values,
    /// so positions keep following vector order. Moving past either end is a no-op.
    pub fn move_column(&mut self, column_index: usize, direction: MoveDirection) {
        let len = self.board.columns.len();
        if column_index >= len {
            log::debug!(
                "[taskboard.store.move_column] Column index {} out of range ({} columns)",
                column_index,
                len
            );
            return;
        }
        let target = match direction {
            MoveDirection::Left => column_index.checked_sub(1),
            MoveDirection::Right => Some(column_index + 1).filter(|&i| i < len),
        };
        let Some(target) = target else {
            return;
        };

        self.board.columns.swap(column_index, target);
        let moved = self.board.columns[target].position;
        self.board.columns[target].position = self.board.columns[column_index].position;
        self.board.columns[column_index].position = moved;

        self.emit(BoardEvent::ColumnMoved {
            from: column_index,
            to: target,
        });
    }

    // ── Tasks ───────────────────────────────────────────────────────────────

    /// Append a task to a column after its highest task position.
    pub fn add_task(&mut self, column_index: usize, mut task: Task) {
        let Some(column) = self.board.columns.get_mut(column_index) else {
            log::debug!(
                "[taskboard.store.add_task] Column index {} out of range",
                column_index
            );
            return;
        };
        task.position = next_position(&column.tasks);
        column.tasks.push(task);
        let task_index = column.tasks.len() - 1;
        self.emit(BoardEvent::TaskAdded {
            column_index,
            task_index,
        });
    }

    /// Shallow-merge `partial` into a task. Keys whose value doesn't fit a
    /// typed attribute are skipped; the rest are still applied.
    pub fn update_task(&mut self, column_index: usize, task_index: usize, partial: Map<String, Value>) {
        let Some(task) = self.task_mut(column_index, task_index) else {
            log::debug!(
                "[taskboard.store.update_task] Task {}/{} out of range",
                column_index,
                task_index
            );
            return;
        };
        for (field, value) in partial {
            if let Err(e) = task.set_field(&field, value) {
                log::warn!("[taskboard.store.update_task] {}", e);
            }
        }
        self.emit(BoardEvent::TaskUpdated {
            column_index,
            task_index,
        });
    }

    pub fn delete_task(&mut self, column_index: usize, task_index: usize) {
        let Some(column) = self.board.columns.get_mut(column_index) else {
            log::debug!(
                "[taskboard.store.delete_task] Column index {} out of range",
                column_index
            );
            return;
        };
        if task_index >= column.tasks.len() {
            log::debug!(
                "[taskboard.store.delete_task] Task index {} out of range ({} tasks)",
                task_index,
                column.tasks.len()
            );
            return;
        }
        column.tasks.remove(task_index);
        renumber(&mut column.tasks);
        self.emit(BoardEvent::TaskDeleted {
            column_index,
            task_index,
        });
    }

    pub fn toggle_task_completion(&mut self, column_index: usize, task_index: usize) {
        let Some(task) = self.task_mut(column_index, task_index) else {
            log::debug!(
                "[taskboard.store.toggle_task_completion] Task {}/{} out of range",
                column_index,
                task_index
            );
            return;
        };
        task.toggle_completion();
        let completed = task.is_completed();
        self.emit(BoardEvent::TaskCompletionToggled {
            column_index,
            task_index,
            completed,
        });
    }

    pub fn toggle_completed_section_visibility(&mut self) {
        self.board.completed_section_expanded = !self.board.completed_section_expanded;
        self.emit(BoardEvent::CompletedSectionToggled {
            expanded: self.board.completed_section_expanded,
        });
    }

    // ── Local snapshots ─────────────────────────────────────────────────────

    /// Save the current columns under `key`.
    pub fn persist(&self, store: &dyn SnapshotStore, key: &str) -> Result<(), StorageError> {
        store.save(key, &self.board.columns)
    }

    /// Replace the columns with the snapshot under `key`.
    /// Returns false (board untouched) when there is none.
    pub fn restore(&mut self, store: &dyn SnapshotStore, key: &str) -> Result<bool, StorageError> {
        match store.load(key)? {
            Some(columns) => {
                self.replace_all(columns);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Column titles are text; non-string edit values keep their JSON form.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemorySnapshotStore;
    use crate::types::{DEFAULT_COLUMN_TITLES, PROGRESS_DONE, PROGRESS_OPEN};
    use serde_json::json;

    fn named_task(name: &str) -> Task {
        let mut task = Task {
            progress: Some(PROGRESS_OPEN.to_string()),
            ..Task::default()
        };
        task.extra.insert("taskName".to_string(), json!(name));
        task
    }

    fn column_positions(store: &BoardStore) -> Vec<usize> {
        store.columns().iter().map(|c| c.position).collect()
    }

    fn column_titles(store: &BoardStore) -> Vec<String> {
        store.columns().iter().map(|c| c.title.clone()).collect()
    }

    fn task_positions(store: &BoardStore, column_index: usize) -> Vec<usize> {
        store.columns()[column_index]
            .tasks
            .iter()
            .map(|t| t.position)
            .collect()
    }

    fn assert_contiguous(store: &BoardStore) {
        let expected: Vec<usize> = (0..store.columns().len()).collect();
        assert_eq!(column_positions(store), expected);
        for (i, column) in store.columns().iter().enumerate() {
            let expected: Vec<usize> = (0..column.tasks.len()).collect();
            assert_eq!(task_positions(store, i), expected, "column {}", i);
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn board_with_tasks() -> BoardStore {
        init_logging();
        let mut store = BoardStore::with_default_columns();
        store.add_task(0, named_task("Call supplier"));
        store.add_task(0, named_task("Send quote"));
        store.add_task(0, named_task("Book meeting"));
        store.add_task(1, named_task("Draft contract"));
        store
    }

    #[test]
    fn test_new_is_empty() {
        let store = BoardStore::new();
        assert!(store.columns().is_empty());
        assert!(store.edit_session().is_none());
        assert!(store.completed_section_expanded());
    }

    #[test]
    fn test_reset_is_deterministic() {
        let mut store = board_with_tasks();
        store.toggle_completed_section_visibility();
        store.start_column_title_edit(0);
        store.add_column(NewColumn::titled("Blocked"));

        store.reset();
        assert_eq!(column_titles(&store), DEFAULT_COLUMN_TITLES);
        assert_eq!(column_positions(&store), vec![0, 1, 2]);
        assert!(store.columns().iter().all(|c| c.tasks.is_empty()));
        assert!(store.edit_session().is_none());
        assert!(store.completed_section_expanded());

        store.reset();
        assert_eq!(store.board(), &Board::with_default_columns());
    }

    #[test]
    fn test_replace_all_is_verbatim() {
        let mut store = BoardStore::with_default_columns();
        let columns = vec![Column::new("Backlog", 5), Column::new("Review", 2)];
        store.replace_all(columns.clone());
        assert_eq!(store.columns(), columns.as_slice());
    }

    #[test]
    fn test_add_column_uses_max_position() {
        let mut store = BoardStore::new();
        store.add_column(NewColumn::titled("First"));
        assert_eq!(column_positions(&store), vec![0]);

        store.replace_all(vec![Column::new("A", 0), Column::new("B", 4)]);
        store.add_column(NewColumn {
            title: "C".to_string(),
            tasks: vec![named_task("seeded")],
        });
        assert_eq!(column_positions(&store), vec![0, 4, 5]);
        assert_eq!(store.columns()[2].tasks.len(), 1);
    }

    #[test]
    fn test_delete_column_renumbers() {
        let mut store = board_with_tasks();
        store.add_column(NewColumn::titled("Archive"));

        store.delete_column(1);
        assert_eq!(column_titles(&store), vec!["To Do", "Done", "Archive"]);
        assert_contiguous(&store);

        store.delete_column(0);
        assert_eq!(column_titles(&store), vec!["Done", "Archive"]);
        assert_contiguous(&store);
    }

    #[test]
    fn test_delete_column_out_of_range_is_noop() {
        let mut store = board_with_tasks();
        let before = store.board().clone();
        store.delete_column(3);
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_move_column_swaps_neighbours() {
        let mut store = board_with_tasks();

        store.move_column(0, MoveDirection::Right);
        assert_eq!(column_titles(&store), vec!["In Progress", "To Do", "Done"]);
        assert_eq!(store.columns()[1].tasks.len(), 3);
        assert_contiguous(&store);

        store.move_column(2, MoveDirection::Left);
        assert_eq!(column_titles(&store), vec!["In Progress", "Done", "To Do"]);
        assert_contiguous(&store);
    }

    #[test]
    fn test_move_column_boundaries_are_noops() {
        let mut store = board_with_tasks();
        let before = store.board().clone();

        store.move_column(0, MoveDirection::Left);
        assert_eq!(store.board(), &before);
        store.move_column(2, MoveDirection::Right);
        assert_eq!(store.board(), &before);
        store.move_column(9, MoveDirection::Left);
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_positions_stay_contiguous_across_mixed_ops() {
        let mut store = BoardStore::with_default_columns();
        store.add_column(NewColumn::titled("QA"));
        store.add_column(NewColumn::titled("Released"));
        store.move_column(4, MoveDirection::Left);
        store.delete_column(0);
        store.move_column(0, MoveDirection::Right);
        store.add_column(NewColumn::titled("Later"));
        store.delete_column(2);
        store.move_column(1, MoveDirection::Right);
        assert_contiguous(&store);

        for name in ["a", "b", "c", "d"] {
            store.add_task(1, named_task(name));
        }
        store.delete_task(1, 1);
        store.add_task(1, named_task("e"));
        store.delete_task(1, 0);
        assert_contiguous(&store);
    }

    #[test]
    fn test_add_task_positions() {
        let mut store = board_with_tasks();
        assert_eq!(task_positions(&store, 0), vec![0, 1, 2]);
        assert_eq!(task_positions(&store, 1), vec![0]);
        assert!(store.columns()[2].tasks.is_empty());

        // Caller-supplied position is overridden
        let mut task = named_task("late");
        task.position = 40;
        store.add_task(2, task);
        assert_eq!(task_positions(&store, 2), vec![0]);
    }

    #[test]
    fn test_add_task_invalid_column_is_noop() {
        let mut store = board_with_tasks();
        let before = store.board().clone();
        store.add_task(7, named_task("lost"));
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_update_task_shallow_merge() {
        let mut store = board_with_tasks();
        let mut partial = Map::new();
        partial.insert("taskName".to_string(), json!("Send revised quote"));
        partial.insert("priorityLevel".to_string(), json!(118));
        partial.insert("dueDate".to_string(), json!("2026-11-01"));
        store.update_task(0, 1, partial);

        let task = store.task(0, 1).unwrap();
        assert_eq!(task.extra["taskName"], json!("Send revised quote"));
        assert_eq!(task.extra["dueDate"], json!("2026-11-01"));
        assert_eq!(task.priority_level, Some(118));
        assert_eq!(task.progress.as_deref(), Some(PROGRESS_OPEN));
        assert_eq!(task.position, 1);
    }

    #[test]
    fn test_update_task_skips_mistyped_keys() {
        let mut store = board_with_tasks();
        let mut partial = Map::new();
        partial.insert("taskProgress".to_string(), json!("half"));
        partial.insert("taskName".to_string(), json!("Renamed"));
        store.update_task(0, 0, partial);

        let task = store.task(0, 0).unwrap();
        assert_eq!(task.task_progress, None);
        assert_eq!(task.extra["taskName"], json!("Renamed"));
    }

    #[test]
    fn test_update_task_out_of_range_is_noop() {
        let mut store = board_with_tasks();
        let before = store.board().clone();
        let mut partial = Map::new();
        partial.insert("taskName".to_string(), json!("x"));
        store.update_task(1, 5, partial.clone());
        store.update_task(8, 0, partial);
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_delete_task_renumbers() {
        let mut store = board_with_tasks();
        store.delete_task(0, 0);
        assert_eq!(task_positions(&store, 0), vec![0, 1]);
        assert_eq!(store.task(0, 0).unwrap().extra["taskName"], json!("Send quote"));

        let before = store.board().clone();
        store.delete_task(0, 2);
        store.delete_task(5, 0);
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_toggle_completion_round_trip() {
        let mut store = board_with_tasks();
        store.toggle_task_completion(0, 1);
        assert_eq!(store.task(0, 1).unwrap().progress.as_deref(), Some(PROGRESS_DONE));
        store.toggle_task_completion(0, 1);
        assert_eq!(store.task(0, 1).unwrap().progress.as_deref(), Some(PROGRESS_OPEN));

        let mut done = named_task("shipped");
        done.progress = Some(PROGRESS_DONE.to_string());
        store.add_task(2, done);
        store.toggle_task_completion(2, 0);
        store.toggle_task_completion(2, 0);
        assert_eq!(store.task(2, 0).unwrap().progress.as_deref(), Some(PROGRESS_DONE));

        let before = store.board().clone();
        store.toggle_task_completion(2, 4);
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_open_and_completed_tasks() {
        let mut store = board_with_tasks();
        store.toggle_task_completion(0, 0);
        store.toggle_task_completion(0, 2);

        let open: Vec<usize> = store.open_tasks(0).iter().map(|t| t.position).collect();
        let completed: Vec<usize> = store
            .completed_tasks(0)
            .iter()
            .map(|t| t.position)
            .collect();
        assert_eq!(open, vec![1]);
        assert_eq!(completed, vec![0, 2]);
        assert!(store.completed_tasks(9).is_empty());
    }

    #[test]
    fn test_toggle_completed_section_visibility() {
        let mut store = BoardStore::new();
        store.toggle_completed_section_visibility();
        assert!(!store.completed_section_expanded());
        store.toggle_completed_section_visibility();
        assert!(store.completed_section_expanded());
    }

    #[test]
    fn test_column_title_edit_commit() {
        let mut store = board_with_tasks();
        store.start_column_title_edit(1);
        let session = store.edit_session().unwrap();
        assert_eq!(session.value, json!("In Progress"));
        assert_eq!(session.task_index(), None);
        assert_eq!(session.field(), "columnTitle");

        store.set_edit_value(json!("Doing"));
        store.commit_edit();
        assert_eq!(store.columns()[1].title, "Doing");
        assert!(store.edit_session().is_none());
    }

    #[test]
    fn test_column_title_edit_out_of_range_is_noop() {
        let mut store = board_with_tasks();
        store.start_column_title_edit(10);
        assert!(store.edit_session().is_none());

        // An existing session survives an out-of-range start
        store.start_column_title_edit(0);
        store.start_column_title_edit(10);
        assert_eq!(store.edit_session().unwrap().column_index, 0);
    }

    #[test]
    fn test_task_field_edit_commit() {
        let mut store = board_with_tasks();
        store.start_task_field_edit(0, 2, "taskName", json!("derived label"));
        assert_eq!(store.edit_session().unwrap().value, json!("derived label"));

        store.set_edit_value(json!("Book kickoff meeting"));
        store.commit_edit();
        assert_eq!(
            store.task(0, 2).unwrap().extra["taskName"],
            json!("Book kickoff meeting")
        );
        assert!(store.edit_session().is_none());
    }

    #[test]
    fn test_starting_new_edit_replaces_previous() {
        let mut store = board_with_tasks();
        store.start_column_title_edit(0);
        store.set_edit_value(json!("Never written"));
        store.start_task_field_edit(1, 0, "taskName", json!("Draft contract"));

        let session = store.edit_session().unwrap();
        assert_eq!(session.column_index, 1);
        assert_eq!(session.task_index(), Some(0));
        assert_eq!(session.value, json!("Draft contract"));

        store.start_column_title_edit(2);
        let session = store.edit_session().unwrap();
        assert_eq!(session.column_index, 2);
        assert_eq!(session.task_index(), None);

        store.commit_edit();
        assert_eq!(store.columns()[0].title, "To Do");
    }

    #[test]
    fn test_commit_without_session_is_noop() {
        let mut store = board_with_tasks();
        let before = store.board().clone();
        store.commit_edit();
        store.set_edit_value(json!("ignored"));
        assert_eq!(store.board(), &before);
    }

    #[test]
    fn test_cancel_discards() {
        let mut store = board_with_tasks();
        store.start_column_title_edit(0);
        store.set_edit_value(json!("Renamed"));
        store.cancel_edit();
        assert_eq!(store.columns()[0].title, "To Do");
        assert!(store.edit_session().is_none());

        store.start_task_field_edit(0, 0, "taskName", json!("Call supplier"));
        store.set_edit_value(json!("Email supplier"));
        store.cancel_edit();
        assert_eq!(store.task(0, 0).unwrap().extra["taskName"], json!("Call supplier"));
    }

    #[test]
    fn test_commit_to_vanished_target_still_clears() {
        let mut store = board_with_tasks();
        store.start_task_field_edit(0, 2, "taskName", json!("x"));
        store.delete_task(0, 2);
        let before = store.board().clone();
        store.commit_edit();
        assert!(store.edit_session().is_none());
        assert_eq!(store.columns(), before.columns.as_slice());

        store.start_column_title_edit(2);
        store.delete_column(2);
        store.commit_edit();
        assert!(store.edit_session().is_none());
        assert_eq!(column_titles(&store), vec!["To Do", "In Progress"]);
    }

    #[test]
    fn test_commit_rejected_value_still_clears() {
        let mut store = board_with_tasks();
        store.start_task_field_edit(0, 0, "priorityLevel", json!("urgent"));
        store.commit_edit();
        assert!(store.edit_session().is_none());
        assert_eq!(store.task(0, 0).unwrap().priority_level, None);
    }

    #[test]
    fn test_commit_non_string_title() {
        let mut store = board_with_tasks();
        store.start_column_title_edit(0);
        store.set_edit_value(json!(2026));
        store.commit_edit();
        assert_eq!(store.columns()[0].title, "2026");
    }

    #[test]
    fn test_events_follow_changes() {
        let mut store = board_with_tasks();
        let mut rx = store.subscribe();

        store.move_column(0, MoveDirection::Left); // no-op, no event
        store.move_column(0, MoveDirection::Right);
        store.toggle_task_completion(1, 0);
        store.start_column_title_edit(0);
        store.cancel_edit();
        store.cancel_edit(); // nothing open, no event
        store.reset();

        assert_eq!(rx.try_recv().unwrap(), BoardEvent::ColumnMoved { from: 0, to: 1 });
        assert_eq!(
            rx.try_recv().unwrap(),
            BoardEvent::TaskCompletionToggled {
                column_index: 1,
                task_index: 0,
                completed: true
            }
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            BoardEvent::EditStarted { column_index: 0, task_index: None, .. }
        ));
        assert_eq!(rx.try_recv().unwrap(), BoardEvent::EditCancelled);
        assert_eq!(rx.try_recv().unwrap(), BoardEvent::Reset);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_persist_and_restore() {
        let snapshots = MemorySnapshotStore::new();
        let mut store = board_with_tasks();
        store.toggle_task_completion(0, 0);
        store.persist(&snapshots, "project-12").unwrap();

        let mut fresh = BoardStore::new();
        assert!(fresh.restore(&snapshots, "project-12").unwrap());
        assert_eq!(fresh.columns(), store.columns());

        let before = fresh.board().clone();
        assert!(!fresh.restore(&snapshots, "unknown").unwrap());
        assert_eq!(fresh.board(), &before);
    }
}
