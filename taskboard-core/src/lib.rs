//! Project task board core: an in-memory Kanban working copy with
//! columns, ordered tasks, a single inline-edit session and template loading.

pub mod config;
pub mod events;
pub mod storage;
pub mod store;
pub mod template;
pub mod types;

pub use events::BoardEvent;
pub use store::BoardStore;
pub use template::{TemplateError, TemplateLoader, TemplateSource};
pub use types::{Board, Column, EditSession, EditTarget, MoveDirection, NewColumn, Task};
