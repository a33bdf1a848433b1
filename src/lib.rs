pub mod columns;
pub mod config;
pub mod storage;
pub mod utils;
pub mod widgets;

pub use columns::{ColumnDefinition, ColumnVisibility, MoveDirection, Pinned};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use widgets::{ColumnPickerAction, ColumnPickerWidget};
