//! Column visibility, ordering and pinning for data tables
//!
//! `ColumnVisibility` owns the layout for one table and persists it under
//! a caller-chosen key. The other modules are the pieces it is built from
//! and can be used on their own.

pub mod definition;
pub mod derive;
pub mod record;
pub mod state;
pub mod store;

pub use definition::{Align, ColumnDefinition, ColumnField, Pinned};
pub use derive::{derive_columns, DerivedColumns};
pub use record::{parse_layout, ColumnRecord, StoredLayout};
pub use state::{ColumnState, MoveDirection};
pub use store::ColumnVisibility;
