//! UI widgets for terminal table hosts
//!
//! The column picker is a pure view over `ColumnVisibility`: it renders the
//! current layout and hands intents back to the host.

pub mod column_picker;

pub use column_picker::{
    picker_rows, ColumnPickerAction, ColumnPickerState, ColumnPickerWidget, PickerRow,
};
