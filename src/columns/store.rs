use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

use super::definition::{find_definition, ColumnDefinition, ColumnField};
use super::derive::{derive_columns, DerivedColumns};
use super::record::{parse_layout, ColumnRecord};
use super::state::{ColumnState, MoveDirection};
use crate::storage::KeyValueStore;
use crate::widgets::column_picker::ColumnPickerAction;

/// Column order and visibility for one table, persisted under a key.
///
/// Every operation is synchronous and never fails: bad stored data falls
/// back to defaults and disallowed requests are ignored. Mutating
/// operations return whether the state changed; changes are written to the
/// backend right away.
pub struct ColumnVisibility<F: ColumnField, S: KeyValueStore> {
    storage: S,
    storage_key: String,
    definitions: Vec<ColumnDefinition<F>>,
    state: ColumnState<F>,
    derived: DerivedColumns<F>,
}

impl<F, S> ColumnVisibility<F, S>
where
    F: ColumnField + Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Load the layout stored under `storage_key` and reconcile it with
    /// `definitions`
    pub fn new(
        storage: S,
        storage_key: impl Into<String>,
        definitions: Vec<ColumnDefinition<F>>,
    ) -> Self {
        let storage_key = storage_key.into();

        let state = match storage.get(&storage_key) {
            Some(raw) => match parse_layout::<F>(&raw) {
                Some(layout) => {
                    tracing::debug!(target: "columns", "Restored column layout '{}'", storage_key);
                    layout.into_state(&definitions)
                }
                None => {
                    tracing::warn!(target: "columns", "Unreadable column layout '{}', using defaults", storage_key);
                    ColumnState::defaults(&definitions)
                }
            },
            None => {
                tracing::debug!(target: "columns", "No stored layout for '{}', using defaults", storage_key);
                ColumnState::defaults(&definitions)
            }
        };

        let derived = derive_columns(&state, &definitions);
        let mut store = Self {
            storage,
            storage_key,
            definitions,
            state,
            derived,
        };
        // Upgrades legacy or stale records in place
        store.persist();
        store
    }

    /// Show or hide a column.
    ///
    /// Hiding an always-visible column and unknown fields are ignored.
    pub fn toggle_column(&mut self, field: &F, visible: bool) -> bool {
        let changed = self.state.set_visible(&self.definitions, field, visible);
        if changed {
            tracing::debug!(target: "columns", "{:?} is now {}", field, if visible { "visible" } else { "hidden" });
            self.commit();
        }
        changed
    }

    /// Swap a column with its neighbour.
    ///
    /// Pinned columns, boundary moves and swaps with a pinned neighbour are
    /// ignored. Visibility is untouched.
    pub fn move_column(&mut self, field: &F, direction: MoveDirection) -> bool {
        let changed = self.state.move_field(&self.definitions, field, direction);
        if changed {
            tracing::debug!(target: "columns", "Moved {:?} {:?}", field, direction);
            self.commit();
        }
        changed
    }

    /// Discard customisation: definition order and default-hidden columns.
    /// Always persists.
    pub fn reset_to_default(&mut self) -> bool {
        let defaults = ColumnState::defaults(&self.definitions);
        let changed = defaults != self.state;
        self.state = defaults;
        tracing::debug!(target: "columns", "Reset column layout '{}'", self.storage_key);
        self.commit();
        changed
    }

    /// Adopt a new definition set.
    ///
    /// Stale fields are dropped, new ones appended to the order, and pinned
    /// fields placed in their zones. Nothing is written when the order and
    /// hidden set come out unchanged.
    pub fn reconcile(&mut self, definitions: Vec<ColumnDefinition<F>>) -> bool {
        self.definitions = definitions;
        let changed = self.state.sanitize(&self.definitions);
        if changed {
            tracing::debug!(
                target: "columns",
                "Reconciled '{}' against {} columns",
                self.storage_key,
                self.definitions.len()
            );
            self.commit();
        } else {
            self.derived = derive_columns(&self.state, &self.definitions);
        }
        changed
    }

    /// Route a picker intent to the matching operation
    pub fn apply(&mut self, action: &ColumnPickerAction<F>) -> bool {
        match action {
            ColumnPickerAction::Toggle(field, visible) => self.toggle_column(field, *visible),
            ColumnPickerAction::Move(field, direction) => self.move_column(field, *direction),
            ColumnPickerAction::Reset => self.reset_to_default(),
            ColumnPickerAction::None | ColumnPickerAction::Close => false,
        }
    }

    fn commit(&mut self) {
        self.derived = derive_columns(&self.state, &self.definitions);
        self.persist();
    }

    fn persist(&mut self) {
        let record = ColumnRecord::from_state(&self.state);
        match serde_json::to_string(&record) {
            Ok(json) => self.storage.set(&self.storage_key, json),
            Err(e) => {
                tracing::warn!(target: "columns", "Could not serialize layout '{}': {}", self.storage_key, e)
            }
        }
    }
}

impl<F: ColumnField, S: KeyValueStore> ColumnVisibility<F, S> {
    pub fn derived(&self) -> &DerivedColumns<F> {
        &self.derived
    }

    /// Visible columns in effective order, for the table
    pub fn visible_columns(&self) -> &[F] {
        &self.derived.visible
    }

    /// Every column in effective order, for the picker
    pub fn ordered_columns(&self) -> &[F] {
        &self.derived.effective_order
    }

    pub fn hidden_columns(&self) -> &HashSet<F> {
        self.state.hidden()
    }

    pub fn is_visible(&self, field: &F) -> bool {
        !self.state.is_hidden(field)
    }

    pub fn state(&self) -> &ColumnState<F> {
        &self.state
    }

    pub fn definitions(&self) -> &[ColumnDefinition<F>] {
        &self.definitions
    }

    pub fn definition(&self, field: &F) -> Option<&ColumnDefinition<F>> {
        find_definition(&self.definitions, field)
    }

    /// Definitions of the visible columns, in display order
    pub fn visible_definitions(&self) -> Vec<&ColumnDefinition<F>> {
        self.derived
            .visible
            .iter()
            .filter_map(|field| self.definition(field))
            .collect()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
