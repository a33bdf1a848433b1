use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::definition::{definition_fields, ColumnDefinition, ColumnField};
use super::state::ColumnState;

/// Stored form of a column layout: `{ "order": [...], "hidden": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord<F> {
    pub order: Vec<F>,
    pub hidden: Vec<F>,
}

impl<F: ColumnField> ColumnRecord<F> {
    pub fn from_state(state: &ColumnState<F>) -> Self {
        Self {
            order: state.order().to_vec(),
            hidden: state.hidden_in_order(),
        }
    }
}

/// A layout read back from storage, before it is checked against the
/// current definitions
#[derive(Debug, Clone, PartialEq)]
pub enum StoredLayout<F> {
    /// `{ "order": [...], "hidden": [...] }`; `hidden` may be missing
    Current {
        order: Vec<F>,
        hidden: Option<Vec<F>>,
    },
    /// Older bare list of the visible fields, in display order
    Legacy(Vec<F>),
}

impl<F: ColumnField> StoredLayout<F> {
    /// Turn the stored layout into a state sanitized against `definitions`
    pub fn into_state(self, definitions: &[ColumnDefinition<F>]) -> ColumnState<F> {
        let mut state = match self {
            StoredLayout::Current { order, hidden } => {
                let hidden = match hidden {
                    Some(hidden) => hidden.into_iter().collect(),
                    None => ColumnState::default_hidden(definitions),
                };
                ColumnState::new(order, hidden)
            }
            StoredLayout::Legacy(visible) => {
                // Anything the old list did not mention was hidden
                let listed: HashSet<&F> = visible.iter().collect();
                let hidden = definition_fields(definitions)
                    .into_iter()
                    .filter(|field| !listed.contains(field))
                    .collect();
                ColumnState::new(visible, hidden)
            }
        };
        state.sanitize(definitions);
        state
    }
}

/// Parse a stored layout.
///
/// Entries that no longer decode as `F` are dropped one by one. Returns
/// `None` for invalid JSON or an unrecognised shape.
pub fn parse_layout<F: DeserializeOwned>(raw: &str) -> Option<StoredLayout<F>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    match value {
        Value::Array(items) => Some(StoredLayout::Legacy(decode_fields(items))),
        Value::Object(mut map) => {
            let order = match map.remove("order")? {
                Value::Array(items) => decode_fields(items),
                _ => return None,
            };
            let hidden = match map.remove("hidden") {
                Some(Value::Array(items)) => Some(decode_fields(items)),
                _ => None,
            };
            Some(StoredLayout::Current { order, hidden })
        }
        _ => None,
    }
}

fn decode_fields<F: DeserializeOwned>(items: Vec<Value>) -> Vec<F> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}
