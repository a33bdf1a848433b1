use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

/// Anything usable as a column identifier: a string, a string enum, an id.
pub trait ColumnField: Clone + Eq + Hash + Debug {}

impl<T> ColumnField for T where T: Clone + Eq + Hash + Debug {}

/// Where a column is pinned in the effective order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pinned {
    Start,
    End,
    #[default]
    None,
}

impl Pinned {
    pub fn is_pinned(&self) -> bool {
        !matches!(self, Pinned::None)
    }
}

/// Horizontal alignment of cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Describes one column of a table.
///
/// Only `field`, `always_visible`, `pinned` and `default_hidden` drive
/// ordering and visibility. The remaining attributes are carried through
/// for the table renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition<F> {
    pub field: F,
    pub label: String,

    /// Column cannot be hidden through the picker
    #[serde(default)]
    pub always_visible: bool,

    /// Pinned columns keep a fixed zone and cannot be reordered
    #[serde(default)]
    pub pinned: Pinned,

    /// Hidden until the user shows it, absent persisted state
    #[serde(default)]
    pub default_hidden: bool,

    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub align: Align,

    /// Preferred width in terminal cells
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub min_width: Option<u16>,
}

impl<F> ColumnDefinition<F> {
    pub fn new(field: F, label: impl Into<String>) -> Self {
        Self {
            field,
            label: label.into(),
            always_visible: false,
            pinned: Pinned::None,
            default_hidden: false,
            sortable: false,
            align: Align::Left,
            width: None,
            min_width: None,
        }
    }

    pub fn pinned_start(mut self) -> Self {
        self.pinned = Pinned::Start;
        self
    }

    pub fn pinned_end(mut self) -> Self {
        self.pinned = Pinned::End;
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    pub fn default_hidden(mut self) -> Self {
        self.default_hidden = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn min_width(mut self, min_width: u16) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_pinned()
    }
}

/// Find the definition for a field
pub fn find_definition<'a, F: PartialEq>(
    definitions: &'a [ColumnDefinition<F>],
    field: &F,
) -> Option<&'a ColumnDefinition<F>> {
    definitions.iter().find(|def| &def.field == field)
}

/// Fields in definition order, first occurrence wins for duplicate fields
pub fn definition_fields<F: ColumnField>(definitions: &[ColumnDefinition<F>]) -> Vec<F> {
    let mut seen = HashSet::with_capacity(definitions.len());
    let mut fields = Vec::with_capacity(definitions.len());
    for def in definitions {
        if seen.insert(&def.field) {
            fields.push(def.field.clone());
        }
    }
    fields
}

/// Fields pinned to `zone`, in definition order
pub fn pinned_fields<F: ColumnField>(definitions: &[ColumnDefinition<F>], zone: Pinned) -> Vec<F> {
    let lookup = pin_lookup(definitions);
    definition_fields(definitions)
        .into_iter()
        .filter(|field| lookup.get(field) == Some(&zone))
        .collect()
}

/// Pin class per field, first occurrence wins for duplicate fields
pub fn pin_lookup<F: ColumnField>(definitions: &[ColumnDefinition<F>]) -> HashMap<&F, Pinned> {
    let mut lookup = HashMap::with_capacity(definitions.len());
    for def in definitions {
        lookup.entry(&def.field).or_insert(def.pinned);
    }
    lookup
}
