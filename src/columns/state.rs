use std::collections::HashSet;

use super::definition::{
    definition_fields, find_definition, pin_lookup, pinned_fields, ColumnDefinition, ColumnField,
    Pinned,
};

/// Direction for nudging a column within the order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// User-owned column layout: the relative order of every column and the
/// set currently hidden.
///
/// After [`ColumnState::sanitize`] the order is a permutation of the
/// definition fields with start-pinned fields leading and end-pinned fields
/// trailing (both in definition order), and `hidden` only holds known
/// fields that may be hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnState<F: ColumnField> {
    order: Vec<F>,
    hidden: HashSet<F>,
}

impl<F: ColumnField> ColumnState<F> {
    /// Create a state as-is; call `sanitize` before trusting it
    pub fn new(order: Vec<F>, hidden: HashSet<F>) -> Self {
        Self { order, hidden }
    }

    /// Definition order with `default_hidden` columns hidden
    pub fn defaults(definitions: &[ColumnDefinition<F>]) -> Self {
        let mut state = Self {
            order: definition_fields(definitions),
            hidden: Self::default_hidden(definitions),
        };
        state.sanitize(definitions);
        state
    }

    pub fn default_hidden(definitions: &[ColumnDefinition<F>]) -> HashSet<F> {
        definitions
            .iter()
            .filter(|def| def.default_hidden && !def.always_visible)
            .map(|def| def.field.clone())
            .collect()
    }

    pub fn order(&self) -> &[F] {
        &self.order
    }

    pub fn hidden(&self) -> &HashSet<F> {
        &self.hidden
    }

    pub fn is_hidden(&self, field: &F) -> bool {
        self.hidden.contains(field)
    }

    /// Hidden fields in order sequence
    pub fn hidden_in_order(&self) -> Vec<F> {
        self.order
            .iter()
            .filter(|field| self.hidden.contains(*field))
            .cloned()
            .collect()
    }

    /// Bring the state in line with `definitions`.
    ///
    /// Duplicate and unknown fields leave the order, definition fields
    /// missing from it are appended in definition order, and pinned fields
    /// are moved to their zones. Hidden fields that are unknown or always
    /// visible are dropped. Returns true when anything changed.
    pub fn sanitize(&mut self, definitions: &[ColumnDefinition<F>]) -> bool {
        let known = definition_fields(definitions);
        let known_set: HashSet<&F> = known.iter().collect();

        let mut seen: HashSet<F> = HashSet::with_capacity(known.len());
        let mut merged: Vec<F> = Vec::with_capacity(known.len());
        for field in &self.order {
            if known_set.contains(field) && seen.insert(field.clone()) {
                merged.push(field.clone());
            }
        }
        for field in &known {
            if !seen.contains(field) {
                merged.push(field.clone());
            }
        }

        let pins = pin_lookup(definitions);
        let mut order = pinned_fields(definitions, Pinned::Start);
        order.extend(
            merged
                .into_iter()
                .filter(|field| pins.get(field) == Some(&Pinned::None)),
        );
        order.extend(pinned_fields(definitions, Pinned::End));

        let hidden: HashSet<F> = self
            .hidden
            .iter()
            .filter(|field| {
                find_definition(definitions, *field).is_some_and(|def| !def.always_visible)
            })
            .cloned()
            .collect();

        let changed = order != self.order || hidden != self.hidden;
        self.order = order;
        self.hidden = hidden;
        changed
    }

    /// Show or hide a column. Returns true when the hidden set changed.
    pub fn set_visible(
        &mut self,
        definitions: &[ColumnDefinition<F>],
        field: &F,
        visible: bool,
    ) -> bool {
        let Some(def) = find_definition(definitions, field) else {
            return false;
        };

        if visible {
            self.hidden.remove(field)
        } else if def.always_visible {
            false
        } else {
            self.hidden.insert(field.clone())
        }
    }

    /// Swap a column with its neighbour in the order.
    ///
    /// Pinned columns never move and a free column never swaps with a
    /// pinned one. Returns true when the order changed.
    pub fn move_field(
        &mut self,
        definitions: &[ColumnDefinition<F>],
        field: &F,
        direction: MoveDirection,
    ) -> bool {
        match find_definition(definitions, field) {
            Some(def) if !def.is_pinned() => {}
            _ => return false,
        }

        let Some(index) = self.order.iter().position(|f| f == field) else {
            return false;
        };

        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.order.len() => index + 1,
            _ => return false,
        };

        let neighbour_pinned = find_definition(definitions, &self.order[target])
            .is_some_and(|def| def.is_pinned());
        if neighbour_pinned {
            return false;
        }

        self.order.swap(index, target);
        true
    }
}
