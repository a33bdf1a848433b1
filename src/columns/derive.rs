use std::collections::HashSet;

use super::definition::{pin_lookup, pinned_fields, ColumnDefinition, ColumnField, Pinned};
use super::state::ColumnState;

/// Column sequences computed from state and definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedColumns<F> {
    /// Every column: start-pinned, then user order, then end-pinned
    pub effective_order: Vec<F>,

    /// `effective_order` without hidden columns
    pub visible: Vec<F>,
}

impl<F> Default for DerivedColumns<F> {
    fn default() -> Self {
        Self {
            effective_order: Vec::new(),
            visible: Vec::new(),
        }
    }
}

/// Compute the effective order and visible columns.
///
/// Pinned zones always come from the definitions, so a pinned field that
/// sits in the middle of `order` still lands in its zone.
pub fn derive_columns<F: ColumnField>(
    state: &ColumnState<F>,
    definitions: &[ColumnDefinition<F>],
) -> DerivedColumns<F> {
    let in_order: HashSet<&F> = state.order().iter().collect();
    let pins = pin_lookup(definitions);

    let start = pinned_fields(definitions, Pinned::Start)
        .into_iter()
        .filter(|field| in_order.contains(field));
    let middle = state
        .order()
        .iter()
        .filter(|field| !pins.get(*field).is_some_and(Pinned::is_pinned))
        .cloned();
    let end = pinned_fields(definitions, Pinned::End)
        .into_iter()
        .filter(|field| in_order.contains(field));

    let effective_order: Vec<F> = start.chain(middle).chain(end).collect();
    let visible = effective_order
        .iter()
        .filter(|field| !state.is_hidden(field))
        .cloned()
        .collect();

    DerivedColumns {
        effective_order,
        visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_zones_from_unsanitized_order() {
        let defs = vec![
            ColumnDefinition::new("a", "A").pinned_start(),
            ColumnDefinition::new("b", "B"),
            ColumnDefinition::new("c", "C"),
            ColumnDefinition::new("d", "D").pinned_end(),
            ColumnDefinition::new("e", "E").pinned_start(),
        ];
        let state = ColumnState::new(vec!["d", "c", "e", "b", "a"], HashSet::from(["b"]));

        let derived = derive_columns(&state, &defs);
        assert_eq!(derived.effective_order, vec!["a", "e", "c", "b", "d"]);
        assert_eq!(derived.visible, vec!["a", "e", "c", "d"]);
    }

    #[test]
    fn test_fields_without_definition_stay_in_middle() {
        let defs = vec![ColumnDefinition::new("a", "A").pinned_end()];
        let state = ColumnState::new(vec!["a", "x"], HashSet::new());

        let derived = derive_columns(&state, &defs);
        assert_eq!(derived.effective_order, vec!["x", "a"]);
    }
}
