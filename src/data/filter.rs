use std::collections::{BTreeMap, BTreeSet};

use super::model::{Selection, Table, Value};

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of accepted values.
pub type FilterState = BTreeMap<String, BTreeSet<Value>>;

/// Initialise a [`FilterState`] with all values accepted (i.e., select everyone).
pub fn init_filter_state(table: &Table) -> FilterState {
    table
        .unique_values
        .iter()
        .map(|(col, vals)| (col.clone(), vals.clone()))
        .collect()
}

/// Return the selection of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The column is not present in `filters` → passes (no constraint)
/// * The filter set for that column is empty → nothing accepted → fails
/// * The row's value for that column is in the accepted set → passes
pub fn filtered_selection(table: &Table, filters: &FilterState) -> Selection {
    // Only columns with an effective restriction need a per-row check.
    let mut active = Vec::new();
    for (col, accepted) in filters {
        if accepted.is_empty() {
            return Selection::default();
        }
        if let Some(all_vals) = table.unique_values.get(col) {
            if accepted.len() == all_vals.len() {
                continue; // everything accepted, no filtering needed
            }
        }
        if let Ok(column) = table.column(col) {
            active.push((column, accepted));
        }
    }

    (0..table.len())
        .filter(|&row| {
            active
                .iter()
                .all(|(column, accepted)| accepted.contains(&column.values[row]))
        })
        .collect()
}
