//! Unique names for new action items.
//!
//! Names are the item type followed by a numeric suffix (`query1`, `query2`,
//! ...). Numbering starts after the number of items that already share the
//! type and moves forward to the first suffix nobody has taken.

use std::collections::HashSet;

use crate::actions::ActionItem;

/// Generate a name for a new item of `kind` that is absent from `existing_names`.
///
/// The first candidate is `kind` + `existing_count_for_type + 1`. Suffixes are
/// never omitted and never start at zero.
pub fn generate_name(
    kind: &str,
    existing_names: &HashSet<String>,
    existing_count_for_type: usize,
) -> String {
    let start = existing_count_for_type + 1;

    // Of `existing_names.len() + 1` consecutive suffixes at least one is free.
    for suffix in start..start + existing_names.len() {
        let candidate = format!("{kind}{suffix}");
        if !existing_names.contains(&candidate) {
            return candidate;
        }
    }

    format!("{kind}{}", start + existing_names.len())
}

/// Generate the next free name for `kind` given the current action items.
pub fn next_name_for(items: &[ActionItem], kind: &str) -> String {
    let names: HashSet<String> = items.iter().map(|item| item.name.clone()).collect();
    let count = items.iter().filter(|item| item.kind == kind).count();
    generate_name(kind, &names, count)
}
