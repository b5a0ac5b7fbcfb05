use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// A single key/value row, e.g. one URL parameter or one header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// Ordered, user-editable key/value rows.
///
/// The list always holds at least one entry so the form has a row to type
/// into. Blank rows are kept as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Param>", into = "Vec<Param>")]
pub struct FieldList {
    entries: Vec<Param>,
}

impl FieldList {
    pub fn new() -> Self {
        Self {
            entries: vec![Param::default()],
        }
    }

    pub fn entries(&self) -> &[Param] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the last row is blanked instead of removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.entries.iter()
    }

    /// Entries with a key or a value filled in.
    pub fn filled(&self) -> impl Iterator<Item = &Param> {
        self.entries.iter().filter(|entry| !entry.is_blank())
    }

    /// Append a blank row.
    pub fn insert_default(&mut self) {
        self.entries.push(Param::default());
    }

    /// Remove the row at `index` and return it. Removing the only row leaves
    /// a single blank row behind.
    pub fn remove_at(&mut self, index: usize) -> Result<Param> {
        self.check_index(index)?;
        if self.entries.len() == 1 {
            return Ok(std::mem::take(&mut self.entries[0]));
        }
        Ok(self.entries.remove(index))
    }

    pub fn update_at(&mut self, index: usize, entry: Param) -> Result<()> {
        self.check_index(index)?;
        self.entries[index] = entry;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

impl Default for FieldList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Param>> for FieldList {
    fn from(mut entries: Vec<Param>) -> Self {
        if entries.is_empty() {
            entries.push(Param::default());
        }
        Self { entries }
    }
}

impl From<FieldList> for Vec<Param> {
    fn from(list: FieldList) -> Self {
        list.entries
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_list_has_one_blank_row() {
        let list = FieldList::new();
        assert_eq!(list.len(), 1);
        assert!(list.entries()[0].is_blank());
    }

    #[test]
    fn remove_last_row_leaves_blank_row() {
        let mut list = FieldList::from(vec![Param::new("page", "1")]);
        let removed = list.remove_at(0).unwrap();

        assert_eq!(removed, Param::new("page", "1"));
        assert_eq!(list.len(), 1);
        assert!(list.entries()[0].is_blank());
        assert!(!list.is_empty());
    }

    #[test]
    fn remove_keeps_order_of_remaining_rows() {
        let mut list = FieldList::from(vec![
            Param::new("a", "1"),
            Param::new("b", "2"),
            Param::new("c", "3"),
        ]);
        list.remove_at(1).unwrap();
        let keys: Vec<&str> = list.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn insert_default_appends_blank_row() {
        let mut list = FieldList::from(vec![Param::new("a", "1")]);
        list.insert_default();
        assert_eq!(list.len(), 2);
        assert!(list.entries()[1].is_blank());
        assert_eq!(list.filled().count(), 1);
    }

    #[test]
    fn update_and_remove_reject_out_of_range_index() {
        let mut list = FieldList::new();
        assert_eq!(
            list.update_at(3, Param::new("k", "v")),
            Err(EditorError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(list.remove_at(1).is_err());
        assert!(list.entries()[0].is_blank());
    }

    #[test]
    fn empty_array_deserializes_to_one_blank_row() {
        let list: FieldList = serde_json::from_str("[]").unwrap();
        assert_eq!(list, FieldList::new());
    }

    #[test]
    fn serializes_as_ordered_key_value_array() {
        let list = FieldList::from(vec![Param::new("Accept", "application/json"), Param::default()]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"key": "Accept", "value": "application/json"},
                {"key": "", "value": ""}
            ])
        );
    }
}
