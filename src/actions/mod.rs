//! # Action items
//!
//! Named units of work bound to a resource. Names are unique across the
//! whole list; new names come from [`crate::naming`].

use std::fmt::{self, Display};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EntityKind, Result};
use crate::naming::next_name_for;
use crate::store::{Store, StoreAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    #[default]
    None,
    Warning,
    /// Waiting for a health check result.
    Pending,
}

/// When an action item runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    #[default]
    Manual,
    Automatic,
}

impl Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TriggerMode::Manual => "Run action only when manually triggered",
            TriggerMode::Automatic => "Run action automatically when inputs change",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub trigger: TriggerMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl ActionItem {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            status: ActionStatus::None,
            trigger: TriggerMode::Manual,
            resource_id: None,
        }
    }
}

/// Typed view over the action item list held by a [`Store`].
pub struct ActionItemStore<'a> {
    store: &'a mut Store,
}

impl<'a> ActionItemStore<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn list(&self) -> &[ActionItem] {
        &self.store.state().action_items
    }

    pub fn find(&self, id: &str) -> Option<&ActionItem> {
        self.store.state().action_item(id)
    }

    /// Append `item`. Fails if its name is already taken.
    pub fn add(&mut self, item: ActionItem) -> Result<()> {
        self.store.dispatch(StoreAction::AddActionItem(item))
    }

    /// Add a new item of `kind` with a generated name and return its id.
    pub fn create(&mut self, kind: &str) -> Result<String> {
        let name = next_name_for(self.list(), kind);
        let id = self.store.next_id();
        self.add(ActionItem::new(id.clone(), kind, name))?;
        Ok(id)
    }

    /// Remove the item with `id` and return it. A missing id is reported as
    /// [`EditorError::NotFound`] and leaves the list unchanged.
    pub fn remove(&mut self, id: &str) -> Result<ActionItem> {
        let item = self
            .find(id)
            .cloned()
            .ok_or_else(|| EditorError::not_found(EntityKind::ActionItem, id))?;
        self.store
            .dispatch(StoreAction::RemoveActionItem(id.to_string()))?;
        Ok(item)
    }

    /// Copy the type of item `id` into a new, uniquely named item whose status
    /// is pending. Returns the new id.
    pub fn duplicate(&mut self, id: &str) -> Result<String> {
        let kind = self
            .find(id)
            .map(|source| source.kind.clone())
            .ok_or_else(|| EditorError::not_found(EntityKind::ActionItem, id))?;

        let name = next_name_for(self.list(), &kind);
        let new_id = self.store.next_id();
        let mut item = ActionItem::new(new_id.clone(), kind, name);
        item.status = ActionStatus::Pending;
        self.add(item)?;

        info!("Duplicated action item {id} as {new_id}");
        Ok(new_id)
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        self.store.dispatch(StoreAction::RenameActionItem {
            id: id.to_string(),
            name: name.into(),
        })
    }

    pub fn set_trigger(&mut self, id: &str, trigger: TriggerMode) -> Result<()> {
        self.store.dispatch(StoreAction::SetActionTrigger {
            id: id.to_string(),
            trigger,
        })
    }

    /// Point item `id` at a resource, or clear the binding with `None`.
    pub fn bind_resource(&mut self, id: &str, resource_id: Option<&str>) -> Result<()> {
        self.store.dispatch(StoreAction::BindResource {
            id: id.to_string(),
            resource_id: resource_id.map(str::to_string),
        })
    }
}
