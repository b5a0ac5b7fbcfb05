//! # Workspace store
//!
//! A single state container for action items and resources. Every mutation
//! goes through [`Store::dispatch`], which checks the action against the
//! current state before applying it; a rejected action leaves the state and
//! subscribers untouched.

use std::collections::HashSet;
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::{ActionItem, ActionItemStore, TriggerMode};
use crate::error::{EditorError, EntityKind, FieldError, Result};
use crate::resources::{ResourceConfig, ResourceStore};

/// Source of ids for new action items and resources.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Predictable `prefix-1`, `prefix-2`, ... ids.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Snapshot of everything the action editor persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl WorkspaceState {
    pub fn action_item(&self, id: &str) -> Option<&ActionItem> {
        self.action_items.iter().find(|item| item.id == id)
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    /// Check a snapshot from outside the reducer, e.g. one read from disk.
    ///
    /// Ids and action item names must be unique, every resource must fit its
    /// schema, and every binding must point at a stored resource.
    pub fn validate(&self) -> Result<()> {
        let mut resource_ids = HashSet::new();
        for resource in &self.resources {
            if !resource_ids.insert(resource.id.as_str()) {
                return Err(EditorError::DuplicateId {
                    kind: EntityKind::Resource,
                    id: resource.id.clone(),
                });
            }
            resource.validate()?;
        }

        let mut item_ids = HashSet::new();
        let mut names = HashSet::new();
        for item in &self.action_items {
            if !item_ids.insert(item.id.as_str()) {
                return Err(EditorError::DuplicateId {
                    kind: EntityKind::ActionItem,
                    id: item.id.clone(),
                });
            }
            if !names.insert(item.name.as_str()) {
                return Err(EditorError::DuplicateName(item.name.clone()));
            }
            if let Some(resource_id) = &item.resource_id {
                if !resource_ids.contains(resource_id.as_str()) {
                    return Err(EditorError::not_found(EntityKind::Resource, resource_id));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    AddActionItem(ActionItem),
    RemoveActionItem(String),
    RenameActionItem { id: String, name: String },
    SetActionTrigger { id: String, trigger: TriggerMode },
    BindResource { id: String, resource_id: Option<String> },
    AddResource(ResourceConfig),
    UpdateResource(ResourceConfig),
}

pub type Listener = Box<dyn FnMut(&WorkspaceState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct Store {
    state: WorkspaceState,
    ids: Box<dyn IdGenerator>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(WorkspaceState::default())
    }

    /// Wrap a snapshot that did not come through [`Store::dispatch`],
    /// rejecting it if it breaks any store invariant.
    pub fn try_with_state(state: WorkspaceState) -> Result<Self> {
        state.validate()?;
        Ok(Self::with_state(state))
    }

    pub fn with_state(state: WorkspaceState) -> Self {
        Self {
            state,
            ids: Box::new(UuidGenerator),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn next_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Apply `action` and notify subscribers. Nothing changes on error.
    pub fn dispatch(&mut self, action: StoreAction) -> Result<()> {
        if let Err(err) = reduce(&mut self.state, action) {
            warn!("Store action rejected: {err}");
            return Err(err);
        }
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        Ok(())
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn action_items(&mut self) -> ActionItemStore<'_> {
        ActionItemStore::new(self)
    }

    pub fn resources(&mut self) -> ResourceStore<'_> {
        ResourceStore::new(self)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn reduce(state: &mut WorkspaceState, action: StoreAction) -> Result<()> {
    match action {
        StoreAction::AddActionItem(item) => {
            if state.action_items.iter().any(|existing| existing.id == item.id) {
                return Err(EditorError::DuplicateId {
                    kind: EntityKind::ActionItem,
                    id: item.id,
                });
            }
            check_name_free(state, &item.name, None)?;
            info!("Added action item {} ({})", item.name, item.id);
            state.action_items.push(item);
        }
        StoreAction::RemoveActionItem(id) => {
            let index = action_index(state, &id)?;
            let removed = state.action_items.remove(index);
            info!("Removed action item {} ({})", removed.name, removed.id);
        }
        StoreAction::RenameActionItem { id, name } => {
            let index = action_index(state, &id)?;
            if name.is_empty() {
                return Err(EditorError::Validation(vec![FieldError::new(
                    "name",
                    crate::form::schema::ERROR_REQUIRED_MESSAGE,
                )]));
            }
            check_name_free(state, &name, Some(&id))?;
            info!("Renamed action item {id} to {name}");
            state.action_items[index].name = name;
        }
        StoreAction::SetActionTrigger { id, trigger } => {
            let index = action_index(state, &id)?;
            state.action_items[index].trigger = trigger;
        }
        StoreAction::BindResource { id, resource_id } => {
            let index = action_index(state, &id)?;
            if let Some(resource_id) = &resource_id {
                if state.resource(resource_id).is_none() {
                    return Err(EditorError::not_found(EntityKind::Resource, resource_id));
                }
            }
            state.action_items[index].resource_id = resource_id;
        }
        StoreAction::AddResource(config) => {
            if state.resource(&config.id).is_some() {
                return Err(EditorError::DuplicateId {
                    kind: EntityKind::Resource,
                    id: config.id,
                });
            }
            config.validate()?;
            info!("Added resource {} ({})", config.name, config.id);
            state.resources.push(config);
        }
        StoreAction::UpdateResource(config) => {
            let index = state
                .resources
                .iter()
                .position(|resource| resource.id == config.id)
                .ok_or_else(|| EditorError::not_found(EntityKind::Resource, &config.id))?;
            let stored_type = state.resources[index].resource_type();
            if stored_type != config.resource_type() {
                return Err(EditorError::ResourceTypeChanged {
                    id: config.id.clone(),
                    from: stored_type.to_string(),
                    to: config.resource_type().to_string(),
                });
            }
            config.validate()?;
            info!("Updated resource {} ({})", config.name, config.id);
            state.resources[index] = config;
        }
    }
    Ok(())
}

fn action_index(state: &WorkspaceState, id: &str) -> Result<usize> {
    state
        .action_items
        .iter()
        .position(|item| item.id == id)
        .ok_or_else(|| EditorError::not_found(EntityKind::ActionItem, id))
}

fn check_name_free(state: &WorkspaceState, name: &str, except_id: Option<&str>) -> Result<()> {
    let taken = state
        .action_items
        .iter()
        .any(|item| item.name == name && Some(item.id.as_str()) != except_id);
    if taken {
        return Err(EditorError::DuplicateName(name.to_string()));
    }
    Ok(())
}
