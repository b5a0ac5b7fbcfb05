//! # Action editor panel
//!
//! Controller behind the action editor: which action item is active, which
//! resource form is open, and what happens when the user picks a menu entry.
//! The UI sends a [`PanelMessage`] to [`update`] and renders the resulting
//! state; it never touches the store directly.

use log::{debug, info};

use crate::actions::TriggerMode;
use crate::error::{EditorError, EntityKind, Result};
use crate::form::{ConfigurationForm, ValidationMode};
use crate::resources::ResourceType;
use crate::store::Store;

/// Resource editing session.
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle { selected: Option<String> },
    Editing(Box<ConfigurationForm>),
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    state: SessionState,
    validation_mode: ValidationMode,
}

impl EditorSession {
    pub fn new(validation_mode: ValidationMode) -> Self {
        Self {
            state: SessionState::Idle { selected: None },
            validation_mode,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing(_))
    }

    pub fn form(&self) -> Option<&ConfigurationForm> {
        match &self.state {
            SessionState::Editing(form) => Some(&**form),
            SessionState::Idle { .. } => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut ConfigurationForm> {
        match &mut self.state {
            SessionState::Editing(form) => Some(&mut **form),
            SessionState::Idle { .. } => None,
        }
    }

    /// Resource last saved or selected while idle.
    pub fn selected(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle { selected } => selected.as_deref(),
            SessionState::Editing(form) => form.resource_id(),
        }
    }

    /// Open a blank form. Any unsaved form is discarded.
    pub fn create(&mut self, resource_type: ResourceType) -> Result<()> {
        self.discard_unsaved();
        let form = ConfigurationForm::new(resource_type)?.with_validation_mode(self.validation_mode);
        self.state = SessionState::Editing(Box::new(form));
        Ok(())
    }

    /// Open the stored resource `id`. Any unsaved form is discarded.
    pub fn edit(&mut self, store: &Store, id: &str) -> Result<()> {
        let config = store
            .state()
            .resource(id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Resource, id))?;
        let form = ConfigurationForm::edit(config)?.with_validation_mode(self.validation_mode);
        self.discard_unsaved();
        self.state = SessionState::Editing(Box::new(form));
        Ok(())
    }

    /// Submit the open form. On success the session goes idle with the saved
    /// resource selected; on failure it stays in editing with field errors.
    pub fn submit(&mut self, store: &mut Store) -> Result<String> {
        let form = self.form_mut().ok_or(EditorError::NoActiveSession)?;
        let id = form.submit(&mut store.resources())?;
        self.state = SessionState::Idle {
            selected: Some(id.clone()),
        };
        Ok(id)
    }

    /// Close the form without saving.
    pub fn close(&mut self) {
        self.discard_unsaved();
        let selected = self.selected().map(str::to_string);
        self.state = SessionState::Idle { selected };
    }

    fn discard_unsaved(&self) {
        if let Some(form) = self.form() {
            debug!(
                "Discarding unsaved {} form ({})",
                form.resource_type(),
                form.resource_id().unwrap_or("new")
            );
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelMessage {
    ActionItemSelected(Option<String>),
    DuplicatePressed,
    DeletePressed,
    RenameSubmitted(String),
    TriggerSelected(TriggerMode),
    ResourceSelected(Option<String>),
    CreateResourcePressed(ResourceType),
    EditResourcePressed,
    ResourceFormClosed,
    ResourceFormSubmitted,
}

/// What the surrounding UI should react to after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    None,
    ActionItemDuplicated(String),
    ActionItemDeleted(String),
    ResourceFormOpened,
    ResourceFormClosed,
    ResourceSaved(String),
}

#[derive(Debug, Clone, Default)]
pub struct ActionEditorPanel {
    active_action_item_id: Option<String>,
    session: EditorSession,
}

impl ActionEditorPanel {
    pub fn new(validation_mode: ValidationMode) -> Self {
        Self {
            active_action_item_id: None,
            session: EditorSession::new(validation_mode),
        }
    }

    pub fn active_action_item_id(&self) -> Option<&str> {
        self.active_action_item_id.as_deref()
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    fn require_active(&self, store: &Store) -> Result<String> {
        let id = self
            .active_action_item_id
            .clone()
            .ok_or(EditorError::NoActiveActionItem)?;
        if store.state().action_item(&id).is_none() {
            return Err(EditorError::not_found(EntityKind::ActionItem, id));
        }
        Ok(id)
    }
}

pub fn update(
    panel: &mut ActionEditorPanel,
    store: &mut Store,
    message: PanelMessage,
) -> Result<PanelEvent> {
    match message {
        PanelMessage::ActionItemSelected(id) => {
            if let Some(id) = &id {
                if store.state().action_item(id).is_none() {
                    return Err(EditorError::not_found(EntityKind::ActionItem, id));
                }
            }
            panel.active_action_item_id = id;
            Ok(PanelEvent::None)
        }
        PanelMessage::DuplicatePressed => {
            let source = panel.require_active(store)?;
            let id = store.action_items().duplicate(&source)?;
            panel.active_action_item_id = Some(id.clone());
            Ok(PanelEvent::ActionItemDuplicated(id))
        }
        PanelMessage::DeletePressed => {
            let id = panel.require_active(store)?;
            store.action_items().remove(&id)?;
            panel.active_action_item_id = None;
            Ok(PanelEvent::ActionItemDeleted(id))
        }
        PanelMessage::RenameSubmitted(name) => {
            let id = panel.require_active(store)?;
            store.action_items().rename(&id, name)?;
            Ok(PanelEvent::None)
        }
        PanelMessage::TriggerSelected(trigger) => {
            let id = panel.require_active(store)?;
            store.action_items().set_trigger(&id, trigger)?;
            Ok(PanelEvent::None)
        }
        PanelMessage::ResourceSelected(resource_id) => {
            let id = panel.require_active(store)?;
            store
                .action_items()
                .bind_resource(&id, resource_id.as_deref())?;
            Ok(PanelEvent::None)
        }
        PanelMessage::CreateResourcePressed(resource_type) => {
            panel.session.create(resource_type)?;
            Ok(PanelEvent::ResourceFormOpened)
        }
        PanelMessage::EditResourcePressed => {
            let id = panel.require_active(store)?;
            let resource_id = store
                .state()
                .action_item(&id)
                .and_then(|item| item.resource_id.clone())
                .ok_or_else(|| EditorError::NoResourceSelected(id.clone()))?;
            panel.session.edit(store, &resource_id)?;
            Ok(PanelEvent::ResourceFormOpened)
        }
        PanelMessage::ResourceFormClosed => {
            panel.session.close();
            Ok(PanelEvent::ResourceFormClosed)
        }
        PanelMessage::ResourceFormSubmitted => {
            let id = panel.session.submit(store)?;
            info!("Saved resource {id}");
            Ok(PanelEvent::ResourceSaved(id))
        }
    }
}
