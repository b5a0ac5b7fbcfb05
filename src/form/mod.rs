//! # Resource configuration form
//!
//! Editable state for one resource while its form is open. Values are seeded
//! from the stored configuration or from the resource type's defaults, edited
//! field by field, validated at the configured trigger point, and written back
//! through [`ResourceStore`] on submit.
//!
//! Forms with a discriminator (the REST API `Authentication` field) keep only
//! the fields of the active branch. Switching branches drops the values of the
//! old branch and starts the new one from defaults.

pub mod field_list;
pub mod schema;

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::error::{EditorError, FieldError, Result};
use crate::resources::{ResourceConfig, ResourcePayload, ResourceStore, ResourceType};

use field_list::{FieldList, Param};
use schema::{FieldKind, FieldSpec, FieldValue, FormSchema};

/// When edited fields are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// When the user leaves a field.
    #[default]
    OnBlur,
    /// On every change.
    OnChange,
    /// Only when the form is submitted.
    OnSubmit,
}

#[derive(Debug, Clone)]
pub struct ConfigurationForm {
    schema: &'static FormSchema,
    resource_id: Option<String>,
    values: BTreeMap<&'static str, FieldValue>,
    errors: BTreeMap<&'static str, FieldError>,
    touched: BTreeSet<&'static str>,
    mode: ValidationMode,
    submit_attempted: bool,
}

impl ConfigurationForm {
    /// A form for a new resource of `resource_type`, filled with defaults.
    pub fn new(resource_type: ResourceType) -> Result<Self> {
        let defaults = resource_type.default_payload().to_config_object()?;
        Ok(Self::seeded(resource_type.schema(), None, &defaults))
    }

    /// A form editing `config`, filled with its stored values.
    pub fn edit(config: &ResourceConfig) -> Result<Self> {
        let stored = config.payload.to_config_object()?;
        Ok(Self::seeded(
            config.resource_type().schema(),
            Some(config.id.clone()),
            &stored,
        ))
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    fn seeded(
        schema: &'static FormSchema,
        resource_id: Option<String>,
        config: &Map<String, serde_json::Value>,
    ) -> Self {
        let branch = schema.discriminator.map(|discriminator| {
            schema
                .branch_in(config)
                .filter(|option| discriminator.accepts(option))
                .unwrap_or(discriminator.default)
        });

        let mut values = BTreeMap::new();
        for spec in schema.active_fields(branch) {
            let value = config
                .get(spec.name)
                .and_then(|stored| FieldValue::from_json(spec.kind, stored))
                .unwrap_or_else(|| FieldValue::default_for(spec.kind));
            values.insert(spec.name, value);
        }
        if let (Some(discriminator), Some(option)) = (schema.discriminator, branch) {
            values.insert(discriminator.field, FieldValue::Text(option.to_string()));
        }

        Self {
            schema,
            resource_id,
            values,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            mode: ValidationMode::default(),
            submit_attempted: false,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.schema.resource_type
    }

    /// Id of the resource being edited; `None` until a new resource is saved.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.resource_id.is_none()
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.value(field).and_then(FieldValue::as_text)
    }

    /// The selected discriminator option, if the schema has one.
    pub fn active_branch(&self) -> Option<&str> {
        let discriminator = self.schema.discriminator?;
        self.text(discriminator.field)
    }

    /// Fields to render, in schema order.
    pub fn visible_fields(&self) -> Vec<&'static str> {
        let branch = self.active_branch();
        self.schema
            .fields
            .iter()
            .filter(|spec| spec.is_active(branch))
            .map(|spec| spec.name)
            .collect()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// Current field errors, in schema order.
    pub fn errors(&self) -> Vec<&FieldError> {
        self.schema
            .fields
            .iter()
            .filter_map(|spec| self.errors.get(spec.name))
            .collect()
    }

    pub fn set_value(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let spec = self.active_spec(field)?;
        if value.kind() != spec.kind {
            return Err(EditorError::TypeMismatch {
                field: field.to_string(),
                expected: spec.kind.describe(),
            });
        }

        if self.schema.is_discriminator(field) {
            let option = value.as_text().unwrap_or_default().to_string();
            return self.switch_branch(&option);
        }

        self.values.insert(spec.name, value);
        self.after_change(spec);
        Ok(())
    }

    pub fn set_text(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        self.set_value(field, FieldValue::Text(value.into()))
    }

    pub fn set_toggle(&mut self, field: &str, value: bool) -> Result<()> {
        self.set_value(field, FieldValue::Toggle(value))
    }

    /// Mark `field` as left by the user and validate it in on-blur mode.
    pub fn blur(&mut self, field: &str) -> Result<Option<FieldError>> {
        let spec = self.active_spec(field)?;
        self.touched.insert(spec.name);
        if self.mode == ValidationMode::OnBlur || self.submit_attempted {
            return Ok(self.validate_field(spec));
        }
        Ok(self.errors.get(spec.name).cloned())
    }

    /// Select discriminator `option`. Values of every other branch are dropped
    /// and the fields of `option` start from their defaults.
    pub fn switch_branch(&mut self, option: &str) -> Result<()> {
        let schema = self.schema;
        let discriminator = schema.discriminator.ok_or_else(|| {
            EditorError::UnknownField(format!("discriminator of {}", schema.resource_type))
        })?;
        if !discriminator.accepts(option) {
            return Err(EditorError::InvalidOption {
                field: discriminator.field.to_string(),
                value: option.to_string(),
            });
        }
        if self.active_branch() == Some(option) {
            return Ok(());
        }

        let always_active =
            |name: &str| schema.field(name).is_none_or(|spec| spec.branch.is_none());
        self.values.retain(|name, _| always_active(*name));
        self.errors.retain(|name, _| always_active(*name));
        self.touched.retain(|name| always_active(*name));

        for spec in schema.fields.iter().filter(|spec| spec.branch == Some(option)) {
            self.values
                .insert(spec.name, FieldValue::default_for(spec.kind));
        }
        self.values
            .insert(discriminator.field, FieldValue::Text(option.to_string()));

        debug!("{} form switched {} to {option}", schema.resource_type, discriminator.field);
        Ok(())
    }

    pub fn list(&self, field: &str) -> Result<&FieldList> {
        let spec = self.active_spec(field)?;
        self.values
            .get(spec.name)
            .and_then(FieldValue::as_list)
            .ok_or_else(|| mismatch(field, FieldKind::KeyValueList))
    }

    pub fn insert_list_entry(&mut self, field: &str) -> Result<()> {
        self.list_mut(field)?.insert_default();
        Ok(())
    }

    pub fn remove_list_entry(&mut self, field: &str, index: usize) -> Result<Param> {
        self.list_mut(field)?.remove_at(index)
    }

    pub fn update_list_entry(&mut self, field: &str, index: usize, entry: Param) -> Result<()> {
        self.list_mut(field)?.update_at(index, entry)
    }

    pub fn tags(&self, field: &str) -> Result<&[String]> {
        let spec = self.active_spec(field)?;
        self.values
            .get(spec.name)
            .and_then(FieldValue::as_tags)
            .ok_or_else(|| mismatch(field, FieldKind::Tags))
    }

    /// Add `tag` unless it is already present.
    pub fn add_tag(&mut self, field: &str, tag: impl Into<String>) -> Result<()> {
        let tag = tag.into();
        let tags = self.tags_mut(field)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        Ok(())
    }

    pub fn remove_tag(&mut self, field: &str, tag: &str) -> Result<bool> {
        let tags = self.tags_mut(field)?;
        let before = tags.len();
        tags.retain(|existing| existing != tag);
        Ok(tags.len() != before)
    }

    /// Validate every active field and record the results.
    pub fn validate(&mut self) -> Vec<FieldError> {
        let schema = self.schema;
        let branch = self.active_branch().map(str::to_string);
        let mut errors = Vec::new();
        for spec in schema.active_fields(branch.as_deref()) {
            if let Some(error) = self.validate_field(spec) {
                errors.push(error);
            }
        }
        errors
    }

    /// Build the typed configuration from the active fields.
    pub fn to_payload(&self) -> Result<ResourcePayload> {
        let mut config = Map::new();
        for name in self.visible_fields() {
            if let Some(value) = self.values.get(name) {
                config.insert(name.to_string(), value.to_json());
            }
        }
        ResourcePayload::from_config_object(self.schema.resource_type, config)
    }

    /// Validate and save the form. Returns the resource id.
    ///
    /// On validation failure every failing field is reported and the store is
    /// left untouched.
    pub fn submit(&mut self, resources: &mut ResourceStore<'_>) -> Result<String> {
        self.submit_attempted = true;
        let errors = self.validate();
        if !errors.is_empty() {
            debug!("{} form rejected with {} error(s)", self.schema.resource_type, errors.len());
            return Err(EditorError::Validation(errors));
        }

        let payload = self.to_payload()?;
        match &self.resource_id {
            Some(id) => {
                resources.update(ResourceConfig::new(id.clone(), payload))?;
                Ok(id.clone())
            }
            None => {
                let id = resources.create(payload)?;
                self.resource_id = Some(id.clone());
                Ok(id)
            }
        }
    }

    fn active_spec(&self, field: &str) -> Result<&'static FieldSpec> {
        let schema: &'static FormSchema = self.schema;
        let spec = schema
            .field(field)
            .ok_or_else(|| EditorError::UnknownField(field.to_string()))?;
        if !spec.is_active(self.active_branch()) {
            return Err(EditorError::InactiveField(field.to_string()));
        }
        Ok(spec)
    }

    fn after_change(&mut self, spec: &FieldSpec) {
        if self.mode == ValidationMode::OnChange || self.submit_attempted {
            self.validate_field(spec);
        }
    }

    fn validate_field(&mut self, spec: &FieldSpec) -> Option<FieldError> {
        let error = self.values.get(spec.name).and_then(|value| spec.check(value));
        match &error {
            Some(error) => {
                self.errors.insert(spec.name, error.clone());
            }
            None => {
                self.errors.remove(spec.name);
            }
        }
        error
    }

    fn list_mut(&mut self, field: &str) -> Result<&mut FieldList> {
        let spec = self.active_spec(field)?;
        match self.values.get_mut(spec.name) {
            Some(FieldValue::List(list)) => Ok(list),
            _ => Err(mismatch(field, FieldKind::KeyValueList)),
        }
    }

    fn tags_mut(&mut self, field: &str) -> Result<&mut Vec<String>> {
        let spec = self.active_spec(field)?;
        match self.values.get_mut(spec.name) {
            Some(FieldValue::Tags(tags)) => Ok(tags),
            _ => Err(mismatch(field, FieldKind::Tags)),
        }
    }
}

fn mismatch(field: &str, kind: FieldKind) -> EditorError {
    EditorError::TypeMismatch {
        field: field.to_string(),
        expected: kind.describe(),
    }
}
