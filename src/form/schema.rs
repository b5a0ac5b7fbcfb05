//! Field schemas describing what a resource configuration form contains.

use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::resources::ResourceType;

use super::field_list::FieldList;

pub const ERROR_REQUIRED_MESSAGE: &str = "this field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Toggle,
    KeyValueList,
    Tags,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Toggle => "a boolean",
            FieldKind::KeyValueList => "a key/value list",
            FieldKind::Tags => "a list of tags",
        }
    }
}

/// Extra format constraint for text fields. Empty values always pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    Digits,
}

impl TextRule {
    fn check(self, value: &str) -> Option<&'static str> {
        match self {
            TextRule::Digits if !value.chars().all(|c| c.is_ascii_digit()) => {
                Some("must contain only digits")
            }
            TextRule::Digits => None,
        }
    }
}

/// The in-memory value of one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Toggle(bool),
    List(FieldList),
    Tags(Vec<String>),
}

impl FieldValue {
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Toggle => FieldValue::Toggle(false),
            FieldKind::KeyValueList => FieldValue::List(FieldList::new()),
            FieldKind::Tags => FieldValue::Tags(Vec::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Toggle(_) => FieldKind::Toggle,
            FieldValue::List(_) => FieldKind::KeyValueList,
            FieldValue::Tags(_) => FieldKind::Tags,
        }
    }

    /// Read a stored JSON value as `kind`. Returns `None` when the shapes disagree.
    pub fn from_json(kind: FieldKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (FieldKind::Text, Value::String(text)) => Some(FieldValue::Text(text.clone())),
            (FieldKind::Toggle, Value::Bool(flag)) => Some(FieldValue::Toggle(*flag)),
            (FieldKind::KeyValueList, Value::Array(_)) => serde_json::from_value(value.clone())
                .ok()
                .map(FieldValue::List),
            (FieldKind::Tags, Value::Array(_)) => serde_json::from_value(value.clone())
                .ok()
                .map(FieldValue::Tags),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Toggle(flag) => Value::Bool(*flag),
            FieldValue::List(list) => Value::Array(
                list.iter()
                    .map(|param| {
                        let mut entry = Map::new();
                        entry.insert("key".to_string(), Value::String(param.key.clone()));
                        entry.insert("value".to_string(), Value::String(param.value.clone()));
                        Value::Object(entry)
                    })
                    .collect(),
            ),
            FieldValue::Tags(tags) => {
                Value::Array(tags.iter().cloned().map(Value::String).collect())
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&FieldList> {
        match self {
            FieldValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&[String]> {
        match self {
            FieldValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
    pub rule: Option<TextRule>,
    /// Discriminator option that activates this field. `None` means always active.
    pub branch: Option<&'static str>,
}

impl FieldSpec {
    const fn of(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            max_len: None,
            rule: None,
            branch: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::of(name, FieldKind::Text)
    }

    pub const fn toggle(name: &'static str) -> Self {
        Self::of(name, FieldKind::Toggle)
    }

    pub const fn list(name: &'static str) -> Self {
        Self::of(name, FieldKind::KeyValueList)
    }

    pub const fn tags(name: &'static str) -> Self {
        Self::of(name, FieldKind::Tags)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub const fn rule(mut self, rule: TextRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub const fn branch(mut self, option: &'static str) -> Self {
        self.branch = Some(option);
        self
    }

    pub fn is_active(&self, active_branch: Option<&str>) -> bool {
        match self.branch {
            None => true,
            Some(option) => active_branch == Some(option),
        }
    }

    /// Check `value` against this field's constraints.
    pub fn check(&self, value: &FieldValue) -> Option<FieldError> {
        let text = value.as_text()?;

        if self.required && text.is_empty() {
            return Some(FieldError::new(self.name, ERROR_REQUIRED_MESSAGE));
        }
        if let Some(max_len) = self.max_len {
            if text.chars().count() > max_len {
                return Some(FieldError::new(
                    self.name,
                    format!("must be at most {max_len} characters"),
                ));
            }
        }
        if text.is_empty() {
            return None;
        }
        self.rule
            .and_then(|rule| rule.check(text))
            .map(|message| FieldError::new(self.name, message))
    }
}

/// A field whose value selects which branch of fields is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminator {
    pub field: &'static str,
    pub options: &'static [&'static str],
    pub default: &'static str,
}

impl Discriminator {
    pub fn accepts(&self, option: &str) -> bool {
        self.options.contains(&option)
    }
}

#[derive(Debug)]
pub struct FormSchema {
    pub resource_type: ResourceType,
    pub fields: &'static [FieldSpec],
    pub discriminator: Option<Discriminator>,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn is_discriminator(&self, name: &str) -> bool {
        self.discriminator
            .is_some_and(|discriminator| discriminator.field == name)
    }

    pub fn active_fields<'s>(
        &'s self,
        active_branch: Option<&'s str>,
    ) -> impl Iterator<Item = &'s FieldSpec> + 's {
        self.fields
            .iter()
            .filter(move |spec| spec.is_active(active_branch))
    }

    /// Active branch named by a stored configuration object.
    pub fn branch_in<'v>(&self, config: &'v Map<String, Value>) -> Option<&'v str> {
        let discriminator = self.discriminator?;
        config.get(discriminator.field).and_then(Value::as_str)
    }

    /// Validate a stored configuration object against the active fields.
    pub fn validate_object(&self, config: &Map<String, Value>) -> Vec<FieldError> {
        let active_branch = self.branch_in(config);
        let mut errors = Vec::new();

        if let (Some(discriminator), Some(option)) = (self.discriminator, active_branch) {
            if !discriminator.accepts(option) {
                errors.push(FieldError::new(
                    discriminator.field,
                    format!("`{option}` is not a valid option"),
                ));
            }
        }

        for spec in self.active_fields(active_branch) {
            let value = config
                .get(spec.name)
                .and_then(|value| FieldValue::from_json(spec.kind, value))
                .unwrap_or_else(|| FieldValue::default_for(spec.kind));
            if let Some(error) = spec.check(&value) {
                errors.push(error);
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_text_rejects_empty_value() {
        let spec = FieldSpec::text("Name").required();
        let error = spec.check(&FieldValue::Text(String::new())).unwrap();
        assert_eq!(error.field, "Name");
        assert_eq!(error.message, ERROR_REQUIRED_MESSAGE);
        assert!(spec.check(&FieldValue::Text("Users DB".into())).is_none());
    }

    #[test]
    fn max_len_counts_characters() {
        let spec = FieldSpec::text("Name").max_len(3);
        assert!(spec.check(&FieldValue::Text("äöü".into())).is_none());
        let error = spec.check(&FieldValue::Text("abcd".into())).unwrap();
        assert_eq!(error.message, "must be at most 3 characters");
    }

    #[test]
    fn digits_rule_skips_empty_value() {
        let spec = FieldSpec::text("Port").rule(TextRule::Digits);
        assert!(spec.check(&FieldValue::Text(String::new())).is_none());
        assert!(spec.check(&FieldValue::Text("3306".into())).is_none());
        assert!(spec.check(&FieldValue::Text("33o6".into())).is_some());
    }

    #[test]
    fn branch_fields_are_only_active_for_their_option() {
        let spec = FieldSpec::text("BasicAuthUsername").branch("basic");
        assert!(spec.is_active(Some("basic")));
        assert!(!spec.is_active(Some("OAuth2")));
        assert!(!spec.is_active(None));
        assert!(FieldSpec::text("Name").is_active(Some("basic")));
    }

    #[test]
    fn json_shape_mismatch_is_rejected() {
        assert_eq!(FieldValue::from_json(FieldKind::Toggle, &json!("yes")), None);
        assert_eq!(
            FieldValue::from_json(FieldKind::Tags, &json!(["a", "b"])),
            Some(FieldValue::Tags(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn list_value_converts_back_to_the_stored_shape() {
        let stored = json!([{"key": "page", "value": "1"}]);
        let value = FieldValue::from_json(FieldKind::KeyValueList, &stored).unwrap();
        assert_eq!(value.to_json(), stored);
    }
}
