//! # Resources
//!
//! Configured external connections that action items run against. Each
//! resource type owns its configuration struct and form schema; the stored
//! shape is `{ id, name, type, config }` with the configuration keys kept
//! verbatim.

pub mod mysql;
pub mod rest_api;

use std::fmt::{self, Display};
use std::str::FromStr;

use log::info;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{EditorError, EntityKind, FieldError, Result};
use crate::form::schema::FormSchema;
use crate::store::{Store, StoreAction};

use mysql::{MYSQL_SCHEMA, MySqlConfig};
use rest_api::{REST_API_SCHEMA, RestApiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "REST API")]
    RestApi,
    #[serde(rename = "MySQL")]
    MySql,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [ResourceType::RestApi, ResourceType::MySql];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::RestApi => "REST API",
            ResourceType::MySql => "MySQL",
        }
    }

    pub fn schema(self) -> &'static FormSchema {
        match self {
            ResourceType::RestApi => &REST_API_SCHEMA,
            ResourceType::MySql => &MYSQL_SCHEMA,
        }
    }

    pub fn default_payload(self) -> ResourcePayload {
        match self {
            ResourceType::RestApi => ResourcePayload::RestApi(RestApiConfig::default()),
            ResourceType::MySql => ResourcePayload::MySql(MySqlConfig::default()),
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = normalize_type_name(value);
        if wanted == "rest" {
            return Ok(ResourceType::RestApi);
        }
        ResourceType::ALL
            .into_iter()
            .find(|resource_type| normalize_type_name(resource_type.as_str()) == wanted)
            .ok_or_else(|| format!("unknown resource type `{value}`"))
    }
}

fn normalize_type_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Typed configuration of a resource, one variant per resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePayload {
    RestApi(RestApiConfig),
    MySql(MySqlConfig),
}

impl ResourcePayload {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourcePayload::RestApi(_) => ResourceType::RestApi,
            ResourcePayload::MySql(_) => ResourceType::MySql,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourcePayload::RestApi(config) => &config.name,
            ResourcePayload::MySql(config) => &config.name,
        }
    }

    /// The configuration as a JSON object with its stored keys.
    pub fn to_config_object(&self) -> Result<Map<String, Value>> {
        let value = match self {
            ResourcePayload::RestApi(config) => serde_json::to_value(config),
            ResourcePayload::MySql(config) => serde_json::to_value(config),
        }
        .map_err(|e| self.malformed(e.to_string()))?;

        match value {
            Value::Object(object) => Ok(object),
            _ => Err(self.malformed("configuration is not an object".to_string())),
        }
    }

    pub fn from_config_object(
        resource_type: ResourceType,
        config: Map<String, Value>,
    ) -> Result<Self> {
        let value = Value::Object(config);
        let malformed = |e: serde_json::Error| EditorError::MalformedConfig {
            resource_type: resource_type.to_string(),
            reason: e.to_string(),
        };
        match resource_type {
            ResourceType::RestApi => serde_json::from_value(value)
                .map(ResourcePayload::RestApi)
                .map_err(malformed),
            ResourceType::MySql => serde_json::from_value(value)
                .map(ResourcePayload::MySql)
                .map_err(malformed),
        }
    }

    /// Check the configuration against its type's schema.
    pub fn validate(&self) -> Result<()> {
        let object = self.to_config_object()?;
        let errors = self.resource_type().schema().validate_object(&object);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EditorError::Validation(errors))
        }
    }

    fn malformed(&self, reason: String) -> EditorError {
        EditorError::MalformedConfig {
            resource_type: self.resource_type().to_string(),
            reason,
        }
    }
}

/// A stored resource: identity plus typed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StoredResource")]
pub struct ResourceConfig {
    pub id: String,
    pub name: String,
    pub payload: ResourcePayload,
}

impl ResourceConfig {
    pub fn new(id: impl Into<String>, payload: ResourcePayload) -> Self {
        Self {
            id: id.into(),
            name: payload.name().to_string(),
            payload,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.payload.resource_type()
    }

    pub fn validate(&self) -> Result<()> {
        self.payload.validate()?;
        if self.name != self.payload.name() {
            return Err(EditorError::Validation(vec![FieldError::new(
                "Name",
                "does not match the resource name",
            )]));
        }
        Ok(())
    }
}

impl Serialize for ResourceConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResourceConfig", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.resource_type())?;
        match &self.payload {
            ResourcePayload::RestApi(config) => state.serialize_field("config", config)?,
            ResourcePayload::MySql(config) => state.serialize_field("config", config)?,
        }
        state.end()
    }
}

#[derive(Deserialize)]
struct StoredResource {
    id: String,
    name: String,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    config: Map<String, Value>,
}

impl TryFrom<StoredResource> for ResourceConfig {
    type Error = EditorError;

    fn try_from(stored: StoredResource) -> Result<Self> {
        let payload = ResourcePayload::from_config_object(stored.resource_type, stored.config)?;
        Ok(Self {
            id: stored.id,
            name: stored.name,
            payload,
        })
    }
}

/// Typed view over the resource list held by a [`Store`].
pub struct ResourceStore<'a> {
    store: &'a mut Store,
}

impl<'a> ResourceStore<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn list_all(&self) -> &[ResourceConfig] {
        &self.store.state().resources
    }

    pub fn find(&self, id: &str) -> Option<&ResourceConfig> {
        self.list_all().iter().find(|resource| resource.id == id)
    }

    pub fn add(&mut self, config: ResourceConfig) -> Result<()> {
        self.store.dispatch(StoreAction::AddResource(config))
    }

    /// Store a new resource under a freshly generated id and return the id.
    pub fn create(&mut self, payload: ResourcePayload) -> Result<String> {
        let id = self.store.next_id();
        let config = ResourceConfig::new(id.clone(), payload);
        self.add(config)?;
        info!("Created resource {id}");
        Ok(id)
    }

    /// Replace a stored resource. Fails if the id is no longer present.
    pub fn update(&mut self, config: ResourceConfig) -> Result<()> {
        if self.find(&config.id).is_none() {
            return Err(EditorError::not_found(EntityKind::Resource, config.id));
        }
        self.store.dispatch(StoreAction::UpdateResource(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BasicAuth, RestAuth};
    use crate::store::SequentialIds;
    use serde_json::json;

    fn rest_payload(name: &str) -> ResourcePayload {
        ResourcePayload::RestApi(RestApiConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn test_store() -> Store {
        Store::new().with_id_generator(Box::new(SequentialIds::new("res")))
    }

    #[test]
    fn parses_resource_type_labels() {
        assert_eq!("REST API".parse::<ResourceType>(), Ok(ResourceType::RestApi));
        assert_eq!("rest-api".parse::<ResourceType>(), Ok(ResourceType::RestApi));
        assert_eq!("MySQL".parse::<ResourceType>(), Ok(ResourceType::MySql));
        assert!("graphql".parse::<ResourceType>().is_err());
    }

    #[test]
    fn serializes_type_tagged_shape() {
        let config = ResourceConfig::new(
            "r1",
            ResourcePayload::RestApi(RestApiConfig {
                name: "Users".into(),
                authentication: RestAuth::Basic(BasicAuth {
                    username: "u".into(),
                    password: "p".into(),
                }),
                ..Default::default()
            }),
        );
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["id"], json!("r1"));
        assert_eq!(value["name"], json!("Users"));
        assert_eq!(value["type"], json!("REST API"));
        assert_eq!(value["config"]["Authentication"], json!("basic"));
        assert_eq!(value["config"]["BasicAuthUsername"], json!("u"));

        let parsed: ResourceConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_config_that_does_not_fit_its_type() {
        let stored = json!({
            "id": "r1",
            "name": "orders",
            "type": "MySQL",
            "config": {"Name": "orders", "SSL": "yes"}
        });
        assert!(serde_json::from_value::<ResourceConfig>(stored).is_err());
    }

    #[test]
    fn create_assigns_id_and_lists_in_order() {
        let mut store = test_store();
        let mut resources = ResourceStore::new(&mut store);

        let first = resources.create(rest_payload("Users")).unwrap();
        let second = resources.create(rest_payload("Billing")).unwrap();

        assert_eq!(first, "res-1");
        assert_eq!(second, "res-2");
        let names: Vec<&str> = resources.list_all().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Users", "Billing"]);
        assert_eq!(resources.find(&first).unwrap().resource_type(), ResourceType::RestApi);
    }

    #[test]
    fn add_rejects_invalid_payload_without_mutation() {
        let mut store = test_store();
        let mut resources = ResourceStore::new(&mut store);

        let err = resources.add(ResourceConfig::new("r1", rest_payload(""))).unwrap_err();

        assert_eq!(err.field_errors()[0].field, "Name");
        assert!(resources.list_all().is_empty());
    }

    #[test]
    fn update_of_missing_id_is_not_found() {
        let mut store = test_store();
        let mut resources = ResourceStore::new(&mut store);

        let err = resources
            .update(ResourceConfig::new("gone", rest_payload("Users")))
            .unwrap_err();

        assert_eq!(err, EditorError::not_found(EntityKind::Resource, "gone"));
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = test_store();
        let mut resources = ResourceStore::new(&mut store);
        let id = resources.create(rest_payload("Users")).unwrap();
        resources.create(rest_payload("Billing")).unwrap();

        resources
            .update(ResourceConfig::new(id.clone(), rest_payload("Customers")))
            .unwrap();

        assert_eq!(resources.list_all()[0].id, id);
        assert_eq!(resources.list_all()[0].name, "Customers");
        assert_eq!(resources.list_all().len(), 2);
    }
}
