use serde::{Deserialize, Serialize};

use crate::form::schema::{FieldSpec, FormSchema, TextRule};

use super::ResourceType;
use super::rest_api::TEXT_MAX_LEN;

pub const DEFAULT_PORT: &str = "3306";

/// Connection settings of a MySQL resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySqlConfig {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Host", default)]
    pub host: String,
    #[serde(rename = "Port", default = "default_port")]
    pub port: String,
    #[serde(rename = "DatabaseName", default)]
    pub database_name: String,
    #[serde(rename = "DatabaseUsername", default)]
    pub database_username: String,
    #[serde(rename = "DatabasePassword", default)]
    pub database_password: String,
    #[serde(rename = "SSL", default)]
    pub ssl: bool,
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: String::new(),
            port: default_port(),
            database_name: String::new(),
            database_username: String::new(),
            database_password: String::new(),
            ssl: false,
        }
    }
}

pub static MYSQL_SCHEMA: FormSchema = FormSchema {
    resource_type: ResourceType::MySql,
    fields: &[
        FieldSpec::text("Name").required().max_len(TEXT_MAX_LEN),
        FieldSpec::text("Host").required(),
        FieldSpec::text("Port").rule(TextRule::Digits),
        FieldSpec::text("DatabaseName"),
        FieldSpec::text("DatabaseUsername"),
        FieldSpec::text("DatabasePassword"),
        FieldSpec::toggle("SSL"),
    ],
    discriminator: None,
};
