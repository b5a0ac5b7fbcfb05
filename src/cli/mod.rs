//! # Command-line front end
//!
//! Drives the action editor from the shell. Action commands go through the
//! panel reducer; resource commands fill a configuration form field by field
//! and submit it, so the CLI sees the same validation as any other editor.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::actions::{ActionItem, TriggerMode};
use crate::auth::AuthMode;
use crate::error::{EditorError, EntityKind};
use crate::form::field_list::{FieldList, Param};
use crate::form::schema::FieldValue;
use crate::form::{ConfigurationForm, ValidationMode};
use crate::panel::{self, ActionEditorPanel, PanelEvent, PanelMessage};
use crate::resources::{ResourceConfig, ResourceType};
use crate::store::Store;

#[derive(Debug, Parser)]
#[command(name = "action-editor")]
#[command(version)]
#[command(about = "Manage action items and the resources they run against")]
pub struct Cli {
    /// Config file (defaults to <config dir>/action-editor/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace database, overriding the configured path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage action items
    Action {
        #[command(subcommand)]
        command: ActionCommand,
    },
    /// Manage resources
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ActionCommand {
    /// List action items in order
    List,
    /// Add an action item with a generated name
    Create {
        /// Action type, e.g. "query"
        kind: String,
    },
    /// Copy an action item's type into a new item
    Duplicate { id: String },
    Rename { id: String, name: String },
    Delete { id: String },
    /// Bind an action item to a resource, or clear the binding
    Bind {
        id: String,
        resource_id: Option<String>,
    },
    /// Choose when an action item runs
    Trigger {
        id: String,
        #[arg(value_enum)]
        mode: TriggerArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TriggerArg {
    Manual,
    Automatic,
}

impl From<TriggerArg> for TriggerMode {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::Manual => TriggerMode::Manual,
            TriggerArg::Automatic => TriggerMode::Automatic,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    List,
    Show { id: String },
    /// Create or update a REST API resource
    Rest(RestArgs),
    /// Create or update a MySQL resource
    Mysql(MySqlArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    None,
    Basic,
    #[value(name = "oauth2")]
    OAuth2,
}

impl From<AuthArg> for AuthMode {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::None => AuthMode::None,
            AuthArg::Basic => AuthMode::Basic,
            AuthArg::OAuth2 => AuthMode::OAuth2,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct RestArgs {
    /// Existing resource to update; omit to create one
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    /// URL parameter as KEY=value (repeatable, replaces the list)
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
    /// Header as KEY=value (repeatable, replaces the list)
    #[arg(long = "header", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,
    /// Extra body value as KEY=value (repeatable, replaces the list)
    #[arg(long = "body-value", value_parser = parse_key_val)]
    pub body_values: Vec<(String, String)>,
    /// Cookie name to forward (repeatable, replaces the list)
    #[arg(long = "cookie")]
    pub cookies: Vec<String>,
    #[arg(long)]
    pub forward_all_cookies: Option<bool>,
    #[arg(long, value_enum)]
    pub auth: Option<AuthArg>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub client_id: Option<String>,
    #[arg(long)]
    pub client_secret: Option<String>,
    #[arg(long)]
    pub authorization_url: Option<String>,
    #[arg(long)]
    pub access_token_url: Option<String>,
    #[arg(long)]
    pub scopes: Option<String>,
    #[arg(long)]
    pub audience: Option<String>,
    #[arg(long)]
    pub client_credentials: Option<bool>,
}

#[derive(Debug, Default, Args)]
pub struct MySqlArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub database_name: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub ssl: Option<bool>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    ActionItems(Vec<ActionItem>),
    ActionItem(ActionItem),
    Resources(Vec<ResourceConfig>),
    Resource(ResourceConfig),
    Message { message: String },
}

impl CommandOutput {
    fn message(message: impl Into<String>) -> Self {
        CommandOutput::Message {
            message: message.into(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize command output")
            }
            OutputFormat::Text => self.render_text(),
        }
    }

    fn render_text(&self) -> Result<String> {
        let text = match self {
            CommandOutput::ActionItems(items) if items.is_empty() => "No action items".to_string(),
            CommandOutput::ActionItems(items) => items
                .iter()
                .map(action_line)
                .collect::<Vec<_>>()
                .join("\n"),
            CommandOutput::ActionItem(item) => action_line(item),
            CommandOutput::Resources(resources) if resources.is_empty() => {
                "No resources".to_string()
            }
            CommandOutput::Resources(resources) => resources
                .iter()
                .map(resource_line)
                .collect::<Vec<_>>()
                .join("\n"),
            CommandOutput::Resource(resource) => {
                let config = resource
                    .payload
                    .to_config_object()
                    .context("Failed to read resource configuration")?;
                let config = serde_json::to_string_pretty(&config)
                    .context("Failed to serialize resource configuration")?;
                format!("{}\n{config}", resource_line(resource))
            }
            CommandOutput::Message { message } => message.clone(),
        };
        Ok(text)
    }
}

fn action_line(item: &ActionItem) -> String {
    let status = serde_json::to_value(item.status)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    let trigger = match item.trigger {
        TriggerMode::Manual => "manual",
        TriggerMode::Automatic => "automatic",
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        item.id,
        item.name,
        item.kind,
        status,
        trigger,
        item.resource_id.as_deref().unwrap_or("-")
    )
}

fn resource_line(resource: &ResourceConfig) -> String {
    format!("{}\t{}\t{}", resource.id, resource.name, resource.resource_type())
}

pub fn execute(store: &mut Store, command: Command, mode: ValidationMode) -> Result<CommandOutput> {
    let mut panel = ActionEditorPanel::new(mode);
    match command {
        Command::Action { command } => execute_action(&mut panel, store, command),
        Command::Resource { command } => execute_resource(&mut panel, store, command),
    }
}

fn execute_action(
    panel: &mut ActionEditorPanel,
    store: &mut Store,
    command: ActionCommand,
) -> Result<CommandOutput> {
    let id = match command {
        ActionCommand::List => {
            return Ok(CommandOutput::ActionItems(store.state().action_items.clone()));
        }
        ActionCommand::Create { kind } => store.action_items().create(&kind)?,
        ActionCommand::Duplicate { id } => {
            select(panel, store, &id)?;
            match panel::update(panel, store, PanelMessage::DuplicatePressed)? {
                PanelEvent::ActionItemDuplicated(copy) => copy,
                _ => id,
            }
        }
        ActionCommand::Rename { id, name } => {
            select(panel, store, &id)?;
            panel::update(panel, store, PanelMessage::RenameSubmitted(name))?;
            id
        }
        ActionCommand::Delete { id } => {
            select(panel, store, &id)?;
            let name = store
                .state()
                .action_item(&id)
                .map(|item| item.name.clone())
                .unwrap_or_default();
            panel::update(panel, store, PanelMessage::DeletePressed)?;
            return Ok(CommandOutput::message(format!(
                "Deleted action item {name} ({id})"
            )));
        }
        ActionCommand::Bind { id, resource_id } => {
            select(panel, store, &id)?;
            panel::update(panel, store, PanelMessage::ResourceSelected(resource_id))?;
            id
        }
        ActionCommand::Trigger { id, mode } => {
            select(panel, store, &id)?;
            panel::update(panel, store, PanelMessage::TriggerSelected(mode.into()))?;
            id
        }
    };

    let item = store
        .state()
        .action_item(&id)
        .cloned()
        .ok_or_else(|| EditorError::not_found(EntityKind::ActionItem, id))?;
    Ok(CommandOutput::ActionItem(item))
}

fn select(panel: &mut ActionEditorPanel, store: &mut Store, id: &str) -> Result<()> {
    panel::update(
        panel,
        store,
        PanelMessage::ActionItemSelected(Some(id.to_string())),
    )?;
    Ok(())
}

fn execute_resource(
    panel: &mut ActionEditorPanel,
    store: &mut Store,
    command: ResourceCommand,
) -> Result<CommandOutput> {
    match command {
        ResourceCommand::List => Ok(CommandOutput::Resources(store.state().resources.clone())),
        ResourceCommand::Show { id } => {
            let resource = store
                .state()
                .resource(&id)
                .cloned()
                .ok_or_else(|| EditorError::not_found(EntityKind::Resource, id))?;
            Ok(CommandOutput::Resource(resource))
        }
        ResourceCommand::Rest(args) => {
            open_form(panel, store, ResourceType::RestApi, args.id.as_deref())?;
            if let Some(form) = panel.session_mut().form_mut() {
                fill_rest_form(form, args)?;
            }
            submit_form(panel, store)
        }
        ResourceCommand::Mysql(args) => {
            open_form(panel, store, ResourceType::MySql, args.id.as_deref())?;
            if let Some(form) = panel.session_mut().form_mut() {
                fill_mysql_form(form, args)?;
            }
            submit_form(panel, store)
        }
    }
}

fn open_form(
    panel: &mut ActionEditorPanel,
    store: &mut Store,
    resource_type: ResourceType,
    id: Option<&str>,
) -> Result<()> {
    match id {
        Some(id) => {
            let existing = store
                .state()
                .resource(id)
                .map(ResourceConfig::resource_type)
                .ok_or_else(|| EditorError::not_found(EntityKind::Resource, id))?;
            if existing != resource_type {
                anyhow::bail!("resource `{id}` is a {existing} resource, not {resource_type}");
            }
            panel.session_mut().edit(store, id)?;
        }
        None => {
            panel::update(panel, store, PanelMessage::CreateResourcePressed(resource_type))?;
        }
    }
    Ok(())
}

fn submit_form(panel: &mut ActionEditorPanel, store: &mut Store) -> Result<CommandOutput> {
    let id = match panel::update(panel, store, PanelMessage::ResourceFormSubmitted)? {
        PanelEvent::ResourceSaved(id) => id,
        other => anyhow::bail!("resource form was not saved: {other:?}"),
    };
    let resource = store
        .state()
        .resource(&id)
        .cloned()
        .ok_or_else(|| EditorError::not_found(EntityKind::Resource, id))?;
    Ok(CommandOutput::Resource(resource))
}

fn set_text(form: &mut ConfigurationForm, field: &str, value: Option<String>) -> Result<()> {
    if let Some(value) = value {
        form.set_text(field, value)?;
    }
    Ok(())
}

fn set_toggle(form: &mut ConfigurationForm, field: &str, value: Option<bool>) -> Result<()> {
    if let Some(value) = value {
        form.set_toggle(field, value)?;
    }
    Ok(())
}

fn set_list(form: &mut ConfigurationForm, field: &str, pairs: Vec<(String, String)>) -> Result<()> {
    if !pairs.is_empty() {
        let params: Vec<Param> = pairs.into_iter().map(|(k, v)| Param::new(k, v)).collect();
        form.set_value(field, FieldValue::List(FieldList::from(params)))?;
    }
    Ok(())
}

fn fill_rest_form(form: &mut ConfigurationForm, args: RestArgs) -> Result<()> {
    if let Some(auth) = args.auth {
        form.switch_branch(AuthMode::from(auth).as_str())?;
    }

    set_text(form, "Name", args.name)?;
    set_text(form, "BaseURL", args.base_url)?;
    set_list(form, "URLParameters", args.params)?;
    set_list(form, "Headers", args.headers)?;
    set_list(form, "ExtraBodyValues", args.body_values)?;
    if !args.cookies.is_empty() {
        form.set_value("CookiesToForward", FieldValue::Tags(Vec::new()))?;
        for cookie in args.cookies {
            form.add_tag("CookiesToForward", cookie)?;
        }
    }
    set_toggle(form, "ForwardAllCookies", args.forward_all_cookies)?;

    set_text(form, "BasicAuthUsername", args.username)?;
    set_text(form, "BasicAuthPassword", args.password)?;

    set_toggle(form, "UseClientCredentialsAuth", args.client_credentials)?;
    set_text(form, "OAuth2ClientID", args.client_id)?;
    set_text(form, "OAuth2ClientSecret", args.client_secret)?;
    set_text(form, "OAuth2AuthorizationURL", args.authorization_url)?;
    set_text(form, "OAuth2AccessTokenURL", args.access_token_url)?;
    set_text(form, "OAuth2Scopes", args.scopes)?;
    set_text(form, "OAuth2Audience", args.audience)?;
    Ok(())
}

fn fill_mysql_form(form: &mut ConfigurationForm, args: MySqlArgs) -> Result<()> {
    set_text(form, "Name", args.name)?;
    set_text(form, "Host", args.host)?;
    set_text(form, "Port", args.port)?;
    set_text(form, "DatabaseName", args.database_name)?;
    set_text(form, "DatabaseUsername", args.username)?;
    set_text(form, "DatabasePassword", args.password)?;
    set_toggle(form, "SSL", args.ssl)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourcePayload;
    use crate::store::SequentialIds;

    fn test_store() -> Store {
        Store::new().with_id_generator(Box::new(SequentialIds::new("id")))
    }

    fn run(store: &mut Store, args: &[&str]) -> Result<CommandOutput> {
        let cli = Cli::try_parse_from(std::iter::once("action-editor").chain(args.iter().copied()))?;
        execute(store, cli.command, ValidationMode::OnBlur)
    }

    #[test]
    fn parse_key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "action-editor",
            "action",
            "list",
            "--output",
            "json",
            "--database",
            "/tmp/w.db",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/w.db")));
    }

    #[test]
    fn duplicate_command_returns_the_copy() {
        let mut store = test_store();
        run(&mut store, &["action", "create", "query"]).unwrap();

        let output = run(&mut store, &["action", "duplicate", "id-1"]).unwrap();

        let CommandOutput::ActionItem(item) = output else {
            panic!("expected an action item");
        };
        assert_eq!(item.id, "id-2");
        assert_eq!(item.name, "query2");
    }

    #[test]
    fn rest_command_creates_resource_with_basic_auth() {
        let mut store = test_store();

        run(
            &mut store,
            &[
                "resource",
                "rest",
                "--name",
                "Users",
                "--base-url",
                "https://api.example.com",
                "--header",
                "Accept=application/json",
                "--auth",
                "basic",
                "--username",
                "admin",
            ],
        )
        .unwrap();

        let resource = &store.state().resources[0];
        let ResourcePayload::RestApi(config) = &resource.payload else {
            panic!("expected a REST API resource");
        };
        assert_eq!(resource.name, "Users");
        assert_eq!(config.headers.entries()[0], Param::new("Accept", "application/json"));
        assert_eq!(config.authentication.mode(), AuthMode::Basic);
    }

    #[test]
    fn rest_command_without_name_fails_validation() {
        let mut store = test_store();

        let err = run(&mut store, &["resource", "rest", "--base-url", "x"]).unwrap_err();

        assert!(err.to_string().contains("Name"));
        assert!(store.state().resources.is_empty());
    }

    #[test]
    fn credentials_for_inactive_auth_mode_are_rejected() {
        let mut store = test_store();

        let err = run(
            &mut store,
            &["resource", "rest", "--name", "Users", "--client-id", "abc"],
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<EditorError>(),
            Some(&EditorError::InactiveField("OAuth2ClientID".into()))
        );
    }

    #[test]
    fn mysql_update_keeps_unspecified_fields() {
        let mut store = test_store();
        run(
            &mut store,
            &["resource", "mysql", "--name", "orders", "--host", "db", "--port", "3307"],
        )
        .unwrap();

        run(&mut store, &["resource", "mysql", "--id", "id-1", "--ssl", "true"]).unwrap();

        let ResourcePayload::MySql(config) = &store.state().resources[0].payload else {
            panic!("expected a MySQL resource");
        };
        assert_eq!(config.port, "3307");
        assert!(config.ssl);
        assert_eq!(store.state().resources.len(), 1);
    }

    #[test]
    fn text_output_lists_items() {
        let mut store = test_store();
        run(&mut store, &["action", "create", "query"]).unwrap();

        let output = run(&mut store, &["action", "list"]).unwrap();

        assert_eq!(
            output.render(OutputFormat::Text).unwrap(),
            "id-1\tquery1\tquery\tnone\tmanual\t-"
        );
    }
}
