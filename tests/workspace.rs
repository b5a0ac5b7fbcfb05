use clap::Parser;

use action_editor::actions::ActionItem;
use action_editor::cli::{self, Cli, CommandOutput, OutputFormat};
use action_editor::error::EditorError;
use action_editor::form::ValidationMode;
use action_editor::storage;
use action_editor::store::{Store, WorkspaceState};

/// Run one CLI invocation against the database at `db`, saving afterwards.
fn invoke(db: &std::path::Path, args: &[&str]) -> anyhow::Result<CommandOutput> {
    let cli = Cli::try_parse_from(std::iter::once("action-editor").chain(args.iter().copied()))?;
    let mut conn = storage::open_db(db)?;
    let mut store = Store::try_with_state(storage::load_workspace(&conn)?)?;

    let output = cli::execute(&mut store, cli.command, ValidationMode::OnBlur)?;
    storage::save_workspace(&mut conn, store.state())?;
    Ok(output)
}

#[test]
fn test_commands_persist_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("workspace.db");

    invoke(&db, &["action", "create", "query"]).unwrap();
    let CommandOutput::Resource(resource) = invoke(
        &db,
        &[
            "resource",
            "rest",
            "--name",
            "Users",
            "--base-url",
            "https://api.example.com",
            "--param",
            "page=1",
        ],
    )
    .unwrap() else {
        panic!("expected a resource");
    };
    let CommandOutput::ActionItems(items) = invoke(&db, &["action", "list"]).unwrap() else {
        panic!("expected action items");
    };
    invoke(&db, &["action", "bind", items[0].id.as_str(), resource.id.as_str()]).unwrap();

    let conn = storage::open_db(&db).unwrap();
    let workspace = storage::load_workspace(&conn).unwrap();
    assert_eq!(workspace.action_items.len(), 1);
    assert_eq!(workspace.action_items[0].resource_id.as_deref(), Some(resource.id.as_str()));
    assert_eq!(workspace.resources, vec![resource]);
}

#[test]
fn test_failed_command_leaves_database_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("workspace.db");
    invoke(&db, &["action", "create", "query"]).unwrap();

    assert!(invoke(&db, &["action", "delete", "missing"]).is_err());
    assert!(invoke(&db, &["resource", "mysql", "--host", "db"]).is_err());

    let conn = storage::open_db(&db).unwrap();
    let workspace = storage::load_workspace(&conn).unwrap();
    assert_eq!(workspace.action_items.len(), 1);
    assert!(workspace.resources.is_empty());
}

#[test]
fn test_corrupt_workspace_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("workspace.db");
    let mut conn = storage::open_db(&db).unwrap();
    let state = WorkspaceState {
        action_items: vec![
            ActionItem::new("a", "query", "query1"),
            ActionItem::new("b", "query", "query1"),
        ],
        resources: Vec::new(),
    };
    storage::save_workspace(&mut conn, &state).unwrap();

    let loaded = storage::load_workspace(&conn).unwrap();
    let err = Store::try_with_state(loaded).unwrap_err();
    assert_eq!(err, EditorError::DuplicateName("query1".into()));

    let err = invoke(&db, &["action", "list"]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<EditorError>(),
        Some(&EditorError::DuplicateName("query1".into()))
    );
}

#[test]
fn test_json_output_uses_stored_shape() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("workspace.db");

    let output = invoke(
        &db,
        &["resource", "mysql", "--name", "orders", "--host", "db.internal"],
    )
    .unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&output.render(OutputFormat::Json).unwrap()).unwrap();

    assert_eq!(json["type"], "MySQL");
    assert_eq!(json["config"]["Port"], "3306");
    assert_eq!(json["config"]["SSL"], false);
}
