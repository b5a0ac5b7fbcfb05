use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::actions::ActionItem;
use crate::resources::ResourceConfig;
use crate::store::WorkspaceState;

pub const ACTION_ITEMS_KEY: &str = "action_items";

const DATA_DIR: &str = "action-editor";
const DATABASE_FILE: &str = "workspace.db";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to encode or decode stored JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to prepare data directory `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine the user data directory")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR).join(DATABASE_FILE))
        .ok_or(StorageError::NoDataDir)
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    init_schema(&conn)?;
    debug!("Opened workspace database {}", path.display());
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS app_state (
         state_key TEXT PRIMARY KEY,
         state_json TEXT NOT NULL,
         updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
       );
       CREATE TABLE IF NOT EXISTS resource_configs (
         resource_id TEXT PRIMARY KEY,
         position INTEGER NOT NULL,
         name TEXT NOT NULL,
         resource_type TEXT NOT NULL,
         config_json TEXT NOT NULL,
         updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
       );",
    )?;
    Ok(())
}

/// Replace everything stored with `state` in one transaction.
pub fn save_workspace(conn: &mut Connection, state: &WorkspaceState) -> Result<()> {
    let items_json = serde_json::to_string(&state.action_items)?;

    let tx = conn.transaction()?;
    upsert_state(&tx, ACTION_ITEMS_KEY, &items_json)?;
    tx.execute("DELETE FROM resource_configs;", [])?;
    for (position, resource) in state.resources.iter().enumerate() {
        upsert_resource(&tx, position, resource)?;
    }
    tx.commit()?;

    debug!(
        "Saved {} action items and {} resources",
        state.action_items.len(),
        state.resources.len()
    );
    Ok(())
}

/// Load the stored workspace. An empty database yields an empty workspace.
pub fn load_workspace(conn: &Connection) -> Result<WorkspaceState> {
    let action_items: Vec<ActionItem> = match load_state(conn, ACTION_ITEMS_KEY)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };

    let mut stmt = conn.prepare(
        "SELECT resource_id, name, resource_type, config_json
         FROM resource_configs ORDER BY position;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredRow {
            id: row.get(0)?,
            name: row.get(1)?,
            resource_type: row.get(2)?,
            config_json: row.get(3)?,
        })
    })?;

    let mut resources = Vec::new();
    for row in rows {
        resources.push(row?.into_config()?);
    }

    Ok(WorkspaceState {
        action_items,
        resources,
    })
}

pub fn upsert_resource(conn: &Connection, position: usize, resource: &ResourceConfig) -> Result<()> {
    let stored = serde_json::to_value(resource)?;
    let config_json = serde_json::to_string(&stored["config"])?;
    conn.execute(
        "INSERT INTO resource_configs
         (resource_id, position, name, resource_type, config_json, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, strftime('%s','now'))
       ON CONFLICT(resource_id)
       DO UPDATE SET
         position = excluded.position,
         name = excluded.name,
         resource_type = excluded.resource_type,
         config_json = excluded.config_json,
         updated_at = excluded.updated_at;",
        params![
            resource.id,
            position as i64,
            resource.name,
            resource.resource_type().as_str(),
            config_json
        ],
    )?;
    Ok(())
}

pub fn load_resource(conn: &Connection, id: &str) -> Result<Option<ResourceConfig>> {
    let row = conn
        .query_row(
            "SELECT resource_id, name, resource_type, config_json
             FROM resource_configs WHERE resource_id = ?1 LIMIT 1;",
            params![id],
            |row| {
                Ok(StoredRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    resource_type: row.get(2)?,
                    config_json: row.get(3)?,
                })
            },
        )
        .optional()?;
    row.map(StoredRow::into_config).transpose()
}

fn upsert_state(conn: &Connection, key: &str, state_json: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (state_key, state_json, updated_at)
       VALUES (?1, ?2, strftime('%s','now'))
       ON CONFLICT(state_key)
       DO UPDATE SET
         state_json = excluded.state_json,
         updated_at = excluded.updated_at;",
        params![key, state_json],
    )?;
    Ok(())
}

fn load_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let raw = conn
        .query_row(
            "SELECT state_json FROM app_state WHERE state_key = ?1 LIMIT 1;",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw)
}

struct StoredRow {
    id: String,
    name: String,
    resource_type: String,
    config_json: String,
}

impl StoredRow {
    // Reassembles the `{ id, name, type, config }` document ResourceConfig decodes.
    fn into_config(self) -> Result<ResourceConfig> {
        let config: serde_json::Value = serde_json::from_str(&self.config_json)?;
        let stored = serde_json::json!({
            "id": self.id,
            "name": self.name,
            "type": self.resource_type,
            "config": config,
        });
        Ok(serde_json::from_value(stored)?)
    }
}
