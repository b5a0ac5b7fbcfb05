//! Action editor engine.
//!
//! Action items are named units of work bound to configured resources. This
//! crate holds the state behind an action editor: the store and its typed
//! views, unique name generation, the schema-driven resource configuration
//! form, the editor panel controller, SQLite persistence, and the CLI that
//! drives them.

pub mod actions;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logger;
pub mod naming;
pub mod panel;
pub mod resources;
pub mod storage;
pub mod store;

pub use error::{EditorError, FieldError};
pub use store::{Store, StoreAction, WorkspaceState};
