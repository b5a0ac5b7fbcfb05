use std::cell::Cell;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use action_editor::cli::{self, Cli};
use action_editor::config::Config;
use action_editor::store::{Store, WorkspaceState};
use action_editor::{logger, storage};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    logger::init(&config.logging)?;

    let db_path = match cli.database {
        Some(path) => path,
        None => config.database_path()?,
    };
    let mut conn = storage::open_db(&db_path)
        .with_context(|| format!("Failed to open workspace database: {}", db_path.display()))?;
    let workspace = storage::load_workspace(&conn).context("Failed to load workspace")?;

    let mut store = Store::try_with_state(workspace).context("Stored workspace is invalid")?;
    let changed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&changed);
    store.subscribe(Box::new(move |_: &WorkspaceState| flag.set(true)));

    let output = cli::execute(&mut store, cli.command, config.editor.validation_mode)?;

    if changed.get() {
        storage::save_workspace(&mut conn, store.state()).context("Failed to save workspace")?;
        info!("Saved workspace to {}", db_path.display());
    }

    println!("{}", output.render(cli.output)?);
    Ok(())
}
