use clap::{Args, Subcommand};
use serde_json::Value;

use miniworld_core::state::apply_updates;
use miniworld_core::store::{ProjectId, ProjectStore};
use miniworld_core::ProjectState;

use super::{parse_updates, to_value};
use crate::input;
use crate::store::{JsonFileStore, DEFAULT_STORE_DIR};

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,

    /// Directory holding saved projects
    #[arg(long, default_value = DEFAULT_STORE_DIR, global = true)]
    pub store_dir: String,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Save the reference project as a new project
    Init {
        #[arg(long)]
        name: Option<String>,
    },
    /// Print a saved project
    Show {
        /// Project id
        id: String,
    },
    /// Apply updates to a saved project and save it
    Update {
        /// Project id
        id: String,
        /// Update as JSON; repeat to apply several in order
        #[arg(long = "set", value_name = "UPDATE", required = true)]
        updates: Vec<String>,
    },
    /// Save a project file (or piped JSON) as a new project, or over an existing one
    Save {
        /// Path to a JSON or YAML project file
        #[arg(long)]
        input: Option<String>,
        /// Overwrite this project instead of creating one
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Restore the most recently updated project
    Load,
    /// List saved projects, newest first
    List,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = JsonFileStore::open(&args.store_dir)?;

    match args.command {
        ProjectCommand::Init { name } => {
            let id = store.save(None, name.as_deref(), &ProjectState::default())?;
            show(&store, &id)
        }
        ProjectCommand::Show { id } => show(&store, &ProjectId::from(id.as_str())),
        ProjectCommand::Update { id, updates } => {
            let id = ProjectId::from(id.as_str());
            let current = store
                .load(&id)?
                .ok_or_else(|| format!("Project not found: {id}"))?;
            let next = apply_updates(&current.data, parse_updates(&updates)?)?;
            store.save(Some(&id), None, &next)?;
            show(&store, &id)
        }
        ProjectCommand::Save { input, id, name } => {
            let state: ProjectState = if let Some(ref path) = input {
                input::file::read_document(path)?
            } else if let Some(data) = input::stdin::read_stdin()? {
                serde_json::from_value(data)?
            } else {
                return Err("--input <file> or stdin required to save a project".into());
            };
            let id = id.map(|s| ProjectId::from(s.as_str()));
            let saved = store.save(id.as_ref(), name.as_deref(), &state)?;
            show(&store, &saved)
        }
        ProjectCommand::Load => {
            let latest = store.load_latest()?.ok_or("No saved projects")?;
            to_value(&latest)
        }
        ProjectCommand::List => to_value(&store.list()?),
    }
}

fn show(store: &JsonFileStore, id: &ProjectId) -> Result<Value, Box<dyn std::error::Error>> {
    let project = store
        .load(id)?
        .ok_or_else(|| format!("Project not found: {id}"))?;
    to_value(&project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn args(dir: &tempfile::TempDir, command: ProjectCommand) -> ProjectArgs {
        ProjectArgs {
            command,
            store_dir: dir.path().to_string_lossy().into_owned(),
        }
    }

    #[test]
    fn test_init_update_load() {
        let dir = tempfile::tempdir().unwrap();

        let created = run_project(args(&dir, ProjectCommand::Init { name: Some("Main St".into()) })).unwrap();
        assert_eq!(created["id"], "p1");
        assert_eq!(created["name"], "Main St");

        let updated = run_project(args(
            &dir,
            ProjectCommand::Update {
                id: "p1".into(),
                updates: vec![
                    r#"{"group":"tenant","update":{"action":"set_sf","id":"1","sf":"5000"}}"#.into(),
                ],
            },
        ))
        .unwrap();
        let sf = updated["data"]["tenants"][0]["sf"].as_str().unwrap();
        assert_eq!(Decimal::from_str(sf).unwrap(), Decimal::from(5000));

        let latest = run_project(args(&dir, ProjectCommand::Load)).unwrap();
        assert_eq!(latest["id"], "p1");

        let listing = run_project(args(&dir, ProjectCommand::List)).unwrap();
        assert_eq!(listing.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_update_unknown_tenant_is_error() {
        let dir = tempfile::tempdir().unwrap();
        run_project(args(&dir, ProjectCommand::Init { name: None })).unwrap();

        let result = run_project(args(
            &dir,
            ProjectCommand::Update {
                id: "p1".into(),
                updates: vec![r#"{"group":"tenant","update":{"action":"remove","id":"99"}}"#.into()],
            },
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_project(args(&dir, ProjectCommand::Load)).is_err());
        assert!(run_project(args(&dir, ProjectCommand::Show { id: "p1".into() })).is_err());
    }
}
