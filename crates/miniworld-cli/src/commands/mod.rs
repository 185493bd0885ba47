pub mod analysis;
pub mod project;

use clap::Args;
use serde_json::Value;

use miniworld_core::state::apply_updates;
use miniworld_core::store::{ProjectId, ProjectStore};
use miniworld_core::{ProjectState, ProjectUpdate};

use crate::input;
use crate::store::{JsonFileStore, DEFAULT_STORE_DIR};

/// Where a command gets its project from.
#[derive(Args)]
pub struct ProjectSourceArgs {
    /// Path to a JSON or YAML project file
    #[arg(long)]
    pub input: Option<String>,

    /// Id of a saved project
    #[arg(long, conflicts_with = "input")]
    pub project: Option<String>,

    /// Directory holding saved projects
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    pub store_dir: String,

    /// Field update applied before computing, as JSON
    /// (e.g. '{"group":"capital","update":{"field":"interest_rate","value":"6.5"}}')
    #[arg(long = "set", value_name = "UPDATE")]
    pub updates: Vec<String>,
}

/// Resolve the project: `--input`, piped stdin, `--project`, else the
/// reference project. `--set` updates are applied on top.
pub fn resolve_state(args: &ProjectSourceArgs) -> Result<ProjectState, Box<dyn std::error::Error>> {
    let base: ProjectState = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(ref id) = args.project {
        let store = JsonFileStore::open(&args.store_dir)?;
        store
            .load(&ProjectId::from(id.as_str()))?
            .ok_or_else(|| format!("Project not found: {id}"))?
            .data
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        tracing::debug!("no project given, using the reference project");
        ProjectState::default()
    };

    let updates = parse_updates(&args.updates)?;
    Ok(apply_updates(&base, updates)?)
}

pub fn parse_updates(raw: &[String]) -> Result<Vec<ProjectUpdate>, Box<dyn std::error::Error>> {
    raw.iter()
        .map(|s| {
            serde_json::from_str::<ProjectUpdate>(s)
                .map_err(|e| Box::<dyn std::error::Error>::from(format!("Invalid update '{s}': {e}")))
        })
        .collect()
}

pub fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(value)?)
}
