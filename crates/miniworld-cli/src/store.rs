//! File-backed project store: one pretty-printed JSON document per project
//! under a store directory.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use miniworld_core::store::{
    sort_newest_first, ProjectId, ProjectStore, ProjectSummary, StoredProject,
    DEFAULT_PROJECT_NAME,
};
use miniworld_core::{CoreError, CoreResult, ProjectState};

pub const DEFAULT_STORE_DIR: &str = ".miniworld";

pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ProjectId) -> CoreResult<PathBuf> {
        let raw = id.as_str();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::InvalidInput {
                field: "project_id".into(),
                reason: format!("'{raw}' is not a valid project id"),
            });
        }
        Ok(self.root.join(format!("{raw}.json")))
    }

    fn read_all(&self) -> CoreResult<Vec<StoredProject>> {
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_project(&path) {
                Ok(p) => projects.push(p),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable project"),
            }
        }
        Ok(projects)
    }

    fn next_id(&self) -> CoreResult<ProjectId> {
        let max = self
            .read_all()?
            .iter()
            .filter_map(|p| p.id.as_str().strip_prefix('p')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(ProjectId::new(format!("p{}", max + 1)))
    }

    fn write(&self, project: &StoredProject) -> CoreResult<()> {
        let path = self.path_for(&project.id)?;
        let json = serde_json::to_string_pretty(project)?;
        fs::write(&path, json)?;
        tracing::info!(project = %project.id, path = %path.display(), "saved project");
        Ok(())
    }
}

fn read_project(path: &Path) -> CoreResult<StoredProject> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

impl ProjectStore for JsonFileStore {
    fn load(&self, id: &ProjectId) -> CoreResult<Option<StoredProject>> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        read_project(&path).map(Some)
    }

    fn save(
        &mut self,
        id: Option<&ProjectId>,
        name: Option<&str>,
        state: &ProjectState,
    ) -> CoreResult<ProjectId> {
        let project = match id {
            Some(id) => {
                let mut existing = self
                    .load(id)?
                    .ok_or_else(|| CoreError::ProjectNotFound { id: id.to_string() })?;
                existing.data = state.clone();
                existing.updated_at = Utc::now();
                if let Some(name) = name {
                    existing.name = name.to_string();
                }
                existing
            }
            None => StoredProject {
                id: self.next_id()?,
                name: name.unwrap_or(DEFAULT_PROJECT_NAME).to_string(),
                updated_at: Utc::now(),
                data: state.clone(),
            },
        };
        self.write(&project)?;
        Ok(project.id)
    }

    fn list(&self) -> CoreResult<Vec<ProjectSummary>> {
        let mut summaries: Vec<ProjectSummary> =
            self.read_all()?.iter().map(ProjectSummary::from).collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_save_creates_sequential_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        let state = ProjectState::default();

        let a = store.save(None, None, &state).unwrap();
        let b = store.save(None, Some("Phase Two"), &state).unwrap();

        assert_eq!(a.as_str(), "p1");
        assert_eq!(b.as_str(), "p2");
        assert!(dir.path().join("p1.json").is_file());
        assert_eq!(store.load(&b).unwrap().unwrap().name, "Phase Two");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_update_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        let mut state = ProjectState::default();
        let id = store.save(None, None, &state).unwrap();

        state.interest_rate = dec!(6.5);
        store.save(Some(&id), None, &state).unwrap();

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let loaded = reopened.load_latest().unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.data.interest_rate, dec!(6.5));
    }

    #[test]
    fn test_unknown_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();

        assert!(store.load(&ProjectId::from("p7")).unwrap().is_none());
        assert!(matches!(
            store.load(&ProjectId::from("../etc/passwd")),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(matches!(
            store.save(Some(&ProjectId::from("p7")), None, &ProjectState::default()),
            Err(CoreError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_skipped_in_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        store.save(None, None, &ProjectState::default()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }
}
