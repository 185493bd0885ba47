use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CoreError;
use crate::state::ProjectState;
use crate::CoreResult;

/// Name given to projects saved without one.
pub const DEFAULT_PROJECT_NAME: &str = "New Project";

/// Opaque project identifier issued by a store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ProjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

/// A persisted project snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProject {
    pub id: ProjectId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub data: ProjectState,
}

/// Listing entry without the full state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub tenant_count: usize,
}

impl From<&StoredProject> for ProjectSummary {
    fn from(p: &StoredProject) -> Self {
        ProjectSummary {
            id: p.id.clone(),
            name: p.name.clone(),
            updated_at: p.updated_at,
            tenant_count: p.data.tenants.len(),
        }
    }
}

/// Load/save contract for project state.
pub trait ProjectStore {
    /// Fetch one project. `Ok(None)` when the id is unknown.
    fn load(&self, id: &ProjectId) -> CoreResult<Option<StoredProject>>;

    /// Insert (`id = None`) or update an existing project. Returns the id the
    /// project is stored under. Updating an unknown id is an error.
    fn save(
        &mut self,
        id: Option<&ProjectId>,
        name: Option<&str>,
        state: &ProjectState,
    ) -> CoreResult<ProjectId>;

    /// All projects, most recently updated first.
    fn list(&self) -> CoreResult<Vec<ProjectSummary>>;

    /// The most recently updated project, used to restore a session.
    fn load_latest(&self) -> CoreResult<Option<StoredProject>> {
        match self.list()?.first() {
            Some(summary) => self.load(&summary.id),
            None => Ok(None),
        }
    }
}

/// Sort newest first, ties broken by id so listings are stable.
pub fn sort_newest_first(summaries: &mut [ProjectSummary]) {
    summaries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Process-local store. Ids are sequential (`p1`, `p2`, ...).
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: BTreeMap<ProjectId, StoredProject>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, id: &ProjectId) -> CoreResult<Option<StoredProject>> {
        Ok(self.projects.get(id).cloned())
    }

    fn save(
        &mut self,
        id: Option<&ProjectId>,
        name: Option<&str>,
        state: &ProjectState,
    ) -> CoreResult<ProjectId> {
        let now = Utc::now();
        match id {
            Some(id) => {
                let existing = self
                    .projects
                    .get_mut(id)
                    .ok_or_else(|| CoreError::ProjectNotFound { id: id.to_string() })?;
                existing.data = state.clone();
                existing.updated_at = now;
                if let Some(name) = name {
                    existing.name = name.to_string();
                }
                tracing::debug!(project = %id, "updated project");
                Ok(id.clone())
            }
            None => {
                self.next_id += 1;
                let id = ProjectId(format!("p{}", self.next_id));
                self.projects.insert(
                    id.clone(),
                    StoredProject {
                        id: id.clone(),
                        name: name.unwrap_or(DEFAULT_PROJECT_NAME).to_string(),
                        updated_at: now,
                        data: state.clone(),
                    },
                );
                tracing::debug!(project = %id, "inserted project");
                Ok(id)
            }
        }
    }

    fn list(&self) -> CoreResult<Vec<ProjectSummary>> {
        let mut summaries: Vec<ProjectSummary> =
            self.projects.values().map(ProjectSummary::from).collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }
}
