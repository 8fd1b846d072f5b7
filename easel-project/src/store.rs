//! Project persistence backends.

use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use easel_history::SavePayload;

use crate::{ProjectError, ProjectRecord};

/// File extension used for stored projects.
pub const PROJECT_FILE_EXT: &str = "easel.json";

/// Where projects live. Updates must be safe to repeat.
pub trait ProjectStore {
    fn create_project(&mut self, record: &ProjectRecord) -> anyhow::Result<()>;

    fn load_project(&self, id: Uuid) -> anyhow::Result<ProjectRecord>;

    fn update_project(&mut self, id: Uuid, payload: &SavePayload) -> anyhow::Result<()>;
}

impl<T: ProjectStore + ?Sized> ProjectStore for &mut T {
    fn create_project(&mut self, record: &ProjectRecord) -> anyhow::Result<()> {
        (**self).create_project(record)
    }

    fn load_project(&self, id: Uuid) -> anyhow::Result<ProjectRecord> {
        (**self).load_project(id)
    }

    fn update_project(&mut self, id: Uuid, payload: &SavePayload) -> anyhow::Result<()> {
        (**self).update_project(id, payload)
    }
}

/// One pretty-printed JSON file per project.
#[derive(Debug, Clone)]
pub struct FileProjectStore {
    root: PathBuf,
}

impl FileProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.{PROJECT_FILE_EXT}"))
    }

    fn write(&self, record: &ProjectRecord) -> anyhow::Result<()> {
        let path = self.path_for(record.id);
        // fs::write does not create directories
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create project dir: {}", self.root.display()))?;

        let json = serde_json::to_string_pretty(record).context("serialize project to json")?;
        fs::write(&path, json).with_context(|| format!("write project file: {}", path.display()))?;
        debug!(path = %path.display(), "Project written");
        Ok(())
    }
}

impl ProjectStore for FileProjectStore {
    fn create_project(&mut self, record: &ProjectRecord) -> anyhow::Result<()> {
        info!(id = %record.id, name = %record.name, "Creating project");
        self.write(record)
    }

    fn load_project(&self, id: Uuid) -> anyhow::Result<ProjectRecord> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(ProjectError::NotFound { id }.into());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("read project file: {}", path.display()))?;
        let record: ProjectRecord = serde_json::from_str(&data).context("parse project json")?;
        Ok(record)
    }

    fn update_project(&mut self, id: Uuid, payload: &SavePayload) -> anyhow::Result<()> {
        let mut record = self.load_project(id)?;
        record.apply(payload);
        self.write(&record)
    }
}

/// Keeps projects in memory and remembers every update it received.
#[derive(Debug, Clone, Default)]
pub struct MemoryProjectStore {
    projects: HashMap<Uuid, ProjectRecord>,
    updates: Vec<(Uuid, SavePayload)>,
    /// When set, updates fail without being applied.
    pub fail_updates: bool,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> &[(Uuid, SavePayload)] {
        &self.updates
    }

    pub fn get(&self, id: Uuid) -> Option<&ProjectRecord> {
        self.projects.get(&id)
    }
}

impl ProjectStore for MemoryProjectStore {
    fn create_project(&mut self, record: &ProjectRecord) -> anyhow::Result<()> {
        self.projects.insert(record.id, record.clone());
        Ok(())
    }

    fn load_project(&self, id: Uuid) -> anyhow::Result<ProjectRecord> {
        self.projects
            .get(&id)
            .cloned()
            .ok_or_else(|| ProjectError::NotFound { id }.into())
    }

    fn update_project(&mut self, id: Uuid, payload: &SavePayload) -> anyhow::Result<()> {
        if self.fail_updates {
            anyhow::bail!("update rejected for project {id}");
        }
        let record = self
            .projects
            .get_mut(&id)
            .ok_or(ProjectError::NotFound { id })?;
        record.apply(payload);
        self.updates.push((id, payload.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_update_unknown_project() {
        let mut store = MemoryProjectStore::new();
        let payload = SavePayload {
            json: "{}".into(),
            width: 1.0,
            height: 1.0,
        };
        let err = store.update_project(Uuid::new_v4(), &payload).unwrap_err();
        assert!(err.downcast_ref::<ProjectError>().is_some());
        assert!(store.updates().is_empty());
    }

    #[test]
    fn test_file_store_path() {
        let store = FileProjectStore::new("projects");
        let id = Uuid::nil();
        assert_eq!(
            store.path_for(id),
            Path::new("projects").join("00000000-0000-0000-0000-000000000000.easel.json")
        );
    }
}
