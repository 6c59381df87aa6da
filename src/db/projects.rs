//! Project repository over the projects document.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::{Project, ProjectsDocument};
use crate::storage::DocumentStore;

use super::{TagRegistry, PROJECTS_KEY};

/// Repository for project audit records.
///
/// The whole collection is loaded on every call and written back in full
/// after a mutation. The write lock only serializes writers inside this
/// process; other processes sharing the bucket can still overwrite each
/// other (last writer wins).
pub struct ProjectRepository {
    documents: DocumentStore,
    tags: Arc<TagRegistry>,
    write_lock: Mutex<()>,
}

impl ProjectRepository {
    pub fn new(documents: DocumentStore, tags: Arc<TagRegistry>) -> Self {
        Self {
            documents,
            tags,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<ProjectsDocument, AppError> {
        Ok(self
            .documents
            .load(PROJECTS_KEY, ProjectsDocument::default)
            .await?)
    }

    /// All projects whose first user is `owner_email`, in stored order.
    pub async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Project>, AppError> {
        let doc = self.load().await?;
        Ok(doc
            .projects
            .into_iter()
            .filter(|p| p.owner_email() == Some(owner_email))
            .collect())
    }

    /// The first project named `name` owned by `owner_email`.
    pub async fn get_by_owner_and_name(
        &self,
        owner_email: &str,
        name: &str,
    ) -> Result<Project, AppError> {
        let doc = self.load().await?;
        doc.projects
            .into_iter()
            .find(|p| p.is(owner_email, name))
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    /// Append a new project and persist the collection.
    ///
    /// Languages declared by the project are then added to the tag registry.
    pub async fn create(&self, project: Project) -> Result<Project, AppError> {
        let (Some(owner), Some(name)) = (project.owner_email(), project.name()) else {
            return Err(AppError::InvalidPayload("Missing JSON data".to_string()));
        };
        let (owner, name) = (owner.to_string(), name.to_string());

        {
            let _guard = self.write_lock.lock().await;
            let mut doc = self.load().await?;

            if doc.projects.iter().any(|p| p.is(&owner, &name)) {
                return Err(AppError::DuplicateProject(
                    "Project with the same name and owner already exists".to_string(),
                ));
            }

            doc.projects.push(project.clone());
            self.documents.save(PROJECTS_KEY, &doc).await?;
        }

        tracing::info!("Created project {} for {}", name, owner);

        if let Some(languages) = project.languages() {
            self.tags.register_languages(&languages).await?;
        }

        Ok(project)
    }
}
