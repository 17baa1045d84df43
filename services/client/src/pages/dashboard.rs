//! services/client/src/pages/dashboard.rs

use chrono::{DateTime, Utc};
use podcast_muse_core::domain::{Project, ProjectStatus, User};
use podcast_muse_core::ports::{BackendService, PortResult};
use tracing::debug;
use uuid::Uuid;

use crate::pages::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Green,
    Blue,
    Yellow,
    Gray,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub tone: BadgeTone,
}

impl StatusBadge {
    pub fn for_status(status: &ProjectStatus) -> Self {
        let tone = match status {
            ProjectStatus::Completed => BadgeTone::Green,
            ProjectStatus::Generating => BadgeTone::Blue,
            ProjectStatus::Pending => BadgeTone::Yellow,
            ProjectStatus::Failed => BadgeTone::Red,
            ProjectStatus::Draft | ProjectStatus::Other(_) => BadgeTone::Gray,
        };
        Self {
            label: status.as_str().to_string(),
            tone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub badge: StatusBadge,
    pub credits_used: i64,
    pub created_at: Option<DateTime<Utc>>,
    /// Completed or failed; nothing more will happen to it.
    pub finished: bool,
}

impl ProjectRow {
    fn from_project(project: Project) -> Self {
        Self {
            id: project.id,
            title: project.title,
            description: project.description.unwrap_or_default(),
            badge: StatusBadge::for_status(&project.status),
            finished: project.status.is_terminal(),
            credits_used: project.total_credits_used,
            created_at: project.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub user: User,
    pub projects: Vec<ProjectRow>,
}

/// Loads the signed-in user's projects. Without a session this fails with
/// `Unauthorized` and the shell redirects to the landing page.
pub async fn load(session: &SessionStore, backend: &dyn BackendService) -> PortResult<DashboardView> {
    let user = session.require_user().await?;
    let projects = backend.list_projects().await?;
    debug!("Loaded {} projects", projects.len());
    Ok(DashboardView {
        user,
        projects: projects.into_iter().map(ProjectRow::from_project).collect(),
    })
}
