//! crates/podcast_muse_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client logic depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the HTTP client, the storage medium and the generator.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AdminStats, CreditGrant, CreditGrantReceipt, LoginGrant, NewProject, PasswordResetTicket,
    Project, ProjectUpdate, Registration, User, UserPatch,
};
use crate::pipeline::{GenerationBrief, Stage};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The backend answered with a non-2xx status. Client and server errors
    /// are deliberately not told apart.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unreadable response: {0}")]
    Decode(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Generation was cancelled")]
    Cancelled,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The backend's `detail` string, when the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            PortError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PortError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persisted client storage
//=========================================================================================

/// Key under which the bearer token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key under which the third-party API keys are persisted (JSON).
pub const API_KEYS_KEY: &str = "api_keys";
/// Key under which the topic picked on the topics page is persisted (JSON).
pub const SELECTED_TOPIC_KEY: &str = "selected_topic";

/// A string key/value store that survives restarts, in the manner of browser
/// local storage. Nothing stored here is encrypted.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
    async fn remove(&self, key: &str) -> PortResult<()>;
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The Podcast Muse REST backend.
#[async_trait]
pub trait BackendService: Send + Sync {
    // --- Auth ---
    async fn login(&self, email: &str, password: &str) -> PortResult<LoginGrant>;

    async fn register(&self, registration: &Registration) -> PortResult<User>;

    async fn forgot_password(&self, email: &str) -> PortResult<PasswordResetTicket>;

    async fn reset_password(&self, token: &str, new_password: &str) -> PortResult<()>;

    async fn current_user(&self) -> PortResult<User>;

    // --- Projects ---
    async fn list_projects(&self) -> PortResult<Vec<Project>>;

    async fn create_project(&self, project: &NewProject) -> PortResult<Project>;

    async fn update_project(&self, project_id: Uuid, update: &ProjectUpdate) -> PortResult<()>;

    // --- Administration ---
    async fn admin_users(&self) -> PortResult<Vec<User>>;

    async fn admin_stats(&self) -> PortResult<AdminStats>;

    async fn admin_update_user(&self, user_id: Uuid, patch: &UserPatch) -> PortResult<()>;

    async fn admin_delete_user(&self, user_id: Uuid) -> PortResult<()>;

    async fn admin_add_credits(&self, grant: &CreditGrant) -> PortResult<CreditGrantReceipt>;
}

/// Produces the artifact for one generation stage: the script text for
/// `Stage::Script`, a media URL for the others.
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    async fn render(&self, stage: Stage, brief: &GenerationBrief) -> PortResult<String>;
}
