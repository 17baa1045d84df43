//! crates/podcast_muse_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any HTTP or storage serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A Podcast Muse account as the backend reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub credits: i64,
    pub is_admin: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined, falling back to the email address.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// What a successful login hands back: the bearer token and, when the backend
/// includes it, the user snapshot.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub access_token: String,
    pub user: Option<User>,
}

/// Input for `POST /auth/register`.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Response of `POST /auth/forgot-password`. The backend returns the token
/// directly while email delivery is not wired up.
#[derive(Debug, Clone, Default)]
pub struct PasswordResetTicket {
    pub message: String,
    pub reset_token: Option<String>,
    pub expires_at: Option<String>,
}

//=========================================================================================
// Projects
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Draft,
    Pending,
    Generating,
    Completed,
    Failed,
    /// A status string this client does not know about, kept verbatim.
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Pending => "pending",
            ProjectStatus::Generating => "generating",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
            ProjectStatus::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "draft" => ProjectStatus::Draft,
            "pending" => ProjectStatus::Pending,
            "generating" => ProjectStatus::Generating,
            "completed" => ProjectStatus::Completed,
            "failed" | "error" => ProjectStatus::Failed,
            other => ProjectStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }
}

/// A podcast project owned by the current user.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub script_content: Option<String>,
    pub total_credits_used: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
}

/// A partial update; `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub script_content: Option<String>,
    pub status: Option<ProjectStatus>,
    pub total_credits_used: Option<i64>,
}

//=========================================================================================
// Client-side preferences
//=========================================================================================

/// Third-party keys the user enters on the settings page. Stored in plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub openai_key: Option<String>,
    pub kie_key: Option<String>,
    pub google_key: Option<String>,
}

impl ApiKeys {
    /// The generation wizard needs both the OpenAI and KIE keys.
    pub fn has_generation_keys(&self) -> bool {
        fn present(key: &Option<String>) -> bool {
            key.as_deref().is_some_and(|k| !k.trim().is_empty())
        }
        present(&self.openai_key) && present(&self.kie_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSuggestion {
    pub title: String,
    pub description: String,
    pub target_audience: String,
    pub estimated_length: String,
    pub keywords: Vec<String>,
}

//=========================================================================================
// Administration
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub is_admin: Option<bool>,
    pub credits: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreditGrant {
    pub user_id: Uuid,
    pub credits: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreditGrantReceipt {
    pub message: String,
    pub previous_credits: i64,
    pub new_credits: i64,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub regular_users: i64,
    pub credits_distributed: i64,
    pub total_projects: i64,
    pub completed_projects: i64,
    pub in_progress_projects: i64,
    pub recent_users: Vec<RecentUser>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentUser {
    pub email: String,
    pub name: String,
    pub joined: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            credits: 100,
            is_admin: false,
            created_at: None,
        }
    }

    #[test]
    fn display_name_prefers_names_over_email() {
        assert_eq!(user(Some("Ada"), Some("Lovelace")).display_name(), "Ada Lovelace");
        assert_eq!(user(Some("Ada"), None).display_name(), "Ada");
        assert_eq!(user(Some("  "), None).display_name(), "a@b.com");
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = ProjectStatus::parse("queued");
        assert_eq!(status, ProjectStatus::Other("queued".to_string()));
        assert_eq!(status.as_str(), "queued");
        assert!(ProjectStatus::parse("completed").is_terminal());
        assert!(!ProjectStatus::parse("draft").is_terminal());
    }

    #[test]
    fn generation_keys_need_openai_and_kie() {
        let mut keys = ApiKeys {
            openai_key: Some("sk-abc".to_string()),
            ..Default::default()
        };
        assert!(!keys.has_generation_keys());
        keys.kie_key = Some("  ".to_string());
        assert!(!keys.has_generation_keys());
        keys.kie_key = Some("kie-123".to_string());
        assert!(keys.has_generation_keys());
    }
}
