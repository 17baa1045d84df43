//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `BackendService` port from the `core` crate. Every request goes to
//! `<base_url>/api/v1/...` with a JSON content type and, when a token is
//! stored, a bearer `Authorization` header.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use podcast_muse_core::domain::{
    AdminStats, CreditGrant, CreditGrantReceipt, LoginGrant, NewProject, PasswordResetTicket,
    Project, ProjectStatus, ProjectUpdate, RecentUser, Registration, User, UserPatch,
};
use podcast_muse_core::ports::{
    BackendService, KeyValueStore, PortError, PortResult, ACCESS_TOKEN_KEY,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

const API_PREFIX: &str = "/api/v1";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the `BackendService` port.
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
}

impl HttpGateway {
    /// Creates a new `HttpGateway`. The bearer token is read from `store` on
    /// every request, so logging in or out takes effect immediately.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        store: Arc<dyn KeyValueStore>,
    ) -> PortResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Sends one request and returns the raw body of a 2xx response. Any other
    /// status becomes `PortError::Status`, carrying the backend's `detail`.
    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> PortResult<Vec<u8>> {
        let url = self.endpoint(path);
        let mut request = self
            .http
            .request(method.clone(), url.as_str())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.store.get(ACCESS_TOKEN_KEY).await? {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!("{} {}", method, url);
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        if !status.is_success() {
            let detail = error_detail(&bytes);
            warn!("{} {} failed with status {}", method, url, status.as_u16());
            return Err(PortError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PortResult<T> {
        let bytes = self.send(Method::GET, path, None).await?;
        decode(&bytes)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send(method, path, Some(encode(body)?)).await?;
        decode(&bytes)
    }

    /// Like `send_json`, for endpoints whose response body is not needed.
    async fn send_ignoring_body<B>(&self, method: Method, path: &str, body: Option<&B>) -> PortResult<()>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(encode).transpose()?;
        self.send(method, path, body).await.map(|_| ())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> PortResult<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| PortError::Unexpected(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> PortResult<T> {
    serde_json::from_slice(bytes).map_err(|e| PortError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Pulls the `detail` string out of an error body. FastAPI validation errors
/// carry a list there instead; it is kept as raw JSON text.
fn error_detail(bytes: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(bytes).ok()?;
    match body.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Accepts RFC 3339, SQLite's `YYYY-MM-DD HH:MM:SS` and naive ISO timestamps.
/// Empty or unreadable values map to `None`.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_id(raw: &str, what: &str) -> PortResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|e| PortError::Decode(format!("invalid {what} id '{raw}': {e}")))
}

//=========================================================================================
// Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde(default)]
    credits: i64,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    created_at: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: parse_id(&self.id, "user")?,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            credits: self.credits,
            is_admin: self.is_admin,
            created_at: parse_timestamp(self.created_at.as_deref()),
        })
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user: Option<UserRecord>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct ForgotPasswordResponse {
    #[serde(default)]
    message: String,
    reset_token: Option<String>,
    expires_at: Option<String>,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct ProjectRecord {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    script_content: Option<String>,
    #[serde(default)]
    total_credits_used: i64,
    #[serde(default)]
    created_at: Option<String>,
}
impl ProjectRecord {
    fn to_domain(self) -> PortResult<Project> {
        Ok(Project {
            id: parse_id(&self.id, "project")?,
            title: self.title,
            description: self.description,
            status: ProjectStatus::parse(&self.status),
            script_content: self.script_content,
            total_credits_used: self.total_credits_used,
            created_at: parse_timestamp(self.created_at.as_deref()),
        })
    }
}

#[derive(Serialize)]
struct CreateProjectRequest<'a> {
    title: &'a str,
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateProjectRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script_content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_credits_used: Option<i64>,
}

#[derive(Serialize)]
struct UserPatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credits: Option<i64>,
}

#[derive(Serialize)]
struct AddCreditsRequest<'a> {
    user_id: String,
    credits: i64,
    reason: &'a str,
}

#[derive(Deserialize)]
struct AddCreditsResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    previous_credits: i64,
    #[serde(default)]
    new_credits: i64,
    transaction_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct StatsRecord {
    users: UserCounts,
    credits: CreditCounts,
    projects: ProjectCounts,
    recent_users: Vec<RecentUserRecord>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct UserCounts {
    total: i64,
    admins: i64,
    regular_users: i64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CreditCounts {
    total_distributed: i64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProjectCounts {
    total: i64,
    completed: i64,
    in_progress: i64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RecentUserRecord {
    email: String,
    name: String,
    joined: String,
}

impl StatsRecord {
    fn to_domain(self) -> AdminStats {
        AdminStats {
            total_users: self.users.total,
            admin_users: self.users.admins,
            regular_users: self.users.regular_users,
            credits_distributed: self.credits.total_distributed,
            total_projects: self.projects.total,
            completed_projects: self.projects.completed,
            in_progress_projects: self.projects.in_progress,
            recent_users: self
                .recent_users
                .into_iter()
                .map(|r| RecentUser {
                    email: r.email,
                    name: r.name,
                    joined: r.joined,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// BackendService Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendService for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> PortResult<LoginGrant> {
        let response: LoginResponse = self
            .send_json(Method::POST, "/auth/login", &LoginRequest { email, password })
            .await?;
        let user = response.user.map(UserRecord::to_domain).transpose()?;
        Ok(LoginGrant {
            access_token: response.access_token,
            user,
        })
    }

    async fn register(&self, registration: &Registration) -> PortResult<User> {
        let request = RegisterRequest {
            email: &registration.email,
            password: &registration.password,
            first_name: registration.first_name.as_deref(),
            last_name: registration.last_name.as_deref(),
        };
        let record: UserRecord = self
            .send_json(Method::POST, "/auth/register", &request)
            .await?;
        record.to_domain()
    }

    async fn forgot_password(&self, email: &str) -> PortResult<PasswordResetTicket> {
        let response: ForgotPasswordResponse = self
            .send_json(
                Method::POST,
                "/auth/forgot-password",
                &ForgotPasswordRequest { email },
            )
            .await?;
        Ok(PasswordResetTicket {
            message: response.message,
            reset_token: response.reset_token,
            expires_at: response.expires_at,
        })
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> PortResult<()> {
        let request = ResetPasswordRequest {
            token,
            new_password,
        };
        self.send_ignoring_body(Method::POST, "/auth/reset-password", Some(&request))
            .await
    }

    async fn current_user(&self) -> PortResult<User> {
        let record: UserRecord = self.get_json("/users/me").await?;
        record.to_domain()
    }

    async fn list_projects(&self) -> PortResult<Vec<Project>> {
        let records: Vec<ProjectRecord> = self.get_json("/projects").await?;
        records.into_iter().map(ProjectRecord::to_domain).collect()
    }

    async fn create_project(&self, project: &NewProject) -> PortResult<Project> {
        let request = CreateProjectRequest {
            title: &project.title,
            description: project.description.as_deref(),
        };
        let record: ProjectRecord = self.send_json(Method::POST, "/projects", &request).await?;
        record.to_domain()
    }

    async fn update_project(&self, project_id: Uuid, update: &ProjectUpdate) -> PortResult<()> {
        let request = UpdateProjectRequest {
            title: update.title.as_deref(),
            description: update.description.as_deref(),
            script_content: update.script_content.as_deref(),
            status: update.status.as_ref().map(ProjectStatus::as_str),
            total_credits_used: update.total_credits_used,
        };
        self.send_ignoring_body(
            Method::PUT,
            &format!("/projects/{project_id}"),
            Some(&request),
        )
        .await
    }

    async fn admin_users(&self) -> PortResult<Vec<User>> {
        let records: Vec<UserRecord> = self.get_json("/admin/users").await?;
        records.into_iter().map(UserRecord::to_domain).collect()
    }

    async fn admin_stats(&self) -> PortResult<AdminStats> {
        let record: StatsRecord = self.get_json("/admin/stats").await?;
        Ok(record.to_domain())
    }

    async fn admin_update_user(&self, user_id: Uuid, patch: &UserPatch) -> PortResult<()> {
        let request = UserPatchRequest {
            is_admin: patch.is_admin,
            credits: patch.credits,
        };
        self.send_ignoring_body(Method::PUT, &format!("/admin/users/{user_id}"), Some(&request))
            .await
    }

    async fn admin_delete_user(&self, user_id: Uuid) -> PortResult<()> {
        self.send_ignoring_body::<()>(Method::DELETE, &format!("/admin/users/{user_id}"), None)
            .await
    }

    async fn admin_add_credits(&self, grant: &CreditGrant) -> PortResult<CreditGrantReceipt> {
        let request = AddCreditsRequest {
            user_id: grant.user_id.to_string(),
            credits: grant.credits,
            reason: grant.reason.as_deref().unwrap_or_default(),
        };
        let response: AddCreditsResponse = self
            .send_json(Method::POST, "/admin/add-credits", &request)
            .await?;
        Ok(CreditGrantReceipt {
            message: response.message,
            previous_credits: response.previous_credits,
            new_credits: response.new_credits,
            transaction_id: response.transaction_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn detail_is_taken_from_the_error_body() {
        assert_eq!(
            error_detail(br#"{"detail":"Email already registered"}"#).as_deref(),
            Some("Email already registered")
        );
        assert_eq!(error_detail(b"<html>502</html>"), None);
        assert_eq!(error_detail(br#"{"detail":null}"#), None);
        assert!(error_detail(br#"{"detail":[{"msg":"field required"}]}"#)
            .is_some_and(|d| d.contains("field required")));
    }

    #[test]
    fn timestamps_accept_every_backend_format() {
        let sqlite = parse_timestamp(Some("2024-03-01 12:30:05")).unwrap();
        assert_eq!((sqlite.year(), sqlite.month(), sqlite.hour()), (2024, 3, 12));

        let rfc = parse_timestamp(Some("2024-03-01T12:30:05+07:00")).unwrap();
        assert_eq!(rfc.hour(), 5);

        assert!(parse_timestamp(Some("2024-03-01T12:30:05.123456")).is_some());
        assert_eq!(parse_timestamp(Some("")), None);
        assert_eq!(parse_timestamp(None), None);
    }

    #[test]
    fn user_record_tolerates_missing_optional_fields() {
        let record: UserRecord = serde_json::from_str(
            r#"{"id":"5b3c1f0e-8a4e-4e8e-9a57-0d7f3f2f6a11","email":"a@b.com","first_name":null,"last_name":null,"created_at":""}"#,
        )
        .unwrap();
        let user = record.to_domain().unwrap();
        assert_eq!(user.credits, 0);
        assert!(!user.is_admin);
        assert_eq!(user.created_at, None);
    }

    #[test]
    fn stats_are_flattened_from_the_nested_shape() {
        let record: StatsRecord = serde_json::from_str(
            r#"{"users":{"total":5,"admins":1,"regular_users":4},
                "credits":{"total_distributed":500},
                "projects":{"total":7,"completed":3,"in_progress":4},
                "recent_users":[{"email":"a@b.com","name":"A B","joined":"2024-03-01"}]}"#,
        )
        .unwrap();
        let stats = record.to_domain();
        assert_eq!(stats.total_users, 5);
        assert_eq!(stats.credits_distributed, 500);
        assert_eq!(stats.in_progress_projects, 4);
        assert_eq!(stats.recent_users[0].name, "A B");
    }

    #[test]
    fn project_update_only_sends_present_fields() {
        let request = UpdateProjectRequest {
            title: None,
            description: None,
            script_content: None,
            status: Some("completed"),
            total_credits_used: Some(18),
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"status":"completed","total_credits_used":18}"#
        );
    }
}
