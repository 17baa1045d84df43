//! services/client/src/pages/admin.rs
//!
//! The admin console. Every mutation is one request followed by a full
//! refetch; nothing is updated optimistically.

use std::sync::Arc;

use podcast_muse_core::domain::{AdminStats, CreditGrant, User, UserPatch};
use podcast_muse_core::ports::{BackendService, PortError, PortResult};
use tracing::{error, info};

use crate::pages::session::SessionStore;
use crate::pages::state::AppState;
use crate::pages::{Banner, Outcome};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("403 - Access Denied")]
    NotAuthorized,
    #[error(transparent)]
    Port(#[from] PortError),
}

pub struct AdminConsole {
    session: Arc<SessionStore>,
    backend: Arc<dyn BackendService>,
    users: Vec<User>,
    stats: AdminStats,
}

impl AdminConsole {
    pub fn new(app: &AppState, session: Arc<SessionStore>) -> Self {
        Self {
            session,
            backend: app.backend.clone(),
            users: Vec::new(),
            stats: AdminStats::default(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn stats(&self) -> &AdminStats {
        &self.stats
    }

    /// Fetches users and stats together. Only the client-side admin flag is
    /// checked here; the backend enforces its own rules.
    pub async fn load(&mut self) -> Result<(), AdminError> {
        let is_admin = self
            .session
            .current_user()
            .await
            .is_some_and(|u| u.is_admin);
        if !is_admin {
            return Err(AdminError::NotAuthorized);
        }

        let (users, stats) =
            futures::try_join!(self.backend.admin_users(), self.backend.admin_stats())?;
        info!("Admin console loaded {} users", users.len());
        self.users = users;
        self.stats = stats;
        Ok(())
    }

    pub async fn grant_credits(&mut self, user: &User, amount: i64, reason: &str) -> Outcome {
        if amount <= 0 {
            return Outcome::banner(Banner::error("Please enter a positive number of credits"));
        }
        let grant = CreditGrant {
            user_id: user.id,
            credits: amount,
            reason: Some(reason.trim().to_string()).filter(|r| !r.is_empty()),
        };

        let result = self.backend.admin_add_credits(&grant).await.map(|receipt| {
            info!(
                "{} credits for {}: {} -> {}",
                amount, user.email, receipt.previous_credits, receipt.new_credits
            );
        });
        self.confirm(result, format!("Added {amount} credits to {}!", user.email))
            .await
    }

    pub async fn toggle_admin(&mut self, user: &User) -> Outcome {
        let promote = !user.is_admin;
        let patch = UserPatch {
            is_admin: Some(promote),
            credits: None,
        };
        let result = self.backend.admin_update_user(user.id, &patch).await;
        let message = if promote {
            format!("{} was granted admin status", user.email)
        } else {
            format!("{} lost admin status", user.email)
        };
        self.confirm(result, message).await
    }

    /// Deletes `user`. Nothing is sent unless the caller confirmed.
    pub async fn delete_user(&mut self, user: &User, confirmed: bool) -> Outcome {
        if !confirmed {
            return Outcome::banner(Banner::info(format!(
                "Confirm to permanently delete {}",
                user.email
            )));
        }
        let result = self.backend.admin_delete_user(user.id).await;
        self.confirm(result, format!("Deleted user {}", user.email))
            .await
    }

    async fn confirm(&mut self, result: PortResult<()>, success: String) -> Outcome {
        match result {
            Ok(()) => {
                let outcome = Outcome::banner(Banner::success(success));
                if let Err(e) = self.load().await {
                    error!("Refreshing the admin console failed: {}", e);
                }
                outcome
            }
            Err(e) => {
                error!("Admin action failed: {}", e);
                Outcome::banner(Banner::error(format!(
                    "Error: {}",
                    e.detail().unwrap_or("Unknown error")
                )))
            }
        }
    }
}
