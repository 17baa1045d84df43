//! services/client/src/pages/session.rs
//!
//! The session store: the bearer token in persisted storage plus the user
//! snapshot in memory. Created once and shared by every page.

use std::sync::Arc;

use podcast_muse_core::domain::{Registration, User};
use podcast_muse_core::ports::{
    BackendService, KeyValueStore, PortError, PortResult, ACCESS_TOKEN_KEY,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::pages::state::AppState;

pub struct SessionStore {
    backend: Arc<dyn BackendService>,
    store: Arc<dyn KeyValueStore>,
    user: RwLock<Option<User>>,
}

impl SessionStore {
    pub fn new(app: &AppState) -> Self {
        Self::with_ports(app.backend.clone(), app.store.clone())
    }

    pub fn with_ports(backend: Arc<dyn BackendService>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            store,
            user: RwLock::new(None),
        }
    }

    /// Restores the session from a persisted token, if there is one.
    /// A token the backend no longer accepts is discarded.
    pub async fn init(&self) -> PortResult<Option<User>> {
        if self.store.get(ACCESS_TOKEN_KEY).await?.is_none() {
            return Ok(None);
        }
        match self.refresh_user().await {
            Ok(user) => Ok(Some(user)),
            Err(PortError::Storage(e)) => Err(PortError::Storage(e)),
            Err(_) => Ok(None),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> PortResult<User> {
        let grant = self.backend.login(email.trim(), password).await?;
        self.store.set(ACCESS_TOKEN_KEY, &grant.access_token).await?;

        let user = match grant.user {
            Some(user) => {
                *self.user.write().await = Some(user.clone());
                user
            }
            None => self.refresh_user().await?,
        };
        info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// Creates the account. The new user still has to log in.
    pub async fn register(&self, registration: &Registration) -> PortResult<User> {
        let user = self.backend.register(registration).await?;
        info!("Registered {} with {} credits", user.email, user.credits);
        Ok(user)
    }

    /// Forgets the user and the persisted token, whatever state they were in.
    pub async fn logout(&self) -> PortResult<()> {
        self.user.write().await.take();
        self.store.remove(ACCESS_TOKEN_KEY).await
    }

    /// Re-fetches the profile with the stored token. Any failure ends the
    /// session.
    pub async fn refresh_user(&self) -> PortResult<User> {
        let result = match self.store.get(ACCESS_TOKEN_KEY).await? {
            Some(_) => self.backend.current_user().await,
            None => Err(PortError::Unauthorized),
        };

        match result {
            Ok(user) => {
                *self.user.write().await = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!("Profile fetch failed, ending the session: {}", e);
                self.logout().await?;
                Err(e)
            }
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// The signed-in user, or `Unauthorized`.
    pub async fn require_user(&self) -> PortResult<User> {
        self.current_user().await.ok_or(PortError::Unauthorized)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }
}
