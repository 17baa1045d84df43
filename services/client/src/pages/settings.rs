//! services/client/src/pages/settings.rs
//!
//! API-key management. Keys live in persisted storage in plaintext.

use std::sync::Arc;

use podcast_muse_core::domain::ApiKeys;
use podcast_muse_core::ports::{KeyValueStore, PortResult};
use tracing::{error, info};

use crate::adapters::storage::{load_api_keys, save_api_keys};
use crate::pages::session::SessionStore;
use crate::pages::{Banner, Outcome, Route};

const OPENAI_PREFIX: &str = "sk-";
const MASK: &str = "••••••••••";

pub struct SettingsPage {
    session: Arc<SessionStore>,
    store: Arc<dyn KeyValueStore>,
}

impl SettingsPage {
    pub fn new(session: Arc<SessionStore>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { session, store }
    }

    /// The saved keys, or empty ones when nothing was saved yet.
    pub async fn load(&self) -> PortResult<ApiKeys> {
        self.session.require_user().await?;
        Ok(load_api_keys(self.store.as_ref()).await?.unwrap_or_default())
    }

    pub async fn save(&self, keys: &ApiKeys) -> Outcome {
        if self.session.require_user().await.is_err() {
            return Outcome::redirect(Route::Landing);
        }

        let keys = normalize(keys);
        match save_api_keys(self.store.as_ref(), &keys).await {
            Ok(()) => {
                info!("API keys saved");
                Outcome::banner(Banner::success("API keys saved successfully!"))
            }
            Err(e) => {
                error!("Saving API keys failed: {}", e);
                Outcome::banner(Banner::error("Failed to save API keys. Please try again."))
            }
        }
    }
}

/// Trims every key, drops blank ones and gives the OpenAI key its `sk-` prefix.
pub fn normalize(keys: &ApiKeys) -> ApiKeys {
    fn clean(key: &Option<String>) -> Option<String> {
        key.as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    ApiKeys {
        openai_key: clean(&keys.openai_key).map(|k| {
            if k.starts_with(OPENAI_PREFIX) {
                k
            } else {
                format!("{OPENAI_PREFIX}{k}")
            }
        }),
        kie_key: clean(&keys.kie_key),
        google_key: clean(&keys.google_key),
    }
}

/// First 10 characters, a fixed mask, then the last 4. Shorter keys are shown as is.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 10 {
        return key.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{MASK}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_key_gets_its_prefix_once() {
        let keys = normalize(&ApiKeys {
            openai_key: Some(" abc123 ".to_string()),
            kie_key: Some("   ".to_string()),
            google_key: None,
        });
        assert_eq!(keys.openai_key.as_deref(), Some("sk-abc123"));
        assert_eq!(keys.kie_key, None);

        let again = normalize(&keys);
        assert_eq!(again.openai_key.as_deref(), Some("sk-abc123"));
    }

    #[test]
    fn keys_are_masked_in_the_middle() {
        assert_eq!(mask_key("sk-1234567890abcdef"), "sk-1234567••••••••••cdef");
        assert_eq!(mask_key("short"), "short");
        assert_eq!(mask_key(""), "");
    }
}
