//! services/client/src/adapters/storage.rs
//!
//! Persisted client storage. `FileStore` keeps every key in one JSON object file
//! on disk; `MemoryStore` is the volatile variant used when nothing should
//! survive the process. Both implement the `KeyValueStore` port.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use podcast_muse_core::domain::{ApiKeys, TopicSuggestion};
use podcast_muse_core::ports::{
    KeyValueStore, PortError, PortResult, API_KEYS_KEY, SELECTED_TOPIC_KEY,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

//=========================================================================================
// File-backed store
//=========================================================================================

/// A `KeyValueStore` persisted as a flat JSON object of strings.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> PortResult<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Storage file {} not found, starting empty", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(PortError::Storage(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            warn!("Storage file {} is not valid JSON: {}", self.path.display(), e);
            PortError::Storage(format!("corrupt storage file: {e}"))
        })
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PortError::Storage(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

//=========================================================================================
// In-memory store
//=========================================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

//=========================================================================================
// Typed entries stored as JSON strings
//=========================================================================================

#[derive(Serialize, Deserialize, Default)]
struct ApiKeysRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openai_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kie_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    google_key: Option<String>,
}
impl ApiKeysRecord {
    fn to_domain(self) -> ApiKeys {
        ApiKeys {
            openai_key: self.openai_key,
            kie_key: self.kie_key,
            google_key: self.google_key,
        }
    }

    fn from_domain(keys: &ApiKeys) -> Self {
        Self {
            openai_key: keys.openai_key.clone(),
            kie_key: keys.kie_key.clone(),
            google_key: keys.google_key.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TopicRecord {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    target_audience: String,
    #[serde(default)]
    estimated_length: String,
    #[serde(default)]
    keywords: Vec<String>,
}
impl TopicRecord {
    fn to_domain(self) -> TopicSuggestion {
        TopicSuggestion {
            title: self.title,
            description: self.description,
            target_audience: self.target_audience,
            estimated_length: self.estimated_length,
            keywords: self.keywords,
        }
    }

    fn from_domain(topic: &TopicSuggestion) -> Self {
        Self {
            title: topic.title.clone(),
            description: topic.description.clone(),
            target_audience: topic.target_audience.clone(),
            estimated_length: topic.estimated_length.clone(),
            keywords: topic.keywords.clone(),
        }
    }
}

async fn load_json<T: for<'de> Deserialize<'de>>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PortError::Storage(format!("unreadable '{key}' entry: {e}"))),
        None => Ok(None),
    }
}

async fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> PortResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| PortError::Storage(e.to_string()))?;
    store.set(key, &raw).await
}

pub async fn load_api_keys(store: &dyn KeyValueStore) -> PortResult<Option<ApiKeys>> {
    let record: Option<ApiKeysRecord> = load_json(store, API_KEYS_KEY).await?;
    Ok(record.map(ApiKeysRecord::to_domain))
}

pub async fn save_api_keys(store: &dyn KeyValueStore, keys: &ApiKeys) -> PortResult<()> {
    save_json(store, API_KEYS_KEY, &ApiKeysRecord::from_domain(keys)).await
}

pub async fn load_selected_topic(store: &dyn KeyValueStore) -> PortResult<Option<TopicSuggestion>> {
    let record: Option<TopicRecord> = load_json(store, SELECTED_TOPIC_KEY).await?;
    Ok(record.map(TopicRecord::to_domain))
}

pub async fn save_selected_topic(
    store: &dyn KeyValueStore,
    topic: &TopicSuggestion,
) -> PortResult<()> {
    save_json(store, SELECTED_TOPIC_KEY, &TopicRecord::from_domain(topic)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcast_muse_core::ports::ACCESS_TOKEN_KEY;

    #[tokio::test]
    async fn file_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        store.set(ACCESS_TOKEN_KEY, "token-123").await.unwrap();
        store.set("other", "value").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
            Some("token-123")
        );

        reopened.remove(ACCESS_TOKEN_KEY).await.unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get("other").await.unwrap().as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_as_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get(ACCESS_TOKEN_KEY).await.unwrap_err();
        assert!(matches!(err, PortError::Storage(_)));
    }

    #[tokio::test]
    async fn api_keys_are_stored_as_plain_json() {
        let store = MemoryStore::new();
        assert_eq!(load_api_keys(&store).await.unwrap(), None);

        let keys = ApiKeys {
            openai_key: Some("sk-abc".to_string()),
            kie_key: Some("kie".to_string()),
            google_key: None,
        };
        save_api_keys(&store, &keys).await.unwrap();

        let raw = store.get(API_KEYS_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"openai_key":"sk-abc","kie_key":"kie"}"#);
        assert_eq!(load_api_keys(&store).await.unwrap(), Some(keys));
    }

    #[tokio::test]
    async fn selected_topic_round_trips_through_storage() {
        let store = MemoryStore::new();
        let topic = podcast_muse_core::topics::suggest("finance").remove(0);
        save_selected_topic(&store, &topic).await.unwrap();
        assert_eq!(load_selected_topic(&store).await.unwrap(), Some(topic));
    }
}
