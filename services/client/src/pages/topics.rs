//! services/client/src/pages/topics.rs
//!
//! Topic search over the built-in catalogue. Picking a topic stores it so the
//! wizard can pre-fill its details step.

use podcast_muse_core::domain::TopicSuggestion;
use podcast_muse_core::ports::KeyValueStore;
use podcast_muse_core::topics;
use tracing::error;

use crate::adapters::storage::save_selected_topic;
use crate::pages::{Banner, Outcome, Route};

pub fn search(keyword: &str) -> Vec<TopicSuggestion> {
    topics::suggest(keyword)
}

pub async fn use_topic(store: &dyn KeyValueStore, topic: &TopicSuggestion) -> Outcome {
    match save_selected_topic(store, topic).await {
        Ok(()) => Outcome::redirect(Route::Create),
        Err(e) => {
            error!("Could not store the selected topic: {}", e);
            Outcome::banner(Banner::error("Could not remember the selected topic"))
        }
    }
}
