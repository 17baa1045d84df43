//! services/client/src/adapters/generation.rs
//!
//! The simulated media generator. Every stage waits a fixed delay and then
//! hands back a placeholder artifact; no real model is called.

use async_trait::async_trait;
use podcast_muse_core::pipeline::{GenerationBrief, Stage, StageTimings};
use podcast_muse_core::ports::{MediaGenerator, PortError, PortResult};
use tracing::info;
use uuid::Uuid;

pub const MOCK_AUDIO_URL: &str = "https://example.com/audio.mp3";
pub const MOCK_VIDEO_URL: &str = "https://example.com/video.mp4";
const MOCK_IMAGE_BASE: &str = "https://picsum.photos/800/800";

/// A `MediaGenerator` that sleeps for each stage's configured delay.
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    timings: StageTimings,
}

impl SimulatedGenerator {
    pub fn new(timings: StageTimings) -> Self {
        Self { timings }
    }
}

#[async_trait]
impl MediaGenerator for SimulatedGenerator {
    async fn render(&self, stage: Stage, brief: &GenerationBrief) -> PortResult<String> {
        info!("{}", stage.working_message());
        tokio::time::sleep(self.timings.delay_for(stage, brief)).await;

        match stage {
            Stage::Script => {
                if brief.script.trim().is_empty() {
                    return Err(PortError::Unexpected("no script to render".to_string()));
                }
                Ok(brief.script.clone())
            }
            Stage::Audio => Ok(MOCK_AUDIO_URL.to_string()),
            Stage::Image => Ok(mock_image_url()),
            Stage::Video => Ok(MOCK_VIDEO_URL.to_string()),
        }
    }
}

/// A picsum URL with a random cache-busting query.
fn mock_image_url() -> String {
    let random = Uuid::new_v4().as_u128() % 1000;
    format!("{MOCK_IMAGE_BASE}?random={random}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_stage_yields_its_placeholder() {
        let generator = SimulatedGenerator::new(StageTimings::instant());
        let brief = GenerationBrief {
            title: "T".to_string(),
            description: "D".to_string(),
            script: "# T".to_string(),
            ..Default::default()
        };

        assert_eq!(generator.render(Stage::Script, &brief).await.unwrap(), "# T");
        assert_eq!(generator.render(Stage::Audio, &brief).await.unwrap(), MOCK_AUDIO_URL);
        assert_eq!(generator.render(Stage::Video, &brief).await.unwrap(), MOCK_VIDEO_URL);
        let image = generator.render(Stage::Image, &brief).await.unwrap();
        assert!(image.starts_with("https://picsum.photos/800/800?random="));
    }

    #[tokio::test]
    async fn an_empty_script_fails_the_script_stage() {
        let generator = SimulatedGenerator::new(StageTimings::instant());
        let err = generator
            .render(Stage::Script, &GenerationBrief::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
