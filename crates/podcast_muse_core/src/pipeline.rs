//! crates/podcast_muse_core/src/pipeline.rs
//!
//! The generation pipeline: an ordered list of stages, each driven through a
//! `MediaGenerator`. Stages run strictly one after another; a failure stops
//! the run and nothing that already completed is rolled back.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::ports::{MediaGenerator, PortError, PortResult};

//=========================================================================================
// Stages and their status
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Script,
    Audio,
    Image,
    Video,
}

impl Stage {
    /// Every stage of a full podcast, in execution order.
    pub const FULL: [Stage; 4] = [Stage::Script, Stage::Audio, Stage::Image, Stage::Video];
    pub const SCRIPT_ONLY: [Stage; 1] = [Stage::Script];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Script => "script",
            Stage::Audio => "audio",
            Stage::Image => "image",
            Stage::Video => "video",
        }
    }

    /// Progress line shown while the stage runs.
    pub fn working_message(self) -> &'static str {
        match self {
            Stage::Script => "Writing the script...",
            Stage::Audio => "Generating the audio...",
            Stage::Image => "Generating the cover image...",
            Stage::Video => "Generating the video...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageStatus {
    #[default]
    Pending,
    Generating,
    Completed,
    Error,
}

impl StageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Generating => "generating",
            StageStatus::Completed => "completed",
            StageStatus::Error => "error",
        }
    }
}

/// One status slot per stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationProgress {
    pub script: StageStatus,
    pub audio: StageStatus,
    pub image: StageStatus,
    pub video: StageStatus,
}

impl GenerationProgress {
    pub fn status(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Script => self.script,
            Stage::Audio => self.audio,
            Stage::Image => self.image,
            Stage::Video => self.video,
        }
    }

    fn set(&mut self, stage: Stage, status: StageStatus) {
        let slot = match stage {
            Stage::Script => &mut self.script,
            Stage::Audio => &mut self.audio,
            Stage::Image => &mut self.image,
            Stage::Video => &mut self.video,
        };
        *slot = status;
    }

    pub fn all_completed(&self, stages: &[Stage]) -> bool {
        stages
            .iter()
            .all(|stage| self.status(*stage) == StageStatus::Completed)
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        Stage::FULL
            .into_iter()
            .find(|stage| self.status(*stage) == StageStatus::Error)
    }
}

/// The artifacts collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResults {
    pub script: String,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl GenerationResults {
    fn record(&mut self, stage: Stage, artifact: String) {
        match stage {
            Stage::Script => self.script = artifact,
            Stage::Audio => self.audio_url = Some(artifact),
            Stage::Image => self.image_url = Some(artifact),
            Stage::Video => self.video_url = Some(artifact),
        }
    }
}

//=========================================================================================
// Run inputs
//=========================================================================================

/// Fixed artificial delay per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimings {
    pub script: Duration,
    pub audio: Duration,
    pub image: Duration,
    pub video: Duration,
    /// The script stage of a script-only run.
    pub compose: Duration,
}

impl Default for StageTimings {
    fn default() -> Self {
        Self {
            script: Duration::from_millis(2000),
            audio: Duration::from_millis(3000),
            image: Duration::from_millis(2000),
            video: Duration::from_millis(4000),
            compose: Duration::from_millis(3000),
        }
    }
}

impl StageTimings {
    /// No delays at all.
    pub fn instant() -> Self {
        Self {
            script: Duration::ZERO,
            audio: Duration::ZERO,
            image: Duration::ZERO,
            video: Duration::ZERO,
            compose: Duration::ZERO,
        }
    }

    pub fn delay(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Script => self.script,
            Stage::Audio => self.audio,
            Stage::Image => self.image,
            Stage::Video => self.video,
        }
    }

    /// The delay of `stage` within the run `brief` belongs to.
    pub fn delay_for(&self, stage: Stage, brief: &GenerationBrief) -> Duration {
        match stage {
            Stage::Script if brief.script_only => self.compose,
            other => self.delay(other),
        }
    }
}

/// Everything a generator needs to know about the podcast being produced.
#[derive(Debug, Clone, Default)]
pub struct GenerationBrief {
    pub title: String,
    pub description: String,
    pub script: String,
    pub script_only: bool,
}

/// Which stages to run, and whether the user already supplied a script.
#[derive(Debug, Clone, Copy)]
pub struct PipelinePlan<'a> {
    pub stages: &'a [Stage],
    pub script_provided: bool,
}

//=========================================================================================
// Pipeline state and execution
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub progress: GenerationProgress,
    pub results: GenerationResults,
}

impl PipelineState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Moves `stage` to `Generating`. Every stage before it in the plan must
    /// already be completed.
    fn start(&mut self, stages: &[Stage], stage: Stage) -> PortResult<()> {
        if let Some(blocker) = stages
            .iter()
            .take_while(|s| **s != stage)
            .find(|s| self.progress.status(**s) != StageStatus::Completed)
        {
            return Err(PortError::Unexpected(format!(
                "{} stage cannot start before the {} stage completes",
                stage.label(),
                blocker.label()
            )));
        }
        self.progress.set(stage, StageStatus::Generating);
        Ok(())
    }
}

/// Runs every stage of `plan` in order, reporting each status change to
/// `observe`.
///
/// The cancellation token is checked before each stage starts and once more
/// after the last one. A stage that is already running is allowed to finish,
/// but a run cancelled at any point ends with `PortError::Cancelled`.
pub async fn run_pipeline<F>(
    generator: &dyn MediaGenerator,
    brief: &GenerationBrief,
    plan: PipelinePlan<'_>,
    cancel: &CancellationToken,
    state: &mut PipelineState,
    mut observe: F,
) -> PortResult<()>
where
    F: FnMut(Stage, StageStatus),
{
    for &stage in plan.stages {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }

        if stage == Stage::Script && plan.script_provided {
            state.results.record(stage, brief.script.clone());
            state.progress.set(stage, StageStatus::Completed);
            observe(stage, StageStatus::Completed);
            continue;
        }

        state.start(plan.stages, stage)?;
        observe(stage, StageStatus::Generating);

        match generator.render(stage, brief).await {
            Ok(artifact) => {
                state.results.record(stage, artifact);
                state.progress.set(stage, StageStatus::Completed);
                observe(stage, StageStatus::Completed);
            }
            Err(e) => {
                state.progress.set(stage, StageStatus::Error);
                observe(stage, StageStatus::Error);
                return Err(e);
            }
        }
    }

    // Abandoned while the last stage was running: the run does not count.
    if cancel.is_cancelled() {
        return Err(PortError::Cancelled);
    }
    Ok(())
}
