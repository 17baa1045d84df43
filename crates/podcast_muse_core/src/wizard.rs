//! crates/podcast_muse_core/src/wizard.rs
//!
//! The podcast creation wizard as a single state machine.
//!
//! `ModeSelection → Details → Script → Generate`. Forward moves pass through a
//! validation gate; backward moves are free except while generation runs.
//! The chosen `Flow` decides the form, the gates, the pipeline stages and the
//! credit cost.

use crate::compose::ComposeForm;
use crate::domain::{ApiKeys, TopicSuggestion};
use crate::pipeline::Stage;

/// Credits charged for a full podcast (script, audio, image, video).
pub const FULL_PODCAST_COST: i64 = 18;
/// Credits charged for generating a script only.
pub const SCRIPT_ONLY_COST: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    ModeSelection,
    Details,
    Script,
    Generate,
}

impl Step {
    pub const LAST: Step = Step::Generate;

    pub fn index(self) -> usize {
        match self {
            Step::ModeSelection => 0,
            Step::Details => 1,
            Step::Script => 2,
            Step::Generate => 3,
        }
    }

    fn next(self) -> Option<Step> {
        match self {
            Step::ModeSelection => Some(Step::Details),
            Step::Details => Some(Step::Script),
            Step::Script => Some(Step::Generate),
            Step::Generate => None,
        }
    }

    fn previous(self) -> Option<Step> {
        match self {
            Step::ModeSelection => None,
            Step::Details => Some(Step::ModeSelection),
            Step::Script => Some(Step::Details),
            Step::Generate => Some(Step::Script),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    ScriptOnly,
    FullPodcast,
}

/// Details collected by the full podcast flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastForm {
    pub title: String,
    pub description: String,
    pub language: String,
    pub target_duration: u32,
    pub voice_gender: String,
    pub voice_tone: String,
    pub script_template: String,
    pub image_style: String,
    pub video_motion: String,
    pub script_content: Option<String>,
    pub use_existing_script: bool,
}

impl Default for PodcastForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            language: "th".to_string(),
            target_duration: 10,
            voice_gender: "female".to_string(),
            voice_tone: "professional".to_string(),
            script_template: "storytelling".to_string(),
            image_style: "studio_mic".to_string(),
            video_motion: "subtle".to_string(),
            script_content: None,
            use_existing_script: false,
        }
    }
}

impl PodcastForm {
    fn has_script(&self) -> bool {
        self.script_content
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Stand-in script written by the "draft a script for me" action.
    pub fn draft_script(&self) -> String {
        let title = self.title.trim();
        let description = self.description.trim();
        format!(
            "# {title}\n\n\
             ## Introduction\nHello everyone, welcome to {title}. Today we're talking about {description}.\n\n\
             ## Main Content\n\
             ### Chapter 1: The Basics\n{description} is a fascinating subject, because...\n\n\
             ### Chapter 2: Techniques\nHere is how it works...\n\n\
             ### Chapter 3: Examples\nLet's look at a real example...\n\n\
             ## Conclusion\nI hope today's episode was useful to you.\nThanks for listening!\n\n\
             ---\n\n\
             *Created by AI with Podcast Muse*\n"
        )
    }
}

/// The wizard's form, tagged by the kind of podcast being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    ScriptOnly(ComposeForm),
    FullPodcast(PodcastForm),
}

impl Flow {
    pub fn new(kind: FlowKind) -> Self {
        match kind {
            FlowKind::ScriptOnly => Flow::ScriptOnly(ComposeForm::default()),
            FlowKind::FullPodcast => Flow::FullPodcast(PodcastForm::default()),
        }
    }

    pub fn kind(&self) -> FlowKind {
        match self {
            Flow::ScriptOnly(_) => FlowKind::ScriptOnly,
            Flow::FullPodcast(_) => FlowKind::FullPodcast,
        }
    }

    pub fn cost(&self) -> i64 {
        match self {
            Flow::ScriptOnly(_) => SCRIPT_ONLY_COST,
            Flow::FullPodcast(_) => FULL_PODCAST_COST,
        }
    }

    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Flow::ScriptOnly(_) => &Stage::SCRIPT_ONLY,
            Flow::FullPodcast(_) => &Stage::FULL,
        }
    }

    /// Labels of the three steps after mode selection.
    pub fn step_labels(&self) -> [&'static str; 3] {
        match self {
            Flow::ScriptOnly(_) => ["Episode Details", "Audience & Style", "Generated Script"],
            Flow::FullPodcast(_) => ["Details", "Script", "Generate"],
        }
    }
}

/// What the gates need to know about the world outside the wizard.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateContext<'a> {
    /// Credit balance of the loaded user; `None` when no profile is loaded.
    pub credits: Option<i64>,
    /// Persisted API keys; `None` when the user never saved any.
    pub api_keys: Option<&'a ApiKeys>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Choose a creation mode first")]
    NoModeSelected,
    #[error("Please enter a podcast title")]
    MissingTitle,
    #[error("Please enter a podcast description")]
    MissingDescription,
    #[error("Please configure your API keys in Settings first!")]
    ApiKeysNotConfigured,
    #[error("Please configure both the OpenAI and KIE API keys in Settings first!")]
    MissingGenerationKeys,
    #[error("Please choose an existing script or write a new one")]
    MissingScript,
    #[error("Please enter a topic for your podcast.")]
    MissingTopic,
    #[error("Not enough credits to create this podcast ({required} credits required, {available} available)")]
    InsufficientCredits { required: i64, available: i64 },
    #[error("Already at the final step")]
    AtFinalStep,
    #[error("Already at the first step")]
    AtFirstStep,
    #[error("Generation is in progress; confirm to abandon it")]
    GenerationInProgress,
    #[error("Generation can only start from the final step")]
    NotReadyToGenerate,
    #[error("No generation is running")]
    NotGenerating,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    flow: Option<Flow>,
    step: Step,
    generating: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            flow: None,
            step: Step::ModeSelection,
            generating: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn flow(&self) -> Option<&Flow> {
        self.flow.as_ref()
    }

    pub fn flow_mut(&mut self) -> Option<&mut Flow> {
        self.flow.as_mut()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Starts `kind` with a fresh form and moves to the details step.
    pub fn select_mode(&mut self, kind: FlowKind) -> Result<Step, GateError> {
        if self.generating {
            return Err(GateError::GenerationInProgress);
        }
        self.flow = Some(Flow::new(kind));
        self.step = Step::Details;
        Ok(self.step)
    }

    /// Copies a picked topic into the details of the current form.
    pub fn apply_topic(&mut self, topic: &TopicSuggestion) {
        match self.flow.as_mut() {
            Some(Flow::FullPodcast(form)) => {
                form.title = topic.title.clone();
                form.description = topic.description.clone();
            }
            Some(Flow::ScriptOnly(form)) => {
                form.topic = topic.title.clone();
            }
            None => {}
        }
    }

    /// Validates the current step and moves one step forward.
    pub fn advance(&mut self, ctx: &GateContext<'_>) -> Result<Step, GateError> {
        if self.generating {
            return Err(GateError::GenerationInProgress);
        }
        let flow = self.flow.as_ref().ok_or(GateError::NoModeSelected)?;
        let next = self.step.next().ok_or(GateError::AtFinalStep)?;

        match self.step {
            Step::ModeSelection => {}
            Step::Details => check_details(flow, ctx)?,
            Step::Script => check_script(flow, ctx)?,
            Step::Generate => return Err(GateError::AtFinalStep),
        }

        self.step = next;
        Ok(next)
    }

    /// Moves one step back. Refused while generation runs.
    pub fn back(&mut self) -> Result<Step, GateError> {
        if self.generating {
            return Err(GateError::GenerationInProgress);
        }
        let previous = self.step.previous().ok_or(GateError::AtFirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    pub fn begin_generation(&mut self) -> Result<(), GateError> {
        if self.flow.is_none() {
            return Err(GateError::NoModeSelected);
        }
        if self.generating {
            return Err(GateError::GenerationInProgress);
        }
        if self.step != Step::Generate {
            return Err(GateError::NotReadyToGenerate);
        }
        self.generating = true;
        Ok(())
    }

    /// The user confirmed abandoning a running generation: back to the script step.
    pub fn abandon_generation(&mut self) -> Result<Step, GateError> {
        if !self.generating {
            return Err(GateError::NotGenerating);
        }
        self.generating = false;
        self.step = Step::Script;
        Ok(self.step)
    }

    /// Generation ended, successfully or not. The wizard stays on the final step.
    pub fn finish_generation(&mut self) {
        self.generating = false;
    }
}

fn check_details(flow: &Flow, ctx: &GateContext<'_>) -> Result<(), GateError> {
    let Flow::FullPodcast(form) = flow else {
        return Ok(());
    };
    if form.title.trim().is_empty() {
        return Err(GateError::MissingTitle);
    }
    if form.description.trim().is_empty() {
        return Err(GateError::MissingDescription);
    }
    let keys = ctx.api_keys.ok_or(GateError::ApiKeysNotConfigured)?;
    if !keys.has_generation_keys() {
        return Err(GateError::MissingGenerationKeys);
    }
    Ok(())
}

fn check_script(flow: &Flow, ctx: &GateContext<'_>) -> Result<(), GateError> {
    match flow {
        Flow::FullPodcast(form) => {
            if !form.use_existing_script && !form.has_script() {
                return Err(GateError::MissingScript);
            }
        }
        Flow::ScriptOnly(form) => {
            if form.topic_is_missing() {
                return Err(GateError::MissingTopic);
            }
        }
    }
    check_credits(flow.cost(), ctx)
}

fn check_credits(required: i64, ctx: &GateContext<'_>) -> Result<(), GateError> {
    match ctx.credits {
        Some(available) if available < required => {
            Err(GateError::InsufficientCredits { required, available })
        }
        _ => Ok(()),
    }
}
