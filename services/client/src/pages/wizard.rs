//! services/client/src/pages/wizard.rs
//!
//! Drives the creation wizard: step gates, the generation run and the
//! save/export actions of the script-only flow.

use std::sync::Arc;
use std::time::Duration;

use podcast_muse_core::compose::ComposeForm;
use podcast_muse_core::domain::{NewProject, Project, ProjectStatus, ProjectUpdate};
use podcast_muse_core::pipeline::{
    run_pipeline, GenerationBrief, GenerationProgress, GenerationResults, PipelinePlan,
    PipelineState, Stage,
};
use podcast_muse_core::ports::{BackendService, KeyValueStore, MediaGenerator, PortError};
use podcast_muse_core::wizard::{
    Flow, FlowKind, GateContext, GateError, PodcastForm, Step, Wizard, FULL_PODCAST_COST,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::adapters::storage::{load_api_keys, load_selected_topic};
use crate::error::ClientError;
use crate::pages::session::SessionStore;
use crate::pages::state::AppState;
use crate::pages::{Banner, Outcome, Route};

/// Cancels the generation run of the controller it came from. The run stops
/// before its next stage starts; a cancel during the last stage still fails
/// the run and nothing is persisted.
#[derive(Clone)]
pub struct AbandonHandle(CancellationToken);

impl AbandonHandle {
    pub fn abandon(&self) {
        self.0.cancel();
    }
}

/// What a finished generation run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// The project created for a full podcast; none for a script-only run.
    pub project: Option<Project>,
    pub results: GenerationResults,
    pub outcome: Outcome,
}

/// A script ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptExport {
    pub file_name: String,
    pub contents: String,
}

pub struct WizardController {
    session: Arc<SessionStore>,
    backend: Arc<dyn BackendService>,
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn MediaGenerator>,
    draft_delay: Duration,
    wizard: Wizard,
    pipeline: PipelineState,
    cancel: CancellationToken,
}

impl WizardController {
    pub fn new(app: &AppState, session: Arc<SessionStore>) -> Self {
        Self {
            session,
            backend: app.backend.clone(),
            store: app.store.clone(),
            generator: app.generator.clone(),
            draft_delay: app.config.stage_timings.script,
            wizard: Wizard::new(),
            pipeline: PipelineState::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn flow_mut(&mut self) -> Option<&mut Flow> {
        self.wizard.flow_mut()
    }

    pub fn progress(&self) -> &GenerationProgress {
        &self.pipeline.progress
    }

    pub fn results(&self) -> &GenerationResults {
        &self.pipeline.results
    }

    pub fn abandon_handle(&self) -> AbandonHandle {
        AbandonHandle(self.cancel.clone())
    }

    //=====================================================================================
    // Steps
    //=====================================================================================

    /// Starts a flow with a fresh form, pre-filled from the topic picked on the
    /// topics page when there is one.
    pub async fn select_mode(&mut self, kind: FlowKind) -> Result<Step, ClientError> {
        self.session.require_user().await?;
        let step = self.wizard.select_mode(kind)?;
        self.pipeline.reset();
        self.cancel = CancellationToken::new();

        if let Some(topic) = load_selected_topic(self.store.as_ref()).await? {
            info!("Pre-filling the wizard with topic '{}'", topic.title);
            self.wizard.apply_topic(&topic);
        }
        Ok(step)
    }

    pub async fn next(&mut self) -> Result<Step, ClientError> {
        let credits = self.session.current_user().await.map(|u| u.credits);
        let keys = load_api_keys(self.store.as_ref()).await?;
        let ctx = GateContext {
            credits,
            api_keys: keys.as_ref(),
        };
        Ok(self.wizard.advance(&ctx)?)
    }

    pub fn back(&mut self) -> Result<Step, GateError> {
        self.wizard.back()
    }

    //=====================================================================================
    // Generation
    //=====================================================================================

    /// Writes a draft script into the full podcast form.
    pub async fn draft_script(&mut self) -> Outcome {
        let Some(Flow::FullPodcast(form)) = self.wizard.flow_mut() else {
            return Outcome::banner(Banner::warning(
                "Drafting a script is only available when creating a full podcast",
            ));
        };
        if form.title.trim().is_empty() {
            return Outcome::banner(Banner::error(GateError::MissingTitle.to_string()));
        }

        tokio::time::sleep(self.draft_delay).await;
        form.script_content = Some(form.draft_script());
        Outcome::banner(Banner::success("Script generated successfully!"))
    }

    /// Runs the pipeline of the selected flow. The wizard must be on its final
    /// step. An abandoned run puts the wizard back on the script step.
    pub async fn generate(&mut self) -> Result<GenerationReport, ClientError> {
        let flow = self
            .wizard
            .flow()
            .cloned()
            .ok_or(GateError::NoModeSelected)?;
        self.wizard.begin_generation()?;
        self.pipeline.reset();

        let result = match &flow {
            Flow::FullPodcast(form) => self.run_full_podcast(form).await,
            Flow::ScriptOnly(form) => self.run_script_only(form).await,
        };

        if matches!(result, Err(ClientError::Port(PortError::Cancelled))) {
            warn!("Generation abandoned");
            self.wizard.abandon_generation()?;
        } else {
            self.wizard.finish_generation();
        }
        self.cancel = CancellationToken::new();

        if let Err(e) = &result {
            error!("Generation failed: {}", e);
        }
        result
    }

    async fn run_full_podcast(&mut self, form: &PodcastForm) -> Result<GenerationReport, ClientError> {
        let mut project = self
            .backend
            .create_project(&NewProject {
                title: form.title.trim().to_string(),
                description: Some(form.description.trim().to_string()),
            })
            .await?;
        info!("Created project {}", project.id);

        let brief = GenerationBrief {
            title: project.title.clone(),
            description: form.description.trim().to_string(),
            script: form.script_content.clone().unwrap_or_default(),
            script_only: false,
        };
        let plan = PipelinePlan {
            stages: &Stage::FULL,
            script_provided: form.use_existing_script,
        };
        run_pipeline(
            self.generator.as_ref(),
            &brief,
            plan,
            &self.cancel,
            &mut self.pipeline,
            |stage, status| info!("{} stage is {}", stage.label(), status.as_str()),
        )
        .await?;

        let update = ProjectUpdate {
            status: Some(ProjectStatus::Completed),
            total_credits_used: Some(FULL_PODCAST_COST),
            ..Default::default()
        };
        self.backend.update_project(project.id, &update).await?;
        project.status = ProjectStatus::Completed;
        project.total_credits_used = FULL_PODCAST_COST;

        // The backend owns the balance; pick up whatever it charged.
        if let Err(e) = self.session.refresh_user().await {
            warn!("Could not refresh the profile after generation: {}", e);
        }

        Ok(GenerationReport {
            project: Some(project),
            results: self.pipeline.results.clone(),
            outcome: Outcome::banner(Banner::success(
                "Podcast created successfully! Redirecting to dashboard...",
            ))
            .then(Route::Dashboard),
        })
    }

    async fn run_script_only(&mut self, form: &ComposeForm) -> Result<GenerationReport, ClientError> {
        let prompt = form.build_prompt();
        info!("Generating a script from a {} character prompt", prompt.chars().count());

        let brief = GenerationBrief {
            title: form.project_title(),
            description: form.project_description(),
            script: form.mock_script(),
            script_only: true,
        };
        let plan = PipelinePlan {
            stages: &Stage::SCRIPT_ONLY,
            script_provided: false,
        };
        run_pipeline(
            self.generator.as_ref(),
            &brief,
            plan,
            &self.cancel,
            &mut self.pipeline,
            |stage, status| info!("{} stage is {}", stage.label(), status.as_str()),
        )
        .await?;

        Ok(GenerationReport {
            project: None,
            results: self.pipeline.results.clone(),
            outcome: Outcome::banner(Banner::success("Script generated successfully!")),
        })
    }

    //=====================================================================================
    // Script-only actions
    //=====================================================================================

    fn compose_form(&self) -> Option<&ComposeForm> {
        match self.wizard.flow() {
            Some(Flow::ScriptOnly(form)) => Some(form),
            _ => None,
        }
    }

    fn generated_script(&self) -> Option<&str> {
        let script = self.pipeline.results.script.as_str();
        (!script.trim().is_empty()).then_some(script)
    }

    /// Replaces the generated script with the user's edited version.
    pub fn edit_script(&mut self, script: String) {
        self.pipeline.results.script = script;
    }

    /// Saves the generated script as a new project.
    pub async fn save_script(&self) -> Outcome {
        let Some(form) = self.compose_form() else {
            return Outcome::banner(Banner::warning("Only a composed script can be saved"));
        };
        if self.generated_script().is_none() {
            return Outcome::banner(Banner::warning("Generate a script before saving it"));
        }

        let project = NewProject {
            title: form.project_title(),
            description: Some(form.project_description()),
        };
        match self.backend.create_project(&project).await {
            Ok(project) => {
                info!("Saved script as project {}", project.id);
                Outcome::banner(Banner::success(
                    "Project saved successfully! Redirecting to dashboard...",
                ))
                .then(Route::Dashboard)
            }
            Err(e) => {
                error!("Saving the script failed: {}", e);
                Outcome::banner(Banner::error("Failed to save project. Please try again."))
            }
        }
    }

    /// The generated script with its download file name.
    pub fn export_script(&self) -> Option<ScriptExport> {
        let form = self.compose_form()?;
        let script = self.generated_script()?;
        Some(ScriptExport {
            file_name: form.export_file_name(),
            contents: script.to_string(),
        })
    }
}

/// The banner shown when `generate` fails.
pub fn failure_banner(kind: FlowKind, err: &ClientError) -> Banner {
    match (kind, err) {
        (_, ClientError::Port(PortError::Cancelled)) => {
            Banner::warning("Generation abandoned. Completed stages were kept.")
        }
        (_, ClientError::Gate(gate)) => Banner::warning(gate.to_string()),
        (FlowKind::FullPodcast, _) => Banner::error("Podcast generation failed. Please try again."),
        (FlowKind::ScriptOnly, _) => Banner::error("Failed to generate script. Please try again."),
    }
}
