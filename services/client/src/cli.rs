//! services/client/src/cli.rs
//!
//! The `podcast-muse` command line: a terminal driver over the page
//! controllers.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use podcast_muse_core::compose::{parse_episode_length, toggle_choice, ComposeForm, EpisodeFormat, Language};
use podcast_muse_core::domain::{ApiKeys, User};
use podcast_muse_core::ports::PortError;
use podcast_muse_core::topics::categories;
use podcast_muse_core::wizard::{Flow, FlowKind, Step};
use tracing::warn;

use crate::adapters::storage::load_api_keys;
use crate::error::ClientError;
use crate::pages::admin::AdminError;
use crate::pages::forms::{self, LoginForm, RegistrationForm, ResetPasswordForm};
use crate::pages::navigation::{self, UserBadge};
use crate::pages::settings::{mask_key, SettingsPage};
use crate::pages::wizard::failure_banner;
use crate::pages::{dashboard, topics, AdminConsole, AppState, Outcome, Route, SessionStore, WizardController};

#[derive(Parser)]
#[command(name = "podcast-muse")]
#[command(about = "Podcast Muse client: create AI podcasts from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login { email: String, password: String },
    /// Create an account (100 free credits)
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user and where they can go
    Whoami,
    /// Request a password reset token
    ForgotPassword { email: String },
    /// Set a new password with a reset token
    ResetPassword { token: String, new_password: String },
    /// Show or update the stored API keys
    Keys(KeysArgs),
    /// Suggest topics for a keyword, or list the categories
    Topics(TopicsArgs),
    /// List your projects
    Projects,
    /// Create a full podcast (script, audio, image, video)
    Create(CreateArgs),
    /// Compose a podcast script only
    Compose(ComposeArgs),
    /// Administer users
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Args)]
pub struct RegisterArgs {
    pub email: String,
    pub password: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(Args)]
pub struct KeysArgs {
    #[arg(long)]
    pub openai: Option<String>,
    #[arg(long)]
    pub kie: Option<String>,
    #[arg(long)]
    pub google: Option<String>,
}

#[derive(Args)]
pub struct TopicsArgs {
    pub keyword: Option<String>,
    /// Remember suggestion N (1-based) for the next `create` or `compose`
    #[arg(long)]
    pub pick: Option<usize>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Read the script from this file
    #[arg(long, conflicts_with_all = ["draft", "use_existing_script"])]
    pub script_file: Option<PathBuf>,
    /// Let the assistant draft the script
    #[arg(long)]
    pub draft: bool,
    /// Reuse an existing script and skip the script stage
    #[arg(long)]
    pub use_existing_script: bool,
    #[arg(long, default_value_t = 10)]
    pub duration: u32,
}

#[derive(Args)]
pub struct ComposeArgs {
    #[arg(long)]
    pub topic: Option<String>,
    #[arg(long)]
    pub language: Option<Language>,
    #[arg(long)]
    pub format: Option<EpisodeFormat>,
    /// Episode length in minutes (5, 10, 15, 20, 30, 45 or 60)
    #[arg(long, value_parser = parse_episode_length)]
    pub length: Option<u32>,
    /// Toggle a tone on or off, repeatable
    #[arg(long = "tone")]
    pub tones: Vec<String>,
    /// Save the generated script as a project
    #[arg(long)]
    pub save: bool,
    /// Write the script into this directory
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Show statistics and every user
    List,
    /// Add credits to a user
    Grant {
        email: String,
        amount: i64,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Grant or revoke admin status
    ToggleAdmin { email: String },
    /// Delete a user
    Delete {
        email: String,
        #[arg(long)]
        yes: bool,
    },
}

fn print_outcome(outcome: &Outcome) {
    if let Some(banner) = &outcome.banner {
        println!("{banner}");
    }
}

fn print_user(user: &User) {
    let badge = UserBadge::for_user(user);
    let admin = if badge.is_admin { " [Admin]" } else { "" };
    println!("{} <{}>{} | Credits: {}", badge.name, user.email, admin, badge.credits);
}

/// The navigation bar as one line, the current page starred.
fn nav_line(user: Option<&User>, current: Route) -> String {
    navigation::links(user, current)
        .iter()
        .map(|link| {
            let star = if link.active { "*" } else { "" };
            format!("{star}{} ({})", link.label, link.route.path())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// "Step 2/3: Script" for the wizard's current step.
fn step_line(flow: &Flow, step: Step) -> Option<String> {
    let labels = flow.step_labels();
    let label = step.index().checked_sub(1).and_then(|i| labels.get(i))?;
    Some(format!("Step {}/{}: {}", step.index(), labels.len(), label))
}

fn print_step(controller: &WizardController) {
    let wizard = controller.wizard();
    if let Some(line) = wizard.flow().and_then(|flow| step_line(flow, wizard.step())) {
        println!("{line}");
    }
}

/// Applies the compose options on top of the form defaults. Each `--tone`
/// toggles, so a default tone can be switched off.
fn fill_compose_form(form: &mut ComposeForm, args: &ComposeArgs) {
    if let Some(topic) = &args.topic {
        form.topic = topic.clone();
    }
    if let Some(language) = args.language {
        form.language = language;
    }
    if let Some(format) = args.format {
        form.format = format;
    }
    if let Some(length) = args.length {
        form.episode_length_min = length;
    }
    for tone in &args.tones {
        toggle_choice(&mut form.tone, tone);
    }
}

/// Fails with `Rejected` when the outcome carries an error banner.
fn require_success(outcome: Outcome) -> Result<Outcome, ClientError> {
    if outcome.is_error() {
        let text = outcome.banner.map(|b| b.text).unwrap_or_default();
        return Err(ClientError::Rejected(text));
    }
    Ok(outcome)
}

pub async fn run(cli: Cli, app: AppState) -> Result<(), ClientError> {
    let session = Arc::new(SessionStore::new(&app));
    session.init().await?;

    match cli.command {
        Commands::Login { email, password } => {
            let outcome = forms::submit_login(&session, &LoginForm { email, password }).await;
            print_outcome(&require_success(outcome)?);
        }
        Commands::Register(args) => {
            let form = RegistrationForm {
                email: args.email,
                confirm_password: args.password.clone(),
                password: args.password,
                first_name: args.first_name.unwrap_or_default(),
                last_name: args.last_name.unwrap_or_default(),
            };
            let outcome = forms::submit_registration(&session, &form).await;
            print_outcome(&require_success(outcome)?);
        }
        Commands::Logout => print_outcome(&navigation::logout(&session).await),
        Commands::Whoami => {
            let user = session.current_user().await;
            match &user {
                Some(user) => print_user(user),
                None => println!("Not signed in"),
            }
            println!("{}", nav_line(user.as_ref(), Route::Dashboard));
        }
        Commands::ForgotPassword { email } => {
            let outcome = forms::submit_forgot_password(app.backend.as_ref(), &email).await;
            print_outcome(&require_success(outcome)?);
        }
        Commands::ResetPassword {
            token,
            new_password,
        } => {
            let form = ResetPasswordForm {
                token,
                confirm_password: new_password.clone(),
                new_password,
            };
            let outcome = forms::submit_reset_password(app.backend.as_ref(), &form).await;
            print_outcome(&require_success(outcome)?);
        }
        Commands::Keys(args) => run_keys(&app, session, args).await?,
        Commands::Topics(args) => run_topics(&app, args).await?,
        Commands::Projects => {
            let view = dashboard::load(&session, app.backend.as_ref()).await?;
            print_user(&view.user);
            if view.projects.is_empty() {
                println!("No projects yet");
            }
            for row in view.projects {
                let credits = if row.finished {
                    format!("{} credits", row.credits_used)
                } else {
                    "unfinished".to_string()
                };
                println!("{} [{}] {} | {}", row.title, row.badge.label, credits, row.description);
            }
        }
        Commands::Create(args) => run_create(&app, session, args).await?,
        Commands::Compose(args) => run_compose(&app, session, args).await?,
        Commands::Admin { command } => run_admin(&app, session, command).await?,
    }
    Ok(())
}

async fn run_keys(app: &AppState, session: Arc<SessionStore>, args: KeysArgs) -> Result<(), ClientError> {
    let page = SettingsPage::new(session, app.store.clone());
    let mut keys = page.load().await?;

    if args.openai.is_some() || args.kie.is_some() || args.google.is_some() {
        keys = ApiKeys {
            openai_key: args.openai.or(keys.openai_key),
            kie_key: args.kie.or(keys.kie_key),
            google_key: args.google.or(keys.google_key),
        };
        print_outcome(&require_success(page.save(&keys).await)?);
        keys = load_api_keys(app.store.as_ref()).await?.unwrap_or_default();
    }

    for (name, key) in [
        ("OpenAI", &keys.openai_key),
        ("KIE", &keys.kie_key),
        ("Google", &keys.google_key),
    ] {
        let shown = key.as_deref().map(mask_key).unwrap_or_else(|| "(not set)".to_string());
        println!("{name}: {shown}");
    }
    Ok(())
}

async fn run_topics(app: &AppState, args: TopicsArgs) -> Result<(), ClientError> {
    let Some(keyword) = args.keyword else {
        println!("Categories: {}", categories().join(", "));
        return Ok(());
    };
    let suggestions = topics::search(&keyword);
    for (i, topic) in suggestions.iter().enumerate() {
        println!("{}. {} ({})", i + 1, topic.title, topic.estimated_length);
        println!("   {}", topic.description);
        println!("   For: {}", topic.target_audience);
    }

    if let Some(pick) = args.pick {
        let topic = pick
            .checked_sub(1)
            .and_then(|i| suggestions.get(i))
            .ok_or_else(|| ClientError::Rejected(format!("There is no suggestion {pick}")))?;
        let outcome = topics::use_topic(app.store.as_ref(), topic).await;
        require_success(outcome)?;
        println!("Selected '{}' for your next podcast", topic.title);
    }
    Ok(())
}

async fn run_create(app: &AppState, session: Arc<SessionStore>, args: CreateArgs) -> Result<(), ClientError> {
    let mut controller = WizardController::new(app, session);
    controller.select_mode(FlowKind::FullPodcast).await?;

    let script = match &args.script_file {
        Some(path) => Some(tokio::fs::read_to_string(path).await?),
        None => None,
    };
    if let Some(Flow::FullPodcast(form)) = controller.flow_mut() {
        if let Some(title) = args.title {
            form.title = title;
        }
        if let Some(description) = args.description {
            form.description = description;
        }
        form.target_duration = args.duration;
        form.use_existing_script = args.use_existing_script;
        if script.is_some() {
            form.script_content = script;
        }
    }

    controller.next().await?;
    print_step(&controller);
    if args.draft {
        print_outcome(&require_success(controller.draft_script().await)?);
    }
    controller.next().await?;
    print_step(&controller);

    let abandon = controller.abandon_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abandon.abandon();
        }
    });
    let result = controller.generate().await;
    watcher.abort();

    match result {
        Ok(report) => {
            print_outcome(&report.outcome);
            let results = &report.results;
            for (label, url) in [
                ("Audio", &results.audio_url),
                ("Cover", &results.image_url),
                ("Video", &results.video_url),
            ] {
                if let Some(url) = url {
                    println!("{label}: {url}");
                }
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", failure_banner(FlowKind::FullPodcast, &e));
            Err(e)
        }
    }
}

async fn run_compose(app: &AppState, session: Arc<SessionStore>, args: ComposeArgs) -> Result<(), ClientError> {
    let mut controller = WizardController::new(app, session);
    controller.select_mode(FlowKind::ScriptOnly).await?;

    if let Some(Flow::ScriptOnly(form)) = controller.flow_mut() {
        fill_compose_form(form, &args);
    }

    controller.next().await?;
    print_step(&controller);
    controller.next().await?;
    print_step(&controller);
    let report = match controller.generate().await {
        Ok(report) => report,
        Err(e) => {
            println!("{}", failure_banner(FlowKind::ScriptOnly, &e));
            return Err(e);
        }
    };
    print_outcome(&report.outcome);
    println!("\n{}", report.results.script);

    if let Some(dir) = args.export {
        if let Some(export) = controller.export_script() {
            let path = dir.join(&export.file_name);
            tokio::fs::write(&path, export.contents).await?;
            println!("Script written to {}", path.display());
        }
    }
    if args.save {
        print_outcome(&require_success(controller.save_script().await)?);
    }
    Ok(())
}

async fn run_admin(app: &AppState, session: Arc<SessionStore>, command: AdminCommand) -> Result<(), ClientError> {
    let mut console = AdminConsole::new(app, session);
    match console.load().await {
        Ok(()) => {}
        Err(AdminError::NotAuthorized) => {
            return Err(ClientError::Rejected(AdminError::NotAuthorized.to_string()))
        }
        Err(AdminError::Port(e)) => return Err(e.into()),
    }

    let find = |console: &AdminConsole, email: &str| -> Result<User, ClientError> {
        console
            .users()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
            .ok_or_else(|| ClientError::Rejected(format!("No user with email {email}")))
    };

    let outcome = match command {
        AdminCommand::List => {
            let stats = console.stats();
            println!(
                "Users: {} ({} admins, {} regular) | Credits distributed: {} | Projects: {} ({} completed, {} in progress)",
                stats.total_users,
                stats.admin_users,
                stats.regular_users,
                stats.credits_distributed,
                stats.total_projects,
                stats.completed_projects,
                stats.in_progress_projects
            );
            for user in console.users() {
                print_user(user);
            }
            return Ok(());
        }
        AdminCommand::Grant {
            email,
            amount,
            reason,
        } => {
            let user = find(&console, &email)?;
            console.grant_credits(&user, amount, &reason).await
        }
        AdminCommand::ToggleAdmin { email } => {
            let user = find(&console, &email)?;
            console.toggle_admin(&user).await
        }
        AdminCommand::Delete { email, yes } => {
            let user = find(&console, &email)?;
            if !yes {
                warn!("Refusing to delete {} without --yes", user.email);
            }
            console.delete_user(&user, yes).await
        }
    };
    print_outcome(&require_success(outcome)?);
    Ok(())
}

/// Maps a missing session to a friendlier message for the terminal.
pub fn describe(err: &ClientError) -> String {
    match err {
        ClientError::Port(PortError::Unauthorized) => {
            "Not signed in. Run `podcast-muse login <email> <password>` first.".to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_requires_subcommand() {
        let err = match Cli::try_parse_from(["podcast-muse"]) {
            Ok(_) => panic!("expected missing subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);
    }

    #[test]
    fn compose_options_parse_their_wire_names() {
        let cli = Cli::try_parse_from([
            "podcast-muse",
            "compose",
            "--topic",
            "Budgeting",
            "--language",
            "en",
            "--format",
            "interview",
            "--tone",
            "calm",
            "--tone",
            "witty",
        ])
        .unwrap();
        match cli.command {
            Commands::Compose(args) => {
                assert_eq!(args.language, Some(Language::English));
                assert_eq!(args.format, Some(EpisodeFormat::Interview));
                assert_eq!(args.tones, vec!["calm", "witty"]);
            }
            _ => panic!("expected compose"),
        }
    }

    #[test]
    fn unknown_choices_are_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["podcast-muse", "compose", "--language", "fr"]).is_err());
    }

    #[test]
    fn only_offered_lengths_parse() {
        let err = match Cli::try_parse_from(["podcast-muse", "compose", "--length", "12"]) {
            Ok(_) => panic!("expected an invalid length"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["podcast-muse", "compose", "--length", "45"]).unwrap();
        match cli.command {
            Commands::Compose(args) => assert_eq!(args.length, Some(45)),
            _ => panic!("expected compose"),
        }
    }

    #[test]
    fn tones_toggle_against_the_defaults() {
        let cli = Cli::try_parse_from([
            "podcast-muse",
            "compose",
            "--tone",
            "warm",
            "--tone",
            "calm",
            "--length",
            "30",
        ])
        .unwrap();
        let Commands::Compose(args) = cli.command else {
            panic!("expected compose");
        };

        let mut form = ComposeForm::default();
        fill_compose_form(&mut form, &args);
        assert_eq!(form.tone, vec!["friendly", "expert", "calm"]);
        assert_eq!(form.episode_length_min, 30);
    }

    #[test]
    fn topics_keyword_is_optional() {
        let cli = Cli::try_parse_from(["podcast-muse", "topics"]).unwrap();
        match cli.command {
            Commands::Topics(args) => assert!(args.keyword.is_none()),
            _ => panic!("expected topics"),
        }
    }

    #[test]
    fn step_lines_use_the_flow_labels() {
        let compose = Flow::new(FlowKind::ScriptOnly);
        assert_eq!(
            step_line(&compose, Step::Script).as_deref(),
            Some("Step 2/3: Audience & Style")
        );
        let podcast = Flow::new(FlowKind::FullPodcast);
        assert_eq!(step_line(&podcast, Step::Generate).as_deref(), Some("Step 3/3: Generate"));
        assert_eq!(step_line(&podcast, Step::ModeSelection), None);
    }

    #[test]
    fn nav_line_stars_the_current_page() {
        assert_eq!(nav_line(None, Route::Landing), "*Sign In (/)");

        let user = User {
            id: uuid::Uuid::nil(),
            email: "root@example.com".to_string(),
            first_name: None,
            last_name: None,
            credits: 10,
            is_admin: true,
            created_at: None,
        };
        let line = nav_line(Some(&user), Route::Dashboard);
        assert!(line.starts_with("*Dashboard (/dashboard)  Topics (/topics)"));
        assert!(line.ends_with("Admin (/admin)"));
    }

    #[test]
    fn script_file_conflicts_with_drafting() {
        let err = match Cli::try_parse_from(["podcast-muse", "create", "--script-file", "s.md", "--draft"]) {
            Ok(_) => panic!("expected conflict"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
