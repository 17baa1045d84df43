//! services/client/src/pages/mod.rs
//!
//! Page controllers. Each page takes user input, talks to the ports and hands
//! back an `Outcome`: an optional banner and an optional redirect.

pub mod admin;
pub mod banner;
pub mod dashboard;
pub mod forms;
pub mod navigation;
pub mod session;
pub mod settings;
pub mod state;
pub mod topics;
pub mod wizard;

pub use admin::AdminConsole;
pub use banner::{Banner, BannerKind};
pub use session::SessionStore;
pub use state::AppState;
pub use wizard::WizardController;

/// Top-level client routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Topics,
    Create,
    Compose,
    Settings,
    Admin,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Register => "/register",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
            Route::Dashboard => "/dashboard",
            Route::Topics => "/topics",
            Route::Create => "/create",
            Route::Compose => "/compose",
            Route::Settings => "/settings",
            Route::Admin => "/admin",
        }
    }
}

/// What a page action hands back to the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub banner: Option<Banner>,
    pub redirect: Option<Route>,
}

impl Outcome {
    pub fn banner(banner: Banner) -> Self {
        Self {
            banner: Some(banner),
            redirect: None,
        }
    }

    pub fn redirect(route: Route) -> Self {
        Self {
            banner: None,
            redirect: Some(route),
        }
    }

    pub fn then(mut self, route: Route) -> Self {
        self.redirect = Some(route);
        self
    }

    pub fn is_error(&self) -> bool {
        self.banner
            .as_ref()
            .is_some_and(|b| b.kind == BannerKind::Error)
    }
}
