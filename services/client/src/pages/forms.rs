//! services/client/src/pages/forms.rs
//!
//! Login, registration, forgot-password and reset-password forms. Each one
//! validates its input, calls the backend and returns a banner.

use podcast_muse_core::domain::Registration;
use podcast_muse_core::ports::{BackendService, PortError};
use regex::Regex;
use tracing::{error, info};

use crate::pages::session::SessionStore;
use crate::pages::{Banner, Outcome, Route};

const MIN_PASSWORD_LEN: usize = 6;
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn looks_like_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

//=========================================================================================
// Login
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn submit_login(session: &SessionStore, form: &LoginForm) -> Outcome {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Outcome::banner(Banner::error("Please enter your email and password"));
    }

    match session.login(&form.email, &form.password).await {
        Ok(user) => Outcome::banner(Banner::success(format!(
            "Welcome back, {}!",
            user.display_name()
        )))
        .then(Route::Dashboard),
        Err(e) => {
            error!("Login failed: {}", e);
            Outcome::banner(Banner::from_port_error(&e, "Login failed"))
        }
    }
}

//=========================================================================================
// Registration
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegistrationForm {
    fn validate(&self) -> Result<Registration, Banner> {
        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err(Banner::error("Please enter a valid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Banner::error("Password must be at least 6 characters long"));
        }
        if self.password != self.confirm_password {
            return Err(Banner::error("Passwords do not match"));
        }
        Ok(Registration {
            email: email.to_string(),
            password: self.password.clone(),
            first_name: blank_to_none(&self.first_name),
            last_name: blank_to_none(&self.last_name),
        })
    }
}

pub async fn submit_registration(session: &SessionStore, form: &RegistrationForm) -> Outcome {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(banner) => return Outcome::banner(banner),
    };

    match session.register(&registration).await {
        Ok(_) => Outcome::banner(Banner::success(
            "Registration successful! You received 100 free credits.",
        ))
        .then(Route::Landing),
        Err(e) => {
            error!("Registration failed: {}", e);
            Outcome::banner(Banner::from_port_error(&e, "Registration failed"))
        }
    }
}

//=========================================================================================
// Password reset
//=========================================================================================

pub async fn submit_forgot_password(backend: &dyn BackendService, email: &str) -> Outcome {
    let email = email.trim();
    if email.is_empty() {
        return Outcome::banner(Banner::error("Please enter your email address"));
    }

    match backend.forgot_password(email).await {
        Ok(ticket) => match ticket.reset_token {
            Some(token) => {
                info!("Reset token issued for {}", email);
                let expires = ticket.expires_at.as_deref().unwrap_or("unknown");
                Outcome::banner(Banner::success(format!(
                    "Password reset link sent! For testing, your reset token is: {token} (expires at {expires})"
                )))
            }
            None => Outcome::banner(Banner::success(
                "If your email is registered, you will receive a reset link",
            )),
        },
        Err(e) => {
            error!("Forgot-password request failed: {}", e);
            Outcome::banner(Banner::error("Failed to send reset link. Please try again."))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn submit_reset_password(backend: &dyn BackendService, form: &ResetPasswordForm) -> Outcome {
    if form.new_password != form.confirm_password {
        return Outcome::banner(Banner::error("Passwords do not match"));
    }
    if form.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Outcome::banner(Banner::error("Password must be at least 6 characters long"));
    }
    if form.token.trim().is_empty() {
        return Outcome::banner(Banner::error("Invalid or missing reset token"));
    }

    match backend.reset_password(form.token.trim(), &form.new_password).await {
        Ok(()) => Outcome::banner(Banner::success(
            "Password reset successful! Redirecting to login...",
        ))
        .then(Route::Landing),
        Err(e) => {
            error!("Password reset failed: {}", e);
            match e {
                PortError::Status { status: 400, detail: Some(detail) } => {
                    Outcome::banner(Banner::error(detail))
                }
                _ => Outcome::banner(Banner::error("Failed to reset password. Please try again.")),
            }
        }
    }
}
