//! services/client/src/pages/banner.rs

use std::fmt;

use podcast_muse_core::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A one-line status message shown above a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Error, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Warning, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: BannerKind::Info, text: text.into() }
    }

    /// The backend's detail when it sent one, `fallback` otherwise.
    pub fn from_port_error(err: &PortError, fallback: &str) -> Self {
        Self::error(err.detail().unwrap_or(fallback))
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            BannerKind::Success => "✅",
            BannerKind::Error => "❌",
            BannerKind::Warning => "⚠️",
            BannerKind::Info => "ℹ️",
        };
        write!(f, "{marker} {}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_prefer_the_backend_detail() {
        let with_detail = PortError::Status {
            status: 401,
            detail: Some("Invalid credentials".to_string()),
        };
        assert_eq!(
            Banner::from_port_error(&with_detail, "Login failed").text,
            "Invalid credentials"
        );

        let bare = PortError::Transport("connection refused".to_string());
        assert_eq!(Banner::from_port_error(&bare, "Login failed").text, "Login failed");
    }
}
