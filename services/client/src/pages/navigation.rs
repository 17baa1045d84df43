//! services/client/src/pages/navigation.rs
//!
//! The navigation shell: which top-level links a session may see, the user
//! badge, and logout.

use podcast_muse_core::domain::User;
use tracing::warn;

use crate::pages::session::SessionStore;
use crate::pages::{Outcome, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
    pub active: bool,
}

const SIGNED_IN_LINKS: [(&str, Route); 5] = [
    ("Dashboard", Route::Dashboard),
    ("Topics", Route::Topics),
    ("Create", Route::Create),
    ("Compose", Route::Compose),
    ("Settings", Route::Settings),
];

/// Links for the current session, with the one matching `current` marked active.
pub fn links(user: Option<&User>, current: Route) -> Vec<NavLink> {
    let link = |label, route| NavLink {
        label,
        route,
        active: route == current,
    };

    let Some(user) = user else {
        return vec![link("Sign In", Route::Landing)];
    };

    let mut links: Vec<NavLink> = SIGNED_IN_LINKS
        .iter()
        .map(|(label, route)| link(*label, *route))
        .collect();
    if user.is_admin {
        links.push(link("Admin", Route::Admin));
    }
    links
}

/// Name, admin tag and credit balance shown at the right of the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    pub name: String,
    pub is_admin: bool,
    pub credits: i64,
}

impl UserBadge {
    pub fn for_user(user: &User) -> Self {
        Self {
            name: user.display_name(),
            is_admin: user.is_admin,
            credits: user.credits,
        }
    }
}

/// Ends the session and sends the user back to the landing page. A storage
/// failure is logged; the in-memory session is gone regardless.
pub async fn logout(session: &SessionStore) -> Outcome {
    if let Err(e) = session.logout().await {
        warn!("Could not remove the persisted token: {}", e);
    }
    Outcome::redirect(Route::Landing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "host@podcast.test".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Host".to_string()),
            credits: 82,
            is_admin,
            created_at: None,
        }
    }

    #[test]
    fn signed_out_sessions_only_see_sign_in() {
        let links = links(None, Route::Landing);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "Sign In");
        assert!(links[0].active);
    }

    #[test]
    fn admin_link_is_reserved_for_admins() {
        let regular = links(Some(&user(false)), Route::Create);
        assert!(regular.iter().all(|l| l.route != Route::Admin));
        let active: Vec<_> = regular.iter().filter(|l| l.active).map(|l| l.label).collect();
        assert_eq!(active, vec!["Create"]);

        let admin = links(Some(&user(true)), Route::Admin);
        assert_eq!(admin.last().map(|l| (l.label, l.active)), Some(("Admin", true)));
    }

    #[test]
    fn badge_shows_name_and_credits() {
        let badge = UserBadge::for_user(&user(true));
        assert_eq!(badge.name, "Ada Host");
        assert!(badge.is_admin);
        assert_eq!(badge.credits, 82);
    }
}
