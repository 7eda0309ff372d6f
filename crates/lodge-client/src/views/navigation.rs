//! Navigation bar.

use lodge_shared::types::Capability;
use tracing::info;

use crate::error::Result;
use crate::nav::Route;
use crate::state::AppState;

const LOGGED_OUT: &str = "You have been logged out.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

pub struct NavBar;

impl NavBar {
    /// Links for the current session. "Dashboard" needs the dashboard
    /// capability; an unreadable stored user hides it.
    pub fn links(state: &AppState) -> Vec<NavLink> {
        let mut links = vec![
            NavLink {
                label: "Map Page",
                route: Route::Map,
            },
            NavLink {
                label: "My Profile",
                route: Route::Profile,
            },
        ];

        let show_dashboard = state
            .session_user()
            .ok()
            .and_then(|u| u.user().map(|u| u.can(Capability::ViewDashboard)))
            .unwrap_or(false);
        if show_dashboard {
            links.push(NavLink {
                label: "Dashboard",
                route: Route::Dashboard,
            });
        }
        links
    }

    /// Drop the credential, wipe storage and return to the entry gate.
    pub fn logout(state: &AppState) -> Result<()> {
        {
            let mut session = state.session()?;
            session.set_token(None)?;
            session.clear()?;
        }
        info!("logged out");
        state.navigator.go(Route::Entry);
        state.notifier.info(LOGGED_OUT);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::notify::ToastLevel;
    use lodge_shared::constants::KEY_USER;
    use lodge_store::LocalStorage;

    fn state_with_user(raw: Option<&str>) -> AppState {
        let storage = LocalStorage::open_in_memory().unwrap();
        if let Some(raw) = raw {
            storage.set_item(KEY_USER, raw).unwrap();
        }
        AppState::with_storage(ClientConfig::default(), storage).unwrap()
    }

    fn labels(state: &AppState) -> Vec<&'static str> {
        NavBar::links(state).into_iter().map(|l| l.label).collect()
    }

    #[test]
    fn test_dashboard_link_by_rank() {
        for (role, visible) in [
            ("MASON", false),
            ("SILVER", false),
            ("GOLDEN", true),
            ("ARCHITECT", true),
        ] {
            let state = state_with_user(Some(&format!(r#"{{"role":"{role}"}}"#)));
            assert_eq!(labels(&state).contains(&"Dashboard"), visible, "role {role}");
        }

        assert_eq!(labels(&state_with_user(None)), vec!["Map Page", "My Profile"]);
        assert_eq!(
            labels(&state_with_user(Some("invalid json"))),
            vec!["Map Page", "My Profile"]
        );
    }

    #[test]
    fn test_logout_clears_everything() {
        let state = state_with_user(Some(r#"{"role":"GOLDEN"}"#));
        {
            let mut session = state.session().unwrap();
            session.mark_entry_verified().unwrap();
            session.set_token(Some("t".into())).unwrap();
        }

        NavBar::logout(&state).unwrap();

        let session = state.session().unwrap();
        assert!(session.storage().is_empty().unwrap());
        assert_eq!(session.auth_header(), None);
        drop(session);
        assert_eq!(state.navigator.current(), Route::Entry);
        assert!(state.notifier.contains(ToastLevel::Info, LOGGED_OUT));
    }
}
