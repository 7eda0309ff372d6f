//! Application state shared by every view.
//!
//! [`AppState`] is a bundle of cheap, cloneable handles: the session
//! context, the API gateway built on top of it, the navigation history and
//! the notification sink. Views borrow it for the duration of a call.

use std::sync::Arc;

use lodge_shared::types::User;
use lodge_store::{LocalStorage, StoreError};
use tracing::error;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::guard::{GuardDecision, RouteGuard};
use crate::nav::{Navigator, Route};
use crate::notify::Notifier;
use crate::session::{self, Session, SessionHandle};

/// How the stored session user looked when it was read.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUser {
    Present(User),
    Missing,
    /// Stored value exists but is not a valid user.
    Corrupt,
}

impl SessionUser {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionUser::Present(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub session: SessionHandle,
    pub api: ApiClient,
    pub navigator: Navigator,
    pub notifier: Notifier,
}

impl AppState {
    /// Open the configured storage and restore the session from it.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let storage = match &config.storage_path {
            Some(path) => LocalStorage::open_at(path)?,
            None => LocalStorage::new()?,
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: ClientConfig, storage: LocalStorage) -> Result<Self> {
        let session = Session::restore_from(storage)?.into_handle();
        let navigator = Navigator::default();
        let api = ApiClient::new(&config, session.clone(), navigator.clone())?;

        Ok(Self {
            config: Arc::new(config),
            session,
            api,
            navigator,
            notifier: Notifier::new(),
        })
    }

    /// Lock the session for a short synchronous section.
    pub fn session(&self) -> Result<std::sync::MutexGuard<'_, Session>> {
        session::lock(&self.session)
    }

    pub fn is_entry_verified(&self) -> bool {
        self.session()
            .map(|s| s.is_entry_verified())
            .unwrap_or(false)
    }

    /// Read the stored user, logging (not notifying) a corrupt value.
    pub fn session_user(&self) -> Result<SessionUser> {
        let session = self.session()?;
        match session.user() {
            Ok(Some(user)) => Ok(SessionUser::Present(user)),
            Ok(None) => Ok(SessionUser::Missing),
            Err(StoreError::Json { source, .. }) => {
                error!(error = %source, "Error parsing user data");
                Ok(SessionUser::Corrupt)
            }
            Err(e) => Err(ClientError::Store(e)),
        }
    }

    /// Navigate through the route guard. Returns where we actually landed.
    pub fn open_route(&self, route: Route) -> Result<Route> {
        let decision = {
            let session = self.session()?;
            RouteGuard::check(&session, &route)
        };
        let landed = match decision {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(to) => to,
        };
        self.navigator.replace(landed.clone());
        Ok(landed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodge_shared::constants::KEY_USER;

    fn state() -> AppState {
        AppState::with_storage(ClientConfig::default(), LocalStorage::open_in_memory().unwrap())
            .unwrap()
    }

    #[test]
    fn test_open_route_applies_guard() {
        let state = state();
        assert_eq!(state.open_route(Route::Dashboard).unwrap(), Route::Entry);
        assert_eq!(state.navigator.current(), Route::Entry);

        state.session().unwrap().mark_entry_verified().unwrap();
        assert_eq!(state.open_route(Route::Dashboard).unwrap(), Route::Dashboard);
        assert_eq!(state.navigator.current(), Route::Dashboard);
    }

    #[test]
    fn test_session_user_states() {
        let state = state();
        assert_eq!(state.session_user().unwrap(), SessionUser::Missing);

        state
            .session()
            .unwrap()
            .storage()
            .set_item(KEY_USER, "invalid json")
            .unwrap();
        assert_eq!(state.session_user().unwrap(), SessionUser::Corrupt);

        state
            .session()
            .unwrap()
            .storage()
            .set_item(KEY_USER, r#"{"role":"ARCHITECT","username":"hiram"}"#)
            .unwrap();
        let user = state.session_user().unwrap();
        assert_eq!(user.user().map(|u| u.username.as_str()), Some("hiram"));
    }
}
