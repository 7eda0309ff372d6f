//! In-app routes and the navigation history.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` -- entry password gate.
    Entry,
    Login,
    Register,
    /// `/main` -- marker map.
    Map,
    Dashboard,
    Profile,
    /// Anything outside the route table, e.g. a server-forced redirect target.
    External(String),
}

impl Route {
    pub fn parse(target: &str) -> Route {
        match target.trim() {
            "/" | "" => Route::Entry,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/main" => Route::Map,
            "/dashboard" => Route::Dashboard,
            "/profile" => Route::Profile,
            other => Route::External(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Entry => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Map => "/main",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::External(target) => target,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Shared navigation history. The last entry is the current location.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Entry)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            history: Arc::new(Mutex::new(vec![start])),
        }
    }

    pub fn go(&self, route: Route) {
        debug!(to = %route, "navigate");
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(route);
    }

    /// Replace the current location without growing the history.
    pub fn replace(&self, route: Route) {
        debug!(to = %route, "navigate (replace)");
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.pop();
        history.push(route);
    }

    pub fn current(&self) -> Route {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.last().cloned().unwrap_or(Route::Entry)
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_round_trip() {
        for route in [
            Route::Entry,
            Route::Login,
            Route::Register,
            Route::Map,
            Route::Dashboard,
            Route::Profile,
        ] {
            assert_eq!(Route::parse(route.path()), route);
        }
        assert_eq!(
            Route::parse("https://example.org/bye"),
            Route::External("https://example.org/bye".into())
        );
    }

    #[test]
    fn test_navigator_history() {
        let nav = Navigator::default();
        assert_eq!(nav.current(), Route::Entry);
        nav.go(Route::Login);
        nav.go(Route::Map);
        nav.replace(Route::Entry);
        assert_eq!(nav.history(), vec![Route::Entry, Route::Login, Route::Entry]);
    }
}
