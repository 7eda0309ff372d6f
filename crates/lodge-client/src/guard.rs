//! Route guard: everything but the entry gate requires the entry flag.

use crate::nav::Route;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn is_gated(route: &Route) -> bool {
        !matches!(route, Route::Entry | Route::External(_))
    }

    pub fn check(session: &Session, route: &Route) -> GuardDecision {
        if !Self::is_gated(route) || session.is_entry_verified() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Route::Entry)
        }
    }
}
