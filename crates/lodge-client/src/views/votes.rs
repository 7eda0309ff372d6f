//! Profile panel: active votes with live countdowns, vote casting and rank
//! promotion requests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use lodge_shared::types::{CastVoteRequest, Decision, Vote, VoteCounts, VoteId, VotePatch};
use tracing::{debug, error, info};

use crate::api::Outcome;
use crate::error::{ClientError, Result};
use crate::state::{AppState, SessionUser};
use crate::views::countdown::{Countdown, CountdownTicker, SharedCountdown};
use crate::views::promotion::PromotionStatus;
use crate::views::unavailable;

const LOAD_FAILED: &str = "Failed to load active votes.";
const CAST_FAILED: &str = "Failed to cast vote. You might have already voted or the vote ended.";
const PROMOTION_FAILED: &str = "Failed to start promotion vote.";

/// `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// What the row shows in place of (or as) the voting controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// "Voted: AGREE"
    Badge(Decision),
    Closed,
    /// Agree/Disagree buttons, disabled while a cast is in flight.
    Buttons { enabled: bool },
}

impl VoteAction {
    pub fn label(&self) -> String {
        match self {
            VoteAction::Badge(decision) => format!("Voted: {decision}"),
            VoteAction::Closed => "Closed".into(),
            VoteAction::Buttons { enabled: true } => "[Agree] [Disagree]".into(),
            VoteAction::Buttons { enabled: false } => "[...] [...]".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub id: VoteId,
    pub title: String,
    pub time_left: String,
    pub counts: VoteCounts,
    pub action: VoteAction,
}

pub struct ProfileView {
    pub votes: Vec<Vote>,
    pub loading: bool,
    pub promotion: Option<PromotionStatus>,
    pub promoting: bool,
    countdown: SharedCountdown,
    submitting: BTreeSet<VoteId>,
    ticker: Option<CountdownTicker>,
}

impl Default for ProfileView {
    fn default() -> Self {
        Self {
            votes: Vec::new(),
            loading: false,
            promotion: None,
            promoting: false,
            countdown: Arc::new(Mutex::new(Countdown::new())),
            submitting: BTreeSet::new(),
            ticker: None,
        }
    }
}

impl ProfileView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the session user for the promotion section, then load votes.
    pub async fn mount(state: &AppState) -> Result<Self> {
        let mut view = Self::new();
        view.refresh_promotion(state)?;
        view.load_active_votes(state).await?;
        Ok(view)
    }

    fn refresh_promotion(&mut self, state: &AppState) -> Result<()> {
        self.promotion = match state.session_user()? {
            SessionUser::Present(user) => Some(PromotionStatus::evaluate(&user, Utc::now())),
            SessionUser::Missing => {
                state.notifier.error(ClientError::NoSessionUser.to_string());
                None
            }
            // Already logged by the state accessor.
            SessionUser::Corrupt => None,
        };
        Ok(())
    }

    fn countdown(&self) -> std::sync::MutexGuard<'_, Countdown> {
        self.countdown.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn remaining(&self, id: VoteId) -> u64 {
        self.countdown().get(id)
    }

    /// Start the ticker unless one is already running or nothing is left.
    fn ensure_ticker(&mut self) {
        let running = self.ticker.as_ref().is_some_and(|t| !t.is_finished());
        if !running && !self.countdown().is_finished() {
            self.ticker = Some(CountdownTicker::spawn(self.countdown.clone()));
        }
    }

    pub async fn load_active_votes(&mut self, state: &AppState) -> Result<()> {
        self.loading = true;
        let result = state.api.get_json::<Vec<Vote>>("votes/").await;
        self.loading = false;

        match result {
            Ok(Outcome::Done(votes)) => {
                debug!(count = votes.len(), "active votes loaded");
                self.countdown()
                    .seed(votes.iter().map(|v| (v.id, v.remaining_seconds())));
                self.votes = votes;
                self.ensure_ticker();
            }
            Ok(Outcome::Redirecting(_)) => {}
            Err(e) => {
                error!(error = %e, "Error fetching active votes");
                state.notifier.error(LOAD_FAILED);
                self.votes.clear();
                *self.countdown() = Countdown::new();
            }
        }
        Ok(())
    }

    fn action_for(&self, vote: &Vote) -> VoteAction {
        if let Some(decision) = vote.current_user_vote {
            VoteAction::Badge(decision)
        } else if self.remaining(vote.id) == 0 {
            VoteAction::Closed
        } else {
            VoteAction::Buttons {
                enabled: !self.submitting.contains(&vote.id),
            }
        }
    }

    pub fn rows(&self) -> Vec<VoteRow> {
        self.votes
            .iter()
            .map(|vote| VoteRow {
                id: vote.id,
                title: vote.title(),
                time_left: format_time(self.remaining(vote.id)),
                counts: vote.vote_counts,
                action: self.action_for(vote),
            })
            .collect()
    }

    pub fn can_cast(&self, id: VoteId) -> bool {
        self.votes
            .iter()
            .find(|v| v.id == id)
            .is_some_and(|v| self.action_for(v) == VoteAction::Buttons { enabled: true })
    }

    pub async fn cast_vote(&mut self, state: &AppState, id: VoteId, decision: Decision) -> Result<bool> {
        if !self.can_cast(id) {
            return Err(unavailable(format!("vote {id} cannot be cast")));
        }

        self.submitting.insert(id);
        let body = CastVoteRequest { decision };
        let result = state
            .api
            .post_json::<_, VotePatch>(&format!("votes/{id}/cast-vote/"), &body)
            .await;
        self.submitting.remove(&id);

        match result {
            Ok(Outcome::Done(patch)) => {
                if let Some(seconds) = patch.time_remaining_seconds {
                    self.countdown().set(id, seconds.max(0) as u64);
                }
                if let Some(vote) = self.votes.iter_mut().find(|v| v.id == id) {
                    vote.merge(patch);
                }
                info!(vote = id, %decision, "vote cast");
                state
                    .notifier
                    .success(format!("Vote '{decision}' cast successfully!"));
                Ok(true)
            }
            Ok(Outcome::Redirecting(_)) => Ok(false),
            Err(e) => {
                error!(error = %e, vote = id, "Error casting vote");
                state
                    .notifier
                    .error(e.detail().unwrap_or(CAST_FAILED).to_string());
                Ok(false)
            }
        }
    }

    /// Ask the backend to open a promotion vote for the session user.
    pub async fn request_promotion(&mut self, state: &AppState) -> Result<Option<Vote>> {
        let mut user = match state.session_user()? {
            SessionUser::Present(user) => user,
            _ => {
                state.notifier.error(ClientError::NoSessionUser.to_string());
                return Err(ClientError::NoSessionUser);
            }
        };

        let status = PromotionStatus::evaluate(&user, Utc::now());
        self.promotion = Some(status);
        let PromotionStatus::Eligible { next } = status else {
            return Err(unavailable(status.message()));
        };
        if self.promoting {
            return Err(unavailable("promotion request in flight"));
        }

        self.promoting = true;
        let result = state.api.post_empty::<Vote>("votes/promote/").await;
        self.promoting = false;

        match result {
            Ok(Outcome::Done(vote)) => {
                state
                    .notifier
                    .success(format!("Promotion vote to {next} started!"));

                user.last_promotion_attempt = Some(Utc::now());
                state.session()?.set_user(&user)?;
                self.promotion = Some(PromotionStatus::evaluate(&user, Utc::now()));

                self.countdown().set(vote.id, vote.remaining_seconds());
                self.votes.push(vote.clone());
                self.ensure_ticker();
                Ok(Some(vote))
            }
            Ok(Outcome::Redirecting(_)) => Ok(None),
            Err(e) => {
                error!(error = %e, "Error requesting promotion");
                state
                    .notifier
                    .error(e.detail().unwrap_or(PROMOTION_FAILED).to_string());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodge_shared::types::VoteType;

    fn vote(id: VoteId, seconds: i64, voted: Option<Decision>) -> Vote {
        Vote {
            id,
            vote_type: VoteType { name: "BAN".into() },
            target_username: Some("tester".into()),
            time_remaining_seconds: Some(seconds),
            vote_counts: VoteCounts::default(),
            current_user_vote: voted,
        }
    }

    fn view_with(votes: Vec<Vote>) -> ProfileView {
        let view = ProfileView::new();
        view.countdown()
            .seed(votes.iter().map(|v| (v.id, v.remaining_seconds())));
        ProfileView { votes, ..view }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(3661), "01:01:01");
        assert_eq!(format_time(59), "00:00:59");
        assert_eq!(format_time(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_display_rule() {
        let view = view_with(vec![
            vote(1, 3600, Some(Decision::Agree)),
            vote(2, 0, None),
            vote(3, 3600, None),
            vote(4, 0, Some(Decision::Disagree)),
        ]);
        let rows = view.rows();

        assert_eq!(rows[0].action, VoteAction::Badge(Decision::Agree));
        assert_eq!(rows[0].action.label(), "Voted: AGREE");
        assert_eq!(rows[1].action, VoteAction::Closed);
        assert_eq!(rows[2].action, VoteAction::Buttons { enabled: true });
        assert_eq!(rows[3].action.label(), "Voted: DISAGREE");
        assert_eq!(rows[2].title, "BAN on: tester");
        assert_eq!(rows[2].time_left, "01:00:00");

        assert!(!view.can_cast(1));
        assert!(!view.can_cast(2));
        assert!(view.can_cast(3));
        assert!(!view.can_cast(99));
    }

    #[test]
    fn test_in_flight_cast_disables_buttons() {
        let mut view = view_with(vec![vote(3, 3600, None)]);
        view.submitting.insert(3);
        assert_eq!(view.rows()[0].action, VoteAction::Buttons { enabled: false });
        assert!(!view.can_cast(3));
    }
}
