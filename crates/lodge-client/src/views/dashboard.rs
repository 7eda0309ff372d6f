//! Role-gated dashboard.
//!
//! Inquisitors get the member listing and ban nominations; everyone else
//! gets a static panel. Architects additionally see the compromised
//! protocol (behind a [`ConfirmationModal`]) and backup export/import.

use std::path::{Path, PathBuf};

use lodge_shared::types::{
    Capability, NominateBanRequest, NominationReceipt, User, UserId, UserSummary,
};
use lodge_shared::validation::is_valid_email;
use reqwest::multipart::{Form, Part};
use tracing::{error, info, warn};

use crate::api::Outcome;
use crate::error::{ClientError, Result};
use crate::nav::Route;
use crate::state::AppState;
use crate::views::modal::{ConfirmationModal, ModalEvent};
use crate::views::{describe_failure, unavailable};

const INVALID_INVITE: &str = "Please enter a valid email address.";
const COMPROMISED: &str = "Compromised protocol activated. Session closed.";
const RESTORED: &str = "Backup restored successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    Inquisitor,
    Member,
}

impl DashboardMode {
    pub fn title(&self) -> &'static str {
        match self {
            DashboardMode::Inquisitor => "Inquisitor Dashboard",
            DashboardMode::Member => "User Dashboard",
        }
    }
}

#[derive(Debug)]
pub struct DashboardView {
    pub mode: DashboardMode,
    user: Option<User>,
    pub users: Vec<UserSummary>,
    pub loading_users: bool,
    pub selected: Option<UserId>,
    pub nominating: bool,
    pub invite_email: String,
    pub invite_error: Option<String>,
    pub compromise_modal: ConfirmationModal,
    pub backup_busy: bool,
}

impl DashboardView {
    pub fn for_user(user: Option<User>) -> Self {
        let mode = match &user {
            Some(u) if u.can(Capability::NominateBan) => DashboardMode::Inquisitor,
            _ => DashboardMode::Member,
        };
        Self {
            mode,
            user,
            users: Vec::new(),
            loading_users: false,
            selected: None,
            nominating: false,
            invite_email: String::new(),
            invite_error: None,
            compromise_modal: ConfirmationModal::new(
                "Confirm compromise",
                "This will wipe every session. Are you sure?",
            ),
            backup_busy: false,
        }
    }

    /// Build the view from the stored session user and run the mount fetch.
    pub async fn mount(state: &AppState) -> Result<Self> {
        let user = state.session_user()?.user().cloned();
        let mut view = Self::for_user(user);
        if view.mode == DashboardMode::Inquisitor {
            view.load_users(state).await?;
        }
        Ok(view)
    }

    pub fn title(&self) -> &'static str {
        self.mode.title()
    }

    fn can(&self, capability: Capability) -> bool {
        self.user.as_ref().is_some_and(|u| u.can(capability))
    }

    /// Compromised protocol and backups are shown to the top rank only.
    pub fn shows_architect_actions(&self) -> bool {
        self.can(Capability::TriggerCompromised) && self.can(Capability::ManageBackups)
    }

    pub async fn load_users(&mut self, state: &AppState) -> Result<()> {
        if self.mode != DashboardMode::Inquisitor {
            return Err(ClientError::NotPermitted(Capability::NominateBan));
        }
        self.loading_users = true;
        let result = state.api.get_json::<Vec<UserSummary>>("users/").await;
        self.loading_users = false;

        match result {
            Ok(Outcome::Done(users)) => self.users = users,
            Ok(Outcome::Redirecting(_)) => {}
            Err(e) => {
                error!(error = %e, "Error fetching users");
                state
                    .notifier
                    .error(describe_failure("Error fetching users", &e));
            }
        }
        Ok(())
    }

    pub fn select_user(&mut self, id: UserId) {
        if self.users.iter().any(|u| u.id == id) {
            self.selected = Some(id);
        }
    }

    /// "Start Ban Voting" is enabled only with a selection and nothing in flight.
    pub fn can_nominate(&self) -> bool {
        self.mode == DashboardMode::Inquisitor && self.selected.is_some() && !self.nominating
    }

    pub async fn nominate(&mut self, state: &AppState) -> Result<Option<NominationReceipt>> {
        if self.mode != DashboardMode::Inquisitor {
            return Err(ClientError::NotPermitted(Capability::NominateBan));
        }
        if !self.can_nominate() {
            return Err(unavailable("no user selected"));
        }
        let Some(target_user_id) = self.selected else {
            return Err(unavailable("no user selected"));
        };

        self.nominating = true;
        let body = NominateBanRequest { target_user_id };
        let result = state
            .api
            .post_json::<_, NominationReceipt>("votes/nominate-ban/", &body)
            .await;
        self.nominating = false;

        match result {
            Ok(Outcome::Done(receipt)) => {
                let name = receipt
                    .target_username
                    .clone()
                    .or_else(|| {
                        self.users
                            .iter()
                            .find(|u| u.id == target_user_id)
                            .map(|u| u.username.clone())
                    })
                    .unwrap_or_default();
                state.notifier.success(format!(
                    "User {name} nominated. Voting started (ID: {})",
                    receipt.id
                ));
                self.selected = None;
                Ok(Some(receipt))
            }
            Ok(Outcome::Redirecting(_)) => Ok(None),
            Err(e) => {
                error!(error = %e, target = target_user_id, "nomination rejected");
                // Server reasons such as "Already nominated" are shown verbatim.
                let message = match e.detail() {
                    Some(detail) if !e.is_unauthorized() => detail.to_string(),
                    _ => describe_failure("Error nominating user", &e),
                };
                state.notifier.error(message);
                Ok(None)
            }
        }
    }

    /// No invite endpoint exists; a valid address is logged and the field cleared.
    pub fn submit_invite(&mut self) -> bool {
        let email = self.invite_email.trim();
        if email.is_empty() || !is_valid_email(email) {
            self.invite_error = Some(INVALID_INVITE.into());
            return false;
        }
        info!("Invite sent to: {email}");
        self.invite_email.clear();
        self.invite_error = None;
        true
    }

    /// Open the confirmation dialog for the compromised protocol.
    pub fn request_compromised(&mut self) -> Result<()> {
        if !self.can(Capability::TriggerCompromised) {
            return Err(ClientError::NotPermitted(Capability::TriggerCompromised));
        }
        self.compromise_modal.open();
        Ok(())
    }

    /// Feed a dialog event; confirm runs the protocol. Returns whether it ran.
    pub async fn handle_modal(&mut self, state: &AppState, event: ModalEvent) -> Result<bool> {
        if !self.compromise_modal.handle(event) {
            return Ok(false);
        }
        self.trigger_compromised(state).await
    }

    async fn trigger_compromised(&mut self, state: &AppState) -> Result<bool> {
        match state.api.post_unit::<()>("compromised/", None).await {
            Ok(Outcome::Done(())) => {
                warn!("compromised protocol triggered");
                state.session()?.clear()?;
                state.navigator.go(Route::Entry);
                state.notifier.warn(COMPROMISED);
                Ok(true)
            }
            Ok(Outcome::Redirecting(_)) => Ok(true),
            Err(e) => {
                error!(error = %e, "compromised protocol failed");
                state
                    .notifier
                    .error(describe_failure("Compromised protocol failed", &e));
                Ok(false)
            }
        }
    }

    /// Download the server backup into `dir`. Returns the written path.
    pub async fn export_backup(&mut self, state: &AppState, dir: &Path) -> Result<Option<PathBuf>> {
        if !self.can(Capability::ManageBackups) {
            return Err(ClientError::NotPermitted(Capability::ManageBackups));
        }
        if self.backup_busy {
            return Err(unavailable("backup transfer in progress"));
        }

        self.backup_busy = true;
        let result = state.api.download("backup/").await;
        self.backup_busy = false;

        let download = match result {
            Ok(Outcome::Done(download)) => download,
            Ok(Outcome::Redirecting(_)) => return Ok(None),
            Err(e) => {
                error!(error = %e, "backup export failed");
                state
                    .notifier
                    .error(describe_failure("Backup export failed", &e));
                return Ok(None);
            }
        };

        let file_name = download.file_name.unwrap_or_else(|| {
            let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            format!("lodge_backup_{timestamp}.sqlite3")
        });
        let path = dir.join(&file_name);
        if let Err(e) = write_backup(dir, &path, &download.bytes).await {
            error!(path = %path.display(), error = %e, "backup export failed");
            state
                .notifier
                .error(format!("Backup export failed: {e}"));
            return Ok(None);
        }

        info!(path = %path.display(), bytes = download.bytes.len(), "Backup downloaded");
        state
            .notifier
            .success(format!("Backup downloaded: {file_name}"));
        Ok(Some(path))
    }

    /// Upload a backup file as multipart field `file`.
    pub async fn import_backup(&mut self, state: &AppState, file: &Path) -> Result<bool> {
        if !self.can(Capability::ManageBackups) {
            return Err(ClientError::NotPermitted(Capability::ManageBackups));
        }
        if self.backup_busy {
            return Err(unavailable("backup transfer in progress"));
        }

        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup".to_string());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        self.backup_busy = true;
        let result = state.api.upload("backup/", form).await;
        self.backup_busy = false;

        match result {
            Ok(Outcome::Done(())) => {
                info!(path = %file.display(), "Backup restored");
                state.notifier.success(RESTORED);
                Ok(true)
            }
            Ok(Outcome::Redirecting(_)) => Ok(false),
            Err(e) => {
                error!(error = %e, "backup import failed");
                state
                    .notifier
                    .error(describe_failure("Backup restore failed", &e));
                Ok(false)
            }
        }
    }
}

async fn write_backup(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, bytes).await
}
