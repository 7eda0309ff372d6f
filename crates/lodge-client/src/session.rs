//! Session context.
//!
//! The [`Session`] owns the persisted client storage and the in-memory copy
//! of the auth credential. It is shared behind [`SessionHandle`] by every
//! component that talks to the backend, and moves through
//! `Init -> Active -> Cleared`.

use std::sync::{Arc, Mutex, MutexGuard};

use lodge_shared::constants::{
    AUTH_SCHEME, ENTRY_VERIFIED_VALUE, KEY_AUTH_TOKEN, KEY_ENTRY_VERIFIED, KEY_USER,
};
use lodge_shared::types::User;
use lodge_store::{LocalStorage, StoreError};
use tracing::{debug, info, warn};

use crate::error::ClientError;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, storage not read yet.
    Init,
    /// Restored from storage or credential set.
    Active,
    /// Wiped by logout or a forced redirect.
    Cleared,
}

pub struct Session {
    storage: LocalStorage,
    token: Option<String>,
    phase: SessionPhase,
}

impl Session {
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            token: None,
            phase: SessionPhase::Init,
        }
    }

    /// Build a session and immediately restore it from storage.
    pub fn restore_from(storage: LocalStorage) -> Result<Self, StoreError> {
        let mut session = Self::new(storage);
        session.restore()?;
        Ok(session)
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    /// Load the persisted credential.
    pub fn restore(&mut self) -> Result<(), StoreError> {
        self.token = self
            .storage
            .get_item(KEY_AUTH_TOKEN)?
            .filter(|t| !t.is_empty());
        self.phase = SessionPhase::Active;
        debug!(has_token = self.token.is_some(), "session restored");
        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Only the exact stored string `"true"` counts as verified.
    pub fn is_entry_verified(&self) -> bool {
        match self.storage.get_item(KEY_ENTRY_VERIFIED) {
            Ok(value) => value.as_deref() == Some(ENTRY_VERIFIED_VALUE),
            Err(e) => {
                warn!(error = %e, "failed to read entry flag");
                false
            }
        }
    }

    pub fn mark_entry_verified(&mut self) -> Result<(), StoreError> {
        self.storage.set_item(KEY_ENTRY_VERIFIED, ENTRY_VERIFIED_VALUE)?;
        self.phase = SessionPhase::Active;
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Set or remove the credential used by every later request.
    pub fn set_token(&mut self, token: Option<String>) -> Result<(), StoreError> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.storage.set_item(KEY_AUTH_TOKEN, &token)?;
                self.token = Some(token);
                self.phase = SessionPhase::Active;
            }
            None => {
                self.storage.remove_item(KEY_AUTH_TOKEN)?;
                self.token = None;
            }
        }
        Ok(())
    }

    /// Value of the `Authorization` header, if a credential is set.
    pub fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("{AUTH_SCHEME} {t}"))
    }

    /// Stored session user. A corrupt stored value is a
    /// [`StoreError::Json`], distinct from `Ok(None)`.
    pub fn user(&self) -> Result<Option<User>, StoreError> {
        self.storage.get_json(KEY_USER)
    }

    pub fn set_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.storage.set_json(KEY_USER, user)
    }

    /// Wipe every persisted key and the in-memory credential.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.token = None;
        self.phase = SessionPhase::Cleared;
        let removed = self.storage.clear()?;
        info!(removed, "session cleared");
        Ok(())
    }
}

/// Lock the shared session, mapping poisoning to a client error.
pub fn lock(handle: &SessionHandle) -> Result<MutexGuard<'_, Session>, ClientError> {
    handle
        .lock()
        .map_err(|e| ClientError::Lock(format!("session: {e}")))
}
