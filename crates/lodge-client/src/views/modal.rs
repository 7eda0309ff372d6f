//! Two-state confirmation dialog.
//!
//! `Closed -> Open` on the trigger, `Open -> Closed` on every event. Only
//! [`ModalEvent::Confirm`] reports that the guarded action should run.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Confirm,
    Cancel,
    /// Click outside the dialog body.
    Backdrop,
    Escape,
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmationModal {
    pub title: String,
    pub message: String,
    state: ModalState,
}

impl ConfirmationModal {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            state: ModalState::Closed,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ModalState::Open
    }

    pub fn open(&mut self) {
        self.state = ModalState::Open;
    }

    /// Feed an event. Returns `true` only for a confirm on an open dialog.
    pub fn handle(&mut self, event: ModalEvent) -> bool {
        if self.state == ModalState::Closed {
            return false;
        }
        self.state = ModalState::Closed;
        event == ModalEvent::Confirm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_confirm_runs_action() {
        for event in [ModalEvent::Cancel, ModalEvent::Backdrop, ModalEvent::Escape] {
            let mut modal = ConfirmationModal::new("Confirm", "Sure?");
            modal.open();
            assert!(!modal.handle(event));
            assert_eq!(modal.state(), ModalState::Closed);
        }

        let mut modal = ConfirmationModal::new("Confirm", "Sure?");
        modal.open();
        assert!(modal.handle(ModalEvent::Confirm));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_closed_modal_ignores_events() {
        let mut modal = ConfirmationModal::default();
        assert!(!modal.handle(ModalEvent::Confirm));
        assert_eq!(modal.state(), ModalState::Closed);
    }
}
