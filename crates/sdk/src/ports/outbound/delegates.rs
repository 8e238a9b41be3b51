//! Host notification ports
//!
//! Split into narrow channels so an embedding only implements what it
//! needs: a headless host can skip [`ConsentUiDelegate`] entirely.

use ccpa_domain::{Action, ConsentUuid, UserConsent};

use super::ConsentError;

/// Presentation lifecycle notifications. Every method defaults to a no-op.
pub trait ConsentUiDelegate: Send + Sync {
    /// The consent UI is about to be shown; the host should present it.
    fn consent_ui_will_show(&self) {}

    /// The consent UI is gone; the host should dismiss its container.
    fn consent_ui_did_disappear(&self) {}

    fn message_will_show(&self) {}

    fn message_did_disappear(&self) {}

    fn pm_will_show(&self) {}

    fn pm_did_disappear(&self) {}

    /// A UI-only action (no consent submission) was taken.
    fn on_action(&self, _action: Action) {}
}

/// Receives the final consent after it has been persisted.
pub trait ConsentReadyDelegate: Send + Sync {
    fn on_consent_ready(&self, consent_uuid: &ConsentUuid, user_consent: &UserConsent);
}

/// Receives every error that reset the consent flow.
pub trait ConsentErrorDelegate: Send + Sync {
    fn on_error(&self, error: &ConsentError);
}
