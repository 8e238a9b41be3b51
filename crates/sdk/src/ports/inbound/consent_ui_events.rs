//! Events the UI collaborator reports back to the consent controller.

use ccpa_domain::{Action, PmConsents};

use crate::ports::outbound::ConsentError;

/// Event surface a presenter drives while a consent UI is loaded.
///
/// Implemented by `ConsentController`; presenters hold it as
/// `Arc<dyn ConsentUiEvents>` so they never depend on the controller type.
#[async_trait::async_trait]
pub trait ConsentUiEvents: Send + Sync {
    /// The UI finished loading and is about to be shown.
    fn consent_ui_will_show(&self);

    /// The UI was closed, whatever the reason.
    fn consent_ui_did_disappear(&self);

    /// The user took `action`; `consents` carries privacy-manager choices.
    async fn on_action(&self, action: Action, consents: Option<PmConsents>);

    /// The UI failed.
    fn on_error(&self, error: ConsentError);

    fn message_will_show(&self);

    fn message_did_disappear(&self);

    fn pm_will_show(&self);

    fn pm_did_disappear(&self);
}
