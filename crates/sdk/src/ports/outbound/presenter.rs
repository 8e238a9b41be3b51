//! Consent UI presenter port
//!
//! Rendering the hosted message / privacy manager is the host's job. The
//! controller only asks the presenter to start loading a UI and to release
//! it once dismissed; the presenter reports progress back through
//! [`ConsentUiEvents`](crate::ports::inbound::ConsentUiEvents).

use url::Url;

use ccpa_domain::ConsentUuid;

/// Everything a presenter needs to load a consent UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationRequest {
    pub url: Url,
    pub property_id: i64,
    pub pm_id: String,
    pub consent_uuid: Option<ConsentUuid>,
}

pub trait ConsentPresenter: Send + Sync {
    /// Start loading the consent message at `request.url`.
    fn load_message(&self, request: PresentationRequest);

    /// Start loading the privacy manager at `request.url`.
    fn load_privacy_manager(&self, request: PresentationRequest);

    /// Tear down any UI resource. Must tolerate being called when nothing is loaded.
    fn release(&self);
}
