//! Consent lifecycle controller
//!
//! Sequences "fetch current consent → optionally present a UI → submit the
//! user's choice → persist and notify" and guarantees at most one flow is
//! outstanding at a time.
//!
//! Every load and every error reset starts a new generation. Network results
//! carry the generation they were started in and are discarded when it no
//! longer matches, so a slow response can never overwrite a newer flow.

mod state;


pub use state::{LoadState, Transition};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use ccpa_domain::{Action, ConsentUuid, PmConsents, UserConsent};
use ccpa_shared::{ActionResponse, MessageResponse};

use crate::application::ConsentStore;
use crate::ports::inbound::ConsentUiEvents;
use crate::ports::outbound::{
    ConsentApiPort, ConsentError, ConsentErrorDelegate, ConsentPresenter, ConsentReadyDelegate,
    ConsentUiDelegate, PresentationRequest,
};

/// What a controller call did.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// The controller was busy (or idle, for actions) and did nothing
    Ignored,
    /// A message URL was handed to the presenter
    Presenting,
    /// The privacy manager was handed to the presenter
    LoadingUi,
    /// Consent was persisted and `on_consent_ready` fired
    ConsentReady,
    /// The flow failed and `on_error` fired
    Failed(ConsentError),
    /// The result arrived for a flow that no longer exists
    Discarded,
    /// A UI-only action was passed to the UI delegate
    Forwarded,
}

/// In-memory consent state guarded by the controller's lock.
#[derive(Debug)]
struct ControllerState {
    load_state: LoadState,
    /// Generation counter; see module docs
    epoch: u64,
    consent_uuid: Option<ConsentUuid>,
    user_consent: UserConsent,
    /// Identifier action submissions target in the current flow
    flow_uuid: Option<ConsentUuid>,
    /// Generation of the action submission in flight, if any
    submitting: Option<u64>,
    should_clean_consent_on_error: bool,
}

impl ControllerState {
    /// Apply `transition`; returns false (and changes nothing) when illegal.
    fn transition(&mut self, transition: Transition) -> bool {
        let Some(next) = self.load_state.apply(transition) else {
            tracing::debug!(state = %self.load_state, ?transition, "Ignoring transition");
            return false;
        };
        if transition.starts_new_generation() {
            self.epoch += 1;
        }
        tracing::debug!(from = %self.load_state, to = %next, epoch = self.epoch, "Load state changed");
        self.load_state = next;
        true
    }

    fn forget_consent(&mut self) {
        self.consent_uuid = None;
        self.user_consent = UserConsent::default();
        self.flow_uuid = None;
    }
}

/// Identifies the flow an in-flight action submission belongs to.
#[derive(Debug, Clone)]
struct ActionTicket {
    epoch: u64,
    flow_uuid: Option<ConsentUuid>,
}

/// Clears the in-flight marker of its generation when the submission
/// finishes or its future is dropped.
struct SubmissionGuard<'a> {
    controller: &'a ConsentController,
    epoch: u64,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock();
        if state.submitting == Some(self.epoch) {
            state.submitting = None;
        }
    }
}

struct Inner {
    api: Arc<dyn ConsentApiPort>,
    store: ConsentStore,
    presenter: Option<Arc<dyn ConsentPresenter>>,
    ui_delegate: Option<Arc<dyn ConsentUiDelegate>>,
    ready_delegate: Option<Arc<dyn ConsentReadyDelegate>>,
    error_delegate: Option<Arc<dyn ConsentErrorDelegate>>,
    property_id: i64,
    pm_id: String,
    state: Mutex<ControllerState>,
}

/// Handle to a consent controller.
///
/// Cheap to clone; clones drive the same controller, so a presenter can
/// hold one and report UI events back into it.
#[derive(Clone)]
pub struct ConsentController {
    inner: Arc<Inner>,
}

pub struct ConsentControllerBuilder {
    api: Arc<dyn ConsentApiPort>,
    store: ConsentStore,
    property_id: i64,
    pm_id: String,
    presenter: Option<Arc<dyn ConsentPresenter>>,
    ui_delegate: Option<Arc<dyn ConsentUiDelegate>>,
    ready_delegate: Option<Arc<dyn ConsentReadyDelegate>>,
    error_delegate: Option<Arc<dyn ConsentErrorDelegate>>,
    should_clean_consent_on_error: bool,
}

impl ConsentControllerBuilder {
    pub fn presenter(mut self, presenter: Arc<dyn ConsentPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn ui_delegate(mut self, delegate: Arc<dyn ConsentUiDelegate>) -> Self {
        self.ui_delegate = Some(delegate);
        self
    }

    pub fn ready_delegate(mut self, delegate: Arc<dyn ConsentReadyDelegate>) -> Self {
        self.ready_delegate = Some(delegate);
        self
    }

    pub fn error_delegate(mut self, delegate: Arc<dyn ConsentErrorDelegate>) -> Self {
        self.error_delegate = Some(delegate);
        self
    }

    /// Purge persisted consent when a flow fails. Defaults to true.
    pub fn clean_consent_on_error(mut self, clean: bool) -> Self {
        self.should_clean_consent_on_error = clean;
        self
    }

    /// Build the controller, seeding in-memory state from the store.
    pub fn build(self) -> ConsentController {
        let state = ControllerState {
            load_state: LoadState::Ready,
            epoch: 0,
            consent_uuid: self.store.load_consent_uuid(),
            user_consent: self.store.load_user_consent(),
            flow_uuid: None,
            submitting: None,
            should_clean_consent_on_error: self.should_clean_consent_on_error,
        };

        ConsentController {
            inner: Arc::new(Inner {
                api: self.api,
                store: self.store,
                presenter: self.presenter,
                ui_delegate: self.ui_delegate,
                ready_delegate: self.ready_delegate,
                error_delegate: self.error_delegate,
                property_id: self.property_id,
                pm_id: self.pm_id,
                state: Mutex::new(state),
            }),
        }
    }
}

impl ConsentController {
    pub fn builder(
        api: Arc<dyn ConsentApiPort>,
        store: ConsentStore,
        property_id: i64,
        pm_id: impl Into<String>,
    ) -> ConsentControllerBuilder {
        ConsentControllerBuilder {
            api,
            store,
            property_id,
            pm_id: pm_id.into(),
            presenter: None,
            ui_delegate: None,
            ready_delegate: None,
            error_delegate: None,
            should_clean_consent_on_error: true,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> LoadState {
        self.lock().load_state
    }

    pub fn consent_uuid(&self) -> Option<ConsentUuid> {
        self.lock().consent_uuid.clone()
    }

    pub fn user_consent(&self) -> UserConsent {
        self.lock().user_consent.clone()
    }

    pub fn should_clean_consent_on_error(&self) -> bool {
        self.lock().should_clean_consent_on_error
    }

    pub fn set_should_clean_consent_on_error(&self, clean: bool) {
        self.lock().should_clean_consent_on_error = clean;
    }

    // =========================================================================
    // Host operations
    // =========================================================================

    /// Fetch the message for the current user and present or finalize it.
    ///
    /// Ignored unless the controller is `Ready`.
    pub async fn load_message(&self) -> FlowOutcome {
        self.fetch(None).await
    }

    /// Same as [`load_message`](Self::load_message) for an authenticated user.
    pub async fn load_message_for_auth_id(&self, auth_id: impl Into<String>) -> FlowOutcome {
        self.fetch(Some(auth_id.into())).await
    }

    /// Ask the presenter to load the privacy manager directly, without a fetch.
    ///
    /// The controller stays `Loading` until the presenter reports
    /// `consent_ui_will_show`. Ignored unless the controller is `Ready`.
    pub fn load_privacy_manager(&self) -> FlowOutcome {
        let consent_uuid = {
            let mut state = self.lock();
            if !state.transition(Transition::BeginLoad) {
                return FlowOutcome::Ignored;
            }
            state.flow_uuid = state.consent_uuid.clone();
            state.consent_uuid.clone()
        };

        let Some(presenter) = self.inner.presenter.as_ref() else {
            return self.fail(ConsentError::presentation("No consent presenter configured"));
        };

        let url = self.inner.api.privacy_manager_url(consent_uuid.clone());
        tracing::debug!(url = %url, "Loading privacy manager");
        presenter.load_privacy_manager(self.presentation_request(url, consent_uuid));
        FlowOutcome::LoadingUi
    }

    /// Handle a user action reported by the UI.
    ///
    /// Accept all, reject all and save & exit are submitted to the consent
    /// service while a UI is presented; every other action is only passed to
    /// the UI delegate.
    pub async fn on_action(&self, action: Action, consents: Option<PmConsents>) -> FlowOutcome {
        if !action.requires_submission() {
            if let Some(delegate) = &self.inner.ui_delegate {
                delegate.on_action(action);
            }
            return FlowOutcome::Forwarded;
        }

        let ticket = {
            let mut state = self.lock();
            let busy = state.submitting == Some(state.epoch);
            if state.load_state != LoadState::Presenting || busy {
                tracing::debug!(
                    state = %state.load_state,
                    submitting = busy,
                    action = %action,
                    "Ignoring action"
                );
                return FlowOutcome::Ignored;
            }
            state.submitting = Some(state.epoch);
            ActionTicket {
                epoch: state.epoch,
                flow_uuid: state.flow_uuid.clone(),
            }
        };

        let in_flight = SubmissionGuard {
            controller: self,
            epoch: ticket.epoch,
        };
        let result = self
            .inner
            .api
            .submit_action(action, ticket.flow_uuid.clone(), consents)
            .await;
        drop(in_flight);

        self.complete_action(ticket, result)
    }

    /// Delete persisted consent and reset the in-memory snapshot.
    pub fn clear_all_consent_data(&self) {
        let mut state = self.lock();
        self.inner.store.clear_all();
        state.forget_consent();
    }

    // =========================================================================
    // Flow internals
    // =========================================================================

    async fn fetch(&self, auth_id: Option<String>) -> FlowOutcome {
        let (epoch, consent_uuid) = {
            let mut state = self.lock();
            if !state.transition(Transition::BeginLoad) {
                return FlowOutcome::Ignored;
            }
            (state.epoch, state.consent_uuid.clone())
        };

        match self.inner.api.fetch_message(consent_uuid, auth_id).await {
            Ok(response) => self.complete_fetch(epoch, response),
            Err(error) => {
                if self.is_current_load(epoch) {
                    self.fail(error)
                } else {
                    tracing::warn!(error = %error, "Discarding error from a superseded message fetch");
                    FlowOutcome::Discarded
                }
            }
        }
    }

    fn is_current_load(&self, epoch: u64) -> bool {
        let state = self.lock();
        state.epoch == epoch && state.load_state == LoadState::Loading
    }

    fn complete_fetch(&self, epoch: u64, response: MessageResponse) -> FlowOutcome {
        let MessageResponse {
            url,
            uuid,
            user_consent,
            ..
        } = response;

        let mut state = self.lock();
        if state.epoch != epoch || state.load_state != LoadState::Loading {
            tracing::warn!(uuid = %uuid, "Discarding response from a superseded message fetch");
            return FlowOutcome::Discarded;
        }

        match url {
            Some(url) => {
                state.flow_uuid = Some(uuid.clone());
                state.transition(Transition::PresentUi);
                drop(state);

                let Some(presenter) = self.inner.presenter.as_ref() else {
                    return self
                        .fail(ConsentError::presentation("No consent presenter configured"));
                };
                tracing::debug!(url = %url, "Presenting consent message");
                presenter.load_message(self.presentation_request(url, Some(uuid)));
                FlowOutcome::Presenting
            }
            None => {
                state.transition(Transition::Resolve);
                self.finalize(&mut state, &uuid, &user_consent);
                drop(state);

                self.notify_ready(&uuid, &user_consent);
                FlowOutcome::ConsentReady
            }
        }
    }

    fn complete_action(
        &self,
        ticket: ActionTicket,
        result: Result<ActionResponse, ConsentError>,
    ) -> FlowOutcome {
        let mut state = self.lock();
        let current = state.epoch == ticket.epoch && state.flow_uuid == ticket.flow_uuid;

        match result {
            Ok(response) if current => {
                self.finalize(&mut state, &response.uuid, &response.user_consent);
                drop(state);

                self.notify_ready(&response.uuid, &response.user_consent);
                FlowOutcome::ConsentReady
            }
            Ok(response) => {
                tracing::warn!(uuid = %response.uuid, "Discarding response for a superseded flow");
                FlowOutcome::Discarded
            }
            Err(error) if current => {
                drop(state);
                self.fail(error)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Discarding error for a superseded flow");
                FlowOutcome::Discarded
            }
        }
    }

    /// Replace the in-memory snapshot with `uuid`/`consent` and persist both.
    fn finalize(&self, state: &mut ControllerState, uuid: &ConsentUuid, consent: &UserConsent) {
        state.consent_uuid = Some(uuid.clone());
        state.user_consent = consent.clone();
        state.flow_uuid = Some(uuid.clone());
        self.inner.store.save_consent_uuid(uuid);
        self.inner.store.save_user_consent(consent);
    }

    fn notify_ready(&self, uuid: &ConsentUuid, consent: &UserConsent) {
        tracing::info!(uuid = %uuid, status = %consent.status, "Consent ready");
        if let Some(delegate) = &self.inner.ready_delegate {
            delegate.on_consent_ready(uuid, consent);
        }
    }

    /// Reset to `Ready`, optionally purge persisted consent, and report `error`.
    fn fail(&self, error: ConsentError) -> FlowOutcome {
        let was_active = {
            let mut state = self.lock();
            let was_active = state.load_state.is_busy();
            state.transition(Transition::Fail);
            state.submitting = None;
            state.flow_uuid = None;
            if state.should_clean_consent_on_error {
                self.inner.store.clear_all();
                state.forget_consent();
            }
            was_active
        };

        if was_active {
            if let Some(presenter) = &self.inner.presenter {
                presenter.release();
            }
        }

        tracing::error!(error = %error, "Consent flow failed");
        if let Some(delegate) = &self.inner.error_delegate {
            delegate.on_error(&error);
        }
        FlowOutcome::Failed(error)
    }

    fn presentation_request(
        &self,
        url: url::Url,
        consent_uuid: Option<ConsentUuid>,
    ) -> PresentationRequest {
        PresentationRequest {
            url,
            property_id: self.inner.property_id,
            pm_id: self.inner.pm_id.clone(),
            consent_uuid,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn with_ui_delegate(&self, notify: impl FnOnce(&dyn ConsentUiDelegate)) {
        if let Some(delegate) = &self.inner.ui_delegate {
            notify(delegate.as_ref());
        }
    }
}

#[async_trait]
impl ConsentUiEvents for ConsentController {
    fn consent_ui_will_show(&self) {
        self.lock().transition(Transition::PresentUi);
        self.with_ui_delegate(|d| d.consent_ui_will_show());
    }

    fn consent_ui_did_disappear(&self) {
        self.lock().transition(Transition::Dismiss);
        if let Some(presenter) = &self.inner.presenter {
            presenter.release();
        }
        self.with_ui_delegate(|d| d.consent_ui_did_disappear());
    }

    async fn on_action(&self, action: Action, consents: Option<PmConsents>) {
        ConsentController::on_action(self, action, consents).await;
    }

    fn on_error(&self, error: ConsentError) {
        self.fail(error);
    }

    fn message_will_show(&self) {
        self.with_ui_delegate(|d| d.message_will_show());
    }

    fn message_did_disappear(&self) {
        self.with_ui_delegate(|d| d.message_did_disappear());
    }

    fn pm_will_show(&self) {
        self.with_ui_delegate(|d| d.pm_will_show());
    }

    fn pm_did_disappear(&self) {
        self.with_ui_delegate(|d| d.pm_did_disappear());
    }
}
