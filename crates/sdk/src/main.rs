//! ccpa-demo - drives one consent flow against the live consent service.
//!
//! Configuration comes from `CCPA_*` environment variables (a `.env` file is
//! honoured). The console presenter logs the UI URL instead of rendering it,
//! then replays `CCPA_DEMO_ACTION` (`accept_all`, `reject_all`,
//! `save_and_exit`, `dismiss`) and closes the UI. `CCPA_DEMO_MODE=pm` opens
//! the privacy manager instead of the message.

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccpa_sdk::application::{ConsentClient, ConsentController, ConsentStore, FlowOutcome};
use ccpa_sdk::config::SdkConfig;
use ccpa_sdk::infrastructure::{AlwaysReachable, FileStorageProvider, ReqwestTransport};
use ccpa_sdk::ports::inbound::ConsentUiEvents;
use ccpa_sdk::ports::outbound::{
    ConsentError, ConsentErrorDelegate, ConsentPresenter, ConsentReadyDelegate, ConsentUiDelegate,
    PresentationRequest,
};
use ccpa_sdk::{Action, ConsentUuid, UserConsent};

/// Presenter that hands load requests to the demo loop.
struct ConsolePresenter {
    requests: mpsc::UnboundedSender<PresentationRequest>,
}

impl ConsentPresenter for ConsolePresenter {
    fn load_message(&self, request: PresentationRequest) {
        tracing::info!(url = %request.url, "Message requested");
        let _ = self.requests.send(request);
    }

    fn load_privacy_manager(&self, request: PresentationRequest) {
        tracing::info!(url = %request.url, "Privacy manager requested");
        let _ = self.requests.send(request);
    }

    fn release(&self) {
        tracing::debug!("Consent UI released");
    }
}

struct ConsoleDelegate;

impl ConsentUiDelegate for ConsoleDelegate {
    fn consent_ui_will_show(&self) {
        tracing::info!("Consent UI will show");
    }

    fn consent_ui_did_disappear(&self) {
        tracing::info!("Consent UI did disappear");
    }

    fn on_action(&self, action: Action) {
        tracing::info!(%action, "UI action");
    }
}

impl ConsentReadyDelegate for ConsoleDelegate {
    fn on_consent_ready(&self, consent_uuid: &ConsentUuid, user_consent: &UserConsent) {
        println!("consentUUID: {}", consent_uuid);
        println!("status: {}", user_consent.status);
        println!("rejected vendors: {:?}", user_consent.rejected_vendors);
        println!("rejected categories: {:?}", user_consent.rejected_categories);
    }
}

impl ConsentErrorDelegate for ConsoleDelegate {
    fn on_error(&self, error: &ConsentError) {
        tracing::error!(error = %error, "Consent error");
    }
}

fn demo_action() -> anyhow::Result<Option<Action>> {
    let Ok(raw) = std::env::var("CCPA_DEMO_ACTION") else {
        return Ok(None);
    };
    let action = match raw.trim().to_ascii_lowercase().as_str() {
        "accept_all" => Action::AcceptAll,
        "reject_all" => Action::RejectAll,
        "save_and_exit" => Action::SaveAndExit,
        "dismiss" => Action::Dismiss,
        other => bail!("Unknown CCPA_DEMO_ACTION: {}", other),
    };
    Ok(Some(action))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ccpa_sdk=debug,ccpa_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SdkConfig::from_env().context("Invalid CCPA configuration")?;
    let action = demo_action()?;
    let privacy_manager = std::env::var("CCPA_DEMO_MODE")
        .map(|mode| mode.eq_ignore_ascii_case("pm"))
        .unwrap_or(false);

    let storage = Arc::new(FileStorageProvider::new());
    tracing::info!("Using consent storage at {:?}", storage.path());
    let store = ConsentStore::new(storage);

    let client = ConsentClient::new(
        &config,
        Arc::new(ReqwestTransport::new(config.request_timeout)),
        Arc::new(AlwaysReachable),
        store.clone(),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let delegate = Arc::new(ConsoleDelegate);
    let controller =
        ConsentController::builder(Arc::new(client), store, config.property_id, &config.pm_id)
            .presenter(Arc::new(ConsolePresenter { requests: tx }))
            .ui_delegate(delegate.clone())
            .ready_delegate(delegate.clone())
            .error_delegate(delegate)
            .clean_consent_on_error(config.should_clean_consent_on_error)
            .build();

    tracing::info!(
        property = %config.property_name,
        consent_uuid = ?controller.consent_uuid(),
        "Starting consent flow"
    );

    let outcome = if privacy_manager {
        controller.load_privacy_manager()
    } else {
        controller.load_message().await
    };

    match outcome {
        FlowOutcome::Presenting | FlowOutcome::LoadingUi => {
            let request = rx
                .recv()
                .await
                .context("Presenter closed before a UI was requested")?;
            println!("Consent UI: {}", request.url);

            controller.consent_ui_will_show();
            if let Some(action) = action {
                let result = controller.on_action(action, None).await;
                tracing::info!(?result, "Action handled");
            }
            controller.consent_ui_did_disappear();
        }
        FlowOutcome::Failed(error) => return Err(error).context("Consent flow failed"),
        other => tracing::info!(?other, "Consent flow finished"),
    }

    println!(
        "stored consent: {:?} {}",
        controller.consent_uuid().map(ConsentUuid::into_inner),
        controller.user_consent().status
    );
    Ok(())
}
