//! CCPA consent SDK.
//!
//! Obtains, presents and records a user's CCPA consent through the remote
//! consent service.
//!
//! - `ports` - contracts for transport, storage, connectivity, the UI
//!   presenter and host notifications
//! - `application` - [`ConsentStore`], [`ConsentClient`] and the
//!   [`ConsentController`] state machine
//! - `infrastructure` - reqwest transport, file and in-memory storage,
//!   connectivity oracles

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::{
    ConsentClient, ConsentController, ConsentControllerBuilder, ConsentStore, FlowOutcome,
    LoadState,
};
pub use config::{ConfigError, SdkConfig};
pub use ports::inbound::ConsentUiEvents;
pub use ports::outbound::ConsentError;

pub use ccpa_domain::{
    Action, CampaignEnv, ConsentStatus, ConsentUuid, PmConsents, PropertyName, TargetingParams,
    UserConsent,
};
