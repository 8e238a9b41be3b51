//! Application layer - consent persistence, service client and lifecycle controller

pub mod consent_client;
pub mod consent_store;
pub mod controller;

pub use consent_client::ConsentClient;
pub use consent_store::{ConsentStore, StorageKeys};
pub use controller::{ConsentController, ConsentControllerBuilder, FlowOutcome, LoadState, Transition};
