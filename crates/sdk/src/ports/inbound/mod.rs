//! Inbound ports - Interfaces the SDK offers to its collaborators

pub mod consent_ui_events;

pub use consent_ui_events::ConsentUiEvents;
