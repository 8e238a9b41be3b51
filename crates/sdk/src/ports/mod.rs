//! Port definitions
//!
//! `outbound` holds the contracts the SDK needs from its environment
//! (transport, storage, connectivity, UI, host notifications).
//! `inbound` holds the event surface the UI collaborator drives.

pub mod inbound;
pub mod outbound;
