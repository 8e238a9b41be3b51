//! CCPA Consent Shared - wire contracts for the consent service
//!
//! This crate contains the types exchanged with the remote consent service:
//! - Request/response DTOs for the message and action endpoints
//! - The opaque `Meta` blob replayed on every request
//! - The JSON codec used for every body
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, serde_json, uuid, url and thiserror
//! 2. **No business logic** - pure data types and serialization
//! 3. **Domain value objects on the wire** - `UserConsent`, `ConsentUuid` are embedded as-is

pub mod codec;
pub mod meta;
pub mod requests;
pub mod responses;

pub use codec::{decode, encode, encode_targeting_params, CodecError, EMPTY_TARGETING_PARAMS};
pub use meta::Meta;
pub use requests::{ActionRequest, CcpaConsents};
pub use responses::{ActionResponse, MessageResponse};
