//! CCPA consent domain - value objects shared by every layer.
//!
//! Pure data with validation; no I/O and no serialization format beyond
//! the serde derives the wire layer relies on.

pub mod error;
pub mod ids;
pub mod value_objects;

pub use error::DomainError;
pub use ids::ConsentUuid;
pub use value_objects::{
    Action, CampaignEnv, ConsentStatus, PmConsentGroup, PmConsents, PropertyName,
    TargetingParams, UserConsent,
};
