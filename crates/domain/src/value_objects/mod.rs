//! Value objects - Immutable objects defined by their attributes

mod action;
mod consent;
mod property;

pub use action::{Action, PmConsentGroup, PmConsents};
pub use consent::{ConsentStatus, UserConsent};
pub use property::{CampaignEnv, PropertyName, TargetingParams};
