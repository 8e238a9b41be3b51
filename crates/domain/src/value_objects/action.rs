//! User actions relayed from the consent UI
//!
//! Every action the hosted UI can emit is enumerated here with the stable
//! integer code the consent service expects in the action endpoint path.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// An action taken by the user in the message or privacy-manager UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Action {
    /// Save the choices made in the privacy manager and close it
    SaveAndExit,
    /// Leave the privacy manager without saving
    PmCancel,
    AcceptAll,
    /// Switch from the message to the privacy manager
    ShowPrivacyManager,
    RejectAll,
    /// Close the message without making a choice
    Dismiss,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::SaveAndExit,
        Action::PmCancel,
        Action::AcceptAll,
        Action::ShowPrivacyManager,
        Action::RejectAll,
        Action::Dismiss,
    ];

    /// Stable integer code used by the consent service.
    pub fn code(self) -> i32 {
        match self {
            Action::SaveAndExit => 1,
            Action::PmCancel => 2,
            Action::AcceptAll => 11,
            Action::ShowPrivacyManager => 12,
            Action::RejectAll => 13,
            Action::Dismiss => 15,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|action| action.code() == code)
            .ok_or_else(|| DomainError::parse(format!("Unknown action code: {}", code)))
    }

    /// Whether this action must be recorded with the consent service.
    ///
    /// All other actions only affect the UI.
    pub fn requires_submission(self) -> bool {
        matches!(
            self,
            Action::AcceptAll | Action::RejectAll | Action::SaveAndExit
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::SaveAndExit => "SaveAndExit",
            Action::PmCancel => "PMCancel",
            Action::AcceptAll => "AcceptAll",
            Action::ShowPrivacyManager => "ShowPrivacyManager",
            Action::RejectAll => "RejectAll",
            Action::Dismiss => "Dismiss",
        };
        f.write_str(name)
    }
}

impl TryFrom<i32> for Action {
    type Error = DomainError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<Action> for i32 {
    fn from(action: Action) -> i32 {
        action.code()
    }
}

/// Accepted/rejected ids for one kind of item in the privacy manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmConsentGroup {
    #[serde(default)]
    pub accepted: Vec<String>,
    #[serde(default)]
    pub rejected: Vec<String>,
}

/// Per-vendor and per-category choices produced by the privacy manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmConsents {
    #[serde(default)]
    pub vendors: PmConsentGroup,
    #[serde(default)]
    pub categories: PmConsentGroup,
}

impl PmConsents {
    pub fn new(vendors: PmConsentGroup, categories: PmConsentGroup) -> Self {
        Self {
            vendors,
            categories,
        }
    }

    pub fn rejecting(
        vendors: impl IntoIterator<Item = String>,
        categories: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            vendors: PmConsentGroup {
                accepted: Vec::new(),
                rejected: vendors.into_iter().collect(),
            },
            categories: PmConsentGroup {
                accepted: Vec::new(),
                rejected: categories.into_iter().collect(),
            },
        }
    }
}
