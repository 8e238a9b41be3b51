//! Consent API Port - what the controller needs from the consent service
//!
//! `ConsentClient` is the production implementation; tests substitute a
//! mock so the lifecycle can be exercised without a network.

use std::sync::Arc;

use url::Url;

use ccpa_domain::{Action, ConsentUuid, PmConsents};
use ccpa_shared::{ActionResponse, CodecError, MessageResponse};

use super::TransportError;

/// Errors surfaced by the consent client and routed to `onError`.
///
/// Cloneable so one failure can be handed to several observers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConsentError {
    /// No reachable network; raised before any transport attempt
    #[error("The device is not connected to the internet")]
    NoInternetConnection,

    /// The target URL could not be built from the configuration
    #[error("Invalid url for {target}")]
    InvalidUrl { target: String },

    /// The request failed or returned no body
    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: Option<TransportError>,
    },

    /// The response body could not be decoded into the expected record
    #[error("Failed to parse response from {target}")]
    Parsing {
        target: String,
        #[source]
        source: Arc<CodecError>,
    },

    /// The request body could not be built
    #[error("Failed to encode request for {target}")]
    Encoding {
        target: String,
        #[source]
        source: Arc<CodecError>,
    },

    /// The UI collaborator failed to load or render the consent UI
    #[error("Consent UI error: {message}")]
    Presentation { message: String },
}

impl ConsentError {
    pub fn request(url: &Url, source: Option<TransportError>) -> Self {
        Self::Request {
            url: url.to_string(),
            source,
        }
    }

    pub fn parsing(target: impl ToString, source: CodecError) -> Self {
        Self::Parsing {
            target: target.to_string(),
            source: Arc::new(source),
        }
    }

    pub fn encoding(target: impl ToString, source: CodecError) -> Self {
        Self::Encoding {
            target: target.to_string(),
            source: Arc::new(source),
        }
    }

    pub fn presentation(message: impl Into<String>) -> Self {
        Self::Presentation {
            message: message.into(),
        }
    }

    /// The URL or operation the error relates to, when known.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::NoInternetConnection | Self::Presentation { .. } => None,
            Self::InvalidUrl { target }
            | Self::Parsing { target, .. }
            | Self::Encoding { target, .. } => Some(target),
            Self::Request { url, .. } => Some(url),
        }
    }
}

/// Consent service operations used by the lifecycle controller.
///
/// Implementations read and write the shared meta blob, so calls on one
/// instance must not overlap; the controller serializes them.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait::async_trait]
pub trait ConsentApiPort: Send + Sync {
    /// Resolve which message (if any) to show for this user.
    async fn fetch_message(
        &self,
        consent_uuid: Option<ConsentUuid>,
        auth_id: Option<String>,
    ) -> Result<MessageResponse, ConsentError>;

    /// Record a user's choice with the consent service.
    async fn submit_action(
        &self,
        action: Action,
        consent_uuid: Option<ConsentUuid>,
        consents: Option<PmConsents>,
    ) -> Result<ActionResponse, ConsentError>;

    /// URL of the hosted privacy manager for this user.
    fn privacy_manager_url(&self, consent_uuid: Option<ConsentUuid>) -> Url;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn request_error_exposes_url_and_cause() {
        let url = Url::parse("https://wrapper-api.sp-prod.net/ccpa/message-url").unwrap();
        let err = ConsentError::request(&url, Some(TransportError::EmptyBody));

        assert_eq!(
            err.target(),
            Some("https://wrapper-api.sp-prod.net/ccpa/message-url")
        );
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("Response had no body".to_string())
        );
    }

    #[test]
    fn parsing_error_keeps_codec_cause() {
        let codec = ccpa_shared::decode::<MessageResponse>(b"{}").unwrap_err();
        let err = ConsentError::parsing("getMessage", codec);

        assert!(matches!(err, ConsentError::Parsing { .. }));
        assert_eq!(err.target(), Some("getMessage"));
        assert!(err.source().is_some());
    }

    #[test]
    fn connectivity_error_has_no_target() {
        assert_eq!(ConsentError::NoInternetConnection.target(), None);
    }
}
