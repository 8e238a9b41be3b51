//! JSON codec for consent service payloads.
//!
//! Every body the client sends or receives goes through here so encoding
//! and decoding failures surface as one typed error.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use ccpa_domain::TargetingParams;

/// Value used for targeting params when they cannot be encoded.
pub const EMPTY_TARGETING_PARAMS: &str = "{}";

/// Errors raised while converting between records and JSON bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A request record could not be represented as JSON
    #[error("Failed to encode JSON: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Bytes were not valid JSON or did not match the expected shape
    #[error("Failed to decode JSON: {0}")]
    Decoding(#[source] serde_json::Error),
}

/// Serialize a request record to JSON bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encoding)
}

/// Deserialize JSON bytes into a response record.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Decoding)
}

/// Stringify targeting params for use as a single query-string value.
///
/// Never fails: falls back to `{}` so a bad map cannot block message loading.
pub fn encode_targeting_params(params: &TargetingParams) -> String {
    serde_json::to_string(params).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to encode targeting params, sending empty object");
        EMPTY_TARGETING_PARAMS.to_string()
    })
}
