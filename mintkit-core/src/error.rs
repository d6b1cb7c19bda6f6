use thiserror::Error;

/// Error outputs from `MintKit`
///
/// Also the error type of the host-implemented callbacks, so it crosses the FFI both ways.
#[derive(Debug, Error, uniffi::Error)]
pub enum MintKitError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that failed validation.
        attribute: String,
        /// Why the attribute was rejected.
        reason: String,
    },
    /// Unexpected error serializing or deserializing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Details of the failure.
        error: String,
    },
    /// Network connection error with details
    #[error("network_error: {url} (status: {status:?}) {error}")]
    NetworkError {
        /// The URL that was requested.
        url: String,
        /// HTTP status code, if a response was received.
        status: Option<u16>,
        /// Details of the failure.
        error: String,
    },
    /// The JSON-RPC endpoint answered with an error object
    #[error("rpc_error: {code} {message}")]
    RpcError {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// The protected action reported a failure
    #[error("action_failed: {reason}")]
    ActionFailed {
        /// Details reported by the action.
        reason: String,
    },
    /// The issuance service could not start a token request
    #[error("token_request_failed: {reason}")]
    TokenRequestFailed {
        /// Details reported by the issuance service.
        reason: String,
    },
    /// Unexpected `UniFFI` callback error
    #[error("unexpected_uniffi_callback_error: {reason}")]
    UnexpectedUniFFICallbackError {
        /// Details reported by `UniFFI`.
        reason: String,
    },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for MintKitError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError {
            reason: error.reason,
        }
    }
}

impl From<reqwest::Error> for MintKitError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError {
            url: error.url().map(ToString::to_string).unwrap_or_default(),
            status: error.status().map(|status| status.as_u16()),
            error: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for MintKitError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError {
            error: error.to_string(),
        }
    }
}

impl From<alloy_sol_types::Error> for MintKitError {
    fn from(error: alloy_sol_types::Error) -> Self {
        Self::SerializationError {
            error: format!("abi: {error}"),
        }
    }
}
