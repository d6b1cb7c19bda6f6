use std::time::Duration;

use alloy_primitives::Address;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::defaults::{
    FLOW_FINISHED_MESSAGE, MULTICALL3, REQUEST_TIMEOUT, RESERVED_SECONDARY_FLOW_ISSUER,
    SECONDARY_FLOW_EMBED_URL,
};
use crate::http_request::ensure_secure_url;
use crate::{Environment, MintKitError};

/// Top-level configuration for a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintKitConfig {
    /// Network environment, used for explorer links.
    pub environment: Environment,
    /// JSON-RPC endpoint of the remote ledger.
    pub rpc_url: String,
    /// Multicall3 contract used to batch supply reads.
    #[serde(default = "default_multicall_address")]
    pub multicall_address: Address,
    /// Timeout for each ledger request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Secondary verification flow settings.
    #[serde(default)]
    pub secondary_flow: SecondaryFlowConfig,
}

const fn default_multicall_address() -> Address {
    MULTICALL3
}

const fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT.as_secs()
}

impl MintKitConfig {
    /// Builds a configuration with the defaults for `environment`.
    ///
    /// # Errors
    /// Returns `MintKitError::InvalidInput` if `rpc_url` is not an `https` URL. Plain `http`
    /// is only accepted for loopback hosts.
    pub fn from_environment(
        environment: Environment,
        rpc_url: String,
    ) -> Result<Self, MintKitError> {
        Self {
            environment,
            rpc_url,
            multicall_address: MULTICALL3,
            request_timeout_secs: default_request_timeout_secs(),
            secondary_flow: SecondaryFlowConfig::default(),
        }
        .validated()
    }

    /// Parses a JSON configuration. Omitted optional fields take their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a URL in it is invalid.
    pub fn from_json(json: &str) -> Result<Self, MintKitError> {
        serde_json::from_str::<Self>(json)?.validated()
    }

    /// Timeout for each ledger request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validated(self) -> Result<Self, MintKitError> {
        ensure_secure_url("rpc_url", &parse_url("rpc_url", &self.rpc_url)?)?;
        if self.request_timeout_secs == 0 {
            return Err(MintKitError::InvalidInput {
                attribute: "request_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        parse_url("secondary_flow.embed_url", &self.secondary_flow.embed_url)?;
        Ok(self)
    }
}

/// Settings for the embedded secondary verification flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct SecondaryFlowConfig {
    /// Issuer that routes through the secondary flow.
    pub reserved_issuer: String,
    /// Payload the embedded surface posts when the user is done.
    pub finished_message: String,
    /// Base URL of the embedded surface.
    pub embed_url: String,
}

impl Default for SecondaryFlowConfig {
    fn default() -> Self {
        Self {
            reserved_issuer: RESERVED_SECONDARY_FLOW_ISSUER.to_string(),
            finished_message: FLOW_FINISHED_MESSAGE.to_string(),
            embed_url: SECONDARY_FLOW_EMBED_URL.to_string(),
        }
    }
}

impl SecondaryFlowConfig {
    /// URL of the embedded surface for the caller's public identifier.
    ///
    /// `return_target` is where the surface sends the user back to.
    ///
    /// # Errors
    /// Returns `MintKitError::InvalidInput` if the configured base URL does not parse.
    pub fn embed_url_for(
        &self,
        public_id: &str,
        return_target: &str,
    ) -> Result<Url, MintKitError> {
        let mut url = parse_url("secondary_flow.embed_url", &self.embed_url)?;
        url.query_pairs_mut()
            .append_pair("wallet", public_id)
            .append_pair("target", return_target);
        Ok(url)
    }
}

fn parse_url(attribute: &str, value: &str) -> Result<Url, MintKitError> {
    Url::parse(value).map_err(|e| MintKitError::InvalidInput {
        attribute: attribute.to_string(),
        reason: e.to_string(),
    })
}
