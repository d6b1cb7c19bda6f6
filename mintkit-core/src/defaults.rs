use std::time::Duration;

use alloy_primitives::{address, Address};

use crate::Environment;

/// Canonical Multicall3 deployment, identical on every EVM chain that carries it.
///
/// Reference: <https://github.com/mds1/multicall3>
pub static MULTICALL3: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");

/// Gatekeeper issuer whose verification runs through the embedded secondary flow
/// instead of a direct token request.
///
/// This is an opaque allowlist entry: the value itself carries no meaning for the core.
pub const RESERVED_SECONDARY_FLOW_ISSUER: &str = "ign2PJfwxvYxAZpMdXgLdY4VLCnChPZWjtTeQwQfQdc";

/// Payload the embedded secondary flow posts once the user has finished it.
pub const FLOW_FINISHED_MESSAGE: &str = "QUIZ_FINISHED";

/// Document embedded while the secondary flow is open.
pub const SECONDARY_FLOW_EMBED_URL: &str = "https://www.encore.fans/embed";

/// Timeout applied to every ledger request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Block explorer base URL for an environment.
#[must_use]
pub const fn explorer_base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Staging => "https://sepolia.worldscan.org",
        Environment::Production => "https://worldscan.org",
    }
}
