//! `mintkit-core` is the headless core behind a gated mint button and a collectible gallery.
//!
//! It has two independent components:
//!
//! - [`gate::GatedActionController`] decides on every click whether to run the protected
//!   action right away, request a verification token, or open the embedded secondary
//!   verification flow.
//! - [`supply::SupplyAggregator`] fetches remaining-supply counts for a gallery of
//!   collectibles with a single batched ledger read.
//!
//! Rendering is left to the host. This crate only produces labels, captions and links.
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Network environment the core is addressed against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    Serialize,
    Deserialize,
    uniffi::Enum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test network.
    Staging,
    /// Main network.
    Production,
}

mod asset;
pub use asset::*;

/// Configuration for the controller and the ledger client.
pub mod config;

/// Default endpoints, addresses and sentinel values.
pub mod defaults;

mod error;
pub use error::*;

pub mod gate;

/// Bridges `log` records to a foreign logger.
pub mod logger;

pub mod supply;

// private modules
mod http_request;

uniffi::setup_scaffolding!("mintkit_core");
