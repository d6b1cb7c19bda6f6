use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::MintKitError;

/// On-chain address of a collectible's supply contract.
///
/// The canonical string form is the EIP-55 checksummed hex string. It is the key used in
/// every [`crate::supply::RemainingCountMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub Address);

impl AssetId {
    /// Checksummed `0x…` form of the address.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0.to_checksum(None)
    }

    /// Short display form: `0x` followed by the first and last four hex digits.
    #[must_use]
    pub fn shortened(&self) -> String {
        let canonical = self.canonical();
        let digits = &canonical[2..];
        format!("0x{}...{}", &digits[..4], &digits[digits.len() - 4..])
    }
}

impl FromStr for AssetId {
    type Err = MintKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let address = Address::from_str(hex).map_err(|e| MintKitError::InvalidInput {
            attribute: "asset".to_string(),
            reason: format!("{trimmed} is not an address: {e}"),
        })?;
        Ok(Self(address))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

// Hosts see assets as checksummed address strings.
uniffi::custom_type!(AssetId, String, {
    lower: |asset| asset.canonical(),
    try_lift: |value| Ok(value.parse::<AssetId>()?),
});

impl From<Address> for AssetId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl Serialize for AssetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A collectible shown in the gallery.
///
/// An entry with neither `asset` nor `action_link` is an unreleased placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct CollectibleRef {
    /// Display image URI.
    pub image: String,
    /// Display name.
    pub name: String,
    /// Supply contract, when the collectible is on chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetId>,
    /// Where activating the entry leads, when it is interactive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_link: Option<String>,
}

impl CollectibleRef {
    /// Whether this entry is an unreleased placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.asset.is_none() && self.action_link.is_none()
    }

    /// Whether this entry has an interactive affordance.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.action_link.is_some()
    }
}
