use serde::Serialize;

use super::RemainingCountMap;
use crate::asset::{AssetId, CollectibleRef};
use crate::defaults::explorer_base_url;
use crate::Environment;

/// Subtitle shown for collectibles that are not on chain yet.
pub const COMING_SOON: &str = "Coming Soon";

/// Builds block explorer links for assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerLinks {
    base: String,
}

impl ExplorerLinks {
    /// Explorer of `environment`.
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        Self::with_base(explorer_base_url(environment))
    }

    /// Explorer rooted at a custom `base` URL.
    #[must_use]
    pub fn with_base(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Page of `asset` on the explorer.
    #[must_use]
    pub fn address_url(&self, asset: &AssetId) -> String {
        format!("{}/address/{}", self.base, asset.canonical())
    }
}

/// Display data for one gallery tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct GalleryEntry {
    /// Display name.
    pub name: String,
    /// Display image URI.
    pub image: String,
    /// Unreleased placeholder, rendered desaturated and without affordance.
    pub unreleased: bool,
    /// Where activating the tile leads, when it is interactive.
    pub action_link: Option<String>,
    /// Shortened asset address, or [`COMING_SOON`].
    pub subtitle: String,
    /// Explorer page of the asset.
    pub explorer_url: Option<String>,
    /// Remaining-supply caption, only for a known non-zero count.
    pub caption: Option<String>,
}

impl GalleryEntry {
    pub(super) fn new(
        collectible: &CollectibleRef,
        counts: &RemainingCountMap,
        explorer: &ExplorerLinks,
    ) -> Self {
        let caption = collectible
            .asset
            .and_then(|asset| counts.get(&asset.canonical()).copied().flatten())
            .filter(|remaining| *remaining > 0)
            .map(remaining_text);

        Self {
            name: collectible.name.clone(),
            image: collectible.image.clone(),
            unreleased: collectible.is_placeholder(),
            action_link: collectible.action_link.clone(),
            subtitle: collectible
                .asset
                .map_or_else(|| COMING_SOON.to_string(), |asset| asset.shortened()),
            explorer_url: collectible
                .asset
                .map(|asset| explorer.address_url(&asset)),
            caption,
        }
    }

    /// Whether the tile has an interactive affordance.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.action_link.is_some()
    }
}

/// Caption for `remaining` editions.
#[must_use]
pub fn remaining_text(remaining: u64) -> String {
    if remaining == 1 {
        "1 edition remaining".to_string()
    } else {
        format!("{remaining} editions remaining")
    }
}
