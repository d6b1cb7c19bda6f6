//! Remaining-supply lookups for the collectible gallery.
//!
//! [`SupplyAggregator::refresh`] collects the asset of every released collectible and asks the
//! [`RemoteLedger`] for all of them in one batched read. The resulting
//! [`RemainingCountMap`] replaces the previous one wholesale.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::asset::{AssetId, CollectibleRef};
use crate::config::MintKitConfig;
use crate::error::MintKitError;
use crate::Environment;

mod gallery;
mod rpc;

pub use gallery::{remaining_text, ExplorerLinks, GalleryEntry, COMING_SOON};
pub use rpc::JsonRpcLedger;

/// Remaining count per asset, keyed by the asset's canonical string form.
///
/// `None` means the count does not apply, e.g. the supply is unlimited.
pub type RemainingCountMap = HashMap<String, Option<u64>>;

/// Source of truth for on-chain supply data.
///
/// [`JsonRpcLedger`] is the built-in implementation. Hosts may supply their own.
#[uniffi::export(with_foreign)]
#[async_trait]
pub trait RemoteLedger: Send + Sync {
    /// Fetches the remaining count of every asset in `assets` with a single batched read.
    ///
    /// # Errors
    /// Returns an error if the read fails as a whole.
    async fn fetch_remaining_counts(
        &self,
        assets: Vec<AssetId>,
    ) -> Result<RemainingCountMap, MintKitError>;
}

/// Keeps the remaining counts for the gallery up to date.
///
/// Overlapping refreshes are not sequenced: whichever completes last wins.
#[derive(uniffi::Object)]
pub struct SupplyAggregator {
    ledger: Arc<dyn RemoteLedger>,
    counts: watch::Sender<Arc<RemainingCountMap>>,
    loading: watch::Sender<bool>,
}

#[uniffi::export(async_runtime = "tokio")]
impl SupplyAggregator {
    /// Creates an aggregator with an empty map.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(ledger: Arc<dyn RemoteLedger>) -> Self {
        let (counts, _) = watch::channel(Arc::new(RemainingCountMap::new()));
        let (loading, _) = watch::channel(false);
        Self {
            ledger,
            counts,
            loading,
        }
    }

    /// Creates an aggregator reading from the JSON-RPC endpoint of a JSON `config`.
    ///
    /// # Errors
    /// Returns an error if the configuration does not parse or validate.
    #[uniffi::constructor]
    pub fn from_config(config: &str) -> Result<Self, MintKitError> {
        let config = MintKitConfig::from_json(config)?;
        Ok(Self::new(Arc::new(JsonRpcLedger::from_config(&config))))
    }

    /// Rebuilds the remaining counts for `collectibles` and returns the new map's size.
    ///
    /// # Errors
    /// See [`SupplyAggregator::refresh`].
    pub async fn refresh_collectibles(
        &self,
        collectibles: Vec<CollectibleRef>,
    ) -> Result<u64, MintKitError> {
        let entries = self.refresh(&collectibles).await?;
        Ok(u64::try_from(entries).unwrap_or(u64::MAX))
    }

    /// Copy of the current remaining counts.
    #[must_use]
    pub fn remaining_counts(&self) -> RemainingCountMap {
        (**self.counts.borrow()).clone()
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Display entries for `collectibles`, linking to the explorer of `environment`.
    #[must_use]
    pub fn gallery_entries(
        &self,
        collectibles: Vec<CollectibleRef>,
        environment: Environment,
    ) -> Vec<GalleryEntry> {
        self.gallery(&collectibles, &ExplorerLinks::for_environment(environment))
    }
}

impl SupplyAggregator {
    /// Rebuilds the remaining counts for `collectibles`.
    ///
    /// Returns the number of entries in the new map. On failure the previous map is kept.
    ///
    /// # Errors
    /// Returns the ledger's error after logging it.
    pub async fn refresh(
        &self,
        collectibles: &[CollectibleRef],
    ) -> Result<usize, MintKitError> {
        let assets = released_assets(collectibles);
        log::debug!("refreshing remaining counts for {} assets", assets.len());
        let requested: BTreeSet<String> = assets.iter().map(AssetId::canonical).collect();

        self.loading.send_replace(true);
        let result = self.ledger.fetch_remaining_counts(assets).await;
        self.loading.send_replace(false);

        match result {
            Ok(mut counts) => {
                counts.retain(|key, _| requested.contains(key));
                let entries = counts.len();
                self.counts.send_replace(Arc::new(counts));
                Ok(entries)
            }
            Err(err) => {
                log::error!("failed to fetch remaining counts: {err}");
                Err(err)
            }
        }
    }

    /// Current remaining counts.
    #[must_use]
    pub fn counts(&self) -> Arc<RemainingCountMap> {
        Arc::clone(&self.counts.borrow())
    }

    /// Receiver notified every time the map is replaced.
    #[must_use]
    pub fn subscribe_counts(&self) -> watch::Receiver<Arc<RemainingCountMap>> {
        self.counts.subscribe()
    }

    /// Receiver notified on every loading transition.
    #[must_use]
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Display entries for `collectibles` using the current counts.
    #[must_use]
    pub fn gallery(
        &self,
        collectibles: &[CollectibleRef],
        explorer: &ExplorerLinks,
    ) -> Vec<GalleryEntry> {
        let counts = self.counts();
        collectibles
            .iter()
            .map(|collectible| GalleryEntry::new(collectible, &counts, explorer))
            .collect()
    }
}

/// Assets of every collectible that has one, first occurrence first.
fn released_assets(collectibles: &[CollectibleRef]) -> Vec<AssetId> {
    let mut seen = BTreeSet::new();
    collectibles
        .iter()
        .filter_map(|collectible| collectible.asset)
        .filter(|asset| seen.insert(*asset))
        .collect()
}
