//! Drives both components the way a mint page does, through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use mintkit_core::defaults::{FLOW_FINISHED_MESSAGE, RESERVED_SECONDARY_FLOW_ISSUER};
use mintkit_core::gate::{
    Activation, GateConfig, GatedActionController, InboundMessages, IssuanceService,
    ProtectedAction, StatusFeed, TriggerLabel, TriggerPredicates, VerificationStatus,
};
use mintkit_core::supply::{ExplorerLinks, RemainingCountMap, RemoteLedger, SupplyAggregator};
use mintkit_core::{AssetId, CollectibleRef, Environment, MintKitError};
use tokio::sync::Notify;

struct FixedLedger {
    counts: RemainingCountMap,
    batches: AtomicUsize,
}

#[async_trait]
impl RemoteLedger for FixedLedger {
    async fn fetch_remaining_counts(
        &self,
        assets: Vec<AssetId>,
    ) -> Result<RemainingCountMap, MintKitError> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(assets
            .into_iter()
            .map(|asset| {
                let key = asset.canonical();
                let count = self.counts.get(&key).copied().flatten();
                (key, count)
            })
            .collect())
    }
}

#[tokio::test]
async fn test_gallery_captions_follow_remaining_counts() {
    let a = AssetId(Address::repeat_byte(0xa1));
    let b = AssetId(Address::repeat_byte(0xb2));
    let ledger = Arc::new(FixedLedger {
        counts: RemainingCountMap::from([(a.canonical(), Some(3)), (b.canonical(), Some(0))]),
        batches: AtomicUsize::new(0),
    });
    let aggregator = SupplyAggregator::new(ledger.clone());
    let collectibles = vec![
        CollectibleRef {
            image: "ipfs://a".to_string(),
            name: "Amulet".to_string(),
            asset: Some(a),
            action_link: None,
        },
        CollectibleRef {
            image: "ipfs://b".to_string(),
            name: "Blade".to_string(),
            asset: Some(b),
            action_link: Some("/x".to_string()),
        },
        CollectibleRef {
            image: "ipfs://c".to_string(),
            name: "Crown".to_string(),
            asset: None,
            action_link: None,
        },
    ];
    let explorer = ExplorerLinks::for_environment(Environment::Production);

    // Before the first refresh completes nothing is captioned.
    let entries = aggregator.gallery(&collectibles, &explorer);
    assert!(entries.iter().all(|entry| entry.caption.is_none()));

    let stored = aggregator.refresh(&collectibles).await.unwrap();
    assert_eq!(stored, 2);
    assert_eq!(ledger.batches.load(Ordering::SeqCst), 1);

    let entries = aggregator.gallery(&collectibles, &explorer);
    assert_eq!(entries[0].caption.as_deref(), Some("3 editions remaining"));
    assert!(!entries[0].is_interactive());
    assert_eq!(entries[1].caption, None);
    assert!(entries[1].is_interactive());
    assert!(!entries[1].unreleased);
    assert!(entries[2].unreleased);
    assert_eq!(entries[2].subtitle, "Coming Soon");
    assert_eq!(
        entries[0].explorer_url.as_deref(),
        Some(format!("https://worldscan.org/address/{a}").as_str())
    );
}

struct Mint {
    minted: AtomicUsize,
    done: Notify,
}

#[async_trait]
impl ProtectedAction for Mint {
    async fn execute(&self) -> Result<(), MintKitError> {
        self.minted.fetch_add(1, Ordering::SeqCst);
        self.done.notify_one();
        Ok(())
    }
}

/// Issuer that turns active as soon as a token is requested.
struct InstantIssuer {
    status: Arc<StatusFeed>,
    requests: AtomicUsize,
}

#[async_trait]
impl IssuanceService for InstantIssuer {
    async fn request_token(&self) -> Result<(), MintKitError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.status.publish(VerificationStatus::Active);
        Ok(())
    }

    fn status(&self) -> Arc<StatusFeed> {
        Arc::clone(&self.status)
    }
}

#[tokio::test]
async fn test_secondary_flow_to_mint() {
    let mint = Arc::new(Mint {
        minted: AtomicUsize::new(0),
        done: Notify::new(),
    });
    let issuer = Arc::new(InstantIssuer {
        status: Arc::new(StatusFeed::new(VerificationStatus::Unverified)),
        requests: AtomicUsize::new(0),
    });
    let messages = Arc::new(InboundMessages::default());
    let controller = GatedActionController::create(
        GateConfig::gated(RESERVED_SECONDARY_FLOW_ISSUER),
        mint.clone(),
        issuer.clone(),
        Arc::clone(&messages),
    )
    .await;

    let predicates = TriggerPredicates {
        active: true,
        ..TriggerPredicates::default()
    };
    assert_eq!(predicates.label(), TriggerLabel::Mint);
    assert!(!predicates.is_disabled());

    let activation = controller.handle_activation().await.unwrap();
    assert_eq!(activation, Activation::SecondaryFlowOpened);
    let embed = controller
        .secondary_flow_url("0xfeed", "https://mint.example.org/")
        .unwrap()
        .unwrap();
    assert!(embed.contains("wallet=0xfeed"));

    messages.post(FLOW_FINISHED_MESSAGE);
    tokio::time::timeout(Duration::from_secs(1), mint.done.notified())
        .await
        .expect("mint did not run after verification");

    assert_eq!(mint.minted.load(Ordering::SeqCst), 1);
    assert_eq!(issuer.requests.load(Ordering::SeqCst), 1);
    assert!(!controller.pending_click());
    assert!(!controller.secondary_flow_open());
}
