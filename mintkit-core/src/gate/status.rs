use tokio::sync::watch;

use super::VerificationStatus;

/// Verification status published by the issuance service.
///
/// The issuer (or the host on its behalf) publishes every status it learns about. The
/// controller only watches the feed. Once every handle to the feed is gone the stream is
/// closed and watchers keep the last published status.
#[derive(Debug, uniffi::Object)]
pub struct StatusFeed {
    sender: watch::Sender<VerificationStatus>,
}

#[uniffi::export]
impl StatusFeed {
    /// Creates a feed holding `initial`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(initial: VerificationStatus) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Publishes `status` to every watcher.
    pub fn publish(&self, status: VerificationStatus) {
        self.sender.send_replace(status);
    }

    /// Latest published status.
    #[must_use]
    pub fn current(&self) -> VerificationStatus {
        *self.sender.borrow()
    }
}

impl StatusFeed {
    pub(crate) fn subscribe(&self) -> watch::Receiver<VerificationStatus> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watchers_see_published_status() {
        let feed = StatusFeed::new(VerificationStatus::Unverified);
        let mut watcher = feed.subscribe();

        feed.publish(VerificationStatus::Awaiting);

        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), VerificationStatus::Awaiting);
        assert_eq!(feed.current(), VerificationStatus::Awaiting);
    }

    #[tokio::test]
    async fn test_dropped_feed_closes_stream_but_keeps_last_status() {
        let feed = StatusFeed::new(VerificationStatus::Active);
        let mut watcher = feed.subscribe();
        drop(feed);

        assert!(watcher.changed().await.is_err());
        assert_eq!(*watcher.borrow(), VerificationStatus::Active);
    }
}
