use tokio::sync::broadcast;

const DEFAULT_CAPACITY: u32 = 16;

/// Inbound cross-surface messages, such as those posted by the embedded secondary flow.
///
/// The host owns the channel and posts every payload it receives. Listeners only see
/// payloads posted after they subscribed, so a stale completion from an earlier flow is
/// never acted upon.
#[derive(Debug, Clone, uniffi::Object)]
pub struct InboundMessages {
    sender: broadcast::Sender<String>,
}

#[uniffi::export]
impl InboundMessages {
    /// Creates a channel buffering up to `capacity` payloads per listener.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let capacity = usize::try_from(capacity).unwrap_or(usize::MAX).max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Posts a payload to every current listener and returns how many received it.
    pub fn post(&self, payload: &str) -> u64 {
        self.sender
            .send(payload.to_string())
            .map_or(0, |receivers| u64::try_from(receivers).unwrap_or(u64::MAX))
    }

    /// Number of listeners currently attached.
    #[must_use]
    pub fn listener_count(&self) -> u64 {
        u64::try_from(self.sender.receiver_count()).unwrap_or(u64::MAX)
    }
}

impl InboundMessages {
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

impl Default for InboundMessages {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_without_listeners_is_dropped() {
        let messages = InboundMessages::default();
        assert_eq!(messages.post("QUIZ_FINISHED"), 0);
        assert_eq!(messages.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_listener_only_sees_later_payloads() {
        let messages = InboundMessages::new(4);
        messages.post("before");

        let mut listener = messages.subscribe();
        assert_eq!(messages.post("after"), 1);

        assert_eq!(listener.recv().await.unwrap(), "after");
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let messages = InboundMessages::new(0);
        let _listener = messages.subscribe();
        assert_eq!(messages.post("ping"), 1);
    }
}
