//! Gated mint coordination.
//!
//! The [`GatedActionController`] sits between the mint trigger and the protected action.
//! When a gate is configured, the action only runs once the issuance service reports an
//! active verification. Clicks made before that are remembered as a pending click, and a
//! status watcher registered at construction fires the action as soon as the status turns
//! [`VerificationStatus::Active`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::{broadcast, watch, Notify};

use crate::config::SecondaryFlowConfig;
use crate::error::MintKitError;

mod messages;
mod status;
mod subscription;
mod trigger;

pub use messages::InboundMessages;
pub use status::StatusFeed;
use subscription::Subscription;
pub use trigger::{trigger_disabled, trigger_label, TriggerLabel, TriggerPredicates};

/// Verification status as reported by the issuance service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, uniffi::Enum,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// No token has been requested yet.
    Unverified,
    /// A token request is in progress.
    Awaiting,
    /// The caller holds an active token.
    Active,
    /// The token was revoked.
    Revoked,
    /// The issuance service failed.
    Error,
}

/// The action the gate protects, usually the mint itself.
#[uniffi::export(with_foreign)]
#[async_trait]
pub trait ProtectedAction: Send + Sync {
    /// Runs the action to completion.
    ///
    /// # Errors
    /// Implementations report failures as `MintKitError::ActionFailed`.
    async fn execute(&self) -> Result<(), MintKitError>;
}

/// Client of the external verification token issuer.
#[uniffi::export(with_foreign)]
#[async_trait]
pub trait IssuanceService: Send + Sync {
    /// Asks the issuer for a token. The outcome shows up on [`IssuanceService::status`].
    ///
    /// # Errors
    /// Returns an error if the request could not be started.
    async fn request_token(&self) -> Result<(), MintKitError>;

    /// Feed of verification status updates. The core only reads it.
    fn status(&self) -> Arc<StatusFeed>;
}

/// Verification requirement in front of the protected action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct Gate {
    /// Identifier of the issuer the token must come from.
    pub issuer: String,
}

/// Per-deployment gating policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct GateConfig {
    /// The gate, if the action is gated at all.
    pub gate: Option<Gate>,
    /// Secondary flow settings, used when the gate issuer is the reserved one.
    pub secondary_flow: SecondaryFlowConfig,
}

impl GateConfig {
    /// Policy for an action that needs no verification.
    #[must_use]
    pub fn ungated() -> Self {
        Self::default()
    }

    /// Policy requiring a token from `issuer`.
    #[must_use]
    pub fn gated(issuer: impl Into<String>) -> Self {
        Self {
            gate: Some(Gate {
                issuer: issuer.into(),
            }),
            secondary_flow: SecondaryFlowConfig::default(),
        }
    }

    /// Replaces the secondary flow settings.
    #[must_use]
    pub fn with_secondary_flow(mut self, secondary_flow: SecondaryFlowConfig) -> Self {
        self.secondary_flow = secondary_flow;
        self
    }
}

/// Branch taken by [`GatedActionController::handle_activation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Activation {
    /// No gate: the action ran to completion.
    Executed,
    /// The status is already active; the status watcher runs the action.
    AwaitingStatus,
    /// The embedded secondary flow was opened.
    SecondaryFlowOpened,
    /// A token was requested from the issuance service.
    TokenRequested,
}

#[derive(Debug, Default)]
struct GateState {
    pending_click: bool,
    secondary_flow_open: bool,
    message_watcher: Option<Subscription>,
    torn_down: bool,
}

struct Shared {
    config: GateConfig,
    action: Arc<dyn ProtectedAction>,
    issuer: Arc<dyn IssuanceService>,
    messages: Arc<InboundMessages>,
    state: Mutex<GateState>,
    wake: Notify,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears the pending click if the action should fire now.
    fn take_pending_click(&self, status: VerificationStatus) -> bool {
        let mut state = self.lock_state();
        if state.torn_down || status != VerificationStatus::Active || !state.pending_click {
            return false;
        }
        state.pending_click = false;
        true
    }
}

/// Coordinates the mint trigger with the verification handshake.
///
/// Must be created inside a Tokio runtime. Dropping the controller tears it down.
#[derive(uniffi::Object)]
pub struct GatedActionController {
    shared: Arc<Shared>,
    status: watch::Receiver<VerificationStatus>,
    status_watcher: Mutex<Option<Subscription>>,
}

impl GatedActionController {
    /// Creates the controller and, when a gate is configured, registers the status watcher.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime and a gate is configured.
    #[must_use]
    pub fn new(
        config: GateConfig,
        action: Arc<dyn ProtectedAction>,
        issuer: Arc<dyn IssuanceService>,
        messages: Arc<InboundMessages>,
    ) -> Self {
        let status = issuer.status().subscribe();
        let gated = config.gate.is_some();
        let shared = Arc::new(Shared {
            config,
            action,
            issuer,
            messages,
            state: Mutex::new(GateState::default()),
            wake: Notify::new(),
        });

        let status_watcher = gated.then(|| {
            Subscription::spawn(watch_status(Arc::clone(&shared), status.clone()))
        });

        Self {
            shared,
            status,
            status_watcher: Mutex::new(status_watcher),
        }
    }

    fn open_secondary_flow(&self) {
        let mut state = self.shared.lock_state();
        if state.secondary_flow_open {
            return;
        }
        // Subscribing before the flow is shown means the completion cannot be missed.
        let inbound = self.shared.messages.subscribe();
        state.secondary_flow_open = true;
        state.message_watcher = Some(Subscription::spawn(watch_messages(
            Arc::clone(&self.shared),
            inbound,
        )));
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl GatedActionController {
    /// Creates the controller on the bindings' Tokio runtime.
    ///
    /// See [`GatedActionController::new`].
    #[uniffi::constructor]
    pub async fn create(
        config: GateConfig,
        action: Arc<dyn ProtectedAction>,
        issuer: Arc<dyn IssuanceService>,
        messages: Arc<InboundMessages>,
    ) -> Self {
        Self::new(config, action, issuer, messages)
    }

    /// Handles a user-initiated click on the trigger.
    ///
    /// # Errors
    /// Without a gate, returns the protected action's error. With a gate, returns the
    /// issuance service's error when a direct token request fails to start.
    pub async fn handle_activation(&self) -> Result<Activation, MintKitError> {
        self.shared.lock_state().pending_click = true;

        let Some(gate) = &self.shared.config.gate else {
            log::debug!("no gate configured, running protected action");
            let result = self.shared.action.execute().await;
            self.shared.lock_state().pending_click = false;
            if let Err(err) = &result {
                log::warn!("protected action failed: {err}");
            }
            return result.map(|()| Activation::Executed);
        };

        let status = *self.status.borrow();
        if status == VerificationStatus::Active {
            log::debug!("verification already active, handing off to status watcher");
            self.shared.wake.notify_one();
            return Ok(Activation::AwaitingStatus);
        }

        if gate.issuer == self.shared.config.secondary_flow.reserved_issuer {
            log::debug!("issuer {} goes through the secondary flow", gate.issuer);
            self.open_secondary_flow();
            return Ok(Activation::SecondaryFlowOpened);
        }

        log::debug!("verification is {status}, requesting token from {}", gate.issuer);
        self.shared.issuer.request_token().await?;
        Ok(Activation::TokenRequested)
    }

    /// Clears the pending click and closes the secondary flow.
    pub fn reset(&self) {
        let mut state = self.shared.lock_state();
        state.pending_click = false;
        state.secondary_flow_open = false;
        state.message_watcher = None;
    }

    /// Whether a click is waiting for verification.
    #[must_use]
    pub fn pending_click(&self) -> bool {
        self.shared.lock_state().pending_click
    }

    /// Whether the embedded secondary flow is open.
    #[must_use]
    pub fn secondary_flow_open(&self) -> bool {
        self.shared.lock_state().secondary_flow_open
    }

    /// URL to embed while the secondary flow is open, `None` otherwise.
    ///
    /// # Errors
    /// Returns an error if the configured embed URL is invalid.
    pub fn secondary_flow_url(
        &self,
        public_id: &str,
        return_target: &str,
    ) -> Result<Option<String>, MintKitError> {
        if !self.secondary_flow_open() {
            return Ok(None);
        }
        let url = self
            .shared
            .config
            .secondary_flow
            .embed_url_for(public_id, return_target)?;
        Ok(Some(url.into()))
    }

    /// Latest verification status seen by the controller.
    #[must_use]
    pub fn verification_status(&self) -> VerificationStatus {
        *self.status.borrow()
    }

    /// Releases both watchers. Later status updates and inbound messages are ignored.
    pub fn teardown(&self) {
        {
            let mut state = self.shared.lock_state();
            state.torn_down = true;
            state.secondary_flow_open = false;
            state.message_watcher = None;
        }
        self.status_watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Drop for GatedActionController {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn watch_status(shared: Arc<Shared>, mut status: watch::Receiver<VerificationStatus>) {
    let mut stream_open = true;
    loop {
        let current = *status.borrow_and_update();
        if shared.take_pending_click(current) {
            log::info!("verification active, running protected action");
            let action = Arc::clone(&shared.action);
            // Detached so that teardown does not cancel an action already under way.
            tokio::spawn(async move {
                if let Err(err) = action.execute().await {
                    log::warn!("protected action failed: {err}");
                }
            });
        }

        if !stream_open {
            // The last status stays current; only clicks can wake the watcher now.
            shared.wake.notified().await;
            continue;
        }

        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    log::debug!("verification status stream closed at {current}");
                    stream_open = false;
                }
            }
            () = shared.wake.notified() => {}
        }
    }
}

async fn watch_messages(shared: Arc<Shared>, mut inbound: broadcast::Receiver<String>) {
    let finished_message = &shared.config.secondary_flow.finished_message;
    loop {
        match inbound.recv().await {
            Ok(payload) if payload == *finished_message => break,
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("secondary flow listener skipped {skipped} messages");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
    drop(inbound);

    {
        let mut state = shared.lock_state();
        if state.torn_down || !state.secondary_flow_open {
            return;
        }
        state.secondary_flow_open = false;
        if let Some(subscription) = state.message_watcher.take() {
            subscription.detach();
        }
    }

    log::debug!("secondary flow finished, requesting token");
    if let Err(err) = shared.issuer.request_token().await {
        log::warn!("token request after secondary flow failed: {err}");
    }
}
