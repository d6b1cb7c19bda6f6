use serde::{Deserialize, Serialize};
use strum::Display;

/// Caller-supplied state of the mint that drives the trigger's label and enablement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[allow(clippy::struct_excessive_bools)]
pub struct TriggerPredicates {
    /// Nothing is left to mint.
    pub sold_out: bool,
    /// The protected action is in flight.
    pub busy: bool,
    /// Only allowlisted buyers may mint right now.
    pub presale: bool,
    /// Minting has started.
    pub active: bool,
}

/// Label shown on the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
pub enum TriggerLabel {
    /// `SOLD OUT`
    #[strum(serialize = "SOLD OUT")]
    SoldOut,
    /// Progress indicator while the action runs.
    #[strum(serialize = "...")]
    InProgress,
    /// `PRESALE MINT`
    #[strum(serialize = "PRESALE MINT")]
    Presale,
    /// `MINT`
    #[strum(serialize = "MINT")]
    Mint,
}

impl TriggerPredicates {
    /// Label for the trigger. Sold out wins over busy, busy over presale.
    #[must_use]
    pub const fn label(&self) -> TriggerLabel {
        if self.sold_out {
            TriggerLabel::SoldOut
        } else if self.busy {
            TriggerLabel::InProgress
        } else if self.presale {
            TriggerLabel::Presale
        } else {
            TriggerLabel::Mint
        }
    }

    /// Whether the trigger must refuse clicks.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.sold_out || self.busy || !self.active
    }
}

/// Label for the trigger given `predicates`.
#[uniffi::export]
#[must_use]
pub fn trigger_label(predicates: TriggerPredicates) -> TriggerLabel {
    predicates.label()
}

/// Whether the trigger is disabled given `predicates`.
#[uniffi::export]
#[must_use]
pub fn trigger_disabled(predicates: TriggerPredicates) -> bool {
    predicates.is_disabled()
}
