//! Delivery and order records shared by the delivery and warehouse services.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{Validate, ValidationErrors};

/// Postal address. Every part is free text; the pricing rules only look at
/// `city` and `street`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub street: String,
    pub house: String,
    pub flat: String,
}

/// Lifecycle state of a delivery.
///
/// `CREATED -> IN_PROGRESS -> DELIVERED`, or `CREATED | IN_PROGRESS -> FAILED`.
/// `DELIVERED` and `FAILED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryState {
    Created,
    InProgress,
    Delivered,
    Failed,
}

impl DeliveryState {
    /// Wire name of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Delivered => "DELIVERED",
            Self::Failed => "FAILED",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }

    /// Whether `next` is reachable from `self` along the documented lifecycle.
    ///
    /// Re-entering the current state is always allowed so repeated
    /// notifications stay idempotent.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Created, Self::InProgress | Self::Failed)
                | (Self::InProgress, Self::Delivered | Self::Failed)
        )
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted delivery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub delivery_id: Uuid,
    pub order_id: Uuid,
    pub from_address: Address,
    pub to_address: Address,
    pub delivery_state: DeliveryState,
}

/// Request body for planning a delivery.
///
/// `delivery_id` is optional; a fresh identifier is generated when absent.
/// Any supplied `delivery_state` is ignored: new deliveries always start as
/// `CREATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    #[serde(default)]
    pub delivery_id: Option<Uuid>,
    pub order_id: Uuid,
    pub from_address: Address,
    pub to_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_state: Option<DeliveryState>,
}

impl NewDelivery {
    /// Builds the record to persist, in state `CREATED`.
    #[must_use]
    pub fn into_delivery(self) -> Delivery {
        Delivery {
            delivery_id: self.delivery_id.unwrap_or_else(Uuid::new_v4),
            order_id: self.order_id,
            from_address: self.from_address,
            to_address: self.to_address,
            delivery_state: DeliveryState::Created,
        }
    }
}

/// The subset of an order the delivery pricing reads.
///
/// Orders carry many more fields (products, payment, totals); they are
/// accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    pub order_id: Uuid,
    pub delivery_id: Uuid,
    #[serde(default)]
    pub delivery_weight: f64,
    #[serde(default)]
    pub delivery_volume: f64,
    #[serde(default)]
    pub fragile: bool,
}

impl Validate for OrderPricing {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        errors.non_negative_finite("deliveryWeight", self.delivery_weight);
        errors.non_negative_finite("deliveryVolume", self.delivery_volume);
    }
}
