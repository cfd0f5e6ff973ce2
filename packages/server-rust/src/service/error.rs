//! Error types for event dispatch and the delivery service.

use depot_core::{DeliveryState, PricingError, ValidationErrors};
use uuid::Uuid;

/// Errors raised while building a handler registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate {family} handler registered for event type {kind}")]
    DuplicateHandler { family: &'static str, kind: String },
}

/// Errors returned by an individual event handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to forward event: {0}")]
    Forward(#[source] anyhow::Error),
}

/// Errors returned by the event dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No handler is registered for the event's type.
    #[error("no handler registered for {family} event type {kind}")]
    Unrecognized { family: &'static str, kind: String },
    /// The matching handler ran and failed.
    #[error("{kind} handler failed: {source}")]
    Handler {
        kind: String,
        #[source]
        source: HandlerError,
    },
}

/// Errors returned by the delivery service.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery with id {delivery_id} not found")]
    NotFound { delivery_id: Uuid },
    #[error("delivery {delivery_id} cannot move from {from} to {to}")]
    InvalidTransition {
        delivery_id: Uuid,
        from: DeliveryState,
        to: DeliveryState,
    },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("{service} service call failed: {source}")]
    Collaborator {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("delivery store error: {0}")]
    Store(#[source] anyhow::Error),
}
