use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use depot_core::TypedEvent;

use super::error::{HandlerError, RegistryError};

// ---------------------------------------------------------------------------
// EventHandler trait
// ---------------------------------------------------------------------------

/// A unit of logic bound to exactly one event type of family `E`.
///
/// Handlers declare their type key through [`event_type`](Self::event_type);
/// the [`HandlerRegistry`] indexes them by it.
#[async_trait]
pub trait EventHandler<E: TypedEvent>: Send + Sync {
    /// The event type this handler processes.
    fn event_type(&self) -> E::Kind;

    /// Process one event of type [`event_type`](Self::event_type).
    async fn handle(&self, event: &E) -> Result<(), HandlerError>;
}

// ---------------------------------------------------------------------------
// HandlerRegistry
// ---------------------------------------------------------------------------

/// Immutable mapping from event type to its handler.
///
/// Built once at startup from a fixed set of handlers and shared behind an
/// `Arc` afterwards; lookups need no synchronization. Registering two
/// handlers with the same type key fails construction.
pub struct HandlerRegistry<E: TypedEvent> {
    by_kind: HashMap<E::Kind, Arc<dyn EventHandler<E>>>,
    /// Registration order, for deterministic reporting.
    order: Vec<E::Kind>,
}

impl<E: TypedEvent> HandlerRegistry<E> {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder<E> {
        HandlerRegistryBuilder {
            inner: Self {
                by_kind: HashMap::new(),
                order: Vec::new(),
            },
        }
    }

    /// Builds a registry indexing each handler by its declared type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateHandler`] naming the first type key
    /// declared by more than one handler.
    pub fn from_handlers<I>(handlers: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn EventHandler<E>>>,
    {
        let mut builder = Self::builder();
        for handler in handlers {
            builder.insert(handler)?;
        }
        Ok(builder.build())
    }

    /// Returns the handler registered for `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: E::Kind) -> Option<&Arc<dyn EventHandler<E>>> {
        self.by_kind.get(&kind)
    }

    #[must_use]
    pub fn contains(&self, kind: E::Kind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    /// Registered type keys in registration order.
    #[must_use]
    pub fn kinds(&self) -> &[E::Kind] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Builder for [`HandlerRegistry`]. The registry becomes immutable once
/// [`build`](Self::build) is called.
pub struct HandlerRegistryBuilder<E: TypedEvent> {
    inner: HandlerRegistry<E>,
}

impl<E: TypedEvent> HandlerRegistryBuilder<E> {
    /// Registers a concrete handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateHandler`] if a handler for the same
    /// type is already registered.
    pub fn register<H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        H: EventHandler<E> + 'static,
    {
        self.insert(Arc::new(handler))?;
        Ok(self)
    }

    fn insert(&mut self, handler: Arc<dyn EventHandler<E>>) -> Result<(), RegistryError> {
        let kind = handler.event_type();
        if self.inner.by_kind.contains_key(&kind) {
            return Err(RegistryError::DuplicateHandler {
                family: E::FAMILY,
                kind: kind.to_string(),
            });
        }
        self.inner.by_kind.insert(kind, handler);
        self.inner.order.push(kind);
        Ok(())
    }

    #[must_use]
    pub fn build(self) -> HandlerRegistry<E> {
        self.inner
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
