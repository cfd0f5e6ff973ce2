//! Delivery record storage.
//!
//! - [`DeliveryStore`] / [`DeliveryTransaction`]: the transactional boundary
//!   the delivery service depends on
//! - [`engines`]: concrete backends

pub mod engine;
pub mod engines;

pub use engine::*;
pub use engines::InMemoryDeliveryStore;
