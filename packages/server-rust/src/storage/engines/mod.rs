//! Concrete [`DeliveryStore`](super::DeliveryStore) backends.

pub mod hashmap;

pub use hashmap::InMemoryDeliveryStore;
