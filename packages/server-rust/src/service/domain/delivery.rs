//! Delivery service: planning, lifecycle transitions and cost estimation.

use std::sync::Arc;

use depot_core::{delivery_cost, Delivery, DeliveryState, NewDelivery, OrderPricing, Validate};
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::service::config::TransitionPolicy;
use crate::service::error::DeliveryError;
use crate::storage::{DeliveryStore, DeliveryTransaction};
use crate::traits::{OrderClient, WarehouseClient};

/// Order-service notification sent after a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderNotice {
    Assembly,
    Completed,
    DeliveryFailed,
}

impl OrderNotice {
    async fn send(self, orders: &dyn OrderClient, order_id: Uuid) -> anyhow::Result<()> {
        match self {
            Self::Assembly => orders.assembly(order_id).await,
            Self::Completed => orders.completed(order_id).await,
            Self::DeliveryFailed => orders.delivery_failed(order_id).await,
        }
    }
}

/// Manages delivery records and their lifecycle.
///
/// Every mutating operation runs in one store transaction that is committed
/// only after the order service has been notified. A failed notification
/// rolls the transaction back, leaving the stored state untouched.
pub struct DeliveryService {
    store: Arc<dyn DeliveryStore>,
    orders: Arc<dyn OrderClient>,
    warehouse: Arc<dyn WarehouseClient>,
    policy: TransitionPolicy,
}

impl DeliveryService {
    #[must_use]
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        orders: Arc<dyn OrderClient>,
        warehouse: Arc<dyn WarehouseClient>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            store,
            orders,
            warehouse,
            policy,
        }
    }

    /// Persists a new delivery in state `CREATED`.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::Store`] if the record cannot be written.
    #[tracing::instrument(skip_all, fields(order_id = %new.order_id))]
    pub async fn plan(&self, new: NewDelivery) -> Result<Delivery, DeliveryError> {
        let delivery = new.into_delivery();
        let mut tx = self.store.begin().await.map_err(DeliveryError::Store)?;
        if let Err(err) = tx.save(delivery.clone()).await {
            rollback(tx).await;
            return Err(DeliveryError::Store(err));
        }
        tx.commit().await.map_err(DeliveryError::Store)?;

        info!(delivery_id = %delivery.delivery_id, "delivery planned");
        Ok(delivery)
    }

    /// Marks the delivery as picked up and notifies the order service that the
    /// order is being assembled.
    ///
    /// # Errors
    ///
    /// See [`DeliveryService::transition`].
    pub async fn pick(&self, delivery_id: Uuid) -> Result<Delivery, DeliveryError> {
        self.transition(delivery_id, DeliveryState::InProgress, OrderNotice::Assembly)
            .await
    }

    /// Marks the delivery as delivered and notifies the order service.
    ///
    /// # Errors
    ///
    /// See [`DeliveryService::transition`].
    pub async fn succeed(&self, delivery_id: Uuid) -> Result<Delivery, DeliveryError> {
        self.transition(delivery_id, DeliveryState::Delivered, OrderNotice::Completed)
            .await
    }

    /// Marks the delivery as failed and notifies the order service.
    ///
    /// # Errors
    ///
    /// See [`DeliveryService::transition`].
    pub async fn fail(&self, delivery_id: Uuid) -> Result<Delivery, DeliveryError> {
        self.transition(delivery_id, DeliveryState::Failed, OrderNotice::DeliveryFailed)
            .await
    }

    /// Computes the delivery cost for an order.
    ///
    /// The delivery record is looked up first; the warehouse is only asked for
    /// its address once the delivery is known to exist.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::Validation`] for negative or non-finite weight/volume
    /// - [`DeliveryError::NotFound`] if the order's delivery does not exist
    /// - [`DeliveryError::Collaborator`] if the warehouse lookup fails
    /// - [`DeliveryError::Pricing`] if the inputs cannot be priced exactly
    #[tracing::instrument(skip_all, fields(order_id = %order.order_id, delivery_id = %order.delivery_id))]
    pub async fn cost(&self, order: &OrderPricing) -> Result<Decimal, DeliveryError> {
        order.validate()?;

        let Some(delivery) = self
            .store
            .find(order.delivery_id)
            .await
            .map_err(DeliveryError::Store)?
        else {
            error!(delivery_id = %order.delivery_id, "no delivery found for order");
            return Err(DeliveryError::NotFound {
                delivery_id: order.delivery_id,
            });
        };

        let warehouse = self
            .warehouse
            .warehouse_address()
            .await
            .map_err(|source| DeliveryError::Collaborator {
                service: "warehouse",
                source,
            })?;

        Ok(delivery_cost(order, &warehouse, &delivery.to_address)?)
    }

    /// Moves a delivery to `target` inside one transaction.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::NotFound`] if the delivery does not exist
    /// - [`DeliveryError::InvalidTransition`] if the strict policy rejects the move
    /// - [`DeliveryError::Collaborator`] if the order service call fails
    /// - [`DeliveryError::Store`] on persistence failure
    #[tracing::instrument(skip(self), fields(policy = self.policy.as_str()))]
    async fn transition(
        &self,
        delivery_id: Uuid,
        target: DeliveryState,
        notice: OrderNotice,
    ) -> Result<Delivery, DeliveryError> {
        let mut tx = self.store.begin().await.map_err(DeliveryError::Store)?;

        match self.apply(tx.as_mut(), delivery_id, target, notice).await {
            Ok(delivery) => {
                tx.commit().await.map_err(DeliveryError::Store)?;
                info!(%delivery_id, state = %target, "delivery state changed");
                Ok(delivery)
            }
            Err(err) => {
                rollback(tx).await;
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        tx: &mut dyn DeliveryTransaction,
        delivery_id: Uuid,
        target: DeliveryState,
        notice: OrderNotice,
    ) -> Result<Delivery, DeliveryError> {
        let Some(mut delivery) = tx.find(delivery_id).await.map_err(DeliveryError::Store)? else {
            return Err(DeliveryError::NotFound { delivery_id });
        };

        let current = delivery.delivery_state;
        if self.policy == TransitionPolicy::Strict && !current.can_transition_to(target) {
            return Err(DeliveryError::InvalidTransition {
                delivery_id,
                from: current,
                to: target,
            });
        }

        delivery.delivery_state = target;
        tx.save(delivery.clone())
            .await
            .map_err(DeliveryError::Store)?;

        notice
            .send(self.orders.as_ref(), delivery.order_id)
            .await
            .map_err(|source| DeliveryError::Collaborator {
                service: "order",
                source,
            })?;

        Ok(delivery)
    }
}

async fn rollback(tx: Box<dyn DeliveryTransaction>) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "delivery transaction rollback failed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use depot_core::Address;
    use parking_lot::Mutex;

    use super::*;
    use crate::storage::InMemoryDeliveryStore;

    /// Order client that records notifications, optionally failing them.
    #[derive(Default)]
    struct RecordingOrders {
        calls: Mutex<Vec<(&'static str, Uuid)>>,
        fail: bool,
    }

    impl RecordingOrders {
        fn record(&self, name: &'static str, order_id: Uuid) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("order service unavailable");
            }
            self.calls.lock().push((name, order_id));
            Ok(())
        }
    }

    #[async_trait]
    impl OrderClient for RecordingOrders {
        async fn assembly(&self, order_id: Uuid) -> anyhow::Result<()> {
            self.record("assembly", order_id)
        }

        async fn completed(&self, order_id: Uuid) -> anyhow::Result<()> {
            self.record("completed", order_id)
        }

        async fn delivery_failed(&self, order_id: Uuid) -> anyhow::Result<()> {
            self.record("delivery_failed", order_id)
        }
    }

    /// Warehouse with a fixed address that counts lookups.
    struct FixedWarehouse {
        address: Address,
        lookups: AtomicU32,
    }

    #[async_trait]
    impl WarehouseClient for FixedWarehouse {
        async fn warehouse_address(&self) -> anyhow::Result<Address> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.address.clone())
        }
    }

    struct Fixture {
        store: InMemoryDeliveryStore,
        orders: Arc<RecordingOrders>,
        warehouse: Arc<FixedWarehouse>,
        service: DeliveryService,
    }

    fn address(city: &str, street: &str) -> Address {
        Address {
            country: "Country".to_string(),
            city: city.to_string(),
            street: street.to_string(),
            house: "1".to_string(),
            flat: "1".to_string(),
        }
    }

    fn fixture_with(policy: TransitionPolicy, failing_orders: bool) -> Fixture {
        let store = InMemoryDeliveryStore::new();
        let orders = Arc::new(RecordingOrders {
            fail: failing_orders,
            ..RecordingOrders::default()
        });
        let warehouse = Arc::new(FixedWarehouse {
            address: address("ADDRESS_1 city", "Warehouse street"),
            lookups: AtomicU32::new(0),
        });
        let service = DeliveryService::new(
            Arc::new(store.clone()),
            orders.clone(),
            warehouse.clone(),
            policy,
        );
        Fixture {
            store,
            orders,
            warehouse,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(TransitionPolicy::Lenient, false)
    }

    fn new_delivery() -> NewDelivery {
        NewDelivery {
            delivery_id: None,
            order_id: Uuid::new_v4(),
            from_address: address("ADDRESS_1 city", "Warehouse street"),
            to_address: address("Elsewhere", "Customer street"),
            delivery_state: Some(DeliveryState::Delivered),
        }
    }

    async fn stored_state(store: &InMemoryDeliveryStore, id: Uuid) -> DeliveryState {
        store.find(id).await.unwrap().unwrap().delivery_state
    }

    #[tokio::test]
    async fn plan_forces_created_and_generates_id() {
        let f = fixture();
        let delivery = f.service.plan(new_delivery()).await.unwrap();

        assert_eq!(delivery.delivery_state, DeliveryState::Created);
        assert!(!delivery.delivery_id.is_nil());
        assert_eq!(stored_state(&f.store, delivery.delivery_id).await, DeliveryState::Created);
    }

    #[tokio::test]
    async fn plan_keeps_supplied_id() {
        let f = fixture();
        let id = Uuid::new_v4();
        let delivery = f
            .service
            .plan(NewDelivery {
                delivery_id: Some(id),
                ..new_delivery()
            })
            .await
            .unwrap();
        assert_eq!(delivery.delivery_id, id);
    }

    #[tokio::test]
    async fn lifecycle_notifies_order_service() {
        let f = fixture();
        let delivery = f.service.plan(new_delivery()).await.unwrap();
        let id = delivery.delivery_id;

        let picked = f.service.pick(id).await.unwrap();
        assert_eq!(picked.delivery_state, DeliveryState::InProgress);
        assert_eq!(stored_state(&f.store, id).await, DeliveryState::InProgress);

        f.service.succeed(id).await.unwrap();
        assert_eq!(stored_state(&f.store, id).await, DeliveryState::Delivered);

        assert_eq!(
            *f.orders.calls.lock(),
            vec![("assembly", delivery.order_id), ("completed", delivery.order_id)]
        );
    }

    #[tokio::test]
    async fn fail_notifies_delivery_failed() {
        let f = fixture();
        let delivery = f.service.plan(new_delivery()).await.unwrap();

        f.service.fail(delivery.delivery_id).await.unwrap();

        assert_eq!(stored_state(&f.store, delivery.delivery_id).await, DeliveryState::Failed);
        assert_eq!(*f.orders.calls.lock(), vec![("delivery_failed", delivery.order_id)]);
    }

    #[tokio::test]
    async fn unknown_delivery_is_not_found_for_every_transition() {
        let f = fixture();
        let id = Uuid::new_v4();

        for result in [
            f.service.pick(id).await,
            f.service.succeed(id).await,
            f.service.fail(id).await,
        ] {
            assert!(matches!(result, Err(DeliveryError::NotFound { delivery_id }) if delivery_id == id));
        }
        assert!(f.orders.calls.lock().is_empty());
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn failed_notification_rolls_back() {
        let f = fixture_with(TransitionPolicy::Lenient, true);
        let delivery = f.service.plan(new_delivery()).await.unwrap();

        let err = f.service.pick(delivery.delivery_id).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Collaborator { service: "order", .. }));
        assert_eq!(stored_state(&f.store, delivery.delivery_id).await, DeliveryState::Created);
    }

    #[tokio::test]
    async fn lenient_policy_accepts_any_move() {
        let f = fixture();
        let delivery = f.service.plan(new_delivery()).await.unwrap();
        f.service.fail(delivery.delivery_id).await.unwrap();

        let picked = f.service.pick(delivery.delivery_id).await.unwrap();
        assert_eq!(picked.delivery_state, DeliveryState::InProgress);
    }

    #[tokio::test]
    async fn strict_policy_rejects_leaving_terminal_state() {
        let f = fixture_with(TransitionPolicy::Strict, false);
        let delivery = f.service.plan(new_delivery()).await.unwrap();
        let id = delivery.delivery_id;
        f.service.fail(id).await.unwrap();

        let err = f.service.pick(id).await.unwrap_err();

        assert!(matches!(
            err,
            DeliveryError::InvalidTransition {
                from: DeliveryState::Failed,
                to: DeliveryState::InProgress,
                ..
            }
        ));
        assert_eq!(stored_state(&f.store, id).await, DeliveryState::Failed);
        assert_eq!(f.orders.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn strict_policy_rejects_skipping_pickup() {
        let f = fixture_with(TransitionPolicy::Strict, false);
        let delivery = f.service.plan(new_delivery()).await.unwrap();

        let err = f.service.succeed(delivery.delivery_id).await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidTransition { .. }));

        f.service.pick(delivery.delivery_id).await.unwrap();
        f.service.succeed(delivery.delivery_id).await.unwrap();
    }

    fn pricing_for(delivery: &Delivery) -> OrderPricing {
        OrderPricing {
            order_id: delivery.order_id,
            delivery_id: delivery.delivery_id,
            delivery_weight: 2.0,
            delivery_volume: 1.0,
            fragile: false,
        }
    }

    #[tokio::test]
    async fn cost_uses_warehouse_and_destination() {
        let f = fixture();
        let delivery = f.service.plan(new_delivery()).await.unwrap();

        let cost = f.service.cost(&pricing_for(&delivery)).await.unwrap();

        assert_eq!(cost, Decimal::new(1296, 2));
        assert_eq!(f.warehouse.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cost_for_unknown_delivery_fails_before_warehouse_lookup() {
        let f = fixture();
        let order = OrderPricing {
            order_id: Uuid::new_v4(),
            delivery_id: Uuid::new_v4(),
            delivery_weight: 1.0,
            delivery_volume: 1.0,
            fragile: true,
        };

        let err = f.service.cost(&order).await.unwrap_err();

        assert!(matches!(err, DeliveryError::NotFound { .. }));
        assert_eq!(f.warehouse.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cost_rejects_negative_weight() {
        let f = fixture();
        let delivery = f.service.plan(new_delivery()).await.unwrap();
        let order = OrderPricing {
            delivery_weight: -1.0,
            ..pricing_for(&delivery)
        };

        let err = f.service.cost(&order).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Validation(_)));
    }
}
