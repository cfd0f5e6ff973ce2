//! Delivery cost calculation.
//!
//! The cost is a fixed chain of adjustments applied to a base amount, carried
//! out in exact decimal arithmetic and rounded up to cents at the end:
//!
//! 1. start at 5.0
//! 2. x2 when the warehouse city contains `ADDRESS_1`
//! 3. x3 when the warehouse city contains `ADDRESS_2` (independent of step 2)
//! 4. x1.2 for fragile orders
//! 5. + weight x 0.3
//! 6. + volume x 0.2
//! 7. x1.2 when the warehouse street differs from the destination street
//! 8. round up to 2 decimal places

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use crate::types::{Address, OrderPricing};

/// City marker of the first warehouse location.
pub const ADDRESS_1: &str = "ADDRESS_1";
/// City marker of the second warehouse location.
pub const ADDRESS_2: &str = "ADDRESS_2";

/// Number of decimal places in a quoted cost.
pub const COST_SCALE: u32 = 2;

/// Errors from [`delivery_cost`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("{field} is not representable as a decimal: {value}")]
    NotRepresentable { field: &'static str, value: String },
    #[error("delivery cost overflowed")]
    Overflow,
}

/// Computes the delivery cost of `order` shipped from `warehouse` to
/// `destination`.
///
/// Deterministic: the same inputs always yield the same cost.
///
/// # Errors
///
/// Returns [`PricingError::NotRepresentable`] for non-finite or out-of-range
/// weight/volume, and [`PricingError::Overflow`] if an intermediate amount
/// exceeds the decimal range.
pub fn delivery_cost(
    order: &OrderPricing,
    warehouse: &Address,
    destination: &Address,
) -> Result<Decimal, PricingError> {
    let mut cost = Decimal::new(50, 1);

    debug!(
        order_id = %order.order_id,
        warehouse_city = %warehouse.city,
        warehouse_street = %warehouse.street,
        destination_street = %destination.street,
        "computing delivery cost"
    );

    if warehouse.city.contains(ADDRESS_1) {
        cost = mul(cost, Decimal::TWO)?;
        debug!(order_id = %order.order_id, %cost, coefficient = 2, "warehouse at ADDRESS_1");
    }
    if warehouse.city.contains(ADDRESS_2) {
        cost = mul(cost, Decimal::from(3))?;
        debug!(order_id = %order.order_id, %cost, coefficient = 3, "warehouse at ADDRESS_2");
    }
    if order.fragile {
        cost = mul(cost, Decimal::new(12, 1))?;
        debug!(order_id = %order.order_id, %cost, coefficient = 1.2, "fragile order");
    }

    // Set when a positive weight or volume is too small to change the cost
    // at decimal precision; the exact cost is then strictly above `cost`.
    let mut truncated = false;

    let weight = to_decimal("deliveryWeight", order.delivery_weight)?;
    cost = add_scaled(
        cost,
        weight,
        Decimal::new(3, 1),
        order.delivery_weight > 0.0,
        &mut truncated,
    )?;
    debug!(order_id = %order.order_id, %weight, %cost, coefficient = 0.3, "weight applied");

    let volume = to_decimal("deliveryVolume", order.delivery_volume)?;
    cost = add_scaled(
        cost,
        volume,
        Decimal::new(2, 1),
        order.delivery_volume > 0.0,
        &mut truncated,
    )?;
    debug!(order_id = %order.order_id, %volume, %cost, coefficient = 0.2, "volume applied");

    if warehouse.street != destination.street {
        cost = mul(cost, Decimal::new(12, 1))?;
        debug!(order_id = %order.order_id, %cost, coefficient = 1.2, "destination street differs");
    }

    let mut rounded = cost.round_dp_with_strategy(COST_SCALE, RoundingStrategy::ToPositiveInfinity);
    if truncated && rounded == cost {
        rounded = add(rounded, Decimal::new(1, COST_SCALE))?;
        debug!(order_id = %order.order_id, cost = %rounded, "sub-precision amount rounded up");
    }
    info!(
        order_id = %order.order_id,
        delivery_id = %order.delivery_id,
        cost = %rounded,
        "delivery cost calculated"
    );
    Ok(rounded)
}

/// Converts through the shortest decimal rendering of `value`, so `0.6`
/// becomes exactly `0.6` rather than its nearest binary fraction.
fn to_decimal(field: &'static str, value: f64) -> Result<Decimal, PricingError> {
    let not_representable = || PricingError::NotRepresentable {
        field,
        value: value.to_string(),
    };
    if !value.is_finite() {
        return Err(not_representable());
    }
    Decimal::from_str(&value.to_string()).map_err(|_| not_representable())
}

/// Adds `amount x coefficient` to `cost`, flagging `truncated` when a
/// `positive` amount leaves the cost unchanged.
fn add_scaled(
    cost: Decimal,
    amount: Decimal,
    coefficient: Decimal,
    positive: bool,
    truncated: &mut bool,
) -> Result<Decimal, PricingError> {
    let next = add(cost, mul(amount, coefficient)?)?;
    if positive && next == cost {
        *truncated = true;
    }
    Ok(next)
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, PricingError> {
    a.checked_mul(b).ok_or(PricingError::Overflow)
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, PricingError> {
    a.checked_add(b).ok_or(PricingError::Overflow)
}
