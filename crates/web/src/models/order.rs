//! Order domain types.
//!
//! An order is an immutable snapshot of a cart at checkout time. Line items
//! capture the product name and unit price as they were when the order was
//! placed; later catalog edits do not affect recorded orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{OrderId, Price, UserId};

/// One line of an order snapshot.
///
/// Serialized into the order's `details` JSON column as
/// `{"product_name": ..., "price": ..., "quantity": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    /// Unit price in minor units at checkout time.
    pub price: Price,
    pub quantity: i64,
}

impl OrderLine {
    /// Line total: unit price × quantity.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A recorded order (write-once).
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Snapshot of the cart contents at checkout time.
    pub details: Vec<OrderLine>,
    /// Sum of line totals, computed at creation and never recomputed.
    pub total_price: Price,
    pub customer_name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}
