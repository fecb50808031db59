//! Cart domain types.

use bazaar_core::{CartItemId, Price, ProductId, UserId};

/// One pending-purchase row: (user, product, quantity).
#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A cart row joined with its product, as shown on the cart page and read
/// at checkout time.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    /// Unit price of the product at read time.
    pub unit_price: Price,
    pub quantity: i64,
    pub first_image_url: Option<String>,
}

impl CartLine {
    /// Line total: unit price × quantity.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}
