use serde::Deserialize;

use crate::models::{LineItem, Order};

/// Everything the operator enters for a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub order_id: i32,
    pub products: Vec<LineItem>,
    pub delivery_address: String,
}

impl CreateOrderRequest {
    /// Builds the stored order. The total is computed here, on the caller's
    /// side, and never recomputed by the store.
    pub fn into_order(self) -> Order {
        let total_amount = self.products.iter().map(LineItem::line_total).sum();
        Order {
            order_id: self.order_id,
            products: self.products,
            total_amount,
            delivery_address: self.delivery_address,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAddressRequest {
    pub order_id: i32,
    pub delivery_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_total_from_line_items() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "order_id": 7,
            "products": [
                { "product_id": "quanau", "product_name": "quan au", "size": "XL", "price": 10, "quantity": 1 },
                { "product_id": "somi", "product_name": "ao so mi", "size": "XL", "price": 10.5, "quantity": 2 }
            ],
            "delivery_address": "Hanoi"
        }))
        .unwrap();

        let order = request.into_order();
        assert_eq!(order.order_id, 7);
        assert_eq!(order.total_amount, 31.0);
        assert_eq!(order.products.len(), 2);
    }
}
