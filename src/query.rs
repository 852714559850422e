//! Filters, updates and aggregation pipelines issued against the order
//! collection. Both store backends receive exactly these documents.

use mongodb::bson::{Bson, Document, doc};

pub const ORDER_ID: &str = "orderid";
pub const TOTAL_FIELD: &str = "total";
pub const TOTAL_QUANTITY_FIELD: &str = "totalQuantity";

pub fn all_orders() -> Document {
    doc! {}
}

pub fn by_order_id(order_id: i32) -> Document {
    doc! { ORDER_ID: order_id }
}

pub fn set_delivery_address(address: &str) -> Document {
    doc! { "$set": { "delivery_address": address } }
}

/// Single group over the whole collection summing the stored `total_amount`.
pub fn total_amount_pipeline() -> Vec<Document> {
    vec![doc! {
        "$group": { "_id": Bson::Null, TOTAL_FIELD: { "$sum": "$total_amount" } }
    }]
}

/// Flatten line items, keep the ones for `product_id`, sum their quantities.
pub fn product_quantity_pipeline(product_id: &str) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$products" },
        doc! { "$match": { "products.product_id": product_id } },
        doc! {
            "$group": {
                "_id": "$products.product_id",
                TOTAL_QUANTITY_FIELD: { "$sum": "$products.quantity" },
            }
        },
    ]
}
