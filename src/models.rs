use std::fmt;

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// A purchase record as stored in the order collection.
///
/// `order_id` is caller supplied and kept under the `orderid` key so existing
/// collections stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "orderid")]
    pub order_id: i32,
    pub products: Vec<LineItem>,
    pub total_amount: f64,
    pub delivery_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    pub size: String,
    /// Integer prices decode into `f64` as well.
    pub price: f64,
    pub quantity: i32,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// The part of a stored order that the listing reads. Other fields may be
/// absent without breaking the listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedOrder {
    #[serde(rename = "orderid")]
    pub order_id: i32,
    #[serde(default)]
    pub products: Vec<ListedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListedItem {
    pub product_name: String,
    pub price: f64,
    pub quantity: i32,
}

impl ListedOrder {
    /// One display row per line item, totals computed from price and quantity.
    pub fn into_lines(self) -> impl Iterator<Item = OrderLine> {
        let order_id = self.order_id;
        self.products.into_iter().map(move |item| OrderLine {
            order_id,
            total: item.price * f64::from(item.quantity),
            product_name: item.product_name,
            price: item.price,
            quantity: item.quantity,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_id: i32,
    pub product_name: String,
    pub price: f64,
    pub quantity: i32,
    pub total: f64,
}

impl fmt::Display for OrderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{:.2}\t{}\t{:.2}",
            self.order_id, self.product_name, self.price, self.quantity, self.total
        )
    }
}

/// Outcome of a single-group `$sum` aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateTotal {
    Numeric(f64),
    Empty,
    UnexpectedType(String),
}

impl AggregateTotal {
    pub fn from_group(group: Option<&Document>, field: &str) -> Self {
        let Some(group) = group else {
            return AggregateTotal::Empty;
        };
        match group.get(field) {
            Some(Bson::Int32(v)) => AggregateTotal::Numeric(f64::from(*v)),
            Some(Bson::Int64(v)) => AggregateTotal::Numeric(*v as f64),
            Some(Bson::Double(v)) => AggregateTotal::Numeric(*v),
            Some(other) => AggregateTotal::UnexpectedType(format!("{:?}", other.element_type())),
            None => AggregateTotal::UnexpectedType(format!("missing field `{field}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn decodes_integer_prices_as_floats() {
        let stored = doc! {
            "orderid": 1,
            "products": [
                { "product_id": "quanau", "product_name": "quan au", "size": "XL", "price": 10, "quantity": 1 },
            ],
            "total_amount": 31,
            "delivery_address": "Hanoi",
        };
        let order: Order = bson::from_document(stored).unwrap();
        assert_eq!(order.products[0].price, 10.0);
        assert_eq!(order.total_amount, 31.0);
    }

    #[test]
    fn listing_reads_only_displayed_fields() {
        let stored = doc! {
            "orderid": 1,
            "products": [
                { "product_id": "quanau", "product_name": "quan au", "price": 10, "quantity": 1 },
            ],
        };
        let order: ListedOrder = bson::from_document(stored).unwrap();
        let lines: Vec<OrderLine> = order.into_lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].total, 10.0);
    }

    #[test]
    fn formats_display_row() {
        let line = OrderLine {
            order_id: 1,
            product_name: "ao so mi".into(),
            price: 10.5,
            quantity: 2,
            total: 21.0,
        };
        assert_eq!(line.to_string(), "1\tao so mi\t10.50\t2\t21.00");
    }

    #[test]
    fn classifies_group_results() {
        assert_eq!(AggregateTotal::from_group(None, "total"), AggregateTotal::Empty);
        assert_eq!(
            AggregateTotal::from_group(Some(&doc! { "total": 73.5 }), "total"),
            AggregateTotal::Numeric(73.5)
        );
        assert_eq!(
            AggregateTotal::from_group(Some(&doc! { "total": 4_i64 }), "total"),
            AggregateTotal::Numeric(4.0)
        );
        assert!(matches!(
            AggregateTotal::from_group(Some(&doc! { "total": "n/a" }), "total"),
            AggregateTotal::UnexpectedType(_)
        ));
    }
}
