use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{self, Bson};

use crate::{
    dto::orders::UpdateAddressRequest,
    error::{AppError, AppResult},
    models::{AggregateTotal, ListedOrder, Order, OrderLine},
    query,
    state::AppState,
    store::StoreError,
};

pub type OrderLineStream = BoxStream<'static, AppResult<OrderLine>>;

pub async fn insert_order(state: &AppState, order: &Order) -> AppResult<()> {
    let document = bson::to_document(order).map_err(StoreError::from)?;
    state.orders.insert_one(document).await?;

    tracing::debug!(
        order_id = order.order_id,
        items = order.products.len(),
        "order inserted"
    );
    Ok(())
}

/// Replaces the delivery address of the first order with `order_id`.
///
/// A missing order is not an error; the returned modified count is 0.
pub async fn update_delivery_address(
    state: &AppState,
    payload: UpdateAddressRequest,
) -> AppResult<u64> {
    let modified = state
        .orders
        .update_one(
            query::by_order_id(payload.order_id),
            query::set_delivery_address(&payload.delivery_address),
        )
        .await?;

    tracing::debug!(order_id = payload.order_id, modified, "delivery address updated");
    Ok(modified)
}

/// Removes the first order with `order_id`. Returns the deleted count (0 or 1).
pub async fn delete_order(state: &AppState, order_id: i32) -> AppResult<u64> {
    let deleted = state.orders.delete_one(query::by_order_id(order_id)).await?;

    tracing::debug!(order_id, deleted, "order deleted");
    Ok(deleted)
}

/// Streams one row per line item across all orders.
///
/// Line totals are `price * quantity` computed while reading; the stored
/// `total_amount` is not consulted. Each call re-reads the collection.
pub async fn order_lines(state: &AppState) -> AppResult<OrderLineStream> {
    let documents = state.orders.find(query::all_orders()).await?;

    Ok(documents
        .map_err(AppError::from)
        .and_then(|document| async move {
            bson::from_document::<ListedOrder>(document).map_err(AppError::from)
        })
        .map_ok(|order| stream::iter(order.into_lines().map(Ok::<_, AppError>)))
        .try_flatten()
        .boxed())
}

/// Sums the stored `total_amount` of every order. `None` on an empty collection.
pub async fn calculate_total_amount(state: &AppState) -> AppResult<Option<f64>> {
    let group = state
        .orders
        .aggregate_first(query::total_amount_pipeline())
        .await?;

    match AggregateTotal::from_group(group.as_ref(), query::TOTAL_FIELD) {
        AggregateTotal::Numeric(total) => {
            tracing::debug!(total, "total amount calculated");
            Ok(Some(total))
        }
        AggregateTotal::Empty => Ok(None),
        AggregateTotal::UnexpectedType(found) => {
            tracing::warn!(%found, "total amount aggregate is not numeric");
            Err(AppError::UnexpectedAggregateType(found))
        }
    }
}

/// Sums the quantity of every line item with `product_id`, counting repeats
/// within one order separately. `None` when no line item matches.
pub async fn count_product_by_id(state: &AppState, product_id: &str) -> AppResult<Option<i64>> {
    let group = state
        .orders
        .aggregate_first(query::product_quantity_pipeline(product_id))
        .await?;
    let Some(group) = group else {
        return Ok(None);
    };

    let quantity = match group.get(query::TOTAL_QUANTITY_FIELD) {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        other => {
            return Err(AppError::UnexpectedQuantityType(format!(
                "{:?}",
                other.map(Bson::element_type)
            )));
        }
    };

    tracing::debug!(product_id, quantity, "product quantity counted");
    Ok(Some(quantity))
}
