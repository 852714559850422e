use futures::TryStreamExt;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::{
    dto::orders::{CreateOrderRequest, UpdateAddressRequest},
    error::AppResult,
    models::LineItem,
    services::order_service,
    state::AppState,
};

use super::Console;

pub async fn insert_order<R, W>(state: &AppState, console: &mut Console<R, W>) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let order_id = console.prompt_parse("Enter Order ID: ").await?;
    let count: usize = console.prompt_parse("Enter number of products: ").await?;

    let mut products = Vec::new();
    for index in 1..=count {
        console.write_line(format!("Product {index}:")).await?;
        let product_id = console.prompt_token("  Enter Product ID: ").await?;
        let product_name = console.prompt("  Enter Product name: ").await?;
        let size = console.prompt("  Enter Size: ").await?;
        let price = console.prompt_parse("  Enter Price: ").await?;
        let quantity = console.prompt_parse("  Enter Quantity: ").await?;
        products.push(LineItem {
            product_id,
            product_name: product_name.trim().to_string(),
            size: size.trim().to_string(),
            price,
            quantity,
        });
    }
    let delivery_address = console.prompt("Enter delivery address: ").await?;

    let order = CreateOrderRequest {
        order_id,
        products,
        delivery_address: delivery_address.trim().to_string(),
    }
    .into_order();
    order_service::insert_order(state, &order).await?;

    console.write_line("Order inserted successfully!").await
}

pub async fn update_delivery_address<R, W>(
    state: &AppState,
    console: &mut Console<R, W>,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let order_id = console.prompt_parse("Enter Order ID: ").await?;
    let delivery_address = console.prompt("Enter new delivery address: ").await?;

    order_service::update_delivery_address(
        state,
        UpdateAddressRequest {
            order_id,
            delivery_address: delivery_address.trim().to_string(),
        },
    )
    .await?;

    console
        .write_line("Delivery address updated successfully!")
        .await
}

pub async fn delete_order<R, W>(state: &AppState, console: &mut Console<R, W>) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let order_id = console.prompt_parse("Enter Order ID to delete: ").await?;
    order_service::delete_order(state, order_id).await?;

    console.write_line("Order deleted successfully!").await
}

pub async fn display_orders<R, W>(state: &AppState, console: &mut Console<R, W>) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = order_service::order_lines(state).await?;
    while let Some(line) = lines.try_next().await? {
        console.write_line(line).await?;
    }
    Ok(())
}

pub async fn calculate_total_amount<R, W>(
    state: &AppState,
    console: &mut Console<R, W>,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Some(total) = order_service::calculate_total_amount(state).await? {
        console.write_line(format!("Total amount: {total:?}")).await?;
    }
    Ok(())
}

pub async fn count_product_by_id<R, W>(
    state: &AppState,
    console: &mut Console<R, W>,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let product_id = console.prompt_token("Enter Product ID: ").await?;
    if let Some(quantity) = order_service::count_product_by_id(state, &product_id).await? {
        console
            .write_line(format!(
                "Total quantity for product_id '{product_id}': {quantity}"
            ))
            .await?;
    }
    Ok(())
}
