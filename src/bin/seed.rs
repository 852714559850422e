use eshop_orders::{
    config::AppConfig,
    db::open_store,
    dto::orders::CreateOrderRequest,
    models::{LineItem, Order},
    services::order_service,
    state::AppState,
};
use mongodb::bson::{self, Bson};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let state = AppState::new(open_store(&config).await?);
    let order = sample_order();
    order_service::insert_order(&state, &order).await?;

    let stored = Bson::Document(bson::to_document(&order)?).into_relaxed_extjson();
    println!("Seeded order into {}.{}:", config.database_name, config.collection_name);
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}

fn sample_order() -> Order {
    CreateOrderRequest {
        order_id: 1,
        products: vec![
            LineItem {
                product_id: "quanau".into(),
                product_name: "quan au".into(),
                size: "XL".into(),
                price: 10.0,
                quantity: 1,
            },
            LineItem {
                product_id: "somi".into(),
                product_name: "ao so mi".into(),
                size: "XL".into(),
                price: 10.5,
                quantity: 2,
            },
        ],
        delivery_address: "Hanoi".into(),
    }
    .into_order()
}
