use std::sync::Arc;

use eshop_orders::{
    menu::{self, Console},
    state::AppState,
    store::{InMemoryOrderStore, OrderStore},
};
use mongodb::bson::doc;

async fn run_script(state: &AppState, script: &str) -> anyhow::Result<String> {
    let mut console = Console::new(script.as_bytes(), Vec::new());
    menu::run(state, &mut console).await?;
    Ok(String::from_utf8(console.into_output())?)
}

fn memory_state() -> (AppState, InMemoryOrderStore) {
    let store = InMemoryOrderStore::new();
    (AppState::new(Arc::new(store.clone())), store)
}

const INSERT_SAMPLE: &str = "1
1
2
quanau
quan au
XL
10
1
somi
ao so mi
XL
10.5
2
Hanoi
";

#[tokio::test]
async fn inserts_and_displays_an_order() -> anyhow::Result<()> {
    let (state, store) = memory_state();
    let output = run_script(&state, &format!("{INSERT_SAMPLE}4\n5\n7\n")).await?;

    assert!(output.contains("Order inserted successfully!"));
    assert!(output.contains("1\tquan au\t10.00\t1\t10.00\n"));
    assert!(output.contains("1\tao so mi\t10.50\t2\t21.00\n"));
    assert!(output.contains("Total amount: 31.0\n"));
    assert!(output.ends_with("Exiting...\n"));
    assert_eq!(store.len()?, 1);
    Ok(())
}

#[tokio::test]
async fn updates_deletes_and_counts() -> anyhow::Result<()> {
    let (state, store) = memory_state();
    let script = format!(
        "{INSERT_SAMPLE}6\nquanau\n2\n1\nHo Chi Minh City\n3\n1\n6\nquanau\n7\n"
    );
    let output = run_script(&state, &script).await?;

    assert!(output.contains("Total quantity for product_id 'quanau': 1\n"));
    assert!(output.contains("Delivery address updated successfully!"));
    assert!(output.contains("Order deleted successfully!"));
    assert_eq!(output.matches("Total quantity for product_id").count(), 1);
    assert!(store.is_empty()?);
    Ok(())
}

#[tokio::test]
async fn empty_collection_prints_no_total() -> anyhow::Result<()> {
    let (state, _) = memory_state();
    let output = run_script(&state, "5\n6\nnothing\n7\n").await?;

    assert!(!output.contains("Total amount"));
    assert!(!output.contains("Total quantity"));
    Ok(())
}

#[tokio::test]
async fn rejects_bad_choices_and_keeps_going() -> anyhow::Result<()> {
    let (state, store) = memory_state();
    let output = run_script(&state, "9\nabc\n3\nxyz\n7\n").await?;

    assert!(output.contains("Invalid option. Please try again."));
    assert!(output.contains("Invalid input: 'abc' is not a number"));
    assert!(output.contains("Invalid input: 'xyz'"));
    assert_eq!(output.matches("Order Management System").count(), 4);
    assert!(store.is_empty()?);
    Ok(())
}

#[tokio::test]
async fn end_of_input_exits_cleanly() -> anyhow::Result<()> {
    let (state, _) = memory_state();
    let output = run_script(&state, "4\n").await?;
    assert!(output.ends_with("Exiting...\n"));
    Ok(())
}

#[tokio::test]
async fn huge_product_count_does_not_end_the_menu() -> anyhow::Result<()> {
    let (state, store) = memory_state();
    let output = run_script(&state, "1\n1\n99999999999999999\n7\n").await?;

    assert!(output.contains("Invalid input: unexpected end of input"));
    assert!(output.ends_with("Exiting...\n"));
    assert!(store.is_empty()?);
    Ok(())
}

#[tokio::test]
async fn non_integer_quantities_report_a_quantity_error() -> anyhow::Result<()> {
    let (state, store) = memory_state();
    store
        .insert_one(doc! {
            "orderid": 1,
            "products": [ { "product_id": "x", "product_name": "X", "price": 1.0, "quantity": 2.0 } ],
        })
        .await?;

    let output = run_script(&state, "6\nx\n7\n").await?;
    assert!(output.contains("Unexpected data type for total quantity."));
    assert!(!output.contains("total amount"));
    Ok(())
}
