//! The numbered console menu in front of the order service.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub mod console;
pub mod orders;

pub use console::Console;

pub const MENU: &str = "\nOrder Management System
1. Insert Order
2. Update Delivery Address
3. Delete Order
4. Display All Orders
5. Calculate Total Amount
6. Count Product By ID
7. Exit
Select an option: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    InsertOrder,
    UpdateDeliveryAddress,
    DeleteOrder,
    DisplayOrders,
    CalculateTotalAmount,
    CountProductById,
    Exit,
}

impl MenuChoice {
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(MenuChoice::InsertOrder),
            2 => Some(MenuChoice::UpdateDeliveryAddress),
            3 => Some(MenuChoice::DeleteOrder),
            4 => Some(MenuChoice::DisplayOrders),
            5 => Some(MenuChoice::CalculateTotalAmount),
            6 => Some(MenuChoice::CountProductById),
            7 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Runs the menu until the operator exits or input ends.
///
/// Failures of a single operation are reported and the loop carries on;
/// only console I/O errors end it.
pub async fn run<R, W>(state: &AppState, console: &mut Console<R, W>) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        console.write(MENU).await?;
        let Some(line) = console.read_line().await? else {
            console.write_line("\nExiting...").await?;
            return Ok(());
        };
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }

        let choice = match answer.parse::<i64>() {
            Ok(number) => MenuChoice::from_number(number),
            Err(_) => {
                console
                    .write_line(format!("Invalid input: '{answer}' is not a number"))
                    .await?;
                continue;
            }
        };
        let Some(choice) = choice else {
            console.write_line("Invalid option. Please try again.").await?;
            continue;
        };

        tracing::debug!(?choice, "menu option selected");
        let outcome = match choice {
            MenuChoice::InsertOrder => orders::insert_order(state, console).await,
            MenuChoice::UpdateDeliveryAddress => {
                orders::update_delivery_address(state, console).await
            }
            MenuChoice::DeleteOrder => orders::delete_order(state, console).await,
            MenuChoice::DisplayOrders => orders::display_orders(state, console).await,
            MenuChoice::CalculateTotalAmount => {
                orders::calculate_total_amount(state, console).await
            }
            MenuChoice::CountProductById => orders::count_product_by_id(state, console).await,
            MenuChoice::Exit => {
                console.write_line("Exiting...").await?;
                return Ok(());
            }
        };

        match outcome {
            Ok(()) => {}
            Err(AppError::Io(err)) => return Err(AppError::Io(err)),
            Err(AppError::UnexpectedAggregateType(_)) => {
                console
                    .write_line("Unexpected data type for total amount.")
                    .await?;
            }
            Err(AppError::UnexpectedQuantityType(_)) => {
                console
                    .write_line("Unexpected data type for total quantity.")
                    .await?;
            }
            Err(err @ AppError::BadRequest(_)) => console.write_line(&err).await?,
            Err(err) => {
                tracing::error!(error = %err, ?choice, "operation failed");
                console.write_line(format!("Error: {err}")).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_menu_numbers() {
        assert_eq!(MenuChoice::from_number(1), Some(MenuChoice::InsertOrder));
        assert_eq!(MenuChoice::from_number(6), Some(MenuChoice::CountProductById));
        assert_eq!(MenuChoice::from_number(7), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::from_number(0), None);
        assert_eq!(MenuChoice::from_number(8), None);
    }
}
