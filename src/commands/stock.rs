//! Stock command handlers: intake, sale and lookup.

use crate::args::{AddArgs, SearchArgs, SellArgs};
use crate::commands::{today, with_refreshed_report, Out};
use crate::model::{
    parse_name, parse_optional_price, parse_price, parse_quantity, CommodityStatus, Intake,
    SaleEvent,
};
use crate::{Config, Result};

/// Adds incoming stock to the ledger.
///
/// When a valid `--price` is given a price annotation is written to the sales log with today's
/// date. A price that does not parse is skipped with a warning and the stock is still added.
///
/// # Returns
///
/// On success, returns an `Out` containing:
/// - A message like `Added 5 of Rice`.
/// - The `Intake`, including the new stock on hand.
/// - The refreshed reports as text, unless they could not be read after the change was saved.
///
/// # Errors
///
/// - `InvalidInput` if the name is empty or the quantity is not a whole number.
pub async fn add_stock(config: Config, args: AddArgs) -> Result<Out<Intake>> {
    let name = parse_name(args.name())?;
    let quantity = parse_quantity(args.quantity())?;
    let price = parse_optional_price(args.price());

    let intake = config
        .db()
        .add_stock(&name, quantity, price, today())
        .await?;

    let message = format!("Added {} of {}", intake.added, intake.name);
    Ok(with_refreshed_report(&config, Out::new(message, intake)).await)
}

/// Records a sale of stock on hand.
///
/// # Returns
///
/// On success, returns an `Out` containing:
/// - A message like `Sold 3 of Rice for 75.00`.
/// - The `SaleEvent` that was appended to the sales log.
/// - The refreshed reports as text, unless they could not be read after the sale was saved.
///
/// # Errors
///
/// - `InvalidInput` if the name is empty, the quantity is not a whole number or the price is not
///   a number from zero to `MAX_PRICE`.
/// - `InsufficientStock` if the commodity is unknown or has fewer units than requested. Nothing
///   is changed in that case.
pub async fn sell_stock(config: Config, args: SellArgs) -> Result<Out<SaleEvent>> {
    let name = parse_name(args.name())?;
    let quantity = parse_quantity(args.quantity())?;
    let price = parse_price(args.price())?;

    let sale = config
        .db()
        .sell_stock(&name, quantity, price, today())
        .await?;

    let message = format!(
        "Sold {} of {} for {}",
        sale.quantity_sold, sale.name, sale.total_price
    );
    Ok(with_refreshed_report(&config, Out::new(message, sale)).await)
}

/// Looks up the stock on hand and total quantity sold of one commodity.
///
/// # Errors
///
/// - `InvalidInput` if the name is empty.
pub async fn search(config: Config, args: SearchArgs) -> Result<Out<CommodityStatus>> {
    let name = parse_name(args.name())?;
    let status = config.db().query_commodity(&name).await?;

    let text = match status.in_stock {
        Some(in_stock) => format!(
            "Commodity: {}\nQuantity in Stock: {}\nTotal Quantity Sold: {}",
            status.name, in_stock, status.total_sold
        ),
        None => format!("{} not found in inventory.", status.name),
    };
    let message = match status.in_stock {
        Some(_) => format!("Found {}", status.name),
        None => format!("{} not found", status.name),
    };
    Ok(Out::new(message, status).with_text(text))
}
