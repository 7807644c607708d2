use itertools::Itertools;
use market_card::{format::readable_number, ItemInfo, SaleInfo};

const ROWS: usize = 10;

/// Plain text version of the card: item name and the first listings as a
/// fixed width table.
pub(crate) fn text_report(item: &ItemInfo, sale: &SaleInfo) -> String {
    let listings = sale
        .listings
        .iter()
        .take(ROWS)
        .format_with("\n", |l, f| {
            f(&format_args!(
                "{:<10} {:3} {:<8} {}",
                readable_number(l.price_per_unit),
                l.hq.then_some("✅").unwrap_or_default(),
                readable_number(l.quantity),
                l.world_name.as_deref().unwrap_or_default()
            ))
        })
        .to_string();
    format!(
        "{}\n{:<10} {:3} {:<8} {}\n{}",
        item.name, "price", "hq", "quantity", "world", listings
    )
}
