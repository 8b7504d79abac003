//! Order summary

use std::io;

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    orders::{LineItem, Order, Promotable},
    prices::PriceError,
};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Totals could not be computed.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Writing to the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Human readable breakdown of an order's line items, adjustments and totals.
#[derive(Debug, Clone, Copy)]
pub struct OrderSummary<'a> {
    order: &'a Order,
}

impl<'a> OrderSummary<'a> {
    /// Summarise `order`.
    pub fn new(order: &'a Order) -> Self {
        Self { order }
    }

    /// Render the summary table followed by the subtotal and total lines.
    ///
    /// # Errors
    ///
    /// Returns an error if a total cannot be computed or the output cannot be
    /// written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "Total", "Adjustment", "Amount"]);

        for line_item in self.order.line_items() {
            push_line_item_rows(&mut builder, line_item)?;
        }

        for adjustment in self.order.adjustments() {
            builder.push_record([
                "(order)".to_string(),
                String::new(),
                String::new(),
                String::new(),
                adjustment.label().to_string(),
                adjustment.amount().to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();

        table.with(theme);
        table.modify(Columns::new(1..4), Alignment::right());
        table.modify(Columns::new(5..), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "{table}")?;

        let subtotal = self.order.subtotal_price()?.to_string();
        let adjustments = self.order.adjustments_total()?.to_string();
        let total = self.order.total_price()?.to_string();
        let width = subtotal.len().max(adjustments.len()).max(total.len());

        writeln!(out, " Subtotal:    {subtotal:>width$}")?;
        writeln!(out, " Adjustments: {adjustments:>width$}")?;
        writeln!(out, " Total:       {total:>width$}")?;

        Ok(())
    }
}

fn push_line_item_rows(builder: &mut Builder, line_item: &LineItem) -> Result<(), PriceError> {
    let quantity = Decimal::from(line_item.quantity());

    builder.push_record([
        line_item.title().to_string(),
        line_item.quantity().to_string(),
        line_item.unit_price().to_string(),
        line_item.total_price()?.to_string(),
        String::new(),
        String::new(),
    ]);

    // Line item adjustments are per unit; show what they take off the line.
    for adjustment in line_item.adjustments() {
        builder.push_record([
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            adjustment.label().to_string(),
            adjustment.amount().multiply(quantity)?.to_string(),
        ]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        adjustments::Adjustment,
        orders::{LineItem, StoreUuid},
        prices::Price,
    };

    use super::*;

    #[test]
    fn renders_line_items_adjustments_and_totals() -> TestResult {
        let mut order = Order::new("default", StoreUuid::new_v4(), USD);
        let mut line_item = LineItem::new("Widget", "default", Price::from_minor(1000, USD), 2);

        line_item.add_adjustment(Adjustment::promotion("Half off", Price::from_minor(-500, USD)))?;
        order.add_line_item(line_item)?;
        order.add_adjustment(Adjustment::custom("Goodwill", Price::from_minor(-100, USD)))?;

        let mut out = Vec::new();

        OrderSummary::new(&order).write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Widget"));
        assert!(output.contains("Half off"));
        assert!(output.contains("-10.00 USD"));
        assert!(output.contains("Goodwill"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("20.00 USD"));
        assert!(output.contains("9.00 USD"));

        Ok(())
    }

    #[test]
    fn renders_empty_order() -> TestResult {
        let order = Order::new("default", StoreUuid::new_v4(), USD);
        let mut out = Vec::new();

        OrderSummary::new(&order).write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Total:"));
        assert!(output.contains("0.00 USD"));

        Ok(())
    }
}
