//! # Sales Report Aggregator
//!
//! Re-derives summary statistics and per-product breakdowns from the
//! raw, append-only sale history. Nothing here is persisted: every
//! report is recomputed from the sales passed in, so it is always
//! consistent with the history.
//!
//! ## Date semantics
//! Filters compare calendar dates in the terminal's local calendar,
//! inclusive on both ends: a sale at `2024-01-05T23:59:59` local time
//! matches `to = 2024-01-05`.
//!
//! ## Group attribution
//! Sale lines carry product *names*, not references. The breakdown
//! therefore attributes each name to the product's **current** group: a
//! product renamed or regrouped after the sale reports under its
//! current group. This is intentional, not a bug; it is the price of
//! keeping history immune to catalog deletions.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::money::Money;
use crate::types::{Group, PaymentMethod, Product, Sale};

/// Filter criteria for a report run. All criteria are optional;
/// an empty filter selects the whole history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Inclusive lower bound, local calendar date.
    pub from: Option<NaiveDate>,

    /// Inclusive upper bound, local calendar date.
    pub to: Option<NaiveDate>,

    /// Payment-method filter. Empty means "no filter". Non-empty keeps
    /// sales where at least one listed method was tendered with an
    /// amount > 0 (logical OR, not AND).
    pub methods: Vec<PaymentMethod>,

    /// Restricts the per-product breakdown to one current group.
    pub group_id: Option<String>,
}

/// Headline numbers over the filtered sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub transactions: u64,
    pub items: i64,
    /// Sum of line totals across filtered sales (pre-discount revenue,
    /// matching the line-level figures shown next to it).
    pub revenue: Money,
}

/// One row of the per-product breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Money,
    /// Current group of the product carrying this name, if the product
    /// still exists in the catalog and is grouped.
    pub group_id: Option<String>,
    pub group_name: Option<String>,
}

/// One flat line of the filtered history, for tabular display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLineRow {
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub quantity: i64,
    pub total: Money,
}

fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

fn matches(sale: &Sale, filter: &ReportFilter) -> bool {
    let date = local_date(sale.created_at);
    if let Some(from) = filter.from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = filter.to {
        if date > to {
            return false;
        }
    }

    if !filter.methods.is_empty() {
        let any = filter
            .methods
            .iter()
            .any(|m| sale.payments.amount(*m).is_positive());
        if !any {
            return false;
        }
    }

    true
}

/// Sales passing the date and payment-method criteria, in history order.
pub fn filter_sales<'a>(sales: &'a [Sale], filter: &ReportFilter) -> Vec<&'a Sale> {
    sales.iter().filter(|s| matches(s, filter)).collect()
}

/// Transaction count, item quantity and revenue over the filtered set.
/// An empty match yields all zeros rather than an error.
pub fn summarize(sales: &[Sale], filter: &ReportFilter) -> ReportSummary {
    let mut summary = ReportSummary::default();
    for sale in filter_sales(sales, filter) {
        summary.transactions += 1;
        summary.items += sale.item_quantity();
        summary.revenue += sale.line_revenue();
    }
    summary
}

/// Flat per-line listing of the filtered sales.
pub fn sale_lines(sales: &[Sale], filter: &ReportFilter) -> Vec<SaleLineRow> {
    filter_sales(sales, filter)
        .into_iter()
        .flat_map(|sale| {
            sale.items.iter().map(|line| SaleLineRow {
                created_at: sale.created_at,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                total: line.line_total,
            })
        })
        .collect()
}

/// Per-product breakdown of the filtered sales.
///
/// Lines are grouped by product name, summing quantity and revenue,
/// then attributed to the current group via the catalog snapshot and
/// optionally restricted by `filter.group_id`. Rows are sorted by name,
/// case-insensitively.
pub fn product_breakdown(
    sales: &[Sale],
    products: &[Product],
    groups: &[Group],
    filter: &ReportFilter,
) -> Vec<BreakdownRow> {
    let group_names: HashMap<&str, &str> = groups
        .iter()
        .map(|g| (g.id.as_str(), g.name.as_str()))
        .collect();

    let mut by_name: HashMap<&str, (i64, Money)> = HashMap::new();
    for sale in filter_sales(sales, filter) {
        for line in &sale.items {
            let entry = by_name
                .entry(line.product_name.as_str())
                .or_insert((0, Money::zero()));
            entry.0 += line.quantity;
            entry.1 += line.line_total;
        }
    }

    let mut rows: Vec<BreakdownRow> = by_name
        .into_iter()
        .filter(|(_, (qty, _))| *qty > 0)
        .map(|(name, (quantity, revenue))| {
            // Current-catalog lookup by name; a deleted product simply
            // has no group attribution.
            let group_id = products
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.group_id.clone());
            let group_name = group_id
                .as_deref()
                .and_then(|id| group_names.get(id))
                .map(|n| n.to_string());
            BreakdownRow {
                product_name: name.to_string(),
                quantity,
                revenue,
                group_id,
                group_name,
            }
        })
        .filter(|row| match &filter.group_id {
            Some(wanted) => row.group_id.as_deref() == Some(wanted.as_str()),
            None => true,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.product_name
            .to_lowercase()
            .cmp(&b.product_name.to_lowercase())
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    rows
}
