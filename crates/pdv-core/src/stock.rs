//! # Stock View Helpers
//!
//! Pure filtering and ordering over catalog snapshots for the stock
//! screen: name search, group restriction and the below-minimum
//! warning list. The ledger itself (atomic adjustments) lives in the
//! persistence layer; these helpers never mutate anything.

use crate::types::Product;

/// Criteria for a stock listing. All optional; the default shows the
/// whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockFilter {
    /// Case-insensitive substring match on the product name.
    pub name_contains: Option<String>,

    /// Restrict to one group.
    pub group_id: Option<String>,

    /// Keep only products under their restock threshold.
    pub below_minimum_only: bool,
}

/// Filters and sorts a catalog snapshot for display, alphabetically by
/// name (case-insensitive).
pub fn stock_view<'a>(products: &'a [Product], filter: &StockFilter) -> Vec<&'a Product> {
    let needle = filter.name_contains.as_deref().map(str::to_lowercase);

    let mut view: Vec<&Product> = products
        .iter()
        .filter(|p| match &needle {
            Some(n) => p.name.to_lowercase().contains(n),
            None => true,
        })
        .filter(|p| match &filter.group_id {
            Some(g) => p.group_id.as_deref() == Some(g.as_str()),
            None => true,
        })
        .filter(|p| !filter.below_minimum_only || p.below_minimum())
        .collect();

    view.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    view
}

/// Products currently under their restock threshold.
pub fn below_minimum(products: &[Product]) -> Vec<&Product> {
    stock_view(
        products,
        &StockFilter {
            below_minimum_only: true,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, group_id: Option<&str>, min_stock: i64, stock: i64) -> Product {
        Product {
            id: name.to_lowercase(),
            name: name.to_string(),
            price_cents: 100,
            group_id: group_id.map(str::to_string),
            min_stock,
            stock,
        }
    }

    #[test]
    fn test_view_sorted_alphabetically() {
        let products = vec![
            product("banana", None, 0, 10),
            product("Abacaxi", None, 0, 10),
        ];
        let view = stock_view(&products, &StockFilter::default());
        let names: Vec<&str> = view.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Abacaxi", "banana"]);
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let products = vec![
            product("Cafe Torrado", None, 0, 10),
            product("Refrigerante", None, 0, 10),
        ];
        let filter = StockFilter {
            name_contains: Some("CAFE".into()),
            ..Default::default()
        };
        let view = stock_view(&products, &filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "Cafe Torrado");
    }

    #[test]
    fn test_group_and_minimum_filters() {
        let products = vec![
            product("a", Some("g1"), 5, 2),
            product("b", Some("g1"), 5, 8),
            product("c", Some("g2"), 5, 1),
        ];

        let filter = StockFilter {
            group_id: Some("g1".into()),
            below_minimum_only: true,
            ..Default::default()
        };
        let view = stock_view(&products, &filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "a");

        let low = below_minimum(&products);
        assert_eq!(low.len(), 2);
    }
}
