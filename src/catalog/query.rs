//! The catalog query engine.
//!
//! Every evaluation starts again from the full snapshot: facets are extracted,
//! products are filtered, sorted, and finally cut into a page. Nothing here holds
//! state between calls.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::{Error, Product};

/// Sentinel facet value meaning "no filter".
pub const ALL: &str = "All";
/// Bucket for products with no subcategory or color.
pub const OTHER: &str = "Other";

/// A facet selection: everything, or one concrete value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Self::from(value.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &str) -> bool {
        self.matches_optional(Some(value))
    }

    /// A concrete selection never matches a missing value.
    pub fn matches_optional(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(value) => value,
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Only(value)
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Selection> for String {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::All => ALL.to_string(),
            Selection::Only(value) => value,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Snapshot order.
    #[default]
    Featured,
    Newest,
    PriceLow,
    PriceHigh,
}

impl SortMode {
    pub const ALL_MODES: [SortMode; 4] = [
        SortMode::Featured,
        SortMode::Newest,
        SortMode::PriceLow,
        SortMode::PriceHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Featured => "featured",
            SortMode::Newest => "newest",
            SortMode::PriceLow => "price-low",
            SortMode::PriceHigh => "price-high",
        }
    }
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL_MODES
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::InvalidValue(format!("unknown sort mode {:?}", s)))
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The filter/sort/page selection of one catalog view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQueryConfig {
    pub category: Selection,
    pub subcategory: Selection,
    pub color: Selection,
    pub sort: SortMode,
    /// 1-indexed; 0 is read as 1.
    pub page: u32,
    pub page_size: NonZeroUsize,
}

impl Default for CatalogQueryConfig {
    fn default() -> Self {
        Self {
            category: Selection::All,
            subcategory: Selection::All,
            color: Selection::All,
            sort: SortMode::Featured,
            page: 1,
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl CatalogQueryConfig {
    pub fn with_page_size(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

/// Selectable values per facet, each list starting with [`ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQueryResult<'a> {
    /// Products on the requested page.
    pub items: Vec<&'a Product>,
    pub total_matches: usize,
    /// At least 1, even with no matches.
    pub total_pages: usize,
    pub page: u32,
    /// Drawn from the whole snapshot, not the filtered set.
    pub facets: FacetOptions,
}

impl CatalogQueryResult<'_> {
    /// No product matched the filters; callers show the empty state instead of pages.
    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }

    /// Whether page controls are worth showing.
    pub fn has_pagination(&self) -> bool {
        self.total_pages > 1
    }
}

fn subcategory_of(product: &Product) -> &str {
    product.subcategory.as_deref().unwrap_or(OTHER)
}

fn color_of(product: &Product) -> &str {
    product.color.as_deref().unwrap_or(OTHER)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(ALL.to_string())
        .chain(
            values
                .filter(|value| seen.insert(*value))
                .map(str::to_string),
        )
        .collect()
}

/// Distinct facet values in first-seen order.
pub fn extract_facets(products: &[Product]) -> FacetOptions {
    FacetOptions {
        categories: distinct(products.iter().map(|p| p.category.as_str())),
        subcategories: distinct(products.iter().map(subcategory_of)),
        colors: distinct(products.iter().map(color_of)),
    }
}

/// Products matching every facet selection, in snapshot order.
///
/// The [`OTHER`] bucket exists only in the facet lists; a product without a
/// subcategory or color is matched by `All` alone.
pub fn filter<'a>(products: &'a [Product], config: &CatalogQueryConfig) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| config.category.matches(&p.category))
        .filter(|p| config.subcategory.matches_optional(p.subcategory.as_deref()))
        .filter(|p| config.color.matches_optional(p.color.as_deref()))
        .collect()
}

/// Stable sort; ties keep their incoming order.
pub fn sort(items: &mut [&Product], mode: SortMode) {
    match mode {
        SortMode::Featured => {}
        SortMode::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::PriceLow => items.sort_by_key(|p| p.price),
        SortMode::PriceHigh => items.sort_by(|a, b| b.price.cmp(&a.price)),
    }
}

pub fn total_pages(total_matches: usize, page_size: NonZeroUsize) -> usize {
    total_matches.div_ceil(page_size.get()).max(1)
}

/// The `page`-th window of `items`; empty past the end.
pub fn page_slice<T>(items: &[T], page: u32, page_size: NonZeroUsize) -> &[T] {
    let index = usize::try_from(page.max(1) - 1).unwrap_or(usize::MAX);
    let start = index.saturating_mul(page_size.get());
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size.get()).min(items.len());
    &items[start..end]
}

/// Runs facet extraction, filtering, sorting and pagination over `products`.
pub fn run_query<'a>(products: &'a [Product], config: &CatalogQueryConfig) -> CatalogQueryResult<'a> {
    let facets = extract_facets(products);
    let mut matches = filter(products, config);
    sort(&mut matches, config.sort);

    let total_matches = matches.len();
    CatalogQueryResult {
        items: page_slice(&matches, config.page, config.page_size).to_vec(),
        total_matches,
        total_pages: total_pages(total_matches, config.page_size),
        page: config.page.max(1),
        facets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crate::{Money, ProductId};

    fn product(id: i32, category: &str, price: u64, subcategory: Option<&str>, color: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {}", id),
            description: String::new(),
            price: Money::from_cents(price),
            image: String::new(),
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
            color: color.map(str::to_string),
            gender: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i64::from(id)),
        }
    }

    fn men_and_women() -> Vec<Product> {
        vec![
            product(1, "Men", 15000, Some("Shoes"), Some("Red")),
            product(2, "Men", 11000, Some("Shoes"), Some("White")),
            product(3, "Women", 15500, Some("Shoes"), Some("Grey")),
            product(4, "Men", 4500, Some("Clothing"), Some("Blue")),
            product(5, "Women", 18000, Some("Shoes"), Some("Blue")),
            product(6, "Men", 12000, None, None),
        ]
    }

    fn ids(items: &[&Product]) -> Vec<i32> {
        items.iter().map(|p| p.id.as_i32()).collect()
    }

    fn page_size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_category_filter_keeps_full_facets() {
        let products = men_and_women();
        let config = CatalogQueryConfig {
            category: Selection::only("Women"),
            ..CatalogQueryConfig::default()
        };

        let result = run_query(&products, &config);
        assert_eq!(result.total_matches, 2);
        assert_eq!(ids(&result.items), vec![3, 5]);
        assert_eq!(result.facets.categories, vec!["All", "Men", "Women"]);
    }

    #[test]
    fn test_facets_bucket_missing_values_as_other() {
        let facets = extract_facets(&men_and_women());
        assert_eq!(facets.subcategories, vec!["All", "Shoes", "Clothing", "Other"]);
        assert_eq!(facets.colors, vec!["All", "Red", "White", "Grey", "Blue", "Other"]);
    }

    #[test]
    fn test_facets_of_empty_catalog_are_just_all() {
        let facets = extract_facets(&[]);
        assert_eq!(facets.categories, vec!["All"]);
        assert_eq!(facets.subcategories, vec!["All"]);
        assert_eq!(facets.colors, vec!["All"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let products = men_and_women();
        let config = CatalogQueryConfig {
            category: Selection::only("Men"),
            subcategory: Selection::only("Shoes"),
            color: Selection::only("White"),
            ..CatalogQueryConfig::default()
        };
        assert_eq!(ids(&filter(&products, &config)), vec![2]);

        let config = CatalogQueryConfig {
            category: Selection::only("Women"),
            color: Selection::only("Red"),
            ..CatalogQueryConfig::default()
        };
        assert!(filter(&products, &config).is_empty());
    }

    #[test]
    fn test_other_selection_is_literal() {
        let products = men_and_women();
        let config = CatalogQueryConfig {
            color: Selection::only(OTHER),
            ..CatalogQueryConfig::default()
        };
        assert!(filter(&products, &config).is_empty());

        let products = vec![
            product(1, "Men", 100, None, None),
            product(2, "Men", 100, Some("Shoes"), None),
            product(3, "Men", 100, Some(OTHER), None),
        ];
        let config = CatalogQueryConfig {
            subcategory: Selection::only(OTHER),
            ..CatalogQueryConfig::default()
        };
        assert_eq!(ids(&filter(&products, &config)), vec![3]);
        assert_eq!(ids(&filter(&products, &CatalogQueryConfig::default())), vec![1, 2, 3]);
    }

    #[test]
    fn test_price_low_sort_is_deterministic() {
        let products = vec![
            product(1, "Men", 15000, None, None),
            product(2, "Men", 11000, None, None),
            product(3, "Men", 18000, None, None),
        ];
        let config = CatalogQueryConfig {
            sort: SortMode::PriceLow,
            ..CatalogQueryConfig::default()
        };

        let first = run_query(&products, &config);
        let prices: Vec<u64> = first.items.iter().map(|p| p.price.cents()).collect();
        assert_eq!(prices, vec![11000, 15000, 18000]);
        assert_eq!(run_query(&products, &config), first);
    }

    #[test]
    fn test_sorts_are_stable_on_ties() {
        let products = vec![
            product(1, "Men", 5000, None, None),
            product(2, "Men", 9000, None, None),
            product(3, "Men", 5000, None, None),
            product(4, "Men", 9000, None, None),
        ];
        let mut items: Vec<&Product> = products.iter().collect();
        sort(&mut items, SortMode::PriceHigh);
        assert_eq!(ids(&items), vec![2, 4, 1, 3]);

        let mut items: Vec<&Product> = products.iter().collect();
        sort(&mut items, SortMode::PriceLow);
        assert_eq!(ids(&items), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_newest_and_featured_order() {
        let products = men_and_women();
        let mut items: Vec<&Product> = products.iter().collect();
        sort(&mut items, SortMode::Newest);
        assert_eq!(ids(&items), vec![6, 5, 4, 3, 2, 1]);

        let mut items: Vec<&Product> = products.iter().collect();
        sort(&mut items, SortMode::Featured);
        assert_eq!(ids(&items), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_pagination_of_thirteen() {
        let products: Vec<Product> = (1..=13).map(|id| product(id, "Men", 100, None, None)).collect();
        let mut config = CatalogQueryConfig::with_page_size(page_size(6));

        let page1 = run_query(&products, &config);
        assert_eq!(page1.items.len(), 6);
        assert_eq!(page1.total_pages, 3);
        assert!(page1.has_pagination());

        config.page = 3;
        let page3 = run_query(&products, &config);
        assert_eq!(ids(&page3.items), vec![13]);

        config.page = 4;
        let past_end = run_query(&products, &config);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_matches, 13);
    }

    #[test]
    fn test_empty_result_reports_one_page() {
        let products = men_and_women();
        let config = CatalogQueryConfig {
            category: Selection::only("Kids"),
            ..CatalogQueryConfig::default()
        };

        let result = run_query(&products, &config);
        assert!(result.is_empty());
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_pagination());
    }

    #[test]
    fn test_page_zero_reads_as_first_page() {
        let items = [1, 2, 3];
        assert_eq!(page_slice(&items, 0, page_size(2)), &[1, 2]);
        assert_eq!(page_slice(&items, 2, page_size(2)), &[3]);
        assert!(page_slice(&items, u32::MAX, page_size(2)).is_empty());
    }

    #[test]
    fn test_sort_mode_strings() {
        for mode in SortMode::ALL_MODES {
            assert_eq!(mode.as_str().parse::<SortMode>().unwrap(), mode);
        }
        assert!("cheapest".parse::<SortMode>().is_err());
        assert_eq!(serde_json::to_string(&SortMode::PriceHigh).unwrap(), "\"price-high\"");
    }

    #[test]
    fn test_selection_all_sentinel() {
        assert_eq!(Selection::from("All"), Selection::All);
        assert_eq!(Selection::from("Men"), Selection::Only("Men".to_string()));
        assert_eq!(serde_json::to_string(&Selection::All).unwrap(), "\"All\"");
        let parsed: Selection = serde_json::from_str("\"Women\"").unwrap();
        assert_eq!(parsed.as_str(), "Women");
    }
}
