//! Catalog records and the filtering behind the shop, search and suggestion
//! endpoints.
//!
//! The catalog is small enough to hold in memory, so every query here is a
//! pure function over slices loaded in bulk. Input order is "catalog order"
//! and all sorts are stable with respect to it.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::cart::ItemSnapshot;
use crate::types::{CategoryId, ProductId, savings_percent};

/// A product as sold in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub images: Vec<String>,
    /// Category slug.
    pub category: String,
    /// Subcategory slug.
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub features: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub in_stock: bool,
    /// Average rating between 0 and 5.
    pub rating: Option<Decimal>,
    pub review_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// First image, or an empty string for products without one.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }

    /// Whole-percent saving when the product has a real discount.
    #[must_use]
    pub fn savings_percent(&self) -> Option<u32> {
        self.discount_price
            .and_then(|discount| savings_percent(self.price, discount))
    }

    /// The fields a cart, saved or wishlist row copies from the product.
    ///
    /// Rows carry the list price, not the discount price.
    #[must_use]
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.primary_image().to_owned(),
        }
    }

    fn whole_star_rating(&self) -> Option<u8> {
        self.rating.and_then(|r| r.floor().to_u8())
    }

    fn name_matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// A product category. Categories with a parent are subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<CategoryId>,
    pub image: Option<String>,
    pub product_count: Option<i32>,
}

impl Category {
    #[must_use]
    pub const fn is_subcategory(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Error for unrecognised sort keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order: {0}")]
pub struct UnknownSort(pub String);

/// Sort orders offered on the shop page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShopSort {
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Rating,
}

impl FromStr for ShopSort {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            other => Err(UnknownSort(other.to_owned())),
        }
    }
}

/// Sort orders offered on the search page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchSort {
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Rating,
    Newest,
}

impl FromStr for SearchSort {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            "newest" => Ok(Self::Newest),
            other => Err(UnknownSort(other.to_owned())),
        }
    }
}

/// Shop page filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopQuery {
    /// Free text matched against name and description.
    pub q: Option<String>,
    /// Category slugs; a product matches any of them.
    pub categories: Vec<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// A product must carry every one of these.
    pub features: Vec<String>,
    pub sort_by: ShopSort,
}

impl ShopQuery {
    pub const DEFAULT_MAX_PRICE: Decimal = Decimal::ONE_THOUSAND;
}

impl Default for ShopQuery {
    fn default() -> Self {
        Self {
            q: None,
            categories: Vec::new(),
            min_price: Decimal::ZERO,
            max_price: Self::DEFAULT_MAX_PRICE,
            features: Vec::new(),
            sort_by: ShopSort::default(),
        }
    }
}

/// Search page filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub q: String,
    /// Inclusive `(min, max)` price bounds.
    pub price_range: Option<(Decimal, Decimal)>,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    /// Whole-star ratings; a product rated 4.6 matches `4`.
    pub ratings: Vec<u8>,
    pub in_stock_only: bool,
    pub sort_by: SearchSort,
}

/// Parse a `"min,max"` price range. Anything malformed is ignored.
///
/// ```
/// use lumina_core::catalog::parse_price_range;
///
/// assert!(parse_price_range("10,50").is_some());
/// assert!(parse_price_range("10").is_none());
/// ```
#[must_use]
pub fn parse_price_range(raw: &str) -> Option<(Decimal, Decimal)> {
    let (min, max) = raw.split_once(',')?;
    let min = min.trim().parse().ok()?;
    let max = max.trim().parse().ok()?;
    Some((min, max))
}

/// Products visible to shoppers.
pub fn active_products(products: &[Product]) -> impl Iterator<Item = &Product> {
    products.iter().filter(|p| p.is_active)
}

/// Categories without a parent.
pub fn top_level_categories(categories: &[Category]) -> impl Iterator<Item = &Category> {
    categories.iter().filter(|c| !c.is_subcategory())
}

/// Active products filed under `slug`, as category or subcategory.
pub fn products_in_category<'a>(
    products: &'a [Product],
    slug: &'a str,
) -> impl Iterator<Item = &'a Product> {
    active_products(products)
        .filter(move |p| p.category == slug || p.subcategory.as_deref() == Some(slug))
}

/// Highest rating first, unrated products last.
fn sort_by_rating(products: &mut [&Product]) {
    products.sort_by(|a, b| match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Apply the shop page filters and sort.
#[must_use]
pub fn shop<'a>(products: &'a [Product], query: &ShopQuery) -> Vec<&'a Product> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<&Product> = active_products(products)
        .filter(|p| query.categories.is_empty() || query.categories.contains(&p.category))
        .filter(|p| {
            needle.as_deref().is_none_or(|needle| {
                p.name_matches(needle) || p.description.to_lowercase().contains(needle)
            })
        })
        .filter(|p| p.price >= query.min_price && p.price <= query.max_price)
        .filter(|p| query.features.iter().all(|f| p.features.contains(f)))
        .collect();

    match query.sort_by {
        ShopSort::Featured => matches.sort_by_key(|p| !p.is_featured),
        ShopSort::PriceLow => matches.sort_by_key(|p| p.price),
        ShopSort::PriceHigh => matches.sort_by_key(|p| Reverse(p.price)),
        ShopSort::Rating => sort_by_rating(&mut matches),
    }
    matches
}

/// Search results.
#[derive(Debug, Serialize)]
pub struct SearchResults<'a> {
    pub products: Vec<&'a Product>,
    pub categories: Vec<&'a Category>,
}

/// Apply the search page query, filters and sort.
///
/// Relevance puts exact name matches first, then names starting with the
/// query, then the rest, each group in catalog order.
#[must_use]
pub fn search<'a>(
    products: &'a [Product],
    categories: &'a [Category],
    query: &SearchQuery,
) -> SearchResults<'a> {
    let needle = query.q.trim().to_lowercase();

    let mut found: Vec<&Product> = active_products(products)
        .filter(|p| p.name_matches(&needle))
        .filter(|p| {
            query
                .price_range
                .is_none_or(|(min, max)| p.price >= min && p.price <= max)
        })
        .filter(|p| query.categories.is_empty() || query.categories.contains(&p.category))
        .filter(|p| {
            query.brands.is_empty()
                || p.brand.as_ref().is_some_and(|b| query.brands.contains(b))
        })
        .filter(|p| {
            query.ratings.is_empty()
                || p.whole_star_rating()
                    .is_some_and(|r| query.ratings.contains(&r))
        })
        .filter(|p| !query.in_stock_only || p.in_stock)
        .collect();

    match query.sort_by {
        SearchSort::Relevance => found.sort_by_key(|p| {
            let name = p.name.to_lowercase();
            if name == needle {
                0
            } else if name.starts_with(&needle) {
                1
            } else {
                2
            }
        }),
        SearchSort::PriceLow => found.sort_by_key(|p| p.price),
        SearchSort::PriceHigh => found.sort_by_key(|p| Reverse(p.price)),
        SearchSort::Rating => sort_by_rating(&mut found),
        SearchSort::Newest => found.sort_by_key(|p| Reverse(p.created_at)),
    }

    let categories = categories
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect();

    SearchResults {
        products: found,
        categories,
    }
}

/// What a suggestion points at. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Product,
    Category,
    Subcategory,
}

/// One entry in the search-as-you-type dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub name: String,
    pub url: String,
}

/// Default number of suggestions shown.
pub const SUGGESTION_LIMIT: usize = 5;

/// Suggestions for a partial query, products first, each kind by name.
#[must_use]
pub fn suggest(
    products: &[Product],
    categories: &[Category],
    q: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let needle = q.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let products = active_products(products)
        .filter(|p| p.name_matches(&needle))
        .map(|p| Suggestion {
            kind: SuggestionKind::Product,
            name: p.name.clone(),
            url: format!("/products/{}", p.id),
        });

    let categories = categories
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .map(|c| Suggestion {
            kind: if c.is_subcategory() {
                SuggestionKind::Subcategory
            } else {
                SuggestionKind::Category
            },
            name: c.name.clone(),
            url: format!("/categories/{}", c.slug),
        });

    let mut suggestions: Vec<Suggestion> = products.chain(categories).collect();
    suggestions.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    suggestions.truncate(limit);
    suggestions
}

/// Options for the shop filter panel.
#[derive(Debug, Serialize)]
pub struct FilterFacets<'a> {
    pub categories: Vec<&'a Category>,
    /// Distinct features across the active catalog, alphabetical.
    pub features: Vec<&'a str>,
    /// Distinct brands across the active catalog, alphabetical.
    pub brands: Vec<&'a str>,
}

impl<'a> FilterFacets<'a> {
    #[must_use]
    pub fn collect(products: &'a [Product], categories: &'a [Category]) -> Self {
        let mut features = BTreeSet::new();
        let mut brands = BTreeSet::new();
        for product in active_products(products) {
            features.extend(product.features.iter().map(String::as_str));
            brands.extend(product.brand.as_deref());
        }
        Self {
            categories: top_level_categories(categories).collect(),
            features: features.into_iter().collect(),
            brands: brands.into_iter().collect(),
        }
    }
}
