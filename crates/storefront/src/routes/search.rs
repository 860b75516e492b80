//! Search and search-as-you-type route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use lumina_core::catalog::{self, SUGGESTION_LIMIT, SearchQuery, SearchResults, Suggestion};

use crate::error::Result;
use crate::routes::query::QueryParams;
use crate::state::AppState;

/// Search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse<'a> {
    pub query: &'a SearchQuery,
    #[serde(flatten)]
    pub results: SearchResults<'a>,
    pub total: usize,
}

/// Build search filters from the query string.
fn search_query(params: &QueryParams) -> Result<SearchQuery> {
    Ok(SearchQuery {
        q: params.first("q").unwrap_or_default().to_owned(),
        price_range: params
            .first("price_range")
            .and_then(catalog::parse_price_range),
        categories: params.list("categories"),
        brands: params.list("brands"),
        ratings: params.parse_list("ratings")?,
        in_stock_only: params.flag("availability"),
        sort_by: params.parse("sort_by")?.unwrap_or_default(),
    })
}

/// Full search with filters.
#[instrument(skip(state, params))]
pub async fn search(State(state): State<AppState>, params: QueryParams) -> Result<Response> {
    let query = search_query(&params)?;
    let products = state.catalog().products().await?;
    let categories = state.catalog().categories().await?;

    let results = catalog::search(&products, &categories, &query);
    let total = results.products.len();

    Ok(Json(SearchResponse {
        query: &query,
        results,
        total,
    })
    .into_response())
}

/// Typed suggestions for a partial query.
#[instrument(skip(state, params))]
pub async fn suggest(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<Vec<Suggestion>>> {
    let q = params.first("q").unwrap_or_default();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let products = state.catalog().products().await?;
    let categories = state.catalog().categories().await?;
    Ok(Json(catalog::suggest(
        &products,
        &categories,
        q,
        SUGGESTION_LIMIT,
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lumina_core::catalog::SearchSort;
    use rust_decimal::Decimal;

    use super::*;

    fn params(query: &str) -> QueryParams {
        let uri: axum::http::Uri = format!("/search?{query}").parse().unwrap();
        let axum::extract::Query(pairs) =
            axum::extract::Query::<Vec<(String, String)>>::try_from_uri(&uri).unwrap();
        QueryParams::from_pairs(pairs)
    }

    #[test]
    fn test_search_query_from_params() {
        let query = search_query(&params(
            "q=head&price_range=10,200&brands=Sonic&brands=Boom&ratings=4,5&availability=true&sort_by=newest",
        ))
        .unwrap();
        assert_eq!(query.q, "head");
        assert_eq!(
            query.price_range,
            Some((Decimal::from(10), Decimal::from(200)))
        );
        assert_eq!(query.brands, vec!["Sonic", "Boom"]);
        assert_eq!(query.ratings, vec![4, 5]);
        assert!(query.in_stock_only);
        assert_eq!(query.sort_by, SearchSort::Newest);
    }

    #[test]
    fn test_malformed_price_range_is_ignored() {
        let query = search_query(&params("q=x&price_range=cheap")).unwrap();
        assert_eq!(query.price_range, None);
        assert_eq!(query.sort_by, SearchSort::Relevance);
    }
}
