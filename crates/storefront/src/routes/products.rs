//! Product and category route handlers.
//!
//! Catalog reads are not visitor-specific, so they use the shared client
//! without a session and are served from its GET cache.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::schema::{CategoryProduct, Collection, Product};
use crate::services::catalog::{
    RELATED_PRODUCTS_LIMIT, get_category_products, get_product, get_related_products,
};
use crate::state::AppState;

/// Query parameters for the product page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Category the visitor browsed from; related products are drawn from it.
    pub category: Option<String>,
}

/// Product page data.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub product: Product,
    pub related: Collection<Product>,
}

/// Display a product with related products.
///
/// GET /products/{id}
#[instrument(skip(state, query))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductPage>> {
    let api = state.schema();

    let product = get_product(api, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

    let related = get_related_products(
        api,
        &id,
        query.category.as_deref(),
        RELATED_PRODUCTS_LIMIT,
    )
    .await?;

    Ok(Json(ProductPage { product, related }))
}

/// List the products in a category.
///
/// GET /categories/{id}/products
#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collection<CategoryProduct>>> {
    Ok(Json(get_category_products(state.schema(), &id).await?))
}
