//! Product and category reads.

use serde_json::json;
use tracing::instrument;

use super::Result;
use crate::schema::{Category, CategoryProduct, Collection, Product, ResourceApi};

/// Default number of related products shown on a product page.
pub const RELATED_PRODUCTS_LIMIT: u32 = 5;

/// Get an active product by ID or slug.
///
/// # Errors
///
/// Returns an error if the API call fails.
#[instrument(skip(api))]
pub async fn get_product(api: &dyn ResourceApi, id_or_slug: &str) -> Result<Option<Product>> {
    Ok(api
        .get("/products/{id}", json!({"id": id_or_slug, "active": true}))
        .await?
        .into_record()?)
}

/// Get active products other than `product_id`.
///
/// `product_id` may be an ID or a slug; both are excluded. With a category,
/// results are limited to it and follow the category's sort order.
///
/// # Errors
///
/// Returns an error if an API call fails.
#[instrument(skip(api))]
pub async fn get_related_products(
    api: &dyn ResourceApi,
    product_id: &str,
    category_id: Option<&str>,
    limit: u32,
) -> Result<Collection<Product>> {
    let mut query = json!({
        "id": {"$ne": product_id},
        "slug": {"$ne": product_id},
        "active": true,
        "limit": limit,
    });

    if let Some(category_id) = category_id {
        let category = api
            .get("/categories/{id}", json!({"id": category_id}))
            .await?
            .into_record::<Category>()?;

        if let (Some(category), Some(query)) = (category, query.as_object_mut()) {
            query.insert("category_index.id".to_owned(), json!(category.id));
            query.insert(
                "sort".to_owned(),
                json!(format!("category_index.sort.{} ASC", category.id)),
            );
        }
    }

    Ok(api
        .get("/products", query)
        .await?
        .into_record()?
        .unwrap_or_default())
}

/// Get the products in a category, each with its product record expanded.
///
/// # Errors
///
/// Returns an error if the API call fails.
#[instrument(skip(api))]
pub async fn get_category_products(
    api: &dyn ResourceApi,
    id: &str,
) -> Result<Collection<CategoryProduct>> {
    Ok(api
        .get(
            "/categories/{id}/products",
            json!({"id": id, "expand": "product"}),
        )
        .await?
        .into_record()?
        .unwrap_or_default())
}
