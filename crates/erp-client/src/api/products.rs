//! Product management API

use serde::{Deserialize, Serialize};
use serde_json::json;

use common::Page;

use crate::api::to_value;
use crate::error::Result;
use crate::pipeline::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    pub cost_price: f64,
    pub selling_price: f64,
    #[serde(default)]
    pub tax_included_price: Option<f64>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub safety_stock: Option<i64>,
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Create/update payload. Optional fields are omitted from the wire
/// entirely so the backend applies its own defaults.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub sku: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<f64>,
    pub selling_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// List/filter parameters for product queries.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_only: Option<bool>,
}

pub async fn list(client: &ApiClient, query: &ProductQuery) -> Result<Page<Product>> {
    client.get("/products", Some(to_value(query)?)).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<Product> {
    client.get(&format!("/products/{id}"), None).await
}

pub async fn get_by_sku(client: &ApiClient, sku: &str) -> Result<Product> {
    client.get(&format!("/products/sku/{sku}"), None).await
}

pub async fn get_by_barcode(client: &ApiClient, barcode: &str) -> Result<Product> {
    client
        .get(&format!("/products/barcode/{barcode}"), None)
        .await
}

/// Keyword search across name, SKU, and barcode.
pub async fn search(
    client: &ApiClient,
    keyword: &str,
    query: &ProductQuery,
) -> Result<Page<Product>> {
    let mut params = to_value(query)?;
    params["keyword"] = json!(keyword);
    client.get("/products/search", Some(params)).await
}

pub async fn create(client: &ApiClient, request: &ProductRequest) -> Result<Product> {
    client.post("/products", Some(to_value(request)?)).await
}

pub async fn update(client: &ApiClient, id: i64, request: &ProductRequest) -> Result<Product> {
    client
        .put(&format!("/products/{id}"), Some(to_value(request)?))
        .await
}

/// Soft delete; the product stays queryable with `active = false`.
pub async fn delete(client: &ApiClient, id: i64) -> Result<()> {
    client.delete_unit(&format!("/products/{id}")).await
}
