//! Customer/member management API

use serde::{Deserialize, Serialize};
use serde_json::json;

use common::Page;

use crate::api::to_value;
use crate::error::Result;
use crate::pipeline::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub member_no: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

pub async fn list(client: &ApiClient, query: &CustomerQuery) -> Result<Page<Customer>> {
    client.get("/customers", Some(to_value(query)?)).await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<Customer> {
    client.get(&format!("/customers/{id}"), None).await
}

pub async fn get_by_member_no(client: &ApiClient, member_no: &str) -> Result<Customer> {
    client
        .get(&format!("/customers/member-no/{member_no}"), None)
        .await
}

/// Keyword search across name, phone, email, and member number.
pub async fn search(
    client: &ApiClient,
    keyword: &str,
    query: &CustomerQuery,
) -> Result<Page<Customer>> {
    let mut params = to_value(query)?;
    params["keyword"] = json!(keyword);
    client.get("/customers/search", Some(params)).await
}

pub async fn create(client: &ApiClient, request: &CustomerRequest) -> Result<Customer> {
    client.post("/customers", Some(to_value(request)?)).await
}

pub async fn update(client: &ApiClient, id: i64, request: &CustomerRequest) -> Result<Customer> {
    client
        .put(&format!("/customers/{id}"), Some(to_value(request)?))
        .await
}
