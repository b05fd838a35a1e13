//! Typed call-site wrappers over the request pipeline
//!
//! Each module maps a backend resource to plain async functions taking an
//! [`ApiClient`](crate::ApiClient). The full backend surface (orders,
//! inventory, promotions, suppliers, reports) repeats the exact same
//! pattern; new resources add a module here.

pub mod auth;
pub mod customers;
pub mod products;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Serialize query/body structs to JSON for the pipeline.
fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::Transport(format!("failed to encode request: {e}")))
}
