//! Shared wire types for the ERP backend client

mod envelope;
mod error;

pub use envelope::{ApiResponse, Page};
pub use error::{Error, Result};
