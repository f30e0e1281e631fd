//! Mapping backend client
//!
//! Implements [`codemap_core::MapperApi`] over the backend's HTTP/JSON
//! interface.
//!
//! # Example
//!
//! ```rust,no_run
//! use codemap_client::{ClientConfig, HttpMapperClient};
//! use codemap_core::MapperApi;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpMapperClient::new(ClientConfig::new("http://localhost:8081/research"))?;
//! let codes = client.list_codes().await?;
//! println!("{} codes", codes.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;

pub use client::{ClientConfig, HttpMapperClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
