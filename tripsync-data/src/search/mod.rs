//! HTTP adapter for the places text-search provider.

mod http;
pub mod wire;

pub use http::{HttpPlaceSearch, HttpSearchConfig};
