//! HTTP handlers for the catalog resources.

pub mod manufacturers;
pub mod products;
