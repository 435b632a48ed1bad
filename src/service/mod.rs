//! Catalog services: validation plus CRUD execution against PostgreSQL.

pub mod manufacturers;
pub mod products;
pub mod validation;
