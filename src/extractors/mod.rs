pub mod token;

pub use token::{ApiTokenHeader, API_TOKEN_HEADER};
