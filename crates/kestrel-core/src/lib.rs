pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod har;
pub mod summary;

pub use error::{Error, Result};
