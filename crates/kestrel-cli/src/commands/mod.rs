pub mod capture;
pub mod completion;
pub mod config;
pub mod har;
pub mod record;
pub mod summary;
