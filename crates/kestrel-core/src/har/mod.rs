mod reader;
mod retriever;
mod types;

pub use reader::HarReader;
pub use retriever::{HAR_DIR, HarRetriever, TIMESTAMP_FORMAT, har_file_name};
pub use types::*;
