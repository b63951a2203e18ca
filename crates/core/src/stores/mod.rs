pub mod opensearch;

pub use opensearch::OpenSearchEngine;
