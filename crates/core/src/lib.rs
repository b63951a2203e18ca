pub mod config;
pub mod error;
pub mod hits;
pub mod mapping;
pub mod models;
pub mod query;
pub mod stores;
pub mod traits;

pub use config::{ClusterConfig, Transport, DEFAULT_CLUSTER_URL};
pub use error::{SearchError, CREATE_INDEX_UNSUPPORTED};
pub use hits::{extract_ids, parse_hits, total_count};
pub use mapping::{lazy_map_results, map_results, order_by_hits, HitOrdered};
pub use models::{
    BatchReport, DocumentFailure, Filter, Hit, HitList, QueryBody, SearchRequest, SortClause,
    SortDirection,
};
pub use query::{
    build_query, page_offset, translate, translate_page, QueryDocument, DEFAULT_PAGE_SIZE,
    DEFAULT_SEARCH_SIZE,
};
pub use stores::OpenSearchEngine;
pub use traits::{RecordStore, SearchEngine, Searchable};
