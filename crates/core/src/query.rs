use crate::models::{Filter, SearchRequest, SortClause};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Upper bound for unpaginated searches; the engine rejects result windows
/// larger than `index.max_result_window`, which defaults to this value.
pub const DEFAULT_SEARCH_SIZE: usize = 10_000;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryDocument {
    #[serde(rename = "_source")]
    pub source: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Value>,
    pub size: usize,
    pub from: usize,
}

impl QueryDocument {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Window for an unpaginated search: `limit` hits from the top. A missing or
/// zero limit means the engine maximum.
pub fn translate(request: &SearchRequest) -> QueryDocument {
    QueryDocument {
        source: true,
        query: build_query(request),
        sort: build_sort(&request.sort),
        size: request
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_SEARCH_SIZE),
        from: 0,
    }
}

/// Window for a 1-indexed page. A zero `per_page` falls back to the default
/// page size and page 0 is read as page 1.
pub fn translate_page(request: &SearchRequest, per_page: usize, page: usize) -> QueryDocument {
    let size = if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page };

    QueryDocument {
        source: true,
        query: build_query(request),
        sort: build_sort(&request.sort),
        size,
        from: page_offset(size, page),
    }
}

pub fn page_offset(per_page: usize, page: usize) -> usize {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// The `bool` container, or `None` when neither text nor any usable filter
/// is present so the cluster falls back to match-all.
pub fn build_query(request: &SearchRequest) -> Option<Value> {
    let mut container = Map::new();

    if let Some(text) = request.text.as_deref().filter(|text| !text.is_empty()) {
        container.insert(
            "must".to_string(),
            json!([
                {
                    "simple_query_string": {
                        "query": text,
                        "fields": request.searchable_fields,
                        "default_operator": "or"
                    }
                }
            ]),
        );
    }

    let filters = build_filters(&request.filters);
    if !filters.is_empty() {
        container.insert("filter".to_string(), Value::Array(filters));
    }

    if container.is_empty() {
        None
    } else {
        Some(json!({ "bool": container }))
    }
}

fn build_filters(filters: &[Filter]) -> Vec<Value> {
    filters
        .iter()
        .filter(|filter| !filter.is_blank())
        .map(|filter| {
            let mut clause = Map::new();
            clause.insert(
                filter.field.clone(),
                json!({
                    "query": filter.value,
                    "operator": "and"
                }),
            );
            json!({ "match": clause })
        })
        .collect()
}

fn build_sort(sort: &[SortClause]) -> Vec<Value> {
    sort.iter()
        .map(|clause| {
            let mut entry = Map::new();
            entry.insert(
                clause.field.clone(),
                json!({ "order": clause.direction.as_str() }),
            );
            Value::Object(entry)
        })
        .collect()
}
