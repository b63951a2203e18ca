use crate::traits::Searchable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    /// Null, `""` and `[]` values (and unnamed fields) carry no constraint.
    pub fn is_blank(&self) -> bool {
        if self.field.is_empty() {
            return true;
        }
        match &self.value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

/// How the `_search` body is produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum QueryBody {
    #[default]
    Translated,
    /// Native query document sent verbatim, bypassing translation.
    Raw(Value),
}

/// Builder-style search request against a single index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchRequest {
    pub index: String,
    pub searchable_fields: Vec<String>,
    pub text: Option<String>,
    pub filters: Vec<Filter>,
    pub sort: Vec<SortClause>,
    pub limit: Option<usize>,
    pub body: QueryBody,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Self::default()
        }
    }

    /// Request targeting `model`'s index, matching text against its declared
    /// searchable fields.
    pub fn for_model<T: Searchable>(model: &T) -> Self {
        Self {
            index: model.searchable_as(),
            searchable_fields: model.searchable_fields(),
            ..Self::default()
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortClause {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn raw(mut self, document: Value) -> Self {
        self.body = QueryBody::Raw(document);
        self
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hit {
    pub id: String,
    pub position: usize,
    pub score: Option<f64>,
    pub source: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HitList {
    pub hits: Vec<Hit>,
    pub total: usize,
}

impl HitList {
    pub fn ids(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentFailure {
    pub id: String,
    pub status: Option<u16>,
    pub reason: String,
}

/// Outcome of a per-document loop. Failures never stop the loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub skipped: usize,
    pub succeeded: Vec<String>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
