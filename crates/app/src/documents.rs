use anyhow::{anyhow, Context};
use async_trait::async_trait;
use opensearch_bridge_core::{RecordStore, SearchError, Searchable};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One line of a JSONL file: an `id` plus arbitrary searchable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    pub index: String,
    pub id: String,
    pub fields: Map<String, Value>,
    pub searchable_fields: Vec<String>,
}

impl JsonDocument {
    /// Field-less document standing for every record of `index`.
    pub fn model(index: &str, searchable_fields: &[String]) -> Self {
        Self {
            index: index.to_string(),
            id: String::new(),
            fields: Map::new(),
            searchable_fields: searchable_fields.to_vec(),
        }
    }
}

impl Searchable for JsonDocument {
    fn search_key(&self) -> String {
        self.id.clone()
    }

    fn searchable_as(&self) -> String {
        self.index.clone()
    }

    fn to_searchable(&self) -> Map<String, Value> {
        self.fields.clone()
    }

    fn searchable_fields(&self) -> Vec<String> {
        self.searchable_fields.clone()
    }

    fn soft_deleted(&self) -> Option<bool> {
        self.fields
            .get("deleted_at")
            .map(|deleted_at| !deleted_at.is_null())
    }
}

pub fn load_documents(
    path: &Path,
    index: &str,
    searchable_fields: &[String],
) -> anyhow::Result<Vec<JsonDocument>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            parse_line(line, index, searchable_fields)
                .with_context(|| format!("{}:{}", path.display(), number + 1))
        })
        .collect()
}

fn parse_line(line: &str, index: &str, searchable_fields: &[String]) -> anyhow::Result<JsonDocument> {
    let mut fields: Map<String, Value> = serde_json::from_str(line)?;
    let id = match fields.remove("id") {
        Some(Value::String(id)) if !id.is_empty() => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(anyhow!("document has no usable `id`")),
    };

    Ok(JsonDocument {
        index: index.to_string(),
        id,
        fields,
        searchable_fields: searchable_fields.to_vec(),
    })
}

/// Record store over documents loaded from a local file.
pub struct JsonlRecordStore {
    documents: Vec<JsonDocument>,
}

impl JsonlRecordStore {
    pub fn new(documents: Vec<JsonDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    type Record = JsonDocument;

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<JsonDocument>, SearchError> {
        Ok(self
            .documents
            .iter()
            .filter(|document| ids.contains(&document.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensearch_bridge_core::{map_results, Hit, HitList};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fields() -> Vec<String> {
        vec!["title".to_string()]
    }

    #[test]
    fn jsonl_lines_become_documents() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"id": "a", "title": "first"}}"#)?;
        writeln!(file)?;
        writeln!(file, r#"{{"id": 7, "title": "second", "deleted_at": null}}"#)?;

        let documents = load_documents(file.path(), "posts", &fields())?;

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, "a");
        assert_eq!(documents[1].id, "7");
        assert!(!documents[0].fields.contains_key("id"));
        assert_eq!(documents[1].searchable_as(), "posts");
        assert_eq!(documents[0].soft_deleted(), None);
        assert_eq!(documents[1].soft_deleted(), Some(false));
        Ok(())
    }

    #[test]
    fn missing_id_is_reported_with_line_number() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"id": "a"}}"#)?;
        writeln!(file, r#"{{"title": "orphan"}}"#)?;

        let error = load_documents(file.path(), "posts", &fields()).unwrap_err();
        assert!(format!("{error:#}").contains(":2"));
        Ok(())
    }

    #[test]
    fn model_drives_search_requests() {
        let model = JsonDocument::model("posts", &fields());
        let request = opensearch_bridge_core::SearchRequest::for_model(&model);

        assert_eq!(request.index, "posts");
        assert_eq!(request.searchable_fields, vec!["title"]);
        assert!(model.to_searchable().is_empty());
    }

    #[tokio::test]
    async fn store_hydrates_hits_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"id": "a", "title": "first"}}"#)?;
        writeln!(file, r#"{{"id": "b", "title": "second"}}"#)?;
        let store = JsonlRecordStore::new(load_documents(file.path(), "posts", &fields())?);

        let hits = HitList {
            hits: ["b", "a"]
                .iter()
                .enumerate()
                .map(|(position, id)| Hit {
                    id: id.to_string(),
                    position,
                    score: None,
                    source: None,
                })
                .collect(),
            total: 2,
        };

        let records = map_results(&hits, &store).await?;
        let ids: Vec<_> = records.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        Ok(())
    }
}
