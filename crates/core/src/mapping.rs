use crate::traits::{RecordStore, Searchable};
use crate::{HitList, SearchError};
use std::collections::HashMap;

/// Fetch the records behind `hits` and return them in hit order.
pub async fn map_results<S>(hits: &HitList, store: &S) -> Result<Vec<S::Record>, SearchError>
where
    S: RecordStore + Sync,
{
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let ids = hits.ids();
    let records = store.find_by_ids(&ids).await?;
    Ok(order_by_hits(records, &ids))
}

/// Like [`map_results`], but yields the records one at a time instead of
/// collecting them.
pub async fn lazy_map_results<S>(
    hits: &HitList,
    store: &S,
) -> Result<HitOrdered<S::Record>, SearchError>
where
    S: RecordStore + Sync,
{
    if hits.is_empty() {
        return Ok(HitOrdered::new(Vec::new(), Vec::new()));
    }

    let ids = hits.ids();
    let records = store.find_by_ids(&ids).await?;
    Ok(HitOrdered::new(records, ids))
}

/// Sort `records` by the position of their key in `ids`. Records whose key is
/// not among the ids are dropped.
pub fn order_by_hits<R: Searchable>(records: Vec<R>, ids: &[String]) -> Vec<R> {
    HitOrdered::new(records, ids.to_vec()).collect()
}

/// Records keyed by id, drained in hit order.
pub struct HitOrdered<R> {
    ids: std::vec::IntoIter<String>,
    records: HashMap<String, R>,
}

impl<R: Searchable> HitOrdered<R> {
    pub fn new(records: Vec<R>, ids: Vec<String>) -> Self {
        Self {
            ids: ids.into_iter(),
            records: records
                .into_iter()
                .map(|record| (record.search_key(), record))
                .collect(),
        }
    }
}

impl<R> Iterator for HitOrdered<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        for id in self.ids.by_ref() {
            if let Some(record) = self.records.remove(&id) {
                return Some(record);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hit;
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Article {
        id: String,
    }

    impl Searchable for Article {
        fn search_key(&self) -> String {
            self.id.clone()
        }

        fn searchable_as(&self) -> String {
            "articles".to_string()
        }

        fn to_searchable(&self) -> Map<String, Value> {
            Map::new()
        }

        fn searchable_fields(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[derive(Default)]
    struct FakeRecordStore {
        records: Vec<Article>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for FakeRecordStore {
        type Record = Article;

        async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Article>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .records
                .iter()
                .filter(|record| ids.contains(&record.id))
                .cloned()
                .collect())
        }
    }

    fn article(id: &str) -> Article {
        Article { id: id.to_string() }
    }

    fn hit_list(ids: &[&str]) -> HitList {
        HitList {
            hits: ids
                .iter()
                .enumerate()
                .map(|(position, id)| Hit {
                    id: id.to_string(),
                    position,
                    score: None,
                    source: None,
                })
                .collect(),
            total: ids.len(),
        }
    }

    #[tokio::test]
    async fn records_come_back_in_hit_order() {
        let store = FakeRecordStore {
            records: vec![article("a"), article("b"), article("c"), article("d")],
            ..Default::default()
        };

        let records = map_results(&hit_list(&["c", "a", "b"]), &store)
            .await
            .expect("mapping should succeed");

        assert_eq!(records, vec![article("c"), article("a"), article("b")]);
    }

    #[tokio::test]
    async fn empty_hits_skip_the_store() {
        let store = FakeRecordStore::default();
        let records = map_results(&HitList::default(), &store).await.unwrap();

        assert!(records.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn hits_missing_from_the_store_are_skipped() {
        let store = FakeRecordStore {
            records: vec![article("b")],
            ..Default::default()
        };

        let records = map_results(&hit_list(&["a", "b"]), &store).await.unwrap();
        assert_eq!(records, vec![article("b")]);
    }

    #[tokio::test]
    async fn lazy_mapping_yields_in_hit_order() {
        let store = FakeRecordStore {
            records: vec![article("a"), article("b"), article("c")],
            ..Default::default()
        };

        let mut records = lazy_map_results(&hit_list(&["b", "x", "c", "a"]), &store)
            .await
            .unwrap();

        assert_eq!(records.next(), Some(article("b")));
        assert_eq!(records.next(), Some(article("c")));
        assert_eq!(records.next(), Some(article("a")));
        assert_eq!(records.next(), None);
    }

    #[tokio::test]
    async fn lazy_mapping_of_empty_hits_skips_the_store() {
        let store = FakeRecordStore::default();
        let mut records = lazy_map_results(&HitList::default(), &store).await.unwrap();

        assert!(records.next().is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn records_not_in_hits_are_dropped() {
        let ids = vec!["b".to_string(), "a".to_string()];
        let ordered = order_by_hits(vec![article("a"), article("z"), article("b")], &ids);
        assert_eq!(ordered, vec![article("b"), article("a")]);
    }
}
