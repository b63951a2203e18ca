use crate::models::{Hit, HitList};
use serde_json::Value;

/// Document ids in the order the cluster returned them.
pub fn extract_ids(hits: &Value) -> Vec<String> {
    hit_entries(hits).iter().map(hit_id).collect()
}

/// `total.value` when the cluster reports it, otherwise the number of hits on
/// this page. The fallback is not a match count and is kept for callers that
/// already depend on it.
pub fn total_count(hits: &Value) -> usize {
    hits.pointer("/total/value")
        .and_then(Value::as_u64)
        .map(|total| total as usize)
        .unwrap_or_else(|| hit_entries(hits).len())
}

pub fn parse_hits(hits: &Value) -> HitList {
    let entries = hit_entries(hits);

    HitList {
        hits: entries
            .iter()
            .enumerate()
            .map(|(position, raw)| Hit {
                id: hit_id(raw),
                position,
                score: raw.pointer("/_score").and_then(Value::as_f64),
                source: raw.pointer("/_source").cloned(),
            })
            .collect(),
        total: total_count(hits),
    }
}

fn hit_entries(hits: &Value) -> &[Value] {
    hits.pointer("/hits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn hit_id(raw: &Value) -> String {
    match raw.pointer("/_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}
