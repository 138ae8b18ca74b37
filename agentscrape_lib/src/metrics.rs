//! Structured-path metric extraction: sold and for-sale counts found by key
//! pattern inside candidate trees.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::normalize::extract_name;
use crate::types::AgentMetrics;
use crate::walker::for_each_object;

/// Counts above this are treated as prices, ids or noise.
pub const MAX_PLAUSIBLE_COUNT: u64 = 5000;

pub fn is_sold_key(key: &str) -> bool {
    let key = key.to_lowercase();
    (key.contains("sold") && !key.contains("unsold") && !key.contains("resolution"))
        || matches!(key.as_str(), "recent_sold" | "sold_count" | "transactions_sold")
}

pub fn is_for_sale_key(key: &str) -> bool {
    let key = key.to_lowercase();
    [
        "for_sale",
        "for-sale",
        "active_listings",
        "active_listing_count",
        "listings_active",
    ]
    .iter()
    .any(|pattern| key.contains(pattern))
}

/// Reads a count from a number or a numeric-looking string (commas
/// allowed). Fractions are truncated; values outside
/// `[0, MAX_PLAUSIBLE_COUNT]` are rejected.
pub fn plausible_count(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() || n < 0.0 || n > MAX_PLAUSIBLE_COUNT as f64 {
        return None;
    }
    Some(n.trunc() as u64)
}

/// Best `(sold, for_sale)` anywhere in `tree`, excluding nested objects
/// that carry their own agent name.
///
/// Every numeric leaf at or below a matching key is a candidate for that
/// bucket; each bucket keeps its maximum independently.
pub fn scan_metrics(tree: &Value) -> AgentMetrics {
    let mut best = AgentMetrics::default();
    match tree {
        Value::Object(map) => scan_map(map, Bucket::default(), &mut best),
        other => scan_into(other, Bucket::default(), &mut best),
    }
    best
}

#[derive(Clone, Copy, Default)]
struct Bucket {
    sold: bool,
    for_sale: bool,
}

fn scan_into(node: &Value, bucket: Bucket, best: &mut AgentMetrics) {
    match node {
        // A nested named object is another agent; its counts are its own.
        Value::Object(map) if !extract_name(map).is_empty() => {}
        Value::Object(map) => scan_map(map, bucket, best),
        Value::Array(items) => {
            for item in items {
                scan_into(item, bucket, best);
            }
        }
        leaf => {
            if !(bucket.sold || bucket.for_sale) {
                return;
            }
            if let Some(count) = plausible_count(leaf) {
                let found = AgentMetrics::new(
                    bucket.sold.then_some(count),
                    bucket.for_sale.then_some(count),
                );
                best.merge_max(found);
            }
        }
    }
}

fn scan_map(map: &Map<String, Value>, bucket: Bucket, best: &mut AgentMetrics) {
    for (key, value) in map {
        let inner = Bucket {
            sold: bucket.sold || is_sold_key(key),
            for_sale: bucket.for_sale || is_for_sale_key(key),
        };
        scan_into(value, inner, best);
    }
}

/// Maps each lowercased agent name found anywhere in `roots` to the best
/// metrics scanned from the object carrying that name. Repeated names are
/// max-merged per field.
pub fn index_metrics_by_name(roots: &[Value]) -> HashMap<String, AgentMetrics> {
    let mut index: HashMap<String, AgentMetrics> = HashMap::new();
    for root in roots {
        for_each_object(root, &mut |node| {
            let name = extract_name(node);
            if name.is_empty() {
                return;
            }
            let mut found = AgentMetrics::default();
            scan_map(node, Bucket::default(), &mut found);
            if !found.is_empty() {
                index.entry(name.to_lowercase()).or_default().merge_max(found);
            }
        });
    }
    index
}
