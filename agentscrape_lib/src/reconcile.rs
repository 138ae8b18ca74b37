//! Page-level reconciliation: the single entry point that turns one HTML
//! document into sorted, deduplicated agent records.

use std::collections::{HashMap, HashSet};

use scraper::Html;

use crate::candidates::locate_candidates_in;
use crate::metrics::index_metrics_by_name;
use crate::normalize::{extract_name, extract_phones};
use crate::text_metrics::{normalize_visible_text, text_metrics_by_name};
use crate::types::{max_present, AgentMetrics, AgentRecord, PhoneEntry};
use crate::walker::collect_agent_nodes;

/// Extracts every agent on the page.
///
/// Deterministic for identical input and never fails: unparseable embedded
/// data is skipped, nodes without a name or phone are dropped, and a page
/// with no agents yields an empty list. Records are sorted by name,
/// case-insensitively.
pub fn parse_agents_from_html(html: &str) -> Vec<AgentRecord> {
    let document = Html::parse_document(html);
    parse_agents_from_document(&document)
}

/// [`parse_agents_from_html`] over an already parsed document.
pub fn parse_agents_from_document(document: &Html) -> Vec<AgentRecord> {
    let roots = locate_candidates_in(document);
    let mut nodes = Vec::new();
    for root in &roots {
        collect_agent_nodes(root, &mut nodes);
    }

    let valid: Vec<(String, Vec<PhoneEntry>)> = nodes
        .into_iter()
        .filter_map(|node| {
            let name = extract_name(node);
            if name.is_empty() {
                return None;
            }
            let phones = extract_phones(node);
            if phones.is_empty() {
                return None;
            }
            Some((name, phones))
        })
        .collect();

    let targets: HashSet<String> = valid
        .iter()
        .map(|(name, _)| normalize_visible_text(name))
        .collect();
    let structured = index_metrics_by_name(&roots);
    let visible = text_metrics_by_name(document, &targets);

    let mut reconciler = Reconciler::default();
    for (name, phones) in valid {
        let from_tree = structured
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or_default();
        let from_text = visible
            .get(&normalize_visible_text(&name))
            .copied()
            .unwrap_or_default();
        reconciler.add(name, phones, from_tree, from_text);
    }

    let records = reconciler.into_sorted();
    tracing::debug!(
        "Reconciled {} agents from {} candidate trees",
        records.len(),
        roots.len()
    );
    records
}

/// Keyed accumulation of agent records, one per lowercased name.
#[derive(Default)]
pub struct Reconciler {
    records: HashMap<String, AgentRecord>,
}

impl Reconciler {
    /// Adds one sighting of an agent.
    ///
    /// A new name takes the text-path value per field when present, else
    /// the structured value. A repeated name unions its phones and keeps
    /// the per-field maximum of stored, text and structured values.
    pub fn add(
        &mut self,
        name: String,
        phones: Vec<PhoneEntry>,
        from_tree: AgentMetrics,
        from_text: AgentMetrics,
    ) {
        let key = name.to_lowercase();
        match self.records.get_mut(&key) {
            Some(existing) => {
                existing.merge_phones(&phones);
                existing.sold = max_present(
                    max_present(existing.sold, from_text.sold),
                    from_tree.sold,
                );
                existing.for_sale = max_present(
                    max_present(existing.for_sale, from_text.for_sale),
                    from_tree.for_sale,
                );
            }
            None => {
                let mut record = AgentRecord {
                    name,
                    phones: Vec::with_capacity(phones.len()),
                    sold: from_text.sold.or(from_tree.sold),
                    for_sale: from_text.for_sale.or(from_tree.for_sale),
                };
                record.merge_phones(&phones);
                self.records.insert(key, record);
            }
        }
    }

    /// Records ordered by lowercased name.
    pub fn into_sorted(self) -> Vec<AgentRecord> {
        let mut keyed: Vec<(String, AgentRecord)> = self.records.into_iter().collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, record)| record).collect()
    }
}
