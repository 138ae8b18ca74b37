//! Record types produced by a page parse.

use serde::{Deserialize, Serialize};

use crate::error::AgentScrapeError;

/// One labelled phone number attached to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneEntry {
    /// Free-form label such as `Office`, `Mobile` or `Unknown`.
    #[serde(rename = "type")]
    pub phone_type: String,
    /// Display-formatted number, see [`crate::normalize::normalize_number`].
    pub number: String,
}

impl PhoneEntry {
    pub fn new(phone_type: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            phone_type: phone_type.into(),
            number: number.into(),
        }
    }
}

/// The reconciled contact and activity entry for one agent on a page.
///
/// A record is only ever emitted with a non-empty `name` and at least one
/// phone. `phones` is unique by `(type, number)` in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    pub phones: Vec<PhoneEntry>,
    pub sold: Option<u64>,
    pub for_sale: Option<u64>,
}

impl AgentRecord {
    /// Identity key used for deduplication within and across pages.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Appends phones not already present, compared by `(type, number)`.
    pub fn merge_phones(&mut self, phones: &[PhoneEntry]) {
        for phone in phones {
            if !self.phones.contains(phone) {
                self.phones.push(phone.clone());
            }
        }
    }
}

/// Best-guess `(sold, for_sale)` counts for one agent.
///
/// Merging keeps the larger value per field and treats `None` as neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentMetrics {
    pub sold: Option<u64>,
    pub for_sale: Option<u64>,
}

impl AgentMetrics {
    pub fn new(sold: Option<u64>, for_sale: Option<u64>) -> Self {
        Self { sold, for_sale }
    }

    pub fn is_empty(&self) -> bool {
        self.sold.is_none() && self.for_sale.is_none()
    }

    pub fn merge_max(&mut self, other: AgentMetrics) {
        self.sold = max_present(self.sold, other.sold);
        self.for_sale = max_present(self.for_sale, other.for_sale);
    }
}

/// Max-merge of two optional counts; an absent side never wins.
pub fn max_present(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Renders records as the pretty-printed JSON array written to disk.
pub fn records_to_json(records: &[AgentRecord]) -> Result<String, AgentScrapeError> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_present_treats_none_as_identity() {
        assert_eq!(max_present(None, None), None);
        assert_eq!(max_present(Some(3), None), Some(3));
        assert_eq!(max_present(None, Some(7)), Some(7));
        assert_eq!(max_present(Some(3), Some(7)), Some(7));
        assert_eq!(max_present(Some(9), Some(7)), Some(9));
    }

    #[test]
    fn merge_max_is_per_field() {
        let mut m = AgentMetrics::new(Some(4), None);
        m.merge_max(AgentMetrics::new(Some(2), Some(11)));
        assert_eq!(m, AgentMetrics::new(Some(4), Some(11)));
        m.merge_max(AgentMetrics::default());
        assert_eq!(m, AgentMetrics::new(Some(4), Some(11)));
    }

    #[test]
    fn merge_phones_skips_existing_pairs() {
        let mut record = AgentRecord {
            name: "Jane Doe".into(),
            phones: vec![PhoneEntry::new("Office", "(206) 555-1234")],
            sold: None,
            for_sale: None,
        };
        record.merge_phones(&[
            PhoneEntry::new("Office", "(206) 555-1234"),
            PhoneEntry::new("Mobile", "(206) 555-1234"),
            PhoneEntry::new("Office", "(206) 555-9999"),
        ]);
        assert_eq!(
            record.phones,
            vec![
                PhoneEntry::new("Office", "(206) 555-1234"),
                PhoneEntry::new("Mobile", "(206) 555-1234"),
                PhoneEntry::new("Office", "(206) 555-9999"),
            ]
        );
    }

    #[test]
    fn record_serializes_with_wire_field_names() {
        let record = AgentRecord {
            name: "Jane Doe".into(),
            phones: vec![PhoneEntry::new("Office", "(206) 555-1234")],
            sold: Some(12),
            for_sale: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Jane Doe",
                "phones": [{"type": "Office", "number": "(206) 555-1234"}],
                "sold": 12,
                "for_sale": null
            })
        );
    }

    #[test]
    fn records_to_json_renders_array() {
        let json = records_to_json(&[]).unwrap();
        assert_eq!(json, "[]");
    }
}
