//! Field normalizer: display names and phone numbers from agent objects.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::types::PhoneEntry;
use crate::walker::{FIRST_NAME, FULL_NAME, LAST_NAME, OFFICE, PERSON_NAME, PHONES, PHONE_LIST};

/// Formats a US number for display.
///
/// 10 digits become `(DDD) DDD-DDDD`, 11 digits with a leading `1` become
/// `+1 (DDD) DDD-DDDD`; anything else is returned trimmed.
pub fn normalize_number(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10]),
        11 if digits.starts_with('1') => format!(
            "+1 ({}) {}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        ),
        _ => raw.trim().to_string(),
    }
}

/// Canonical display name, or an empty string when the object has none.
///
/// Precedence: `person_name`, then `full_name`, then `first_name` and
/// `last_name` joined by a single space.
pub fn extract_name(node: &Map<String, Value>) -> String {
    for key in [PERSON_NAME, FULL_NAME] {
        if let Some(name) = node.get(key).and_then(scalar_text) {
            let name = name.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    let first = node.get(FIRST_NAME).and_then(Value::as_str).unwrap_or("").trim();
    let last = node.get(LAST_NAME).and_then(Value::as_str).unwrap_or("").trim();
    format!("{} {}", first, last).trim().to_string()
}

/// Deduplicated phones from the agent's own list, its office's list, and
/// any keyed `phone_list` map. The first label seen for a number wins.
pub fn extract_phones(node: &Map<String, Value>) -> Vec<PhoneEntry> {
    let mut phones = PhoneCollector::default();

    for entry in array_entries(node.get(PHONES)) {
        let label = text_field(entry, "type")
            .or_else(|| text_field(entry, "label"))
            .unwrap_or("Unknown");
        phones.push(label, entry.get("number"));
    }

    let office = node.get(OFFICE).and_then(Value::as_object);
    if let Some(office) = office {
        for entry in array_entries(office.get(PHONES)) {
            phones.push(text_field(entry, "type").unwrap_or("Office"), entry.get("number"));
        }
    }

    let phone_list = office
        .and_then(|o| o.get(PHONE_LIST))
        .filter(|v| is_truthy(v))
        .or_else(|| node.get(PHONE_LIST));
    if let Some(Value::Object(by_id)) = phone_list {
        for entry in by_id.values().filter_map(Value::as_object) {
            phones.push(text_field(entry, "type").unwrap_or("Office"), entry.get("number"));
        }
    }

    phones.into_entries()
}

#[derive(Default)]
struct PhoneCollector {
    seen: HashSet<String>,
    entries: Vec<PhoneEntry>,
}

impl PhoneCollector {
    fn push(&mut self, label: &str, raw: Option<&Value>) {
        let Some(raw) = raw.and_then(scalar_text) else {
            return;
        };
        let number = normalize_number(&raw);
        if number.is_empty() || !self.seen.insert(number.clone()) {
            return;
        }
        self.entries.push(PhoneEntry::new(label, number));
    }

    fn into_entries(self) -> Vec<PhoneEntry> {
        self.entries
    }
}

fn array_entries(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Non-empty string field.
fn text_field<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Strings as-is and numbers rendered; other shapes carry no text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
