//! Tree walker: collects agent-like objects from a candidate tree.

use serde_json::{Map, Value};

pub const PERSON_NAME: &str = "person_name";
pub const FULL_NAME: &str = "full_name";
pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const PHONES: &str = "phones";
pub const OFFICE: &str = "office";
pub const PHONE_LIST: &str = "phone_list";

/// An object judged to describe an agent: it carries a name-bearing key and
/// a contact-bearing key. Values are not inspected, only key presence.
pub fn is_agent_like(node: &Map<String, Value>) -> bool {
    let has_name = node.contains_key(PERSON_NAME)
        || node.contains_key(FULL_NAME)
        || (node.contains_key(FIRST_NAME) && node.contains_key(LAST_NAME));
    let has_contact =
        node.contains_key(PHONES) || node.contains_key(OFFICE) || node.contains_key(PHONE_LIST);
    has_name && has_contact
}

/// Depth-first pre-order walk appending every agent-like object to `out`.
///
/// Qualifying objects are still descended into, so nested agents are
/// collected alongside their parents.
pub fn collect_agent_nodes<'a>(node: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match node {
        Value::Object(map) => {
            if is_agent_like(map) {
                out.push(map);
            }
            for value in map.values() {
                collect_agent_nodes(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_agent_nodes(item, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Visits every object in the tree, agent-like or not, in pre-order.
pub fn for_each_object<'a>(node: &'a Value, visit: &mut impl FnMut(&'a Map<String, Value>)) {
    match node {
        Value::Object(map) => {
            visit(map);
            for value in map.values() {
                for_each_object(value, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                for_each_object(item, visit);
            }
        }
        _ => {}
    }
}
