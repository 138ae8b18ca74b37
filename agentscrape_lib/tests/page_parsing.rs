use std::collections::HashSet;

use agentscrape_lib::{parse_agents_from_html, AgentRecord, PhoneEntry};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head></head><body>{}</body></html>", body)
}

#[test]
fn single_script_record() {
    let html = page(
        r#"<script>{"person_name":"Jane Doe","phones":[{"type":"Office","number":"2065551234"}]}</script>"#,
    );
    let records = parse_agents_from_html(&html);
    assert_eq!(
        records,
        vec![AgentRecord {
            name: "Jane Doe".into(),
            phones: vec![PhoneEntry::new("Office", "(206) 555-1234")],
            sold: None,
            for_sale: None,
        }]
    );
}

#[test]
fn same_name_from_two_sources_keeps_both_formats() {
    let html = page(concat!(
        r#"<script type="application/json">{"agents":[{"person_name":"Jane Doe","phones":[{"type":"Office","number":"2065551234"}]}]}</script>"#,
        r#"<script>cache.put({"person_name":"jane doe","phones":[{"type":"Office","number":"12065551234"}]});</script>"#,
    ));
    let records = parse_agents_from_html(&html);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Jane Doe");
    assert_eq!(
        records[0].phones,
        vec![
            PhoneEntry::new("Office", "(206) 555-1234"),
            PhoneEntry::new("Office", "+1 (206) 555-1234"),
        ]
    );
}

#[test]
fn recovers_fragment_with_trailing_comma_and_undefined() {
    let html = page(
        r#"<script>var s = {"agent": {"person_name": "Ann Lee", "email": undefined, "phones": [{"number": "5035550000",},],}};</script>"#,
    );
    let records = parse_agents_from_html(&html);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ann Lee");
    assert_eq!(
        records[0].phones,
        vec![PhoneEntry::new("Unknown", "(503) 555-0000")]
    );
}

#[test]
fn visible_text_takes_precedence_over_structured_count() {
    let html = page(concat!(
        r#"<div class="card"><h3>Jane Doe</h3><p>Sold: 15</p></div>"#,
        r#"<script type="application/json">{"person_name":"Jane Doe","sold":12,"phones":[{"number":"2065551234"}]}</script>"#,
    ));
    let records = parse_agents_from_html(&html);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sold, Some(15));
    assert_eq!(records[0].for_sale, None);
}

#[test]
fn structured_count_used_when_text_is_silent() {
    let html = page(
        r#"<script type="application/json">{"person_name":"Jane Doe","active_listings":"6","phones":[{"number":"2065551234"}]}</script>"#,
    );
    let records = parse_agents_from_html(&html);
    assert_eq!(records[0].for_sale, Some(6));
    assert_eq!(records[0].sold, None);
}

#[test]
fn nodes_without_name_or_phone_are_dropped() {
    let html = page(
        r#"<script type="application/json">[
            {"person_name":"","phones":[{"number":"2065551234"}]},
            {"person_name":"No Phones","phones":[{"number":""}]},
            {"first_name":"","last_name":"","office":{"phones":[{"number":"2065551234"}]}},
            {"full_name":"Kept","office":{"phones":[{"number":"2065551234"}]}}
        ]</script>"#,
    );
    let records = parse_agents_from_html(&html);
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Kept"]);
    assert_eq!(records[0].phones, vec![PhoneEntry::new("Office", "(206) 555-1234")]);
}

#[test]
fn malformed_embedded_data_yields_empty_list() {
    let html = page(concat!(
        r#"<script type="application/json">{"person_name": "X", "phones": [</script>"#,
        r#"<script>{"person_name": 'single', "phones": [oops]}</script>"#,
    ));
    assert!(parse_agents_from_html(&html).is_empty());
}

#[test]
fn full_directory_page() {
    let html = load_fixture("directory_page.html");
    let records = parse_agents_from_html(&html);

    assert_eq!(
        records,
        vec![
            AgentRecord {
                name: "Bob Ray".into(),
                phones: vec![PhoneEntry::new("Office", "(360) 555-0101")],
                sold: Some(0),
                for_sale: None,
            },
            AgentRecord {
                name: "Carla Diaz".into(),
                phones: vec![PhoneEntry::new("Mobile", "+1 (425) 555-7788")],
                sold: Some(4),
                for_sale: None,
            },
            AgentRecord {
                name: "Jane Doe".into(),
                phones: vec![
                    PhoneEntry::new("Mobile", "(206) 555-1234"),
                    PhoneEntry::new("Office", "(206) 555-0000"),
                    PhoneEntry::new("Mobile", "+1 (206) 555-1234"),
                ],
                sold: Some(15),
                for_sale: Some(3),
            },
        ]
    );
}

#[test]
fn parsing_is_deterministic() {
    let html = load_fixture("directory_page.html");
    let first = parse_agents_from_html(&html);
    for _ in 0..3 {
        assert_eq!(parse_agents_from_html(&html), first);
    }
}

#[test]
fn output_invariants_hold() {
    let html = load_fixture("directory_page.html");
    let records = parse_agents_from_html(&html);

    let mut keys = HashSet::new();
    for record in &records {
        assert!(!record.name.is_empty());
        assert!(!record.phones.is_empty());
        assert!(keys.insert(record.key()), "duplicate agent {}", record.name);

        let mut pairs = HashSet::new();
        for phone in &record.phones {
            assert!(pairs.insert(phone.clone()), "duplicate phone {:?}", phone);
        }
    }

    let sorted: Vec<String> = records.iter().map(|r| r.name.to_lowercase()).collect();
    let mut expected = sorted.clone();
    expected.sort();
    assert_eq!(sorted, expected);
}
