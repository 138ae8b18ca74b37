use super::*;

fn sample_agents() -> Vec<AgentRecord> {
    vec![
        AgentRecord {
            name: "Jane Doe".into(),
            phones: vec![
                PhoneEntry::new("Mobile", "(206) 555-1234"),
                PhoneEntry::new("Office", "(206) 555-0000"),
            ],
            sold: Some(15),
            for_sale: Some(3),
        },
        AgentRecord {
            name: "Bob Ray".into(),
            phones: vec![PhoneEntry::new("Office", "(360) 555-0101")],
            sold: Some(0),
            for_sale: None,
        },
    ]
}

// -- Cell formatting --

#[test]
fn test_phones_cell_joins_entries() {
    let agents = sample_agents();
    assert_eq!(
        phones_cell(&agents[0].phones),
        "Mobile: (206) 555-1234; Office: (206) 555-0000"
    );
}

#[test]
fn test_phones_cell_empty() {
    assert_eq!(phones_cell(&[]), "");
}

#[test]
fn test_count_cell() {
    assert_eq!(count_cell(Some(0)), "0");
    assert_eq!(count_cell(Some(42)), "42");
    assert_eq!(count_cell(None), "");
}

// -- Row builder tests --

#[test]
fn test_build_agent_rows_mapping() {
    let rows = build_agent_rows(&sample_agents());
    assert_eq!(rows.len(), 2);

    let row = &rows[1];
    assert_eq!(row.name, "Bob Ray");
    assert_eq!(row.phones, "Office: (360) 555-0101");
    assert_eq!(row.sold, "0");
    assert_eq!(row.for_sale, "");
}

#[test]
fn test_build_agent_rows_empty() {
    assert!(build_agent_rows(&[]).is_empty());
}

// -- CSV --

fn csv_from_rows<T: Serialize>(rows: &[T]) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

#[test]
fn test_csv_agents_headers() {
    let csv = csv_from_rows(&build_agent_rows(&sample_agents()));
    let header = csv.lines().next().unwrap();
    assert_eq!(header, "Name,Phones,Sold,For Sale");
}

#[test]
fn test_csv_agents_quotes_phone_list() {
    let csv = csv_from_rows(&build_agent_rows(&sample_agents()));
    let first = csv.lines().nth(1).unwrap();
    assert_eq!(
        first,
        "Jane Doe,Mobile: (206) 555-1234; Office: (206) 555-0000,15,3"
    );
}

// -- JSON --

#[test]
fn test_json_agents_shape() {
    let json = records_to_json(&sample_agents()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &value[0];
    assert_eq!(first["name"], "Jane Doe");
    assert_eq!(first["phones"][0]["type"], "Mobile");
    assert_eq!(first["phones"][0]["number"], "(206) 555-1234");
    assert_eq!(first["sold"], 15);
    assert!(value[1]["for_sale"].is_null());
}

#[test]
fn test_write_agents_file_round_trips() {
    let dir = std::env::temp_dir().join(format!("agentscrape-output-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("agents.json");

    write_agents_file(&path, &sample_agents()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("]\n"));
    let back: Vec<AgentRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, sample_agents());

    std::fs::remove_dir_all(&dir).unwrap();
}

// -- Markdown --

#[test]
fn test_markdown_agents_structure() {
    let mut table = Table::new(build_agent_rows(&sample_agents()));
    table.with(Style::markdown());
    let md = table.to_string();

    assert!(md.contains('|'));
    assert!(md.contains("---"));
    let header_line = md.lines().next().unwrap();
    assert!(header_line.contains("Name"));
    assert!(header_line.contains("For Sale"));
    assert!(md.contains("Bob Ray"));
}

#[test]
fn test_markdown_empty_produces_headers_only() {
    let mut table = Table::new(build_agent_rows(&[]));
    table.with(Style::markdown());
    let md = table.to_string();

    let lines: Vec<&str> = md.lines().collect();
    assert!(
        lines.len() <= 2,
        "expected at most 2 lines for empty table, got {}",
        lines.len()
    );
    if !lines.is_empty() {
        assert!(lines[0].contains("Phones"));
    }
}
