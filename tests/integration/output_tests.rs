use indexmap::IndexMap;
use paper_trawl::extract::FieldValue;
use paper_trawl::model::sort_by_rank;
use paper_trawl::output::{JsonOutput, OutputHandler};
use paper_trawl::{Rank, ResultRecord};
use tempfile::TempDir;

fn record(page: u32, position: u32) -> ResultRecord {
    let mut fields = IndexMap::new();
    fields.insert(
        "Title".to_string(),
        FieldValue::Text(format!("Paper {}.{}", page, position)),
    );
    fields.insert(
        "Authors".to_string(),
        FieldValue::List(vec![FieldValue::Map(IndexMap::from([
            ("name".to_string(), FieldValue::from("Ada")),
            ("from".to_string(), FieldValue::Null),
        ]))]),
    );
    ResultRecord::new(
        Rank::new(page, position),
        format!("https://example.com/document/{}{}", page, position),
        fields,
    )
}

#[test]
fn test_sorted_records_written_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");

    let mut records = vec![record(2, 0), record(1, 1), record(1, 0)];
    sort_by_rank(&mut records);
    JsonOutput::new(&path).write_records(&records).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let ranks: Vec<serde_json::Value> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rank"].clone())
        .collect();
    assert_eq!(
        ranks,
        vec![
            serde_json::json!([1, 0]),
            serde_json::json!([1, 1]),
            serde_json::json!([2, 0])
        ]
    );
    assert_eq!(parsed[0]["Authors"][0]["name"], "Ada");
    assert!(parsed[0]["Authors"][0]["from"].is_null());
}

#[test]
fn test_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(&path, "stale").unwrap();

    let output = JsonOutput::new(&path);
    output.write_records(&[record(1, 0)]).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with('['));
    assert_eq!(output.destination(), path.display().to_string());
}
