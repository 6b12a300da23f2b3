//! Integration tests for crm-columns

use crm_columns::clustering::{
    AnalysisOptions, AnalysisRequest, FocusOn, parse_cluster_response, total_clustered_rows,
};
use crm_columns::ingest::sheet_names;
use crm_columns::{
    ApprovedMapping, CellValue, ColumnDetector, ColumnType, DetectorError, FileKind, Row,
    SampleSize, build_mapping,
};
use rust_xlsxwriter::Workbook;
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// Two sheets: a notes sheet first, then the customer table with a blank
/// and a repeated header.
fn customer_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let intro = workbook.add_worksheet();
    intro.set_name("Intro").unwrap();
    intro.write_string(0, 0, "Read me").unwrap();
    intro.write_string(1, 0, "Exported from the CRM").unwrap();

    let customers = workbook.add_worksheet();
    customers.set_name("Customers").unwrap();
    for (col, header) in [(0, "Customer ID"), (1, "contact"), (2, "amt"), (4, "amt")] {
        customers.write_string(0, col, header).unwrap();
    }
    let rows = [("C1", "a@b.com", 5000.0, 12.0), ("C2", "c@d.org", 7000.0, 15.0)];
    for (i, (id, email, amount, orders)) in rows.into_iter().enumerate() {
        let row = i as u32 + 1;
        customers.write_string(row, 0, id).unwrap();
        customers.write_string(row, 1, email).unwrap();
        customers.write_number(row, 2, amount).unwrap();
        customers.write_number(row, 4, orders).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

#[test]
fn test_detect_by_header() {
    let data = b"Customer ID,Email,Phone Number,Total Revenue,Order Count,Last Order Date,Signup,Status,Tier,City,Country,Age,Gender,notes\n\
C1,a@b.com,555-123-4567,1200,3,2024-01-05,2023-02-01,active,gold,Paris,France,34,F,vip\n";
    let file = temp_file(data);

    let summary = ColumnDetector::new().detect_path(file.path()).unwrap();
    let mapping = &summary.mapping;

    assert_eq!(summary.kind, FileKind::Csv);
    assert_eq!(summary.row_count, 1);
    assert!(summary.file_name.is_some());

    let expected = [
        ("Customer ID", ColumnType::CustomerId),
        ("Email", ColumnType::Email),
        ("Phone Number", ColumnType::Phone),
        ("Total Revenue", ColumnType::Revenue),
        ("Order Count", ColumnType::PurchaseCount),
        ("Last Order Date", ColumnType::LastPurchaseDate),
        ("Signup", ColumnType::SignupDate),
        ("Status", ColumnType::Status),
        ("Tier", ColumnType::Segment),
        ("City", ColumnType::City),
        ("Country", ColumnType::Country),
        ("Age", ColumnType::Age),
        ("Gender", ColumnType::Gender),
    ];
    for (column, column_type) in expected {
        assert_eq!(mapping.column_type(column), column_type, "column {column}");
    }
    assert_eq!(mapping.unmapped, vec!["notes"]);
}

#[test]
fn test_detect_by_values() {
    let data = b"x1,x2,x3,x4,x5,x6,x7\n\
a@b.com,+1 (555) 123-4567,15/01/2024,5000,25,2,hello\n\
c@d.org,+1 (555) 987-6543,20/02/2024,7000,35,3,world\n";

    let summary = ColumnDetector::new().detect_bytes(data).unwrap();
    let mapping = &summary.mapping;

    assert_eq!(mapping.column_type("x1"), ColumnType::Email);
    assert_eq!(mapping.column_type("x2"), ColumnType::Phone);
    assert_eq!(mapping.column_type("x3"), ColumnType::SignupDate);
    assert_eq!(mapping.column_type("x4"), ColumnType::Revenue);
    assert_eq!(mapping.column_type("x5"), ColumnType::Age);
    assert_eq!(mapping.column_type("x6"), ColumnType::PurchaseCount);
    assert_eq!(mapping.unmapped, vec!["x7"]);
}

#[test]
fn test_every_column_is_detected_or_unmapped() {
    let data = b"id,contact,Spend,blob,,blob\n1,a@b.com,10,?,,x\n2,c@d.org,20,!,,y\n";
    let summary = ColumnDetector::new().detect_bytes(data).unwrap();
    let mapping = &summary.mapping;

    assert_eq!(summary.columns, vec!["id", "contact", "Spend", "blob", "__EMPTY", "blob_1"]);
    for column in &summary.columns {
        let detected = mapping.detected.contains_key(column);
        let unmapped = mapping.unmapped.contains(column);
        assert!(detected != unmapped, "column {column} must be in exactly one place");
    }

    let suggested: usize = mapping.suggestions.values().map(Vec::len).sum();
    assert_eq!(suggested, mapping.detected.len());
    assert_eq!(
        mapping.detected.len() + mapping.unmapped.len(),
        summary.columns.len()
    );
}

#[test]
fn test_mapping_is_deterministic() {
    let data = b"Name,Revenue,misc\nAnn,100,1\nBob,200,2\n";
    let detector = ColumnDetector::new();
    let first = detector.detect_bytes(data).unwrap();
    let second = detector.detect_bytes(data).unwrap();
    assert_eq!(first.mapping, second.mapping);
}

#[test]
fn test_no_rows_leaves_unnamed_columns_unmapped() {
    let columns = ["alpha", "beta", "gamma"];
    let mapping = build_mapping(&columns, &[]);
    assert_eq!(mapping.unmapped, columns);
    assert!(mapping.detected.is_empty());
    assert!(mapping.suggestions.is_empty());
}

#[test]
fn test_suggestions_follow_input_order() {
    let mapping = build_mapping(&["Work Email", "misc", "Email"], &[]);
    assert_eq!(mapping.columns_of(ColumnType::Email), ["Work Email", "Email"]);
}

#[test]
fn test_rows_from_json() {
    // Spreadsheet-style rows with native numbers.
    let rows: Vec<Row> = serde_json::from_str(
        r#"[{"score": 5000, "contact": "a@b.com", "flag": true},
            {"score": 7000.5, "contact": null, "flag": false}]"#,
    )
    .unwrap();

    let mapping = build_mapping(&["score", "contact", "flag"], &rows);
    assert_eq!(mapping.column_type("score"), ColumnType::Revenue);
    assert_eq!(mapping.column_type("contact"), ColumnType::Email);
    // Booleans coerce to 1/0.
    assert_eq!(mapping.column_type("flag"), ColumnType::PurchaseCount);
}

#[test]
fn test_semicolon_and_bom() {
    let data = "\u{FEFF}Nom;Courriel;Pays\nAnn;a@b.com;FR\n".as_bytes();
    let summary = ColumnDetector::new().detect_bytes(data).unwrap();

    assert_eq!(summary.columns, vec!["Nom", "Courriel", "Pays"]);
    assert_eq!(summary.mapping.column_type("Courriel"), ColumnType::Email);
}

#[test]
fn test_windows_1252_export() {
    let data = b"Name,Email\nJos\xe9 Mart\xednez,jose@example.com\nRen\xe9e,renee@example.com\n";
    let summary = ColumnDetector::new().detect_bytes(data).unwrap();

    assert_eq!(summary.row_count, 2);
    assert_eq!(summary.mapping.column_type("Name"), ColumnType::Name);
    assert_eq!(summary.mapping.column_type("Email"), ColumnType::Email);
}

#[test]
fn test_sample_all_rows() {
    let mut data = String::from("code\n");
    for _ in 0..10 {
        data.push_str("5\n");
    }
    data.push_str("100000\n");

    let mut detector = ColumnDetector::new();
    let summary = detector.detect_bytes(data.as_bytes()).unwrap();
    assert_eq!(summary.mapping.column_type("code"), ColumnType::PurchaseCount);

    detector.sample_size(SampleSize::All);
    let summary = detector.detect_bytes(data.as_bytes()).unwrap();
    assert_eq!(summary.mapping.column_type("code"), ColumnType::Revenue);
}

#[test]
fn test_file_errors() {
    let missing = ColumnDetector::new().detect_path("/nonexistent/customers.csv");
    assert!(matches!(missing, Err(DetectorError::Io(_))));

    let file = temp_file(b"Email\na@b.com\n");
    let mut detector = ColumnDetector::new();
    detector.max_file_size(4);
    assert!(matches!(
        detector.detect_path(file.path()),
        Err(DetectorError::FileTooLarge { .. })
    ));

    let binary = temp_file(&[0x00, 0x01, 0x02, 0x03]);
    assert!(matches!(
        ColumnDetector::new().detect_path(binary.path()),
        Err(DetectorError::UnsupportedFormat)
    ));

    let header_only = temp_file(b"Email,Name\n");
    assert!(matches!(
        ColumnDetector::new().detect_path(header_only.path()),
        Err(DetectorError::EmptyData)
    ));
}

#[test]
fn test_sheet_option_ignored_for_delimited() {
    let mut detector = ColumnDetector::new();
    detector.sheet("Customers");
    // Delimited exports have no sheets; the option is ignored.
    let summary = detector.detect_bytes(b"Email\na@b.com\n").unwrap();
    assert_eq!(summary.kind, FileKind::Csv);
}

#[test]
fn test_approved_mapping_reaches_clustering() {
    let data = b"Customer ID,Revenue,notes\n1,100,a\n2,200,b\n3,300,c\n";
    let summary = ColumnDetector::new().detect_bytes(data).unwrap();

    let mut approved: ApprovedMapping = summary.mapping.approve();
    approved
        .set("notes", ColumnType::Segment)
        .set("Revenue", ColumnType::Unknown);

    let options = AnalysisOptions {
        num_clusters: 3,
        focus_on: FocusOn::Both,
    };
    let request = AnalysisRequest::new(&summary.preview, approved.clone(), options);

    assert_eq!(request.rows.len(), 3);
    assert_eq!(request.column_mapping, approved);
    assert_eq!(request.column_mapping.get("Revenue"), ColumnType::Unknown);
    // The inferred mapping is untouched.
    assert_eq!(summary.mapping.column_type("Revenue"), ColumnType::Revenue);

    let response = r#"```json
[{"id": "a", "name": "Big spenders", "percentage": 40},
 {"id": "b", "name": "Everyone else", "percentage": 60}]
```"#;
    let clusters = parse_cluster_response(response, request.total_rows as u64).unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(total_clustered_rows(&clusters), 3);
}

#[test]
fn test_workbook_named_sheet() {
    let data = customer_workbook();
    let mut detector = ColumnDetector::new();
    detector.sheet("Customers");

    let summary = detector.detect_bytes(&data).unwrap();
    let mapping = &summary.mapping;

    assert_eq!(summary.kind, FileKind::Workbook);
    assert_eq!(summary.row_count, 2);
    assert_eq!(
        summary.columns,
        vec!["Customer ID", "contact", "amt", "__EMPTY", "amt_1"]
    );
    assert_eq!(summary.preview[0]["amt"], CellValue::Number(5000.0));

    assert_eq!(mapping.column_type("Customer ID"), ColumnType::CustomerId);
    assert_eq!(mapping.column_type("contact"), ColumnType::Email);
    assert_eq!(mapping.column_type("amt"), ColumnType::Revenue);
    assert_eq!(mapping.column_type("amt_1"), ColumnType::PurchaseCount);
    assert_eq!(mapping.unmapped, vec!["__EMPTY"]);
}

#[test]
fn test_workbook_default_sheet_and_listing() {
    let data = customer_workbook();
    assert_eq!(sheet_names(&data).unwrap(), vec!["Intro", "Customers"]);

    let file = temp_file(&data);
    let summary = ColumnDetector::new().detect_path(file.path()).unwrap();
    assert_eq!(summary.kind, FileKind::Workbook);
    assert_eq!(summary.columns, vec!["Read me"]);
    assert_eq!(summary.row_count, 1);
}

#[test]
fn test_workbook_missing_sheet() {
    let data = customer_workbook();
    let mut detector = ColumnDetector::new();
    detector.sheet("Nope");

    let err = detector.detect_bytes(&data).unwrap_err();
    assert!(matches!(err, DetectorError::SheetNotFound(ref name) if name == "Nope"));
}

#[test]
fn test_csv_keeps_columns_past_header() {
    let data = b"Email,Age\na@b.com,31,5000\nc@d.org,40,6000\n";
    let summary = ColumnDetector::new().detect_bytes(data).unwrap();

    assert_eq!(summary.columns, vec!["Email", "Age", "__EMPTY"]);
    assert_eq!(summary.mapping.column_type("__EMPTY"), ColumnType::Revenue);
}
