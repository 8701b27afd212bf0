//! Reading provider exports with report preambles.

use std::io::Write;

use payroll_ingest::{IngestError, IngestOptions, read_upload, read_upload_path};

const EXPORT: &str = "\
Payroll Report,,,,
Department:,Aquatics,,,
Run Date:,2026-01-31,,,

Staff First Name,Staff Last Name,Scheduled Hours,Scheduled Payroll,Time Clock Hours
Staff First Name,Staff Last Name,Scheduled Hours,Scheduled Payroll,Time Clock Hours
JOHN,smith,12,,
ada,byron,,\"$1,250.00\",
maria,lopez
";

fn daxco_options() -> IngestOptions {
    IngestOptions::default()
        .with_anchor("Staff First Name")
        .with_columns(["Staff First Name", "Staff Last Name"])
        .with_preamble(["Department"])
}

#[test]
fn last_anchor_line_is_the_header() {
    let upload = read_upload(EXPORT.as_bytes(), &daxco_options()).expect("read export");
    assert_eq!(upload.header_index, 4);
    assert_eq!(upload.rows.len(), 3);
    assert_eq!(upload.rows[0].get("staff first name"), Some("JOHN"));
    assert_eq!(upload.rows[1].get("Scheduled Payroll"), Some("$1,250.00"));
}

#[test]
fn preamble_value_is_copied_to_every_row() {
    let upload = read_upload(EXPORT.as_bytes(), &daxco_options()).expect("read export");
    assert_eq!(
        upload.preamble.get("Department").map(String::as_str),
        Some("Aquatics")
    );
    for row in &upload.rows {
        assert_eq!(row.get("Department"), Some("Aquatics"));
    }
}

#[test]
fn short_lines_are_padded() {
    let upload = read_upload(EXPORT.as_bytes(), &daxco_options()).expect("read export");
    let last = &upload.rows[2];
    assert_eq!(last.get("Scheduled Hours"), Some(""));
    assert_eq!(last.get("Time Clock Hours"), Some(""));
}

#[test]
fn missing_anchor_is_reported() {
    let err = read_upload(b"Name,Hours\nAnn,4\n", &daxco_options()).unwrap_err();
    match err {
        IngestError::HeaderNotFound { anchor } => assert_eq!(anchor, "Staff First Name"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_columns_are_listed() {
    let options = daxco_options().with_columns(["Staff First Name", "Employee Id"]);
    let err = read_upload(EXPORT.as_bytes(), &options).unwrap_err();
    match err {
        IngestError::MissingColumns { columns } => assert_eq!(columns, vec!["Employee Id"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(EXPORT.as_bytes()).expect("write export");
    let upload = read_upload_path(file.path(), &daxco_options()).expect("read export");
    assert_eq!(upload.rows.len(), 3);

    let missing = file.path().with_extension("absent");
    assert!(matches!(
        read_upload_path(&missing, &daxco_options()),
        Err(IngestError::Io { .. })
    ));
}
