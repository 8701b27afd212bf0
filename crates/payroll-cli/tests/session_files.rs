//! Session files and engine wiring as the CLI drives them.

use std::fs;
use std::time::Duration;

use payroll_cli::engine::{
    EngineSettings, ReferenceSource, build_gateway, build_reconciler, load_catalog,
};
use payroll_cli::session::{SessionFile, read_upload_file};
use payroll_model::{FieldEdit, IntegrationKey};
use tempfile::TempDir;

const REFERENCE: &str = r#"{
  "employees": [
    { "key": "1001", "first_name": "John", "last_name": "Smith" },
    { "key": "1009", "first_name": "John", "last_name": "Doe" },
    { "key": "1001", "first_name": "John", "last_name": "Smith", "department": "4287" }
  ],
  "codes": [
    { "domain": "gross_to_net", "key": "1", "description": "Earnings" },
    { "domain": "type_code", "key": "REG", "description": "Regular" },
    { "domain": "department", "key": "4287", "description": "Aquatics" }
  ]
}"#;

const UPLOAD: &str = "\
Staff First Name,Staff Last Name,Scheduled Hours
John,Smith,8
John,,4
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("reference.json"), REFERENCE).expect("write reference");
        fs::write(dir.path().join("upload.csv"), UPLOAD).expect("write upload");
        Self { dir }
    }

    fn settings(&self) -> EngineSettings {
        EngineSettings {
            catalog: None,
            reference: ReferenceSource::File(self.dir.path().join("reference.json")),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

fn key() -> IntegrationKey {
    IntegrationKey::new(42, "payroll", "daxco").expect("key")
}

#[test]
fn process_save_reconcile_round_trip() {
    let workspace = Workspace::new();
    let reconciler = build_reconciler(&workspace.settings()).expect("reconciler");
    let bytes = read_upload_file(&workspace.dir.path().join("upload.csv"), 1024).expect("upload");
    let batch = reconciler.process_upload(&bytes, &key()).expect("process");
    assert!(!batch.all_valid);

    let path = workspace.dir.path().join("session.json");
    SessionFile::new(key(), batch.clone()).save(&path).expect("save");
    let loaded = SessionFile::load(&path).expect("load");
    assert_eq!(loaded.key, key());
    assert_eq!(loaded.batch, batch);

    let batch = reconciler
        .reconcile_with_edits(
            loaded.batch,
            &[FieldEdit::new(2, "employee_id", "1009")],
            &loaded.key,
        )
        .expect("reconcile");
    assert!(batch.all_valid);
    assert_eq!(
        batch.rows[1].field("employee_id").and_then(|f| f.canonical_key()),
        Some("1009")
    );
}

#[test]
fn oversized_upload_is_refused() {
    let workspace = Workspace::new();
    let path = workspace.dir.path().join("upload.csv");
    let err = read_upload_file(&path, 10).unwrap_err();
    assert!(err.to_string().contains("above the limit of 10 bytes"));
    assert!(read_upload_file(&workspace.dir.path().join("absent.csv"), 10).is_err());
}

#[test]
fn broken_session_file_names_the_path() {
    let workspace = Workspace::new();
    let path = workspace.dir.path().join("session.json");
    fs::write(&path, "{ not json").expect("write");
    let err = SessionFile::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("session.json"));
}

#[test]
fn catalog_override_replaces_builtin() {
    let workspace = Workspace::new();
    let path = workspace.dir.path().join("integrations.toml");
    fs::write(
        &path,
        r#"
[[integrations]]
integration_type = "payroll"
provider = "paylocity"
stages = []
output = { columns = [] }
"#,
    )
    .expect("write catalog");

    let catalog = load_catalog(Some(&path)).expect("catalog");
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get(&key()).is_err());
    assert!(load_catalog(None).expect("builtin").get(&key()).is_ok());

    let missing = workspace.dir.path().join("absent.toml");
    let err = load_catalog(Some(&missing)).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn http_gateway_is_described_by_url() {
    let source = ReferenceSource::Http {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: Some("secret".to_string()),
    };
    let gateway = build_gateway(&source, Duration::from_secs(1)).expect("gateway");
    let description = gateway.describe();
    assert!(description.contains("127.0.0.1:9"));
    assert!(!description.contains("secret"));
}
