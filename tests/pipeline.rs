//! Integration tests for the ingestion pipeline and batch analyzer.
//!
//! The three collaborator traits are replaced by in-memory fakes so the
//! tests can observe exactly which downloads, uploads, and analysis calls
//! the pipeline makes.

use async_trait::async_trait;
use review_harness::analyze::analyze_records;
use review_harness::catalog::CatalogIndex;
use review_harness::config::Pacing;
use review_harness::error::{AnalysisError, SourceError, StoreError};
use review_harness::export::{read_results, write_results};
use review_harness::ingest::ingest_references;
use review_harness::models::{
    FileId, FileMetadata, FileRecord, RemoteBlobHandle, RosterRow, NO_ANALYSIS, UNKNOWN_STUDENT,
};
use review_harness::roster::build_roster;
use review_harness::traits::{AnalysisService, RemoteStore, SourceStore};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

// ─── Fakes ──────────────────────────────────────────────────────────

const PDF_BYTES: &[u8] = b"%PDF-1.4 fake body";

#[derive(Default)]
struct FakeSource {
    /// file id → display name (`None` = file exists without a name)
    files: HashMap<String, Option<String>>,
    failing_metadata: HashSet<String>,
    failing_download: HashSet<String>,
    downloads: Mutex<Vec<String>>,
    staged_paths: Mutex<Vec<PathBuf>>,
}

impl FakeSource {
    fn with_file(mut self, id: &str, name: &str) -> Self {
        self.files.insert(id.to_string(), Some(name.to_string()));
        self
    }

    fn with_unnamed_file(mut self, id: &str) -> Self {
        self.files.insert(id.to_string(), None);
        self
    }

    fn failing_metadata(mut self, id: &str) -> Self {
        self.failing_metadata.insert(id.to_string());
        self
    }

    fn failing_download(mut self, id: &str, name: &str) -> Self {
        self.failing_download.insert(id.to_string());
        self.with_file(id, name)
    }

    fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceStore for FakeSource {
    async fn metadata(&self, id: &FileId) -> Result<FileMetadata, SourceError> {
        if self.failing_metadata.contains(id.as_str()) {
            return Err(SourceError::Transport("HTTP 500".to_string()));
        }
        match self.files.get(id.as_str()) {
            Some(name) => Ok(FileMetadata { name: name.clone() }),
            None => Err(SourceError::NotFound(id.to_string())),
        }
    }

    async fn download(&self, id: &FileId, dest: &Path) -> Result<u64, SourceError> {
        self.downloads.lock().unwrap().push(id.to_string());
        self.staged_paths.lock().unwrap().push(dest.to_path_buf());
        assert!(dest.exists(), "staging file must exist before download");

        if self.failing_download.contains(id.as_str()) {
            std::fs::write(dest, &PDF_BYTES[..4])?;
            return Err(SourceError::Transport("connection reset".to_string()));
        }
        std::fs::write(dest, PDF_BYTES)?;
        Ok(PDF_BYTES.len() as u64)
    }
}

#[derive(Default)]
struct FakeRemote {
    listing: Vec<RemoteBlobHandle>,
    list_fails: bool,
    quota_exhausted_for: HashSet<String>,
    uploads: Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl FakeRemote {
    fn uploads(&self) -> Vec<(String, String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn list(&self) -> Result<Vec<RemoteBlobHandle>, StoreError> {
        if self.list_fails {
            return Err(StoreError::Transport("HTTP 503".to_string()));
        }
        Ok(self.listing.clone())
    }

    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        content_type: &str,
    ) -> Result<RemoteBlobHandle, StoreError> {
        if self.quota_exhausted_for.contains(display_name) {
            return Err(StoreError::QuotaExceeded("storage quota".to_string()));
        }
        let bytes = std::fs::read(path)?;
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((display_name.to_string(), content_type.to_string(), bytes));
        Ok(handle(&format!("files/up{}", uploads.len()), display_name))
    }
}

#[derive(Clone, Copy)]
enum Outcome {
    Text(&'static str),
    RateLimited,
    ServiceDown,
    Garbled,
}

#[derive(Default)]
struct ScriptedAnalysis {
    /// blob uri → outcome; unlisted uris answer "ok"
    script: HashMap<String, Outcome>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedAnalysis {
    fn on(mut self, record: &FileRecord, outcome: Outcome) -> Self {
        self.script.insert(record.remote.uri.clone(), outcome);
        self
    }
}

#[async_trait]
impl AnalysisService for ScriptedAnalysis {
    async fn generate(
        &self,
        prompt: &str,
        blob: &RemoteBlobHandle,
    ) -> Result<String, AnalysisError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), blob.uri.clone()));
        match self.script.get(&blob.uri).copied().unwrap_or(Outcome::Text("ok")) {
            Outcome::Text(t) => Ok(t.to_string()),
            Outcome::RateLimited => Err(AnalysisError::RateLimited("quota exhausted".to_string())),
            Outcome::ServiceDown => Err(AnalysisError::Service {
                status: 503,
                message: "unavailable".to_string(),
            }),
            Outcome::Garbled => Err(AnalysisError::Malformed("expected value".to_string())),
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn handle(name: &str, display_name: &str) -> RemoteBlobHandle {
    RemoteBlobHandle {
        name: name.to_string(),
        uri: format!("https://store.test/v1beta/{}", name),
        display_name: display_name.to_string(),
        mime_type: Some("application/pdf".to_string()),
        create_time: None,
        expiration_time: None,
    }
}

fn link(id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view?usp=sharing", id)
}

fn record(id: &str, display_name: &str, student: &str) -> FileRecord {
    FileRecord {
        identifier: FileId::new(id),
        display_name: display_name.to_string(),
        resolved_name: student.to_string(),
        remote: handle(&format!("files/{}", id), display_name),
    }
}

fn pacing() -> Pacing {
    Pacing {
        upload_delay: Duration::ZERO,
        analysis_delay: Duration::from_secs(1),
        rate_limit_backoff: Duration::from_secs(5),
    }
}

// ─── Ingestion ──────────────────────────────────────────────────────

#[tokio::test]
async fn cache_hit_reuses_handle_without_transfer() {
    let source = FakeSource::default()
        .with_file("cached", "(2023) John Smith_A1b2_extra.pdf")
        .with_file("fresh", "(2023) Jane Roe_Z9_essay.pdf");
    let cached = handle("files/existing", "(2023) John Smith_A1b2_extra.pdf");
    let remote = FakeRemote {
        listing: vec![cached.clone()],
        ..Default::default()
    };

    let catalog = CatalogIndex::build(&remote).await;
    let records = ingest_references(
        &source,
        &remote,
        &catalog,
        &[link("cached"), link("fresh")],
        &Pacing::none(),
    )
    .await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].identifier.as_str(), "cached");
    assert_eq!(records[0].remote, cached);
    assert_eq!(records[0].resolved_name, "John Smith");

    assert_eq!(source.downloads(), vec!["fresh".to_string()]);
    let uploads = remote.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "(2023) Jane Roe_Z9_essay.pdf");
    assert_eq!(uploads[0].1, "application/pdf");
    assert_eq!(uploads[0].2, PDF_BYTES);
    assert_eq!(records[1].remote.display_name, "(2023) Jane Roe_Z9_essay.pdf");
    assert_eq!(records[1].resolved_name, "Jane Roe");
}

#[tokio::test]
async fn failing_references_are_skipped_in_order() {
    let source = FakeSource::default()
        .with_file("a", "(1) Alice Adams_X1.pdf")
        .failing_metadata("b")
        .with_unnamed_file("c")
        .failing_download("d", "(1) Dan Dole_X4.pdf")
        .with_file("e", "(1) Eve Evans_X5_hw.pdf")
        .with_file("f", "(1) Fay Fox_X6.pdf");
    let remote = FakeRemote {
        quota_exhausted_for: ["(1) Fay Fox_X6.pdf".to_string()].into_iter().collect(),
        ..Default::default()
    };

    let references = vec![
        link("a"),
        "https://example.com/not-a-drive-link".to_string(),
        link("b"),
        link("c"),
        link("d"),
        link("missing"),
        link("f"),
        link("e"),
    ];
    let records = ingest_references(
        &source,
        &remote,
        &CatalogIndex::empty(),
        &references,
        &Pacing::none(),
    )
    .await;

    let ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["a", "e"]);
    assert!(records.len() <= references.len());
    assert_eq!(records[1].resolved_name, "Eve Evans");
}

#[tokio::test]
async fn unparseable_name_gets_placeholder() {
    let source = FakeSource::default().with_file("x", "(2023) A1B2C3");
    let remote = FakeRemote::default();

    let records = ingest_references(
        &source,
        &remote,
        &CatalogIndex::empty(),
        &[link("x")],
        &Pacing::none(),
    )
    .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resolved_name, UNKNOWN_STUDENT);
    assert_eq!(records[0].display_name, "(2023) A1B2C3");
}

#[tokio::test]
async fn staging_files_never_outlive_their_item() {
    let source = FakeSource::default()
        .with_file("ok", "(1) Ok Person_A1.pdf")
        .failing_download("bad", "(1) Bad Person_B2.pdf");
    let remote = FakeRemote::default();

    let records = ingest_references(
        &source,
        &remote,
        &CatalogIndex::empty(),
        &[link("ok"), link("bad")],
        &Pacing::none(),
    )
    .await;

    assert_eq!(records.len(), 1);
    let staged = source.staged_paths.lock().unwrap().clone();
    assert_eq!(staged.len(), 2);
    assert_ne!(staged[0], staged[1]);
    for path in staged {
        assert!(!path.exists(), "staging file left behind: {}", path.display());
    }
}

#[tokio::test]
async fn catalog_listing_failure_uploads_everything() {
    let source = FakeSource::default().with_file("a", "(1) Alice Adams_X1.pdf");
    let remote = FakeRemote {
        listing: vec![handle("files/old", "(1) Alice Adams_X1.pdf")],
        list_fails: true,
        ..Default::default()
    };

    let catalog = CatalogIndex::build(&remote).await;
    assert!(catalog.is_empty());

    let records =
        ingest_references(&source, &remote, &catalog, &[link("a")], &Pacing::none()).await;
    assert_eq!(records.len(), 1);
    assert_eq!(remote.uploads().len(), 1);
    assert_ne!(records[0].remote.name, "files/old");
}

#[tokio::test(start_paused = true)]
async fn pauses_only_after_successful_uploads() {
    let source = FakeSource::default()
        .with_file("up1", "(1) Ann Lee_A1_hw.pdf")
        .with_file("hit", "(1) Cached Person_C3_hw.pdf")
        .failing_download("broken", "(1) Ben Ray_B2_hw.pdf")
        .with_file("up2", "(1) Dee Fox_D4_hw.pdf");
    let remote = FakeRemote {
        listing: vec![handle("files/old", "(1) Cached Person_C3_hw.pdf")],
        ..Default::default()
    };
    let pacing = Pacing {
        upload_delay: Duration::from_secs(3),
        analysis_delay: Duration::ZERO,
        rate_limit_backoff: Duration::ZERO,
    };

    let catalog = CatalogIndex::build(&remote).await;
    let start = tokio::time::Instant::now();
    let records = ingest_references(
        &source,
        &remote,
        &catalog,
        &[link("up1"), link("hit"), link("broken"), link("up2")],
        &pacing,
    )
    .await;
    let elapsed = start.elapsed();

    let ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["up1", "hit", "up2"]);
    assert_eq!(remote.uploads().len(), 2);

    // one pause per completed upload; the cache hit and the failed item add none
    assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(7), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn empty_reference_list() {
    let records = ingest_references(
        &FakeSource::default(),
        &FakeRemote::default(),
        &CatalogIndex::empty(),
        &[],
        &Pacing::none(),
    )
    .await;
    assert!(records.is_empty());
}

// ─── Analysis ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn rate_limit_backs_off_and_batch_continues() {
    let records = vec![
        record("a", "a.pdf", "Alice Adams"),
        record("b", "b.pdf", "Bob Brown"),
        record("c", "c.pdf", "Cy Cole"),
    ];
    let service = ScriptedAnalysis::default()
        .on(&records[0], Outcome::Text("  First.  "))
        .on(&records[1], Outcome::RateLimited)
        .on(&records[2], Outcome::Text("Third."));

    let start = tokio::time::Instant::now();
    let results = analyze_records(&service, "Grade this.", &records, &pacing()).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].file_id, "a");
    assert_eq!(results[0].analysis, "First.");
    assert_eq!(results[1].file_id, "c");
    assert_eq!(results[1].analysis, "Third.");

    // two successful pauses plus one backoff
    assert!(elapsed >= Duration::from_secs(7), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(8), "elapsed {:?}", elapsed);
    assert_eq!(service.calls.lock().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn service_errors_back_off_but_malformed_responses_do_not() {
    let records = vec![
        record("a", "a.pdf", "Alice Adams"),
        record("b", "b.pdf", "Bob Brown"),
    ];

    let service = ScriptedAnalysis::default()
        .on(&records[0], Outcome::ServiceDown)
        .on(&records[1], Outcome::Garbled);
    let start = tokio::time::Instant::now();
    let results = analyze_records(&service, "p", &records, &pacing()).await;
    let elapsed = start.elapsed();

    assert!(results.is_empty());
    assert!(elapsed >= Duration::from_secs(5), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(6), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn empty_response_uses_placeholder_text() {
    let records = vec![record("a", "a.pdf", "Alice Adams")];
    let service = ScriptedAnalysis::default().on(&records[0], Outcome::Text("   \n"));

    let results = analyze_records(&service, "p", &records, &Pacing::none()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].analysis, NO_ANALYSIS);
}

#[tokio::test]
async fn prompt_and_blob_reference_are_submitted() {
    let records = vec![record("a", "a.pdf", "Alice Adams")];
    let service = ScriptedAnalysis::default();

    analyze_records(&service, "Summarize.", &records, &Pacing::none()).await;

    let calls = service.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![(
            "Summarize.".to_string(),
            "https://store.test/v1beta/files/a".to_string()
        )]
    );
}

// ─── End to end ─────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_analyze_and_persist() {
    let tmp = TempDir::new().unwrap();
    let source = FakeSource::default()
        .with_file("a", "Essay (Final) John Smith_A1b2_extra.pdf")
        .with_file("b", "scan_0001_final.pdf");
    let remote = FakeRemote::default();

    let catalog = CatalogIndex::build(&remote).await;
    let records = ingest_references(
        &source,
        &remote,
        &catalog,
        &[
            link("a"),
            "https://drive.google.com/open?id=b".to_string(),
        ],
        &Pacing::none(),
    )
    .await;
    assert_eq!(records.len(), 2);

    let service = ScriptedAnalysis::default();
    let results = analyze_records(&service, "Grade.", &records, &Pacing::none()).await;

    let path = tmp.path().join("responses.json");
    write_results(&path, &results).unwrap();
    let loaded = read_results(&path).unwrap();

    assert_eq!(loaded, results);
    assert_eq!(loaded[0].file_name, "Essay (Final) John Smith_A1b2_extra.pdf");
    assert_eq!(loaded[0].file_id, "a");
    assert_eq!(loaded[0].student_name, "John Smith");
    assert_eq!(loaded[0].analysis, "ok");
    assert_eq!(loaded[1].student_name, "scan");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let keys: Vec<&String> = raw[0].as_object().unwrap().keys().collect();
    let mut expected = vec!["analysis", "file_id", "file_name", "student_name"];
    expected.sort();
    assert_eq!(keys, expected);
}

// ─── Roster ─────────────────────────────────────────────────────────

#[tokio::test]
async fn roster_marks_each_failure_kind() {
    let source = FakeSource::default()
        .with_file("a", "(1) Ana Maria Pérez_X1_hw.pdf")
        .failing_metadata("b")
        .with_file("c", "(1) 9Z")
        .with_file("d", "(1) Cher_Q7");

    let references = vec![
        link("a"),
        "not a link".to_string(),
        String::new(),
        link("b"),
        link("c"),
        link("d"),
    ];
    let rows = build_roster(&source, &references).await;

    assert_eq!(
        rows,
        vec![
            RosterRow::Named {
                first_name: "Ana".into(),
                last_name: "Maria Pérez".into(),
                link: link("a"),
            },
            RosterRow::Failed {
                reason: "Invalid link",
                link: "not a link".into(),
            },
            RosterRow::Failed {
                reason: "API error",
                link: link("b"),
            },
            RosterRow::Failed {
                reason: "Could not parse name",
                link: link("c"),
            },
            RosterRow::Named {
                first_name: "Cher".into(),
                last_name: String::new(),
                link: link("d"),
            },
        ]
    );
}
