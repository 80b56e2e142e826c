//! Integration tests: `UploadSession` + `HttpBackend` against a mock OCR
//! backend speaking the real wire format.

use pdfocr_client::{
    ClientConfig, ClientError, HttpBackend, NoopNotifier, Notice, Notifier, OcrBackend,
    RequestStep, SelectedFile, Tag, UiState, UploadSession,
};
use std::sync::{Mutex, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs to the test harness; filter with RUST_LOG.
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn backend_for(server: &MockServer) -> HttpBackend {
    init_tracing();
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .build()
        .expect("valid config");
    HttpBackend::new(config).expect("client")
}

fn drawing() -> SelectedFile {
    SelectedFile::pdf("drawing.pdf", b"%PDF-1.7\n%test body\n".to_vec())
}

#[derive(Default)]
struct Alerts(Mutex<Vec<Notice>>);

impl Notifier for Alerts {
    fn alert(&self, notice: &Notice) {
        self.0.lock().unwrap().push(notice.clone());
    }

    fn on_state_change(&self, _state: &UiState) {}
}

impl Alerts {
    fn take(&self) -> Vec<Notice> {
        self.0.lock().unwrap().drain(..).collect()
    }
}

async fn mount_upload_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "File processed successfully",
            "download_url": "/download"
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Submission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_uploads_then_fetches_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_exists("content-type"))
        .and(body_string_contains(r#"name="file""#))
        .and(body_string_contains(r#"filename="drawing.pdf""#))
        .and(body_string_contains("%PDF-1.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "File processed successfully",
            "download_url": "/download"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tags": [
                {"Tag": "PT", "Count": 12},
                {"Tag": "FT", "Count": 5},
                {"Tag": "LT", "Count": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let alerts = Alerts::default();
    let mut session = UploadSession::new(backend_for(&server), &alerts);
    session.select_file(drawing());
    session.submit().await.expect("submit ok");

    let state = session.state();
    assert!(!state.uploading);
    assert_eq!(state.download_url.as_deref(), Some("/download"));
    assert_eq!(
        state.tags,
        vec![Tag::new("PT", 12), Tag::new("FT", 5), Tag::new("LT", 1)]
    );
    assert_eq!(
        session.download_link(&server.uri()),
        Some(format!("{}/download", server.uri()))
    );
    assert_eq!(alerts.take(), vec![Notice::Success]);
}

#[tokio::test]
async fn rejected_upload_skips_tags_and_reports_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Invalid file format. Only PDFs are allowed"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"tags": []})))
        .expect(0)
        .mount(&server)
        .await;

    let alerts = Alerts::default();
    let mut session = UploadSession::new(backend_for(&server), &alerts);
    session.select_file(drawing());
    let err = session.submit().await.unwrap_err();

    match err {
        ClientError::RequestFailed { step, detail, .. } => {
            assert_eq!(step, RequestStep::Upload);
            assert!(detail.contains("400"), "got: {detail}");
            assert!(detail.contains("Only PDFs are allowed"), "got: {detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.state().download_url, None);
    assert!(session.state().tags.is_empty());
    assert!(!session.state().uploading);
    assert_eq!(alerts.take(), vec![Notice::Failure]);
}

#[tokio::test]
async fn failing_tags_keeps_download_url() {
    let server = MockServer::start().await;
    mount_upload_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = UploadSession::new(backend_for(&server), NoopNotifier);
    session.select_file(drawing());
    let err = session.submit().await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RequestFailed {
            step: RequestStep::Tags,
            ..
        }
    ));
    assert_eq!(session.state().download_url.as_deref(), Some("/download"));
    assert!(session.state().tags.is_empty());
    assert!(!session.state().uploading);
}

#[tokio::test]
async fn malformed_tags_body_is_a_request_failure() {
    let server = MockServer::start().await;
    mount_upload_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let mut session = UploadSession::new(backend_for(&server), NoopNotifier);
    session.select_file(drawing());
    let err = session.submit().await.unwrap_err();

    match err {
        ClientError::RequestFailed { step, detail, .. } => {
            assert_eq!(step, RequestStep::Tags);
            assert!(detail.contains("invalid response body"), "got: {detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn submit_without_file_hits_no_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let alerts = Alerts::default();
    let mut session = UploadSession::new(backend_for(&server), &alerts);
    let err = session.submit().await.unwrap_err();

    assert!(matches!(err, ClientError::NoFileSelected));
    assert_eq!(alerts.take(), vec![Notice::NoFileSelected]);
}

#[tokio::test]
async fn unreachable_backend_is_a_request_failure() {
    init_tracing();
    // Nothing listens on port 1.
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let backend = HttpBackend::new(config).unwrap();

    let err = backend.upload(&drawing()).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::RequestFailed {
            step: RequestStep::Upload,
            ..
        }
    ));
}

#[tokio::test]
async fn configured_timeout_applies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({"tags": []})),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .request_timeout_secs(1)
        .build()
        .unwrap();
    let backend = HttpBackend::new(config).unwrap();

    let err = backend.fetch_tags().await.unwrap_err();
    match err {
        ClientError::RequestFailed { detail, .. } => {
            assert!(detail.contains("timed out"), "got: {detail}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Download ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn download_into_directory_uses_content_disposition() {
    let server = MockServer::start().await;
    let payload = b"PK\x03\x04 fake xlsx".to_vec();
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    r#"attachment; filename="extracted_data.xlsx""#,
                )
                .set_body_bytes(payload.clone()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let written = backend_for(&server)
        .download("/download", dir.path())
        .await
        .expect("download ok");

    assert_eq!(written, dir.path().join("extracted_data.xlsx"));
    assert_eq!(std::fs::read(&written).unwrap(), payload);
}

#[tokio::test]
async fn download_to_explicit_file_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("result.xlsx");
    let written = backend_for(&server)
        .download("download", &target)
        .await
        .expect("download ok");

    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"data");
}

#[tokio::test]
async fn download_without_filename_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let written = backend_for(&server)
        .download("/download", dir.path())
        .await
        .unwrap();

    assert_eq!(
        written.file_name().and_then(|n| n.to_str()),
        Some(pdfocr_client::backend::DEFAULT_DOWNLOAD_NAME)
    );
}

#[tokio::test]
async fn download_404_is_a_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = backend_for(&server)
        .download("/download", dir.path())
        .await
        .unwrap_err();

    match err {
        ClientError::RequestFailed { step, detail, .. } => {
            assert_eq!(step, RequestStep::Download);
            assert!(detail.contains("404"), "got: {detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn truncated_download_leaves_no_file() {
    init_tracing();
    // Promise 100 000 bytes, send a handful, hang up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\nPK partial")
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    let config = ClientConfig::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();
    let backend = HttpBackend::new(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("result.xlsx");
    let err = backend.download("/download", &target).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RequestFailed {
            step: RequestStep::Download,
            ..
        }
    ));
    assert!(!target.exists(), "partial file left at {}", target.display());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
