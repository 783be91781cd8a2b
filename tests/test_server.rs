//! End-to-end HTTP tests against a pdftk stand-in script.
#![cfg(unix)]

use fillpdf_lib::api::{self, AppState};
use fillpdf_lib::fdf::{self, CheckboxLexicon, Form};
use fillpdf_lib::ops::Context;
use fillpdf_lib::pdftk::Pdftk;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// fill_form echoes the FDF it was given, multistamp concatenates base + stamp.
const FAKE_PDFTK: &str = r#"#!/bin/sh
case "$2" in
  fill_form)
    [ -f "$1" ] || { echo "Error: Unable to find file: $1" >&2; exit 1; }
    cat "$3" > "$5" ;;
  multistamp)
    cat "$1" "$3" > "$5" ;;
  *)
    echo "unexpected operation: $2" >&2; exit 2 ;;
esac
"#;

/// Written once per test binary, before any test spawns a process.
fn fake_pdftk() -> &'static Path {
    static BIN: OnceLock<(tempfile::TempDir, PathBuf)> = OnceLock::new();
    let (_, path) = BIN.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdftk");
        std::fs::write(&path, FAKE_PDFTK).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        (dir, path)
    });
    path
}

struct TestServer {
    base_url: String,
    scratch: tempfile::TempDir,
    files: tempfile::TempDir,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(Pdftk::new(fake_pdftk(), Some(Duration::from_secs(30))), 1024 * 1024).await
    }

    async fn start_with(pdftk: Pdftk, body_limit: usize) -> Self {
        // Make sure the script exists before this test forks anything
        fake_pdftk();

        let scratch = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let state = AppState::new(Context::new(pdftk, scratch.path()), "1.2.3-test", body_limit);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api::router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            scratch,
            files,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn template(&self) -> PathBuf {
        let path = self.files.path().join("template.pdf");
        std::fs::write(&path, b"%PDF-1.4 template").unwrap();
        path
    }

    fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }
}

#[tokio::test]
async fn test_healthcheck_and_version() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/healthcheck")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = server.client.get(server.url("/version")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "1.2.3-test");
}

#[tokio::test]
async fn test_fillform_returns_tool_output() {
    let server = TestServer::start().await;
    let template = server.template();

    let res = server
        .client
        .post(server.url("/fillform"))
        .json(&serde_json::json!({
            "form": {"Name": "Jöhn Doe", "Subscribe": true},
            "filename": template,
            "checkedString": "Yes",
            "uncheckedString": "No",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/pdf");

    let form: Form = serde_json::from_str(r#"{"Name": "Jöhn Doe", "Subscribe": true}"#).unwrap();
    let expected = fdf::to_bytes(&form, &CheckboxLexicon::new("Yes", "No")).unwrap();
    assert_eq!(res.bytes().await.unwrap().as_ref(), expected.as_slice());
    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_fillform_missing_template_is_500_and_cleans_up() {
    let server = TestServer::start().await;
    let missing = server.files.path().join("missing.pdf");

    let res = server
        .client
        .post(server.url("/fillform"))
        .json(&serde_json::json!({"form": {"a": "b"}, "filename": missing}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert_eq!(body, "pdftk reported an error");
    assert!(!body.contains("missing.pdf"), "internal paths must not leak");
    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let server = TestServer::start().await;

    for path in ["/fillform", "/multistamp"] {
        let res = server.client.post(server.url(path)).body("{oops").send().await.unwrap();
        assert_eq!(res.status(), 400);
        assert_eq!(res.text().await.unwrap(), "invalid input json");
    }
    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let server = TestServer::start().await;

    for path in ["/fillform", "/multistamp"] {
        let res = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 405);
        assert_eq!(res.text().await.unwrap(), "post requests only");
    }
}

#[tokio::test]
async fn test_multistamp_round_trip() {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    let server = TestServer::start().await;
    let res = server
        .client
        .post(server.url("/multistamp"))
        .json(&serde_json::json!({
            "signaturePDF": BASE64.encode(b"%STAMP"),
            "formPDF": BASE64.encode(b"%BASE"),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"%BASE%STAMP");
    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_multistamp_accepts_line_wrapped_base64() {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    // What `base64` from coreutils or a MIME encoder produces: 76 columns per line
    let stamp: Vec<u8> = b"%STAMP ".iter().copied().chain(0..=255u8).collect();
    let encoded = BASE64.encode(&stamp);
    let wrapped: Vec<&str> = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect();
    assert!(wrapped.len() > 1);

    let server = TestServer::start().await;
    let res = server
        .client
        .post(server.url("/multistamp"))
        .json(&serde_json::json!({
            "signaturePDF": wrapped.join("\r\n") + "\r\n",
            "formPDF": BASE64.encode(b"%BASE"),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.bytes().await.unwrap().as_ref(), [b"%BASE".as_slice(), &stamp].concat());
    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_multistamp_bad_base64_is_400() {
    let server = TestServer::start().await;
    let res = server
        .client
        .post(server.url("/multistamp"))
        .json(&serde_json::json!({"signaturePDF": "not base64!", "formPDF": ""}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    assert_eq!(res.text().await.unwrap(), "could not decode signature file");
}

#[tokio::test]
async fn test_missing_pdftk_is_500() {
    let server = TestServer::start_with(Pdftk::new("/nonexistent/pdftk", None), 1024 * 1024).await;
    let template = server.template();

    let res = server
        .client
        .post(server.url("/fillform"))
        .json(&serde_json::json!({"form": {}, "filename": template}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(server.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_body_limit() {
    let server = TestServer::start_with(Pdftk::new(fake_pdftk(), None), 1024).await;
    let huge = "A".repeat(4096);

    let res = server
        .client
        .post(server.url("/multistamp"))
        .json(&serde_json::json!({"signaturePDF": huge, "formPDF": ""}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fillform_requests_are_isolated() {
    let server = TestServer::start().await;
    let template = server.template();
    let lexicon = CheckboxLexicon::new("On", "Off");

    let requests = (0..16).map(|i| {
        let client = server.client.clone();
        let url = server.url("/fillform");
        let body = serde_json::json!({
            "form": {"Name": format!("Person {}", i), "Index": i, "Even": i % 2 == 0},
            "filename": template,
            "checkedString": "On",
            "uncheckedString": "Off",
        });
        async move {
            let res = client.post(url).json(&body).send().await.unwrap();
            assert_eq!(res.status(), 200);
            (body, res.bytes().await.unwrap())
        }
    });

    for (body, bytes) in futures::future::join_all(requests).await {
        let form: Form = serde_json::from_value(body["form"].clone()).unwrap();
        let expected = fdf::to_bytes(&form, &lexicon).unwrap();
        assert_eq!(bytes.as_ref(), expected.as_slice());
    }
    assert_eq!(server.leftover_workspaces(), 0);
}
