mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::{TempDir, tempdir};
use tiny_http::Server;

use common::{SUMMARY, library_zip, reports_tree, write_file};
use zipbrowse::server::{self, App, ServerConfig};

struct Running {
    _base: TempDir,
    addr: SocketAddr,
    server: Arc<Server>,
    task: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl Running {
    async fn start() -> Self {
        let base = tempdir().unwrap();
        reports_tree(base.path());
        library_zip(base.path());
        write_file(&base.path().join("META-INF/MANIFEST.MF"), b"Manifest-Version: 1.0\n");

        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let app = Arc::new(App::new(ServerConfig {
            base_path: base.path().to_path_buf(),
            context_path: "/artifacts".to_string(),
            reserved_names: Vec::new(),
        }));
        let task = tokio::spawn(server::run(server.clone(), app));
        Self {
            _base: base,
            addr,
            server,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        self.server.unblock();
        self.task.await.unwrap().unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn browses_into_archives() {
    let running = Running::start().await;

    let response = reqwest::get(running.url("/artifacts/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    let page = response.text().await.unwrap();
    assert!(page.contains("href=\"/artifacts/reports\""));
    assert!(page.contains("href=\"/artifacts/lib.zip?download\""));
    assert!(!page.contains("META-INF"));

    let page = reqwest::get(running.url("/artifacts/reports/q1.zip/charts?sort=SIZE"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("href=\"/artifacts/reports/q1.zip\">../</a>"));
    assert!(page.contains("fig1.png"));
    assert!(page.contains("0.9 kb"));

    running.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn serves_member_bytes() {
    let running = Running::start().await;

    let response = reqwest::get(running.url("/artifacts/reports/q1.zip/summary.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(response.headers()["content-length"], "12");
    assert_eq!(response.bytes().await.unwrap().as_ref(), SUMMARY);

    let response = reqwest::get(running.url("/artifacts/reports/q1.zip?download"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/octet-stream");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"q1.zip\""
    );
    let body = response.bytes().await.unwrap();
    assert_eq!(&body[..4], b"PK\x03\x04");

    running.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn maps_failures_to_statuses() {
    let running = Running::start().await;

    for (path, status) in [
        ("/artifacts/reports/q2.zip", 404),
        ("/artifacts/reports/q1.zip/missing.txt", 404),
        ("/artifacts/META-INF/MANIFEST.MF", 404),
        ("/other/reports", 404),
        ("/artifacts/reports?sort=COLOR", 400),
        ("/artifacts/reports/q1.zip/summary.txt?sort=NAME", 200),
        ("/artifacts/reports/q1.zip/charts?download", 400),
    ] {
        let response = reqwest::get(running.url(path)).await.unwrap();
        assert_eq!(response.status().as_u16(), status, "{path}");
    }

    running.stop().await;
}
