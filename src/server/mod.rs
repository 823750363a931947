//! HTTP front end.
//!
//! Requests are accepted on a blocking [`tiny_http::Server`] thread and each
//! one is served on its own tokio task: the path is resolved through the
//! [`Resolver`], directories are rendered as HTML listings and leaves are
//! streamed back with a guessed `Content-Type`.

mod render;
mod request;

pub use render::{escape_html, listing_page};
pub use request::{
    Target, TargetError, normalize_context_path, parse_target, percent_decode, percent_encode_path,
};

use anyhow::Result;
use log::{debug, info, warn};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::vfs::{Entry, ListingRecord, Resolver, VfsError};

/// Names hidden from every listing regardless of configuration.
pub const ALWAYS_RESERVED: [&str; 2] = ["WEB-INF", "META-INF"];

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub base_path: PathBuf,
    pub context_path: String,
    /// Extra names hidden from listings, compared case-insensitively
    pub reserved_names: Vec<String>,
}

/// A response ready to be written back to the client.
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Box<dyn Read + Send>,
    pub length: u64,
}

impl Reply {
    fn text(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::bytes(status, "text/plain; charset=utf-8", format!("{message}\n").into_bytes())
    }

    fn bytes(status: u16, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            length: data.len() as u64,
            body: Box::new(Cursor::new(data)),
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Read the whole body; used by tests and small error pages.
    pub fn into_body_bytes(mut self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.body.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn into_response(self) -> Response<Box<dyn Read + Send>> {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
            .collect();
        Response::new(
            StatusCode(self.status),
            headers,
            self.body,
            usize::try_from(self.length).ok(),
            None,
        )
    }
}

/// Request handling state shared by all connections.
#[derive(Debug)]
pub struct App {
    resolver: Resolver,
    context_path: String,
    reserved: Vec<String>,
}

impl App {
    pub fn new(config: ServerConfig) -> Self {
        let mut reserved: Vec<String> = ALWAYS_RESERVED.iter().map(|name| name.to_string()).collect();
        reserved.extend(config.reserved_names);
        Self {
            resolver: Resolver::new(config.base_path),
            context_path: normalize_context_path(&config.context_path),
            reserved,
        }
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn should_hide(&self, name: &str) -> bool {
        self.reserved.iter().any(|reserved| reserved.eq_ignore_ascii_case(name))
    }

    /// Produce the reply for a request line.
    pub async fn handle(&self, method: &Method, url: &str) -> Reply {
        if !matches!(method, Method::Get | Method::Head) {
            let mut reply = Reply::text(405, "method not allowed");
            reply.headers.push(("Allow", "GET, HEAD".to_string()));
            return reply;
        }

        let target = match parse_target(url, &self.context_path) {
            Ok(target) => target,
            Err(TargetError::OutsideContext) => return Reply::text(404, "not found"),
            Err(err) => return Reply::text(400, err.to_string()),
        };
        if target.path.split('/').any(|segment| self.should_hide(segment)) {
            return Reply::text(404, "not found");
        }

        match self.respond(&target).await {
            Ok(reply) => reply,
            Err(err) => {
                let status = status_for(&err);
                warn!("{}: {}", url, err);
                Reply::text(status, err.to_string())
            }
        }
    }

    async fn respond(&self, target: &Target) -> Result<Reply, VfsError> {
        let entry = self.resolver.resolve(&target.path).await?;

        if target.download {
            let content = entry.open_download().await?;
            let length = content.len();
            return Ok(Reply {
                status: 200,
                headers: vec![
                    ("Content-Type", "application/octet-stream".to_string()),
                    ("Content-Disposition", attachment(entry.name())),
                ],
                length,
                body: content.into_std_reader().await,
            });
        }

        if entry.is_directory() {
            return self.listing(&entry, target).await;
        }

        let content = entry.open_content().await?;
        let length = content.len();
        let mut headers = Vec::with_capacity(2);
        match mime_guess::from_path(entry.name()).first() {
            Some(mime) => headers.push(("Content-Type", mime.to_string())),
            None => {
                headers.push(("Content-Type", "application/octet-stream".to_string()));
                headers.push(("Content-Disposition", attachment(entry.name())));
            }
        }
        Ok(Reply {
            status: 200,
            headers,
            length,
            body: content.into_std_reader().await,
        })
    }

    async fn listing(&self, directory: &Entry, target: &Target) -> Result<Reply, VfsError> {
        let children = directory.list_children(&target.sort).await?;
        let local = chrono::Local;
        let records: Vec<ListingRecord> = children
            .iter()
            .filter(|child| child.is_parent_link() || !self.should_hide(child.name()))
            .map(|child| ListingRecord::from_entry(child, &self.context_path, &local))
            .collect();
        debug!("rendering {} records for {:?}", records.len(), directory.path());

        let page = listing_page(&directory.url_path(&self.context_path), &records);
        Ok(Reply::bytes(200, "text/html; charset=utf-8", page.into_bytes()))
    }

    /// Serve one tiny_http request to completion.
    pub async fn serve(&self, request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        let reply = self.handle(&method, &url).await;
        info!(
            "{} {} -> {} ({} bytes{})",
            method,
            url,
            reply.status,
            reply.length,
            reply.header("Content-Disposition").map_or("", |_| ", attachment")
        );

        let response = reply.into_response();
        match tokio::task::spawn_blocking(move || request.respond(response)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("{} {}: failed to write response: {}", method, url, err),
            Err(err) => warn!("{} {}: response task failed: {}", method, url, err),
        }
    }
}

/// Accept requests until the server is unblocked, serving each on its own task.
pub async fn run(server: Arc<Server>, app: Arc<App>) -> Result<()> {
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        for request in server.incoming_requests() {
            let app = app.clone();
            handle.spawn(async move { app.serve(request).await });
        }
    })
    .await?;
    info!("server stopped");
    Ok(())
}

/// HTTP status for a filesystem failure.
pub fn status_for(err: &VfsError) -> u16 {
    match err {
        VfsError::NotFound { .. } | VfsError::ArchiveUnreadable { .. } => 404,
        VfsError::ListingUnavailable { .. } => 500,
        VfsError::NotADirectory { .. } | VfsError::IsADirectory { .. } => 400,
    }
}

fn attachment(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect();
    format!("attachment; filename=\"{name}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(dir: &std::path::Path, context_path: &str) -> App {
        App::new(ServerConfig {
            base_path: dir.to_path_buf(),
            context_path: context_path.to_string(),
            reserved_names: vec!["listing.xsl".to_string()],
        })
    }

    fn body_text(reply: Reply) -> String {
        String::from_utf8(reply.into_body_bytes().unwrap()).unwrap()
    }

    #[test]
    fn reserved_names_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "");
        assert!(app.should_hide("web-inf"));
        assert!(app.should_hide("META-INF"));
        assert!(app.should_hide("Listing.XSL"));
        assert!(!app.should_hide("docs"));
    }

    #[test]
    fn attachment_names_stay_ascii() {
        assert_eq!(attachment("a b.bin"), "attachment; filename=\"a b.bin\"");
        assert_eq!(attachment("x\"ü.bin"), "attachment; filename=\"x__.bin\"");
    }

    #[tokio::test]
    async fn serves_text_with_guessed_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello there").unwrap();
        let app = app(dir.path(), "/files");

        let reply = app.handle(&Method::Get, "/files/notes.txt").await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("Content-Type"), Some("text/plain"));
        assert_eq!(reply.header("Content-Disposition"), None);
        assert_eq!(reply.length, 11);
        assert_eq!(body_text(reply), "hello there");
    }

    #[tokio::test]
    async fn unknown_type_and_download_are_attachments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.qqq9"), b"\x00\x01").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        let app = app(dir.path(), "");

        let reply = app.handle(&Method::Get, "/blob.qqq9").await;
        assert_eq!(reply.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(reply.header("Content-Disposition"), Some("attachment; filename=\"blob.qqq9\""));

        let reply = app.handle(&Method::Get, "/notes.txt?download").await;
        assert_eq!(reply.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(body_text(reply), "hi");
    }

    #[tokio::test]
    async fn listing_hides_reserved_and_dot_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("WEB-INF")).unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("listing.xsl"), b"x").unwrap();
        std::fs::write(dir.path().join(".secret"), b"x").unwrap();
        std::fs::write(dir.path().join("docs/readme.md"), b"# hi").unwrap();
        let app = app(dir.path(), "/files");

        let reply = app.handle(&Method::Get, "/files/").await;
        assert_eq!(reply.status, 200);
        let page = body_text(reply);
        assert!(page.contains("href=\"/files/docs\""));
        assert!(!page.contains("WEB-INF"));
        assert!(!page.contains("listing.xsl"));
        assert!(!page.contains(".secret"));

        let page = body_text(app.handle(&Method::Get, "/files/docs?sort=NAME").await);
        assert!(page.contains("href=\"/files/\">../</a>"));
        assert!(page.contains("href=\"/files/docs/readme.md?download\""));
    }

    #[tokio::test]
    async fn error_statuses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::create_dir(dir.path().join("WEB-INF")).unwrap();
        std::fs::write(dir.path().join("broken.zip"), b"nope").unwrap();
        let app = app(dir.path(), "/files");

        assert_eq!(app.handle(&Method::Get, "/files/missing").await.status, 404);
        assert_eq!(app.handle(&Method::Get, "/files/broken.zip").await.status, 404);
        assert_eq!(app.handle(&Method::Get, "/elsewhere/docs").await.status, 404);
        assert_eq!(app.handle(&Method::Get, "/files/WEB-INF").await.status, 404);
        assert_eq!(app.handle(&Method::Get, "/files/docs?sort=COLOR").await.status, 400);
        assert_eq!(app.handle(&Method::Get, "/files/docs?download").await.status, 400);
        assert_eq!(app.handle(&Method::Post, "/files/docs").await.status, 405);
    }
}
