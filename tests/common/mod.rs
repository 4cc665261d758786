//! Test utilities and helper functions for the autoimage test suite

use anyhow::Result;
use autoimage::GrabberConfig;
use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;

/// Creates a temporary directory for test files
#[allow(dead_code)]
pub fn create_test_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body>
    {}
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

/// A news article page with a main image inside an `entry` container
#[allow(dead_code)]
pub fn create_article_html(src: &str, alt: &str) -> String {
    create_test_html(
        "Story",
        &format!(
            r#"<div id="header"><img src="/logo.png" alt="Logo"></div>
    <div class="entry">
        <h1>Story</h1>
        <img src="{src}" alt="{alt}">
        <img src="/img/second.jpg" alt="Second">
    </div>"#
        ),
    )
}

/// Sets up a mock HTTP server
#[allow(dead_code)]
pub async fn setup_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Creates a mock endpoint that returns HTML content
#[allow(dead_code)]
pub async fn create_html_mock(server: &mut Server, path: &str, html: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(html)
        .create_async()
        .await
}

/// Creates a mock endpoint that returns an error
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}

/// Configuration matching the article fixture, resolving relative links
/// against the mock server
#[allow(dead_code)]
pub fn create_test_config(server: &Server) -> GrabberConfig {
    GrabberConfig::builder()
        .image_class("X")
        .image_queries([r#"//*[@class="entry"]//img[1]"#])
        .site_url(server.url())
        .fetch_timeout_secs(2)
        .build()
        .expect("Failed to create test config")
}

/// An http URL on a local port nothing listens on
#[allow(dead_code)]
pub fn unreachable_url(path: &str) -> Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(format!("http://127.0.0.1:{port}{path}"))
}

/// An http URL served by a listener that accepts connections and never answers
#[allow(dead_code)]
pub async fn spawn_stalled_server(path: &str) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    Ok(format!("http://127.0.0.1:{port}{path}"))
}
