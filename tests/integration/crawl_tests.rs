//! Integration tests for the auditor
//!
//! These tests use wiremock to create mock documentation sites and run the
//! full crawl-and-check cycle end-to-end.

use std::collections::HashSet;
use std::time::Duration;
use sumi_audit::config::Config;
use sumi_audit::crawler::{audit_site, Coordinator};
use sumi_audit::output::{BrokenStatus, CsvReportWriter, ReportWriter};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short timeout
fn create_test_config(timeout_ms: u64) -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout_ms = timeout_ms;
    config
}

/// Serves `html` for GET and the same status for HEAD
async fn mount_page(server: &MockServer, page: &str, status: u16, html: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status).set_body_string(html))
        .mount(server)
        .await;
    Mock::given(method("HEAD"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_single_broken_link() {
    let mock_server = MockServer::start().await;
    let other_site = MockServer::start().await;
    let base_url = mock_server.uri();

    let index_html = format!(
        r##"<html><body>
            <a href="a.html">A</a>
            <a href="b.html">B</a>
            <a href="{}/external">Elsewhere</a>
            <a href="#section">Jump</a>
        </body></html>"##,
        other_site.uri()
    );
    mount_page(&mock_server, "/docs/index.html", 200, &index_html).await;
    mount_page(&mock_server, "/docs/a.html", 200, "<html><body>No links</body></html>").await;
    mount_page(&mock_server, "/docs/b.html", 404, "Not Found").await;

    // The other site is checked but never crawled
    Mock::given(method("HEAD"))
        .and(path("/external"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&other_site)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other_site)
        .await;

    let start_url = format!("{}/docs/index.html", base_url);
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .expect("Audit failed");

    assert_eq!(sink.rows().len(), 1);
    let row = &sink.rows()[0];
    assert_eq!(row.origin, start_url);
    assert_eq!(row.status, BrokenStatus::Code(404));
    assert_eq!(row.url, format!("{}/docs/b.html", base_url));

    let stats = &sink.summary().statistics;
    assert_eq!(stats.pages_visited, 4);
    assert_eq!(stats.checks_performed, 4);
    assert_eq!(stats.broken_links, 1);
}

#[tokio::test]
async fn test_method_not_allowed_never_reported() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/docs/index.html",
        200,
        r#"<a href="api.html">API</a>"#,
    )
    .await;
    mount_page(&mock_server, "/docs/api.html", 405, "").await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert!(sink.rows().is_empty());
    assert_eq!(sink.summary().statistics.checks_performed, 2);
}

#[tokio::test]
async fn test_excluded_urls_never_fetched() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/docs/index.html",
        200,
        r#"
        <a href="tutorial.ipynb">Notebook</a>
        <a href="/twitter/share">Share</a>
        <a href="https://www.kaggle.com/code/someone/notebook">Kaggle</a>
        "#,
    )
    .await;
    Mock::given(path("/docs/tutorial.ipynb"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(path("/twitter/share"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert!(sink.rows().is_empty());
    let stats = &sink.summary().statistics;
    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.urls_excluded, 3);
}

#[tokio::test]
async fn test_sibling_version_checked_not_crawled() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/stable/index.html",
        200,
        r#"<a href="/dev/index.html">Dev docs</a>"#,
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/dev/index.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dev/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/dev/x.html">X</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let start_url = format!("{}/stable/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(sink.rows()[0].status, BrokenStatus::Code(500));
    assert_eq!(sink.rows()[0].origin, start_url);
}

#[tokio::test]
async fn test_start_url_timeout_yields_no_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/docs/index.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="a.html">A</a>"#)
                .set_delay(Duration::from_millis(1_500)),
        )
        .mount(&mock_server)
        .await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(200))
        .await
        .unwrap();

    assert!(sink.rows().is_empty());
    let summary = sink.summary();
    assert_eq!(summary.start_failure.as_deref(), Some("Request timed out"));
    assert_eq!(summary.statistics.extraction_failures, 1);
    assert_eq!(summary.statistics.pages_visited, 1);
}

#[tokio::test]
async fn test_missing_start_url_reported_as_its_own_origin() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/docs/index.html", 404, "Not Found").await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(sink.rows()[0].origin, start_url);
    assert_eq!(sink.rows()[0].status, BrokenStatus::Code(404));
    assert_eq!(sink.rows()[0].url, start_url);
    assert_eq!(sink.summary().start_failure.as_deref(), Some("404"));
}

#[tokio::test]
async fn test_timed_out_link_reported_with_label() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/docs/index.html",
        200,
        r#"<a href="slow.html">Slow</a>"#,
    )
    .await;
    Mock::given(path("/docs/slow.html"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_500)))
        .mount(&mock_server)
        .await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(300))
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(
        sink.rows()[0].status,
        BrokenStatus::Error("Request timed out".to_string())
    );
}

#[tokio::test]
async fn test_unreachable_host_reported_with_error_summary() {
    let mock_server = MockServer::start().await;

    // Reserve a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = listener.local_addr().unwrap().port();
    drop(listener);

    let index_html = format!(r#"<a href="http://127.0.0.1:{}/gone">Gone</a>"#, dead_port);
    mount_page(&mock_server, "/docs/index.html", 200, &index_html).await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    let row = &sink.rows()[0];
    assert_eq!(row.url, format!("http://127.0.0.1:{}/gone", dead_port));
    match &row.status {
        BrokenStatus::Error(summary) => {
            assert!(!summary.is_empty());
            assert!(summary.split(':').count() <= 2);
        }
        other => panic!("expected an error summary, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cyclic_site_terminates() {
    let mock_server = MockServer::start().await;

    let pages = [
        ("/docs/index.html", r#"<a href="a.html">A</a><a href="index.html">Home</a>"#),
        ("/docs/a.html", r#"<a href="b.html">B</a><a href="index.html">Home</a>"#),
        ("/docs/b.html", r#"<a href="a.html">A</a><a href="./index.html">Home</a>"#),
    ];

    for (page, html) in pages {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let coordinator = Coordinator::new(&start_url, "Stable", &create_test_config(2_000)).unwrap();
    let sink = tokio::time::timeout(Duration::from_secs(30), coordinator.run())
        .await
        .expect("Audit did not terminate");

    assert!(sink.rows().is_empty());
    assert_eq!(sink.summary().statistics.pages_visited, 3);
}

#[tokio::test]
async fn test_broken_link_attributed_to_first_parent() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/docs/index.html",
        200,
        r#"<a href="p1.html">P1</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/docs/p1.html",
        200,
        r#"<a href="missing.html">Missing</a><a href="p2.html">P2</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/docs/p2.html",
        200,
        r#"<a href="missing.html">Missing again</a>"#,
    )
    .await;
    mount_page(&mock_server, "/docs/missing.html", 404, "").await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(
        sink.rows()[0].origin,
        format!("{}/docs/p1.html", mock_server.uri())
    );
}

#[tokio::test]
async fn test_link_shared_within_one_batch_reported_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/docs/index.html",
        200,
        r#"<a href="p1.html">P1</a><a href="p2.html">P2</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/docs/p1.html",
        200,
        r#"<a href="missing.html">Missing</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/docs/p2.html",
        200,
        r#"<a href="missing.html">Missing too</a>"#,
    )
    .await;
    mount_page(&mock_server, "/docs/missing.html", 404, "").await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &create_test_config(2_000))
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(
        sink.rows()[0].url,
        format!("{}/docs/missing.html", mock_server.uri())
    );

    let parents: HashSet<String> = [
        format!("{}/docs/p1.html", mock_server.uri()),
        format!("{}/docs/p2.html", mock_server.uri()),
    ]
    .into_iter()
    .collect();
    assert!(parents.contains(&sink.rows()[0].origin));
}

#[tokio::test]
async fn test_single_worker_visits_every_page() {
    let mock_server = MockServer::start().await;

    let links: String = (0..12)
        .map(|i| format!(r#"<a href="page{}.html">{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/docs/index.html", 200, &links).await;
    for i in 0..12 {
        let status = if i % 4 == 0 { 404 } else { 200 };
        mount_page(&mock_server, &format!("/docs/page{}.html", i), status, "").await;
    }

    let mut config = create_test_config(2_000);
    config.crawler.max_workers = 1;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Stable", &config).await.unwrap();

    let broken: HashSet<String> = sink.rows().iter().map(|r| r.url.clone()).collect();
    let expected: HashSet<String> = [0, 4, 8]
        .iter()
        .map(|i| format!("{}/docs/page{}.html", mock_server.uri(), i))
        .collect();
    assert_eq!(broken, expected);
    assert_eq!(sink.summary().statistics.batches, 13);
}

#[tokio::test]
async fn test_report_written_as_csv() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/docs/index.html",
        200,
        r#"<a href="b.html">B</a>"#,
    )
    .await;
    mount_page(&mock_server, "/docs/b.html", 404, "").await;

    let start_url = format!("{}/docs/index.html", mock_server.uri());
    let sink = audit_site(&start_url, "Dev", &create_test_config(2_000))
        .await
        .unwrap();

    let writer = CsvReportWriter::new(temp_dir.path());
    let report_path = sink.flush(&writer).unwrap();
    assert_eq!(report_path, temp_dir.path().join("Broken Links Dev.csv"));

    let content = std::fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "Origin Webpage,Status Code / Error,URL");
    assert_eq!(
        lines[1],
        format!("{},404,{}/docs/b.html", start_url, mock_server.uri())
    );
    assert_eq!(lines.len(), 2);

    // Writing through the trait object gives the same file
    let dyn_writer: &dyn ReportWriter = &writer;
    assert_eq!(sink.flush(dyn_writer).unwrap(), report_path);
}

#[tokio::test]
async fn test_invalid_start_url_rejected() {
    let result = audit_site("not-a-url", "Stable", &create_test_config(2_000)).await;
    assert!(result.is_err());
}
