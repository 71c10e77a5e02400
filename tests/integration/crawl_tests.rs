//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl pipeline end-to-end.

use open_crawler::config::Config;
use open_crawler::{CrawlError, CrawlRequest, Crawler, ErrorKind, OutputFormat};
use open_crawler::robots::MAX_CRAWL_DELAY_SECS;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html>
  <head><title>Test Article</title></head>
  <body>
    <nav><a href="/">Home</a></nav>
    <main>
      <h1>Heading</h1>
      <p>First paragraph.</p>
      <ul>
        <li>one</li>
        <li>two</li>
      </ul>
      <a href="https://example.com/more">More</a>
    </main>
    <footer>Footer text</footer>
  </body>
</html>"#;

/// Creates a test configuration without a minimum crawl delay
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.minimum_crawl_delay = 0.0;
    config.crawler.request_timeout_ms = 5_000;
    config.crawler.robots_timeout_ms = 2_000;
    config
}

fn crawler() -> Crawler {
    Crawler::from_config(&create_test_config()).expect("Failed to build crawler")
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_text_format() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let url = format!("{}/article", mock_server.uri());
    let result = crawler()
        .crawl(&CrawlRequest::new(&url))
        .await
        .expect("Crawl failed");

    assert_eq!(result.url, url);
    assert_eq!(result.title, "Test Article");
    assert_eq!(result.format, OutputFormat::Text);
    assert_eq!(
        result.content,
        "Test Article\n\nHeading First paragraph. one two More"
    );
    assert!(!result.content.contains("Footer"));
    assert!(!result.content.contains("Home"));

    let timestamp = chrono::DateTime::parse_from_rfc3339(&result.timestamp);
    assert!(timestamp.is_ok());
    assert!(result.timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_crawl_markdown_format() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let request = CrawlRequest::new(format!("{}/article", mock_server.uri()))
        .with_format(OutputFormat::Markdown);
    let result = crawler().crawl(&request).await.expect("Crawl failed");

    assert_eq!(
        result.content,
        "# Test Article\n\n# Heading\n\nFirst paragraph.\n\n- one\n- two\n\n[More](https://example.com/more)\n\n"
    );
}

#[tokio::test]
async fn test_crawl_json_format() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let request = CrawlRequest::new(format!("{}/article", mock_server.uri()))
        .with_format(OutputFormat::Json);
    let result = crawler().crawl(&request).await.expect("Crawl failed");

    let value: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(value["title"], "Test Article");
    assert_eq!(value["content"]["headings"][0]["text"], "Heading");
    assert_eq!(value["content"]["paragraphs"][0], "First paragraph.");
    assert_eq!(value["content"]["lists"][0]["type"], "unordered");
    assert_eq!(value["content"]["links"][0]["url"], "https://example.com/more");
}

#[tokio::test]
async fn test_crawl_xml_format_with_selector() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let request = CrawlRequest::new(format!("{}/article", mock_server.uri()))
        .with_selector("ul")
        .with_format(OutputFormat::Xml);
    let result = crawler().crawl(&request).await.expect("Crawl failed");

    assert!(result
        .content
        .starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<document>\n"));
    assert!(result.content.contains("<list type=\"unordered\">"));
    assert!(!result.content.contains("<paragraphs>"));
}

#[tokio::test]
async fn test_robots_denied_before_fetch() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nDisallow: /private").await;

    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = crawler()
        .crawl(&CrawlRequest::new(format!(
            "{}/private/page",
            mock_server.uri()
        )))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RobotsDenied);
}

#[tokio::test]
async fn test_agent_specific_rules() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        "User-agent: OpenCrawler\nDisallow: /\n\nUser-agent: *\nAllow: /",
    )
    .await;

    let decision = crawler()
        .check_policy(&format!("{}/anything", mock_server.uri()))
        .await;
    assert!(!decision.allowed);
}

#[tokio::test]
async fn test_robots_fetched_once_per_host() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = crawler();
    let first = crawler
        .check_policy(&format!("{}/a", mock_server.uri()))
        .await;
    let second = crawler
        .check_policy(&format!("{}/b", mock_server.uri()))
        .await;

    assert!(first.allowed);
    assert_eq!(first, second);
    assert_eq!(crawler.robots().cache().len(), 1);
}

#[tokio::test]
async fn test_robots_missing_is_permissive() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let crawler = crawler();
    let decision = crawler
        .check_policy(&format!("{}/page", mock_server.uri()))
        .await;

    assert!(decision.allowed);
    assert_eq!(decision.crawl_delay_seconds, 0.0);
    // Failures are not cached
    assert!(crawler.robots().cache().is_empty());
}

#[tokio::test]
async fn test_robots_crawl_delay_reported() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nCrawl-delay: 3").await;

    let mut config = create_test_config();
    config.crawler.minimum_crawl_delay = 1.0;
    let crawler = Crawler::from_config(&config).unwrap();

    let decision = crawler
        .check_policy(&format!("{}/", mock_server.uri()))
        .await;
    assert!(decision.allowed);
    assert_eq!(decision.crawl_delay_seconds, 3.0);
}

#[tokio::test]
async fn test_same_host_crawls_are_spaced() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let mut config = create_test_config();
    config.crawler.minimum_crawl_delay = 0.5;
    let crawler = Crawler::from_config(&config).unwrap();
    let request = CrawlRequest::new(format!("{}/article", mock_server.uri()));

    let start = Instant::now();
    crawler.crawl(&request).await.expect("First crawl failed");
    crawler.crawl(&request).await.expect("Second crawl failed");

    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_http_status_errors() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let crawler = crawler();

    let err = crawler
        .crawl(&CrawlRequest::new(format!("{}/missing", mock_server.uri())))
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::HttpStatus { status: 404, .. }));

    let err = crawler
        .crawl(&CrawlRequest::new(format!("{}/broken", mock_server.uri())))
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::HttpStatus { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
}

#[tokio::test]
async fn test_size_exceeded() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    let big_page = format!("<html><body><p>{}</p></body></html>", "x".repeat(4096));
    mount_page(&mock_server, "/big", &big_page).await;

    let mut config = create_test_config();
    config.crawler.max_page_size = 1024;
    let crawler = Crawler::from_config(&config).unwrap();

    let err = crawler
        .crawl(&CrawlRequest::new(format!("{}/big", mock_server.uri())))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SizeExceeded);
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ARTICLE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.request_timeout_ms = 300;
    let crawler = Crawler::from_config(&config).unwrap();

    let err = crawler
        .crawl(&CrawlRequest::new(format!("{}/slow", mock_server.uri())))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkTimeout);
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", ARTICLE).await;

    let result = crawler()
        .crawl(&CrawlRequest::new(format!("{}/old", mock_server.uri())))
        .await
        .expect("Crawl failed");

    assert_eq!(result.url, format!("{}/new", mock_server.uri()));
}

#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .and(header("user-agent", "OpenCrawler/1.0"))
        .and(header("dnt", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
        .expect(1)
        .mount(&mock_server)
        .await;

    crawler()
        .crawl(&CrawlRequest::new(format!("{}/article", mock_server.uri())))
        .await
        .expect("Crawl failed");
}

#[tokio::test]
async fn test_selector_not_found() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let request =
        CrawlRequest::new(format!("{}/article", mock_server.uri())).with_selector(".missing");
    let err = crawler().crawl(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SelectorNotFound);
}

#[tokio::test]
async fn test_empty_page() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/empty",
        "<html><body><nav>menu</nav><script>x()</script></body></html>",
    )
    .await;

    let err = crawler()
        .crawl(&CrawlRequest::new(format!("{}/empty", mock_server.uri())))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseEmpty);
}

#[tokio::test]
async fn test_clear_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let crawler = crawler();
    let request = CrawlRequest::new(format!("{}/article", mock_server.uri()));
    crawler.crawl(&request).await.expect("Crawl failed");
    assert_eq!(crawler.robots().cache().len(), 1);
    assert_eq!(crawler.rate_limiter().tracked_hosts(), 1);

    crawler.clear_cache();
    assert!(crawler.robots().cache().is_empty());
    assert_eq!(crawler.rate_limiter().tracked_hosts(), 0);

    crawler.crawl(&request).await.expect("Crawl after clear failed");
}

#[tokio::test]
async fn test_unreachable_host() {
    let err = crawler()
        .crawl(&CrawlRequest::new("http://127.0.0.1:9/page"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::NetworkUnreachable | ErrorKind::NetworkTimeout
    ));
}

/// Serves every request with a chunked body of `body_len` bytes and no
/// Content-Length header
async fn serve_chunked(body_len: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;

                let chunk = format!("<p>{}</p>", "x".repeat(body_len));
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n{}\r\n0\r\n\r\n",
                    chunk.len(),
                    chunk
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_size_exceeded_without_content_length() {
    let base_url = serve_chunked(8192).await;

    let mut config = create_test_config();
    config.crawler.max_page_size = 1024;
    let crawler = Crawler::from_config(&config).unwrap();

    let err = crawler
        .crawl(&CrawlRequest::new(format!("{}/page", base_url)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SizeExceeded);
}

#[tokio::test]
async fn test_chunked_page_within_limit() {
    let base_url = serve_chunked(64).await;
    let result = crawler()
        .crawl(&CrawlRequest::new(format!("{}/page", base_url)))
        .await
        .expect("Crawl failed");
    assert_eq!(result.content, format!("Untitled\n\n{}", "x".repeat(64)));
}

#[tokio::test]
async fn test_oversized_robots_is_permissive() {
    let mock_server = MockServer::start().await;
    let robots = format!("User-agent: *\nDisallow: /\n# {}\n", "padding ".repeat(512));
    mount_robots(&mock_server, &robots).await;

    let mut config = create_test_config();
    config.crawler.max_page_size = 1024;
    let crawler = Crawler::from_config(&config).unwrap();

    let decision = crawler
        .check_policy(&format!("{}/page", mock_server.uri()))
        .await;
    assert!(decision.allowed);
    assert!(crawler.robots().cache().is_empty());
}

#[tokio::test]
async fn test_huge_crawl_delay_is_capped() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nCrawl-delay: 1e20").await;
    mount_page(&mock_server, "/article", ARTICLE).await;

    let crawler = crawler();
    let decision = crawler
        .check_policy(&format!("{}/article", mock_server.uri()))
        .await;
    assert!(decision.allowed);
    assert_eq!(decision.crawl_delay_seconds, MAX_CRAWL_DELAY_SECS);

    // First request to the host does not wait, so the crawl completes
    let result = crawler
        .crawl(&CrawlRequest::new(format!("{}/article", mock_server.uri())))
        .await
        .expect("Crawl failed");
    assert_eq!(result.title, "Test Article");
}

#[tokio::test]
async fn test_concurrent_checks_fetch_robots_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nAllow: /")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = crawler();
    let first_url = format!("{}/a", mock_server.uri());
    let second_url = format!("{}/b", mock_server.uri());
    let (first, second) = tokio::join!(
        crawler.check_policy(&first_url),
        crawler.check_policy(&second_url)
    );

    assert!(first.allowed);
    assert!(second.allowed);
    assert_eq!(crawler.robots().cache().len(), 1);
}
