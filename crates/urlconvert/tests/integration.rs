//! Integration tests for urlconvert using wiremock

use std::collections::HashSet;
use std::time::Duration;
use urlconvert::{
    fetch_titles_with_options, Command, ConvertRequest, Converter, FetchError, FetchOptions,
    LinkFormat, Settings, Span, TitleFetcher, STATUS_MESSAGE,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(title: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body></body></html>",
        title
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

fn url_set(urls: &[&str]) -> HashSet<String> {
    urls.iter().map(|s| s.to_string()).collect()
}

fn fast_options() -> FetchOptions {
    FetchOptions::default().timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_fetch_title_trims_whitespace() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", 200, page("\n Sample title  \n\n")).await;

    let url = format!("{}/", mock_server.uri());
    let titles = fetch_titles_with_options(&url_set(&[&url]), fast_options()).await;

    assert_eq!(titles.len(), 1);
    assert_eq!(titles[&url].as_deref().ok(), Some("Sample title"));
}

#[tokio::test]
async fn test_fetch_same_title_for_many_urls() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/one", 200, page("Sample title")).await;
    mount_page(&mock_server, "/two", 200, page("Sample title")).await;

    let one = format!("{}/one", mock_server.uri());
    let two = format!("{}/two", mock_server.uri());
    let titles = fetch_titles_with_options(&url_set(&[&one, &two]), fast_options()).await;

    for url in [&one, &two] {
        assert_eq!(titles[url].as_deref().ok(), Some("Sample title"));
    }
}

#[tokio::test]
async fn test_failures_do_not_affect_siblings() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/ok", 200, page("Fine")).await;
    mount_page(&mock_server, "/untitled", 200, "<html><body>hi</body></html>".into()).await;
    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;

    let ok = format!("{}/ok", mock_server.uri());
    let untitled = format!("{}/untitled", mock_server.uri());
    let image = format!("{}/image.png", mock_server.uri());
    // Nothing listens on port 1
    let refused = "http://127.0.0.1:1/".to_string();

    let titles = fetch_titles_with_options(
        &url_set(&[&ok, &untitled, &image, &refused]),
        fast_options(),
    )
    .await;

    assert_eq!(titles.len(), 4);
    assert_eq!(titles[&ok].as_deref().ok(), Some("Fine"));
    assert!(matches!(titles[&untitled], Err(FetchError::MissingTitle)));
    assert!(matches!(titles[&image], Err(FetchError::MissingTitle)));
    assert!(titles[&refused].is_err());
}

#[tokio::test]
async fn test_error_status_with_title_still_counts() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/gone", 404, page("Page Not Found")).await;

    let url = format!("{}/gone", mock_server.uri());
    let titles = fetch_titles_with_options(&url_set(&[&url]), fast_options()).await;

    assert_eq!(titles[&url].as_deref().ok(), Some("Page Not Found"));
}

#[tokio::test]
async fn test_batch_timeout_returns_nothing() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/fast", 200, page("Fast")).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Slow"), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fast = format!("{}/fast", mock_server.uri());
    let slow = format!("{}/slow", mock_server.uri());
    let fetcher =
        TitleFetcher::new(FetchOptions::default().timeout(Duration::from_millis(300))).unwrap();

    let titles = fetcher.fetch(&url_set(&[&fast, &slow])).await;

    assert!(titles.is_empty());
}

#[tokio::test]
async fn test_user_agent_header() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(wiremock::matchers::header("user-agent", "TestAgent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("UA ok"), "text/html"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/", mock_server.uri());
    let options = fast_options().user_agent("TestAgent/1.0");
    let titles = fetch_titles_with_options(&url_set(&[&url]), options).await;

    assert_eq!(titles[&url].as_deref().ok(), Some("UA ok"));
}

#[tokio::test]
async fn test_duplicate_selections_fetch_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dup"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("Dup"), "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/dup", mock_server.uri());
    let text = format!("{} and {}", url, url);
    let second = url.len() + " and ".len();
    let request = ConvertRequest::new(LinkFormat::Markdown)
        .text(text)
        .select(0, url.len())
        .select(second, second + url.len());

    let response = Converter::default().execute(request).await.unwrap();

    assert_eq!(response.selections, 2);
    assert_eq!(response.unique_urls, 1);
    assert_eq!(response.titles, 1);
    assert_eq!(
        response.text.unwrap(),
        format!("[Dup]({}) and [Dup]({})", url, url)
    );
    assert_eq!(response.status.message.as_deref(), Some(STATUS_MESSAGE));
}

#[tokio::test]
async fn test_html_conversion_escapes_url() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/search", 200, page("title b")).await;

    let url = format!("{}/search?page=5&key=値", mock_server.uri());
    let request = ConvertRequest::new(LinkFormat::Html).select_text(0, url.len(), url.clone());

    let response = Converter::default().execute(request).await.unwrap();

    assert_eq!(response.replacements.len(), 1);
    assert_eq!(
        response.replacements[0].text,
        format!(
            r#"<a href="{}/search?page=5&amp;key=値">title b</a>"#,
            mock_server.uri()
        )
    );
    assert!(response.text.is_none());
}

#[tokio::test]
async fn test_run_rewrites_document_from_the_end() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/a", 200, page("Alpha")).await;
    mount_page(&mock_server, "/b", 200, page("Beta")).await;
    mount_page(&mock_server, "/c", 200, "<html></html>".into()).await;

    let a = format!("{}/a", mock_server.uri());
    let b = format!("{}/b", mock_server.uri());
    let c = format!("{}/c", mock_server.uri());
    let mut document = format!("{}\n{}\n{}\nplain", a, c, b);

    let mut selections = Vec::new();
    let mut offset = 0;
    for line in document.lines() {
        selections.push((Span::new(offset, offset + line.len()), line.to_string()));
        offset += line.len() + 1;
    }

    let converter = Converter::new(Settings::default());
    let mut applied = Vec::new();
    let status = converter
        .run(&selections, &Command::Rst, |span, text| {
            applied.push(span);
            document.replace_range(span.start..span.end, text);
        })
        .await;

    assert_eq!(status.phase, "complete");
    assert_eq!(applied.len(), 2);
    assert!(applied[0] > applied[1]);
    assert_eq!(
        document,
        format!("`Alpha <{}>`_\n{}\n`Beta <{}>`_\nplain", a, c, b)
    );
}

#[tokio::test]
async fn test_path_conversion_needs_no_server() {
    let request = ConvertRequest::new(LinkFormat::Path)
        .text("go to https://unreachable.invalid/a/b?q=1#frag now")
        .select(6, 46);

    let response = Converter::default().execute(request).await.unwrap();

    assert_eq!(response.text.as_deref(), Some("go to /a/b?q=1#frag now"));
    assert_eq!(response.titles, 0);
}

#[tokio::test]
async fn test_invalid_timeout_setting_converts_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("Never"), "text/html"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let settings = Settings::from_json(r#"{"timeout_seconds": "10"}"#).unwrap();
    let url = format!("{}/", mock_server.uri());
    let request = ConvertRequest::new(LinkFormat::Markdown).select_text(0, url.len(), url.clone());

    let response = Converter::new(settings).execute(request).await.unwrap();

    assert!(response.replacements.is_empty());
    assert_eq!(response.status.phase, "complete");
}
