//! Integration tests for crawl sessions over the real HTTP transport.

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doi_spider::crawl::{CrawlError, CrawlSession, CrawlToolkit, SessionConfig};
use doi_spider::user_agent::{default_browser_user_agents, default_project_user_agent};
use doi_spider::ResolutionOptions;
mod support;
use support::socket_guard::start_mock_server_or_skip;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

fn local_session(config: SessionConfig, timeout: Duration) -> CrawlSession {
    let options = ResolutionOptions::new("10.1000/test").with_timeout(timeout);
    CrawlSession::open(&CrawlToolkit::http(), options, config).unwrap()
}

fn loopback(max_depth: usize) -> SessionConfig {
    SessionConfig::new(["127.0.0.1"], max_depth)
}

async fn request_headers(server: &MockServer, name: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_session_collects_normalized_links_with_browser_user_agent() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(html(r#"<a class="pdf" href="/files/article.pdf">PDF</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = local_session(loopback(1), Duration::from_secs(5));
    session.on_html("a.pdf[href]", |el, scope| {
        if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
            scope.push_full_text(link);
        }
    });
    session.visit(&format!("{}/article", server.uri())).await.unwrap();

    assert_eq!(
        session.into_harvest().into_urls(),
        vec![format!("{}/files/article.pdf", server.uri())]
    );
    let agents = request_headers(&server, "user-agent").await;
    assert_eq!(agents.len(), 1);
    assert!(default_browser_user_agents().contains(&agents[0]));
}

#[tokio::test]
async fn test_fixed_user_agent_identifies_the_tool() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/article"))
        .and(header("user-agent", default_project_user_agent().as_str()))
        .respond_with(html("<p>ok</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = local_session(loopback(1).with_fixed_user_agent(), Duration::from_secs(5));
    session.visit(&format!("{}/article", server.uri())).await.unwrap();
}

#[tokio::test]
async fn test_follow_up_visit_sends_referer_and_cookies() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(
            html(r#"<a class="next" href="/suppl">Supplementary</a>"#)
                .insert_header("Set-Cookie", "session=abc; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/suppl"))
        .and(header("referer", format!("{}/landing", server.uri()).as_str()))
        .and(header("cookie", "session=abc"))
        .respond_with(html(r#"<a class="file" href="/suppl/data.xlsx">Data</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = local_session(loopback(2).with_referer(), Duration::from_secs(5));
    session.on_html("a.next[href]", |el, scope| {
        if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
            scope.visit(link);
        }
    });
    session.on_html("a.file[href]", |el, scope| {
        if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
            scope.push_supplementary(link);
        }
    });
    session.visit(&format!("{}/landing", server.uri())).await.unwrap();

    assert_eq!(
        session.into_harvest().into_urls(),
        vec![format!("{}/suppl/data.xlsx", server.uri())]
    );
}

#[tokio::test]
async fn test_redirects_are_followed_and_links_resolve_against_final_page() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/doi/10.1000/test"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/journal/article/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/journal/article/"))
        .respond_with(html(r#"<a class="pdf" href="fulltext.pdf">PDF</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = local_session(loopback(1), Duration::from_secs(5));
    session.on_html("a.pdf[href]", |el, scope| {
        if let Some(link) = el.attr("href").and_then(|href| scope.normalize(href)) {
            scope.push_full_text(link);
        }
    });
    session
        .visit(&format!("{}/doi/10.1000/test", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        session.into_harvest().into_urls(),
        vec![format!("{}/journal/article/fulltext.pdf", server.uri())]
    );
}

#[tokio::test]
async fn test_redirect_leaving_allow_list_is_dropped() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let port = server.address().port();
    Mock::given(method("GET"))
        .and(path("/doi/10.1000/test"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("http://localhost:{port}/elsewhere").as_str()),
        )
        .mount(&server)
        .await;

    let mut session = local_session(loopback(1), Duration::from_secs(5));
    session
        .visit(&format!("{}/doi/10.1000/test", server.uri()))
        .await
        .unwrap();

    assert!(session.harvest().is_empty());
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn test_entry_page_error_status_is_reported() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut session = local_session(loopback(1), Duration::from_secs(5));
    let error = session
        .visit(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, CrawlError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut session = local_session(loopback(1), Duration::from_millis(300));
    let error = session
        .visit(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, CrawlError::Transport { .. }));
}

#[tokio::test]
async fn test_head_resolution_returns_final_url() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/short/A190"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/files/sdc1.pdf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/files/sdc1.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // HEAD resolution is not bound by the allow-list.
    let session = local_session(SessionConfig::new(["example.org"], 1), Duration::from_secs(5));
    let resolved = session
        .resolve_head(&format!("{}/short/A190", server.uri()))
        .await
        .unwrap();

    assert_eq!(resolved.as_str(), format!("{}/files/sdc1.pdf", server.uri()));
}
