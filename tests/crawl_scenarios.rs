//! End-to-end crawl scenarios against a local HTTP server.

use httptest::{matchers::*, responders::*, Expectation, Server};
use tokio_util::sync::CancellationToken;

use link_status::{run_with_cancellation, Category, Config, Report};

fn config_for(seed: &str) -> Config {
    Config {
        seed: seed.to_string(),
        concurrency: 4,
        timeout_seconds: 5,
        ..Default::default()
    }
}

async fn run(config: Config) -> Report {
    run_with_cancellation(config, CancellationToken::new())
        .await
        .expect("run should complete")
}

fn result_for<'a>(report: &'a Report, suffix: &str) -> &'a link_status::CheckResult {
    report
        .results
        .iter()
        .find(|r| r.url.ends_with(suffix))
        .unwrap_or_else(|| panic!("no result for URL ending in '{suffix}'"))
}

#[tokio::test]
async fn seed_with_no_links_yields_single_ok_result() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body("<html></html>"),
        ),
    );

    let report = run(config_for(&server.url_str("/"))).await;

    assert_eq!(report.total_urls(), 1);
    let seed = &report.results[0];
    assert_eq!(seed.category, Category::Ok);
    assert_eq!(seed.status, Some(200));
    assert!(seed.elapsed_ms.is_some());
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn broken_internal_link_is_reported_and_fails_the_run() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<html><a href="/missing">x</a></html>"#),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/missing"))
            .respond_with(status_code(404)),
    );

    let report = run(config_for(&server.url_str("/"))).await;

    assert_eq!(report.total_urls(), 2);
    assert_eq!(result_for(&report, "/").category, Category::Ok);

    let missing = result_for(&report, "/missing");
    assert_eq!(missing.category, Category::Broken);
    assert_eq!(missing.status, Some(404));
    assert!(missing.referrer.as_deref().is_some_and(|r| r.ends_with("/")));
    assert_eq!(missing.context.as_deref(), Some("x"));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn external_redirect_chain_is_recorded() {
    let site = Server::run();
    let external = Server::run();

    let external_b = external.url_str("/b");
    external.expect(
        Expectation::matching(request::method_path("HEAD", "/a")).respond_with(
            status_code(301).insert_header("Location", external_b.as_str()),
        ),
    );
    external.expect(
        Expectation::matching(request::method_path("HEAD", "/b")).respond_with(status_code(200)),
    );

    let body = format!(r#"<html><a href="{}">external</a></html>"#, external.url_str("/a"));
    site.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(body),
        ),
    );

    let report = run(config_for(&site.url_str("/"))).await;

    assert_eq!(report.total_urls(), 2);
    let redirected = result_for(&report, "/a");
    assert_eq!(redirected.category, Category::Redirect);
    assert_eq!(redirected.status, Some(200));
    assert_eq!(redirected.redirect_chain.len(), 1);
    assert!(redirected
        .final_url
        .as_deref()
        .is_some_and(|u| u.ends_with("/b")));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn depth_cap_stops_internal_discovery() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/p1">p1</a>"#),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/p1")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/p2">p2</a>"#),
        ),
    );
    // No expectation for /p2: fetching it would fail the test.

    let config = Config {
        max_depth: 1,
        ..config_for(&server.url_str("/"))
    };
    let report = run(config).await;

    assert_eq!(report.total_urls(), 2);
    assert!(
        !report.results.iter().any(|r| r.url.ends_with("/p2")),
        "URL beyond the depth cap must not appear in the report"
    );
}

#[tokio::test]
async fn excluded_urls_are_skipped_without_fetching() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/admin/x">admin</a><a href="/public">public</a>"#),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/public"))
            .respond_with(status_code(200).insert_header("Content-Type", "text/html")),
    );
    // No expectation for /admin/x: it must never be fetched.

    let config = Config {
        exclude_patterns: vec!["/admin".to_string()],
        ..config_for(&server.url_str("/"))
    };
    let report = run(config).await;

    let skipped = result_for(&report, "/admin/x");
    assert_eq!(skipped.category, Category::Skipped);
    assert!(skipped.status.is_none());
    assert!(skipped.elapsed_ms.is_none(), "no network attempt was made");
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn assets_are_checked_with_head_regardless_of_host() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<img src="/logo.png"><script src="/app.js"></script>"#),
        ),
    );
    // Assets on the seed host still go through the HEAD-first policy.
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/logo.png"))
            .respond_with(status_code(200).insert_header("Content-Type", "image/png")),
    );
    server.expect(
        Expectation::matching(request::method_path("HEAD", "/app.js"))
            .respond_with(status_code(200).insert_header("Content-Type", "text/javascript")),
    );

    let report = run(config_for(&server.url_str("/"))).await;

    assert_eq!(report.total_urls(), 3);
    assert_eq!(report.count(Category::Ok), 3);
}

#[tokio::test]
async fn every_url_appears_exactly_once() {
    let server = Server::run();
    // Both pages link to each other and to themselves.
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/">home</a><a href="/other">other</a>"#),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/other")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/">home</a><a href="/other">other</a>"#),
        ),
    );

    let report = run(config_for(&server.url_str("/"))).await;

    assert_eq!(report.total_urls(), 2);
    let mut urls: Vec<_> = report.results.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 2, "each URL appears exactly once");

    let sum: usize = report.totals.values().sum();
    assert_eq!(sum, report.total_urls());
}

#[tokio::test]
async fn cancellation_reports_queued_urls_as_skipped() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/one">1</a><a href="/two">2</a>"#),
        ),
    );
    // /one and /two are never fetched: the run is cancelled before the
    // workers start.

    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run_with_cancellation(config_for(&server.url_str("/")), cancel)
        .await
        .expect("cancelled run still yields a partial report");

    assert_eq!(report.total_urls(), 3);
    assert_eq!(report.count(Category::Ok), 1);
    assert_eq!(report.count(Category::Skipped), 2);
    for suffix in ["/one", "/two"] {
        let skipped = result_for(&report, suffix);
        assert_eq!(skipped.category, Category::Skipped);
        assert!(skipped.error.as_deref().is_some_and(|e| e.contains("cancelled")));
    }
}

#[tokio::test]
async fn invalid_seed_is_a_configuration_error() {
    let err = run_with_cancellation(
        config_for("not a url at all!!!"),
        CancellationToken::new(),
    )
    .await
    .expect_err("invalid seed must abort before the crawl");

    assert!(err.to_string().contains("seed"));
}

#[tokio::test]
async fn unreachable_seed_is_a_configuration_error() {
    // Port 1 is essentially guaranteed closed
    let config = Config {
        timeout_seconds: 2,
        ..config_for("http://127.0.0.1:1/")
    };
    let err = run_with_cancellation(config, CancellationToken::new())
        .await
        .expect_err("unreachable seed must abort before the crawl");

    assert!(err.to_string().contains("unreachable"));
}

#[tokio::test]
async fn per_host_pacing_spaces_out_fetches() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/a">a</a><a href="/b">b</a>"#),
        ),
    );
    for path in ["/a", "/b"] {
        server.expect(
            Expectation::matching(request::method_path("GET", path))
                .respond_with(status_code(200).insert_header("Content-Type", "text/html")),
        );
    }

    let config = Config {
        per_host_rate_ms: 80,
        ..config_for(&server.url_str("/"))
    };

    let started = std::time::Instant::now();
    let report = run(config).await;
    let elapsed = started.elapsed();

    assert_eq!(report.total_urls(), 3);
    // Three same-host fetches with an 80ms window cannot finish faster
    // than two full windows (with a little slack for timer precision).
    assert!(
        elapsed >= std::time::Duration::from_millis(150),
        "pacing should have spaced out fetches, finished in {elapsed:?}"
    );
}

#[tokio::test]
async fn redirecting_internal_page_is_still_crawled() {
    let server = Server::run();
    let new_home = server.url_str("/new");
    server.expect(
        Expectation::matching(request::method_path("GET", "/old")).respond_with(
            status_code(301).insert_header("Location", new_home.as_str()),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/new")).respond_with(
            status_code(200)
                .insert_header("Content-Type", "text/html")
                .body(r#"<a href="/deeper">go</a>"#),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/deeper"))
            .respond_with(status_code(200).insert_header("Content-Type", "text/html")),
    );

    let report = run(config_for(&server.url_str("/old"))).await;

    let seed = result_for(&report, "/old");
    assert_eq!(seed.category, Category::Redirect);
    // The link found on the redirect target was discovered and checked.
    assert_eq!(result_for(&report, "/deeper").category, Category::Ok);
}
