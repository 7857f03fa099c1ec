//! Integration tests for the contribution pipeline against a mocked GraphQL endpoint

use chrono::{DateTime, TimeZone, Utc};
use contribkit_lib::providers::github_contributions::{ContributionOptions, Scaling, fetch_contributions};
use contribkit_lib::providers::{AccountKind, ProviderName, RawPayload};
use core::time::Duration;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const LOGIN: &str = "octocat";
const TOKEN: &str = "test-token";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn repo(name_with_owner: &str, kind: &str) -> Value {
    let (owner, name) = name_with_owner.split_once('/').unwrap();
    json!({
        "name": name,
        "nameWithOwner": name_with_owner,
        "url": format!("https://github.com/{name_with_owner}"),
        "owner": {
            "login": owner,
            "url": format!("https://github.com/{owner}"),
            "avatarUrl": format!("https://avatars.example/{owner}"),
            "__typename": kind,
        }
    })
}

fn data(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

fn contributions(repos: &[Value]) -> ResponseTemplate {
    let entries: Vec<_> = repos.iter().map(|r| json!({ "repository": r })).collect();
    data(json!({
        "user": { "contributionsCollection": { "commitContributionsByRepository": entries } }
    }))
}

fn search_page(repos: &[Value], end_cursor: Option<&str>) -> ResponseTemplate {
    let edges: Vec<_> = repos.iter().map(|r| json!({ "node": { "repository": r } })).collect();
    data(json!({
        "search": {
            "pageInfo": { "hasNextPage": end_cursor.is_some(), "endCursor": end_cursor },
            "edges": edges,
        }
    }))
}

fn count(n: u64) -> ResponseTemplate {
    data(json!({ "search": { "issueCount": n } }))
}

fn graphql(needle: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", format!("bearer {TOKEN}").as_str()))
        .and(body_string_contains(needle))
}

async fn mount_count(server: &MockServer, name_with_owner: &str, response: ResponseTemplate) {
    graphql("issueCount")
        .and(body_string_contains(format!("repo:{name_with_owner} is:pr is:merged author:{LOGIN}")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/graphql", server.uri())
}

/// Timeline finds `solo/alpha`, `acme/beta`, `acme/delta`; search finds `acme/beta`, `acme/gamma`,
/// `solo/zeta`. One timeline year and the second search page fail.
async fn mount_mixed_scenario(server: &MockServer) {
    graphql("createdAt")
        .respond_with(data(json!({ "user": { "createdAt": "2023-03-01T00:00:00Z" } })))
        .expect(1)
        .mount(server)
        .await;

    graphql("contributionsCollection")
        .and(body_string_contains("\"from\":\"2023-03-01T00:00:00Z\""))
        .respond_with(contributions(&[
            repo("solo/alpha", "User"),
            repo("acme/beta", "Organization"),
            repo("acme/delta", "Organization"),
        ]))
        .expect(1)
        .mount(server)
        .await;

    graphql("contributionsCollection")
        .and(body_string_contains("\"from\":\"2024-01-01T00:00:00Z\""))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(server)
        .await;

    graphql("hasNextPage")
        .and(body_string_contains("\"after\":null"))
        .respond_with(search_page(
            &[repo("acme/beta", "Organization"), repo("acme/gamma", "Organization"), repo("solo/zeta", "User")],
            Some("cursor-1"),
        ))
        .expect(1)
        .mount(server)
        .await;

    graphql("hasNextPage")
        .and(body_string_contains("\"after\":\"cursor-1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "secondary rate limit", "type": "RATE_LIMITED" }]
        })))
        .expect(1)
        .mount(server)
        .await;

    mount_count(server, "solo/alpha", count(0)).await;
    mount_count(server, "acme/beta", count(5)).await;
    mount_count(server, "acme/gamma", count(3)).await;
    mount_count(server, "solo/zeta", count(2)).await;
    mount_count(
        server,
        "acme/delta",
        ResponseTemplate::new(200).set_body_json(json!({ "errors": [{ "message": "something went wrong" }] })),
    )
    .await;
}

#[tokio::test]
async fn test_pipeline_discovers_measures_and_aggregates() {
    let server = MockServer::start().await;
    mount_mixed_scenario(&server).await;

    let records = fetch_contributions(&endpoint(&server), TOKEN, LOGIN, ContributionOptions::default(), now())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);

    let acme = &records[0];
    assert_eq!(acme.sponsor.login, "acme");
    assert_eq!(acme.sponsor.kind, AccountKind::Organization);
    assert_eq!(acme.sponsor.link_url.as_deref(), Some("https://github.com/acme"));
    assert!((acme.weight - 8.0).abs() < f64::EPSILON);
    assert_eq!(acme.provider, ProviderName::GithubContributions);
    assert_eq!(acme.created_at, now());

    let Some(RawPayload::Contributions(audit)) = &acme.raw else {
        unreachable!("contribution records carry an audit payload");
    };
    assert_eq!(audit.total_prs, 8);
    let repos: Vec<_> = audit.repos.iter().map(|r| (r.name_with_owner.as_str(), r.merged_prs)).collect();
    assert_eq!(repos, [("acme/beta", 5), ("acme/gamma", 3)]);

    let solo = &records[1];
    assert_eq!(solo.sponsor.login, "solo");
    assert_eq!(solo.sponsor.kind, AccountKind::User);
    assert_eq!(solo.sponsor.link_url.as_deref(), Some("https://github.com/solo/zeta"));
    assert!((solo.weight - 2.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_pipeline_applies_scaling_without_reordering() {
    let server = MockServer::start().await;
    mount_mixed_scenario(&server).await;

    let options = ContributionOptions {
        scaling: Scaling {
            max: Some(5.0),
            logarithmic: true,
        },
        ..ContributionOptions::default()
    };

    let records = fetch_contributions(&endpoint(&server), TOKEN, LOGIN, options, now()).await.unwrap();

    let logins: Vec<_> = records.iter().map(|r| r.sponsor.login.as_str()).collect();
    assert_eq!(logins, ["acme", "solo"]);
    assert!((records[0].weight - 5.0).abs() < f64::EPSILON);
    assert!((records[1].weight - 3.0_f64.log10() * 10.0).abs() < 1e-9);
    assert!(records.iter().all(|r| r.weight <= 5.0));
}

#[tokio::test]
async fn test_search_stops_at_page_ceiling() {
    let server = MockServer::start().await;

    graphql("createdAt")
        .respond_with(data(json!({ "user": null })))
        .mount(&server)
        .await;

    graphql("hasNextPage")
        .and(body_string_contains("\"after\":null"))
        .respond_with(search_page(&[repo("acme/beta", "Organization")], Some("cursor-1")))
        .expect(1)
        .mount(&server)
        .await;

    graphql("hasNextPage")
        .and(body_string_contains("\"after\":\"cursor-1\""))
        .respond_with(search_page(&[repo("acme/gamma", "Organization")], None))
        .expect(0)
        .mount(&server)
        .await;

    mount_count(&server, "acme/beta", count(1)).await;

    let options = ContributionOptions {
        max_search_pages: 1,
        ..ContributionOptions::default()
    };

    let records = fetch_contributions(&endpoint(&server), TOKEN, LOGIN, options, now()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sponsor.link_url.as_deref(), Some("https://github.com/acme/beta"));
}

#[tokio::test]
async fn test_measurement_spans_several_batches() {
    let server = MockServer::start().await;

    graphql("createdAt")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let repos: Vec<_> = (0..7).map(|i| repo(&format!("org{i}/project"), "Organization")).collect();
    graphql("hasNextPage")
        .respond_with(search_page(&repos, None))
        .expect(1)
        .mount(&server)
        .await;

    for i in 0..7 {
        mount_count(&server, &format!("org{i}/project"), count(i + 1)).await;
    }

    let options = ContributionOptions {
        batch_size: 3,
        ..ContributionOptions::default()
    };

    let records = fetch_contributions(&endpoint(&server), TOKEN, LOGIN, options, now()).await.unwrap();

    let weights: Vec<_> = records.iter().map(|r| r.weight).collect();
    assert_eq!(weights, [7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
}

/// Answers every count query with 1 after `delay`, recording when each request arrived.
#[derive(Debug, Clone)]
struct SlowCounter {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for SlowCounter {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        count(1).set_delay(self.delay)
    }
}

/// Largest number of requests that arrived within `delay` of one another. A request cannot be
/// answered sooner than `delay`, so this is the peak number of requests in flight.
fn peak_in_flight(arrivals: &[Instant], delay: Duration) -> usize {
    arrivals
        .iter()
        .map(|&at| arrivals.iter().filter(|&&other| other <= at && at.duration_since(other) < delay).count())
        .max()
        .unwrap_or(0)
}

#[tokio::test]
async fn test_measurement_never_exceeds_batch_size_in_flight() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    graphql("createdAt")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let repos: Vec<_> = (0..7).map(|i| repo(&format!("org{i}/project"), "Organization")).collect();
    graphql("hasNextPage")
        .respond_with(search_page(&repos, None))
        .mount(&server)
        .await;

    graphql("issueCount")
        .respond_with(SlowCounter {
            arrivals: Arc::clone(&arrivals),
            delay,
        })
        .expect(7)
        .mount(&server)
        .await;

    let options = ContributionOptions {
        batch_size: 3,
        ..ContributionOptions::default()
    };

    let records = fetch_contributions(&endpoint(&server), TOKEN, LOGIN, options, now()).await.unwrap();
    assert_eq!(records.len(), 7);

    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 7);

    let peak = peak_in_flight(&arrivals, delay);
    assert!(peak <= 3, "{peak} count requests were in flight at once");
    assert!(peak > 1, "count requests within a batch were not concurrent");
}

#[tokio::test]
async fn test_every_strategy_failing_yields_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let records = fetch_contributions(&endpoint(&server), TOKEN, LOGIN, ContributionOptions::default(), now())
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_missing_login_fails_before_any_request() {
    let server = MockServer::start().await;

    let err = fetch_contributions(&endpoint(&server), TOKEN, "", ContributionOptions::default(), now())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("login is required"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let server = MockServer::start().await;

    let err = fetch_contributions(&endpoint(&server), "", LOGIN, ContributionOptions::default(), now())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("token is required"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
