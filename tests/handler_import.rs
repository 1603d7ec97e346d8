mod common;

use serde_json::{Value, json};

fn record(short_code: &str, long_url: &str) -> Value {
    json!({
        "source": "bitly",
        "longUrl": long_url,
        "shortCode": short_code,
        "createdAt": "2020-01-02T03:04:05Z",
        "tags": ["legacy"]
    })
}

#[tokio::test]
async fn test_import_keeps_original_codes() {
    let server = common::test_server();

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [
                record("abc", "https://example.com/a"),
                record("def", "https://example.com/b")
            ]
        }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["imported"], 2);
    assert_eq!(json["items"][0]["status"], "imported");
    assert_eq!(json["items"][0]["shortCode"], "abc");
    assert_eq!(json["items"][0]["shortUrl"], "https://s.test/abc");

    let stored = server.get("/rest/short-urls/abc").await.json::<Value>();
    assert_eq!(stored["dateCreated"], "2020-01-02T03:04:05Z");
    assert_eq!(stored["importSource"], "bitly");
    assert_eq!(stored["tags"], json!(["legacy"]));
}

#[tokio::test]
async fn test_import_without_original_codes_generates_new_ones() {
    let server = common::test_server();

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({ "shortUrls": [record("abc", "https://example.com/a")] }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["items"][0]["status"], "imported");
    assert_eq!(json["items"][0]["originalShortCode"], "abc");
    assert_ne!(json["items"][0]["shortCode"], "abc");
}

#[tokio::test]
async fn test_reimport_is_skipped() {
    let server = common::test_server();
    let body = json!({
        "importShortCodes": true,
        "shortUrls": [record("abc", "https://example.com/a")]
    });

    server.post("/rest/short-urls/import").json(&body).await;
    let response = server.post("/rest/short-urls/import").json(&body).await;

    let json = response.json::<Value>();
    assert_eq!(json["summary"]["skipped"], 1);
    assert_eq!(json["items"][0]["status"], "skipped");
    assert_eq!(json["items"][0]["reason"], "already_imported");
}

#[tokio::test]
async fn test_reimport_merges() {
    let server = common::test_server();

    server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [record("abc", "https://example.com/a")]
        }))
        .await;

    let mut updated = record("abc", "https://example.com/updated");
    updated["tags"] = json!(["legacy", "moved"]);
    updated["maxVisits"] = json!(50);

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "mode": "merge",
            "shortUrls": [updated]
        }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["summary"]["merged"], 1);
    assert_eq!(json["items"][0]["status"], "merged");

    let stored = server.get("/rest/short-urls/abc").await.json::<Value>();
    assert_eq!(stored["longUrl"], "https://example.com/updated");
    assert_eq!(stored["meta"]["maxVisits"], 50);
    assert_eq!(stored["tags"], json!(["legacy", "moved"]));
}

#[tokio::test]
async fn test_import_taken_code_regenerates() {
    let server = common::test_server();
    common::create_short_url(
        &server,
        json!({ "longUrl": "https://example.com/native", "customSlug": "abc" }),
    )
    .await;

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [record("abc", "https://example.com/imported")]
        }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["items"][0]["status"], "imported");
    assert_ne!(json["items"][0]["shortCode"], "abc");

    let native = server.get("/rest/short-urls/abc").await.json::<Value>();
    assert_eq!(native["longUrl"], "https://example.com/native");
}

#[tokio::test]
async fn test_import_taken_code_skipped_on_request() {
    let server = common::test_server();
    common::create_short_url(
        &server,
        json!({ "longUrl": "https://example.com/native", "customSlug": "abc" }),
    )
    .await;

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "onConflict": "skip",
            "shortUrls": [record("abc", "https://example.com/imported")]
        }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["items"][0]["status"], "skipped");
    assert_eq!(json["items"][0]["reason"], "short_code_taken");
}

#[tokio::test]
async fn test_import_reports_failed_records() {
    let server = common::test_server();

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [
                record("ok", "https://example.com/a"),
                record("bad", "")
            ]
        }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["summary"]["imported"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["items"][1]["status"], "failed");
    assert_eq!(json["items"][1]["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_import_empty_batch_rejected() {
    let server = common::test_server();

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({ "shortUrls": [] }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_imported_short_url_redirects() {
    let server = common::test_server();

    server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [record("legacy1", "https://example.com/legacy")]
        }))
        .await;

    let response = server.get("/legacy1").await;

    assert_eq!(response.header("location"), "https://example.com/legacy");
}

#[tokio::test]
async fn test_same_code_under_different_domains_is_imported_twice() {
    let server = common::test_server();
    let mut scoped = record("abc", "https://example.com/scoped");
    scoped["domain"] = json!("other.test");
    let body = json!({
        "importShortCodes": true,
        "shortUrls": [record("abc", "https://example.com/plain"), scoped]
    });

    let response = server.post("/rest/short-urls/import").json(&body).await;

    let json = response.json::<Value>();
    assert_eq!(json["summary"]["imported"], 2);
    assert_eq!(json["items"][0]["shortUrl"], "https://s.test/abc");
    assert_eq!(json["items"][1]["status"], "imported");
    assert_eq!(json["items"][1]["shortUrl"], "https://other.test/abc");

    let plain = server.get("/abc").await;
    assert_eq!(plain.header("location"), "https://example.com/plain");
    let on_domain = server.get("/abc").add_header("Host", "other.test").await;
    assert_eq!(on_domain.header("location"), "https://example.com/scoped");

    let again = server.post("/rest/short-urls/import").json(&body).await;
    let json = again.json::<Value>();
    assert_eq!(json["summary"]["skipped"], 2);
    assert_eq!(json["items"][1]["reason"], "already_imported");
}

#[tokio::test]
async fn test_merge_stays_within_domain() {
    let server = common::test_server();
    let mut scoped = record("abc", "https://example.com/scoped");
    scoped["domain"] = json!("other.test");

    server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [record("abc", "https://example.com/plain"), scoped.clone()]
        }))
        .await;

    scoped["longUrl"] = json!("https://example.com/scoped-v2");
    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({ "importShortCodes": true, "mode": "merge", "shortUrls": [scoped] }))
        .await;
    assert_eq!(response.json::<Value>()["summary"]["merged"], 1);

    let plain = server.get("/rest/short-urls/abc").await.json::<Value>();
    assert_eq!(plain["longUrl"], "https://example.com/plain");

    let on_domain = server
        .get("/rest/short-urls/abc")
        .add_query_param("domain", "other.test")
        .await
        .json::<Value>();
    assert_eq!(on_domain["longUrl"], "https://example.com/scoped-v2");
}

#[tokio::test]
async fn test_import_rejects_blank_short_code() {
    let server = common::test_server();

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [record("", "https://example.com/a")]
        }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["summary"]["imported"], 0);
    assert_eq!(json["items"][0]["status"], "failed");
    assert_eq!(json["items"][0]["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_import_rejects_zero_max_visits() {
    let server = common::test_server();
    let mut zero = record("abc", "https://example.com/a");
    zero["maxVisits"] = json!(0);

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({ "importShortCodes": true, "shortUrls": [zero] }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["items"][0]["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_imported_code_with_backslash_round_trips() {
    let server = common::test_server();

    let response = server
        .post("/rest/short-urls/import")
        .json(&json!({
            "importShortCodes": true,
            "shortUrls": [record("a\\b", "https://example.com/slashed")]
        }))
        .await;

    let json = response.json::<Value>();
    assert_eq!(json["items"][0]["shortUrl"], "https://s.test/a%5Cb");

    let redirect = server.get("/a%5Cb").await;
    assert_eq!(redirect.header("location"), "https://example.com/slashed");
}
