//! Tests for collections, item contexts and form parameters

use super::*;
use crate::http::{HttpClient, HttpClientConfig, HttpTransport};
use crate::pagination::{Control, ListQuery, TraversalEnd};
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Widget {
    sid: String,
    #[serde(default)]
    friendly_name: Option<String>,
}

fn transport() -> Arc<HttpTransport> {
    let config = HttpClientConfig::builder().no_rate_limit().max_retries(0).build();
    Arc::new(HttpTransport::new(HttpClient::with_config(config).unwrap()))
}

fn widgets(server: &MockServer) -> Collection<Widget> {
    Collection::new(transport(), format!("{}/v1/Widgets", server.uri()), "")
}

// ============================================================================
// Params Tests
// ============================================================================

#[test]
fn test_params_preserve_order_and_replace() {
    let params = Params::new()
        .set("To", "+15558675310")
        .set("Body", "first")
        .set_opt("MediaUrl", None::<String>)
        .set("Body", "second");

    assert_eq!(
        params.as_pairs(),
        &[
            ("To".to_string(), "+15558675310".to_string()),
            ("Body".to_string(), "second".to_string()),
        ]
    );
    assert_eq!(params.get("Body"), Some("second"));
    assert_eq!(params.len(), 2);
}

#[test]
fn test_params_rendering() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
    let params = Params::new()
        .set_bool("Enabled", false)
        .set_date("StartDate", date)
        .set_datetime("StartTime", at)
        .set_json("Attributes", &json!({"tier": "gold"}));

    assert_eq!(params.get("Enabled"), Some("false"));
    assert_eq!(params.get("StartDate"), Some("2024-03-09"));
    assert_eq!(params.get("StartTime"), Some("2024-03-09T14:05:00Z"));
    assert_eq!(params.get("Attributes"), Some(r#"{"tier":"gold"}"#));
}

#[test]
fn test_params_from_iter() {
    let params: Params = [("A", "1"), ("B", "2")].into_iter().collect();
    let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["A", "B"]);
    assert!(!params.is_empty());
}

// ============================================================================
// URI Tests
// ============================================================================

#[test]
fn test_collection_uris_with_suffix() {
    let messages: Collection<Widget> = Collection::new(
        transport(),
        "https://api.twilio.com/2010-04-01/Accounts/ACxxx/Messages/",
        ".json",
    );

    assert_eq!(
        messages.uri(),
        "https://api.twilio.com/2010-04-01/Accounts/ACxxx/Messages.json"
    );
    let item = messages.item("SM123").unwrap();
    assert_eq!(item.id(), "SM123");
    assert_eq!(
        item.uri(),
        "https://api.twilio.com/2010-04-01/Accounts/ACxxx/Messages/SM123.json"
    );

    let media: Collection<Widget> = item.collection("/Media");
    assert_eq!(
        media.uri(),
        "https://api.twilio.com/2010-04-01/Accounts/ACxxx/Messages/SM123/Media.json"
    );
}

#[test]
fn test_nested_collection_without_suffix() {
    let services: Collection<Widget> =
        Collection::new(transport(), "https://chat.twilio.com/v2/Services", "");
    let channels: Collection<Widget> = services.item("IS1").unwrap().collection("Channels");
    let members: Collection<Widget> = channels.item("CH1").unwrap().collection("Members");

    assert_eq!(
        members.uri(),
        "https://chat.twilio.com/v2/Services/IS1/Channels/CH1/Members"
    );
}

#[test_case("" ; "empty")]
#[test_case("   " ; "blank")]
#[test_case("IS1/Channels" ; "slash")]
#[test_case("IS1?x=1" ; "query")]
#[test_case("IS1#frag" ; "fragment")]
fn test_item_rejects_invalid_id(id: &str) {
    let services: Collection<Widget> =
        Collection::new(transport(), "https://chat.twilio.com/v2/Services", "");
    let err = services.item(id).unwrap_err();
    assert!(err.is_invalid_argument());
}

// ============================================================================
// Operation Tests
// ============================================================================

#[tokio::test]
async fn test_create_fetch_update_remove() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/Widgets"))
        .and(body_string("FriendlyName=gear"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"sid": "WD1", "friendly_name": "gear"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/Widgets/WD1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sid": "WD1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/Widgets/WD1"))
        .and(body_string("FriendlyName=cog"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"sid": "WD1", "friendly_name": "cog"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/Widgets/WD1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let widgets = widgets(&server);

    let created = widgets
        .create(&Params::new().set("FriendlyName", "gear"))
        .await
        .unwrap();
    assert_eq!(created.friendly_name.as_deref(), Some("gear"));

    let item = widgets.item(&created.sid).unwrap();
    assert_eq!(
        item.fetch().await.unwrap(),
        Widget {
            sid: "WD1".to_string(),
            friendly_name: None
        }
    );

    let updated = item
        .update(&Params::new().set("FriendlyName", "cog"))
        .await
        .unwrap();
    assert_eq!(updated.friendly_name.as_deref(), Some("cog"));

    assert!(item.remove().await.unwrap());
}

#[tokio::test]
async fn test_fetch_unexpected_shape_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/Widgets/WD1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "no sid"})))
        .mount(&server)
        .await;

    let err = widgets(&server).item("WD1").unwrap().fetch().await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("/v1/Widgets/WD1"));
}

#[tokio::test]
async fn test_fetch_missing_item_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/Widgets/WD404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 20404,
            "message": "not found",
            "status": 404
        })))
        .mount(&server)
        .await;

    let err = widgets(&server).item("WD404").unwrap().fetch().await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

fn widget_page(server: &MockServer, page: u32, sids: &[&str], next: bool) -> serde_json::Value {
    let records: Vec<_> = sids.iter().map(|sid| json!({ "sid": sid })).collect();
    let next_page_url = next.then(|| {
        format!(
            "{}/v1/Widgets?PageSize=2&Page={}&PageToken=PT{}",
            server.uri(),
            page + 1,
            page + 1
        )
    });
    json!({
        "meta": {
            "key": "widgets",
            "page": page,
            "page_size": 2,
            "next_page_url": next_page_url
        },
        "widgets": records
    })
}

async fn mount_widget_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/Widgets"))
        .and(query_param("PageToken", "PT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_page(server, 1, &["WD3"], false)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/Widgets"))
        .and(query_param("PageSize", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(widget_page(server, 0, &["WD1", "WD2"], true)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_follows_next_page_url() {
    let server = MockServer::start().await;
    mount_widget_pages(&server).await;

    let all = widgets(&server)
        .list(&ListQuery::new().with_page_size(2))
        .await
        .unwrap();
    let sids: Vec<&str> = all.iter().map(|w| w.sid.as_str()).collect();

    assert_eq!(sids, vec!["WD1", "WD2", "WD3"]);
}

#[tokio::test]
async fn test_each_stops_on_request() {
    let server = MockServer::start().await;
    mount_widget_pages(&server).await;

    let mut seen = Vec::new();
    let outcome = widgets(&server)
        .each(&ListQuery::new().with_page_size(2), |w| {
            seen.push(w.sid);
            Control::Stop
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["WD1".to_string()]);
    assert!(matches!(outcome.end, TraversalEnd::Cancelled));
    assert_eq!(outcome.pages_fetched, 1);
}

#[tokio::test]
async fn test_page_then_next_page() {
    let server = MockServer::start().await;
    mount_widget_pages(&server).await;

    let widgets = widgets(&server);
    let first = widgets
        .page(&ListQuery::new().with_page_size(2))
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let second = widgets.next_page(&first).await.unwrap().unwrap();
    assert_eq!(second.records()[0].sid, "WD3");
    assert!(widgets.next_page(&second).await.unwrap().is_none());
}
