//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_case::test_case;
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// Fake collection server
// ============================================================================

const BASE_URI: &str = "https://example.test/v1/Records";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Links {
    /// Pages carry a next URL
    Url,
    /// Pages carry only a next token
    TokenOnly,
}

/// Serves `total` records, honouring the requested `PageSize`
struct FakeCollection {
    total: usize,
    links: Links,
    fail_on_call: Option<usize>,
    empty_on_call: Option<usize>,
    calls: Mutex<Vec<PageTarget>>,
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
}

impl FakeCollection {
    fn new(total: usize) -> Self {
        Self {
            total,
            links: Links::Url,
            fail_on_call: None,
            empty_on_call: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            overlapped: AtomicBool::new(false),
        }
    }

    fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    fn empty_on(mut self, call: usize) -> Self {
        self.empty_on_call = Some(call);
        self
    }

    fn calls(&self) -> Vec<PageTarget> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn requested_sizes(&self) -> Vec<u32> {
        self.calls()
            .iter()
            .map(|t| t.param(PAGE_SIZE_PARAM).unwrap().parse().unwrap())
            .collect()
    }

    fn serve(&self, target: &PageTarget) -> Result<RawPage> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(target.clone());
            calls.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(Error::http_status(500, r#"{"message":"boom"}"#));
        }

        let size: usize = target
            .param(PAGE_SIZE_PARAM)
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE as usize);
        let offset: usize = target
            .param(PAGE_TOKEN_PARAM)
            .and_then(|t| t.strip_prefix("PT").map(str::to_string))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let page_number: u32 = target
            .param(PAGE_PARAM)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let end = (offset + size).min(self.total);
        let records = if self.empty_on_call == Some(call) {
            Vec::new()
        } else {
            (offset..end)
                .map(|i| json!({"sid": format!("RC{i:03}"), "index": i}))
                .collect()
        };

        let page = RawPage::last(records, page_number);
        if end >= self.total {
            return Ok(page);
        }

        let token = format!("PT{end}");
        Ok(match self.links {
            Links::Url => page.with_next_url(format!(
                "{BASE_URI}?PageSize={size}&Page={}&PageToken={token}",
                page_number + 1
            )),
            Links::TokenOnly => page.with_next_token(token),
        })
    }
}

#[async_trait]
impl PageFetcher for FakeCollection {
    async fn fetch_page(&self, target: &PageTarget) -> Result<RawPage> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        let result = self.serve(target);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Item {
    sid: String,
    index: usize,
}

fn reader(fake: &Arc<FakeCollection>) -> PagedCollectionReader<Item> {
    let fetcher: Arc<dyn PageFetcher> = fake.clone();
    PagedCollectionReader::new(fetcher, BASE_URI)
}

fn indices(items: &[Item]) -> Vec<usize> {
    items.iter().map(|i| i.index).collect()
}

// ============================================================================
// ListQuery Tests
// ============================================================================

#[test]
fn test_list_query_defaults() {
    let query = ListQuery::new();
    assert_eq!(query.page_size(), None);
    assert_eq!(query.effective_page_size(), DEFAULT_PAGE_SIZE);
    assert_eq!(query.limit(), None);
    assert!(query.filters().is_empty());
    assert_ok!(query.validate());
}

#[test_case(0 ; "zero")]
#[test_case(1001 ; "above max")]
fn test_list_query_rejects_page_size(size: u32) {
    let err = ListQuery::new().with_page_size(size).validate().unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("page_size"));
}

#[test_case(1 ; "min")]
#[test_case(1000 ; "max")]
fn test_list_query_accepts_page_size(size: u32) {
    assert_ok!(ListQuery::new().with_page_size(size).validate());
}

#[test_case("PageSize")]
#[test_case("Page")]
#[test_case("PageToken")]
#[test_case("")]
fn test_list_query_rejects_reserved_filter(key: &str) {
    let err = ListQuery::new().with_filter(key, "1").validate().unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_list_query_filters() {
    let query = ListQuery::new()
        .with_filter("Status", "queued")
        .with_filter("To", "+15558675310")
        .with_filter("Status", "delivered")
        .with_filter_opt("From", None::<String>)
        .with_date_filter(
            "DateSent",
            chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        );

    assert_eq!(
        query.filters(),
        &[
            ("Status".to_string(), "delivered".to_string()),
            ("To".to_string(), "+15558675310".to_string()),
            ("DateSent".to_string(), "2024-03-09".to_string()),
        ]
    );
}

#[test]
fn test_list_query_datetime_filter() {
    use chrono::TimeZone;
    let at = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let query = ListQuery::new().with_datetime_filter("StartDate", at);
    assert_eq!(query.filters()[0].1, "2024-01-02T03:04:05Z");
}

#[test_case(None, 50 ; "no limit")]
#[test_case(Some(5), 5 ; "limit below page")]
#[test_case(Some(50), 50 ; "limit equal page")]
#[test_case(Some(500), 50 ; "limit above page")]
fn test_requested_page_size(remaining: Option<u64>, expected: u32) {
    assert_eq!(ListQuery::new().requested_page_size(remaining), expected);
}

// ============================================================================
// State machine Tests
// ============================================================================

#[test]
fn test_traversal_state_transitions() {
    use TraversalState::*;

    assert!(Idle.can_transition_to(Fetching));
    assert!(Fetching.can_transition_to(HasPage));
    assert!(Fetching.can_transition_to(Failed));
    assert!(HasPage.can_transition_to(Fetching));
    assert!(HasPage.can_transition_to(Cancelled));
    assert!(HasPage.can_transition_to(Exhausted));

    assert!(!Idle.can_transition_to(HasPage));
    assert!(!Fetching.can_transition_to(Cancelled));
    for terminal in [Exhausted, LimitReached, Cancelled, Failed] {
        assert!(terminal.is_terminal());
        assert!(!terminal.can_transition_to(Fetching));
    }
    assert!(!HasPage.is_terminal());
}

#[test]
fn test_control_from_bool() {
    assert_eq!(Control::from(true), Control::Continue);
    assert_eq!(Control::from(false), Control::Stop);
    assert!(Control::Stop.is_stop());
}

#[test]
fn test_page_from_raw_reports_bad_record() {
    let raw = RawPage::last(vec![json!({"sid": "RC1", "index": 1}), json!({"sid": 7})], 3);
    let err = Page::<Item>::from_raw(raw).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("record 1 of page 3"));
}

// ============================================================================
// page / get_page
// ============================================================================

#[tokio::test]
async fn test_page_fetches_exactly_one_page() {
    let fake = Arc::new(FakeCollection::new(30));
    let page = reader(&fake)
        .page(&ListQuery::new().with_page_size(10).with_filter("Status", "sent"))
        .await
        .unwrap();

    assert_eq!(page.len(), 10);
    assert_eq!(page.page_number(), 0);
    assert!(page.has_next());
    assert_eq!(fake.call_count(), 1);
    assert_eq!(fake.calls()[0].param("Status"), Some("sent".to_string()));
}

#[tokio::test]
async fn test_page_default_uses_default_size() {
    let fake = Arc::new(FakeCollection::new(120));
    let page = reader(&fake).page_default().await.unwrap();
    assert_eq!(page.len(), 50);
    assert_eq!(fake.requested_sizes(), vec![50]);
}

#[tokio::test]
async fn test_get_page_follows_next_url() {
    let fake = Arc::new(FakeCollection::new(25));
    let reader = reader(&fake);

    let first = reader
        .page(&ListQuery::new().with_page_size(10))
        .await
        .unwrap();
    let second = reader
        .get_page(first.next_page_url().unwrap())
        .await
        .unwrap();

    assert_eq!(second.page_number(), 1);
    assert_eq!(second.records()[0].index, 10);
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn test_page_rejects_invalid_query_without_fetching() {
    let fake = Arc::new(FakeCollection::new(5));
    let err = reader(&fake)
        .page(&ListQuery::new().with_page_size(0))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = reader(&fake).get_page("  ").await.unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_page_transport_error() {
    let fake = Arc::new(FakeCollection::new(5).failing_on(1));
    let err = reader(&fake).page_default().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status_code(), Some(500));
}

// ============================================================================
// list
// ============================================================================

#[tokio::test]
async fn test_list_three_full_pages() {
    let fake = Arc::new(FakeCollection::new(30));
    let records = reader(&fake)
        .list(&ListQuery::new().with_page_size(10))
        .await
        .unwrap();

    assert_eq!(indices(&records), (0..30).collect::<Vec<_>>());
    assert_eq!(fake.call_count(), 3);
    assert!(!fake.overlapped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_list_limit_shrinks_final_request() {
    let fake = Arc::new(FakeCollection::new(30));
    let records = reader(&fake)
        .list(&ListQuery::new().with_page_size(10).with_limit(25))
        .await
        .unwrap();

    assert_eq!(records.len(), 25);
    assert_eq!(fake.call_count(), 3);
    assert_eq!(fake.requested_sizes(), vec![10, 10, 5]);
}

#[tokio::test]
async fn test_small_limit_requests_small_page() {
    let fake = Arc::new(FakeCollection::new(30));
    let records = reader(&fake)
        .list(&ListQuery::new().with_page_size(50).with_limit(5))
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(fake.requested_sizes(), vec![5]);
}

#[test_case(0)]
#[test_case(1)]
#[test_case(9)]
#[test_case(10)]
#[test_case(11)]
#[test_case(29)]
#[test_case(30)]
#[test_case(31)]
#[test_case(1000)]
#[tokio::test]
async fn test_limit_respected_in_list_and_each(limit: u64) {
    let expected = limit.min(30) as usize;
    let query = ListQuery::new().with_page_size(10).with_limit(limit);

    let fake = Arc::new(FakeCollection::new(30));
    let listed = reader(&fake).list(&query).await.unwrap();
    assert_eq!(listed.len(), expected);

    let fake = Arc::new(FakeCollection::new(30));
    let mut calls = 0usize;
    let outcome = reader(&fake)
        .each(&query, |_| {
            calls += 1;
            Control::Continue
        })
        .await
        .unwrap();
    assert_eq!(calls, expected);
    assert_eq!(outcome.delivered, expected as u64);
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_limit_zero_fetches_nothing() {
    let fake = Arc::new(FakeCollection::new(30));
    let query = ListQuery::new().with_limit(0);

    assert!(reader(&fake).list(&query).await.unwrap().is_empty());
    assert!(reader(&fake).page(&query).await.unwrap().is_empty());
    let outcome = reader(&fake).each(&query, |_| Control::Continue).await.unwrap();
    assert!(matches!(outcome.end, TraversalEnd::LimitReached));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_list_is_all_or_nothing() {
    let fake = Arc::new(FakeCollection::new(30).failing_on(2));
    let result = reader(&fake)
        .list(&ListQuery::new().with_page_size(10))
        .await;

    let err = assert_err!(result);
    assert!(err.is_transport());
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn test_list_stops_on_empty_page() {
    let fake = Arc::new(FakeCollection::new(30).empty_on(2));
    let records = reader(&fake)
        .list(&ListQuery::new().with_page_size(10))
        .await
        .unwrap();

    assert_eq!(records.len(), 10);
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn test_list_follows_token_only_pages() {
    let fake = Arc::new(FakeCollection::new(25).with_links(Links::TokenOnly));
    let records = reader(&fake)
        .list(&ListQuery::new().with_page_size(10).with_filter("Status", "sent"))
        .await
        .unwrap();

    assert_eq!(indices(&records), (0..25).collect::<Vec<_>>());
    let calls = fake.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].param(PAGE_TOKEN_PARAM), Some("PT10".to_string()));
    assert_eq!(calls[1].param(PAGE_PARAM), Some("1".to_string()));
    assert_eq!(calls[2].param("Status"), Some("sent".to_string()));
}

#[tokio::test]
async fn test_list_untyped_records() {
    let fake = Arc::new(FakeCollection::new(3));
    let fetcher: Arc<dyn PageFetcher> = fake.clone();
    let reader: PagedCollectionReader<JsonObject> = PagedCollectionReader::new(fetcher, BASE_URI);

    let records = reader.list(&ListQuery::new()).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["sid"], "RC002");
}

// ============================================================================
// each
// ============================================================================

#[tokio::test]
async fn test_each_preserves_server_order() {
    let query = ListQuery::new().with_page_size(7);

    let fake = Arc::new(FakeCollection::new(30));
    let listed = reader(&fake).list(&query).await.unwrap();

    let fake = Arc::new(FakeCollection::new(30));
    let mut delivered = Vec::new();
    reader(&fake)
        .each(&query, |item| {
            delivered.push(item);
            Control::Continue
        })
        .await
        .unwrap();

    assert_eq!(listed, delivered);
    assert_eq!(indices(&delivered), (0..30).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_each_stop_after_second_record() {
    let fake = Arc::new(FakeCollection::new(30));
    let mut seen = 0;
    let outcome = reader(&fake)
        .each(&ListQuery::new().with_page_size(10), |_| {
            seen += 1;
            Control::from(seen < 2)
        })
        .await
        .unwrap();

    assert_eq!(seen, 2);
    assert!(outcome.is_cancelled());
    assert_eq!(outcome.pages_fetched, 1);
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test]
async fn test_each_stop_on_fifteenth_record() {
    let fake = Arc::new(FakeCollection::new(30));
    let mut seen = 0;
    let outcome = reader(&fake)
        .each(&ListQuery::new().with_page_size(10), |_| {
            seen += 1;
            if seen == 15 {
                Control::Stop
            } else {
                Control::Continue
            }
        })
        .await
        .unwrap();

    assert_eq!(seen, 15);
    assert_eq!(outcome.delivered, 15);
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn test_each_failure_keeps_prior_delivery() {
    let fake = Arc::new(FakeCollection::new(30).failing_on(2));
    let mut delivered = Vec::new();
    let outcome = reader(&fake)
        .each(&ListQuery::new().with_page_size(10), |item| {
            delivered.push(item.index);
            Control::Continue
        })
        .await
        .unwrap();

    assert_eq!(delivered, (0..10).collect::<Vec<_>>());
    assert_eq!(outcome.delivered, 10);
    assert!(!outcome.is_complete());
    assert_eq!(outcome.error().and_then(Error::status_code), Some(500));
    assert!(outcome.into_result().is_err());
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn test_each_first_page_failure() {
    let fake = Arc::new(FakeCollection::new(30).failing_on(1));
    let outcome = reader(&fake)
        .each(&ListQuery::new(), |_| Control::Continue)
        .await
        .unwrap();

    assert_eq!(outcome.delivered, 0);
    assert!(outcome.error().is_some_and(Error::is_transport));
}

#[tokio::test]
async fn test_each_invalid_argument_is_immediate() {
    let fake = Arc::new(FakeCollection::new(30));
    let result = reader(&fake)
        .each(&ListQuery::new().with_page_size(5000), |_| Control::Continue)
        .await;

    assert!(result.unwrap_err().is_invalid_argument());
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_each_fetches_are_sequential() {
    let fake = Arc::new(FakeCollection::new(30));
    let outcome = reader(&fake)
        .each(&ListQuery::new().with_page_size(10), |_| Control::Continue)
        .await
        .unwrap();

    assert!(matches!(outcome.end, TraversalEnd::Exhausted));
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(fake.call_count(), 3);
    assert!(!fake.overlapped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_independent_traversals_run_concurrently() {
    let fake = Arc::new(FakeCollection::new(40));
    let reader = reader(&fake);
    let query = ListQuery::new().with_page_size(10);

    let (a, b) = tokio::join!(reader.list(&query), reader.list(&query));

    assert_eq!(indices(&a.unwrap()), (0..40).collect::<Vec<_>>());
    assert_eq!(indices(&b.unwrap()), (0..40).collect::<Vec<_>>());
    assert_eq!(fake.call_count(), 8);
}

// ============================================================================
// stream
// ============================================================================

#[tokio::test]
async fn test_stream_matches_list() {
    let fake = Arc::new(FakeCollection::new(23));
    let streamed: Vec<Item> = reader(&fake)
        .stream(ListQuery::new().with_page_size(10))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(indices(&streamed), (0..23).collect::<Vec<_>>());
    assert_eq!(fake.call_count(), 3);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let fake = Arc::new(FakeCollection::new(30));
    let taken: Vec<Item> = reader(&fake)
        .stream(ListQuery::new().with_page_size(10))
        .unwrap()
        .take(12)
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(taken.len(), 12);
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn test_stream_ends_after_error() {
    let fake = Arc::new(FakeCollection::new(30).failing_on(2));
    let results: Vec<Result<Item>> = reader(&fake)
        .stream(ListQuery::new().with_page_size(10))
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 11);
    assert!(results[..10].iter().all(std::result::Result::is_ok));
    assert!(results[10].as_ref().is_err_and(Error::is_transport));
}

#[tokio::test]
async fn test_stream_rejects_invalid_query() {
    let fake = Arc::new(FakeCollection::new(30));
    let result = reader(&fake).stream(ListQuery::new().with_filter("PageToken", "x"));
    assert!(result.is_err());
}
