//! End-to-end tests for the cache-first client against a running proxy
//!
//! The proxy is served on a loopback port; upstream is either mock mode or a
//! fake upstream that counts calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use skyexplorer::cache::{AddOutcome, FavoriteSet, FileStore, KeyValueStore};
use skyexplorer::client::{ClientError, HttpFetcher, PictureFetcher, PictureHook};
use skyexplorer::data::{ApodError, Upstream, UpstreamReply};
use skyexplorer::proxy::{create_router, AppState, ProxyConfig};

struct CountingUpstream {
    status: u16,
    body: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl Upstream for CountingUpstream {
    async fn fetch_picture(&self, _api_key: &str, _date: &str) -> Result<UpstreamReply, ApodError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UpstreamReply::from_body(self.status, self.body))
    }
}

/// Serves the proxy on a loopback port and returns its base URL
async fn spawn_proxy(upstream: Arc<dyn Upstream>, config: ProxyConfig) -> String {
    let app = create_router(AppState::new(upstream, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn keyed() -> ProxyConfig {
    ProxyConfig {
        api_key: Some("TEST_KEY".to_string()),
        ..Default::default()
    }
}

fn file_store() -> (Arc<dyn KeyValueStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf()));
    (store, temp_dir)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const RECORD_BODY: &str = r#"{
    "date": "2024-07-15",
    "title": "Saturn at Opposition",
    "explanation": "Rings tilted toward Earth.",
    "media_type": "image",
    "url": "https://apod.nasa.gov/apod/image/saturn.jpg",
    "copyright": "A. Astronomer",
    "service_version": "v1"
}"#;

#[tokio::test]
async fn test_mock_mode_round_trip_through_client() {
    let upstream = Arc::new(CountingUpstream {
        status: 500,
        body: "",
        calls: AtomicUsize::new(0),
    });
    let config = ProxyConfig {
        mock_mode: true,
        ..Default::default()
    };
    let base = spawn_proxy(upstream.clone(), config).await;

    let fetcher = HttpFetcher::new(&base);
    let record = fetcher.fetch("2024-07-04").await.unwrap();

    assert_eq!(record.date, "2024-07-04");
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_same_date_hits_network_once_across_sessions() {
    let upstream = Arc::new(CountingUpstream {
        status: 200,
        body: RECORD_BODY,
        calls: AtomicUsize::new(0),
    });
    let base = spawn_proxy(upstream.clone(), keyed()).await;
    let (store, _temp_dir) = file_store();

    let hook = PictureHook::new(HttpFetcher::new(&base), store.clone());
    let first = hook.load(day(2024, 7, 15), false).await;
    let second = hook.load(day(2024, 7, 15), false).await;
    assert_eq!(first.record, second.record);
    assert_eq!(first.record.unwrap().copyright_label(), "A. Astronomer");

    // A fresh hook over the same store starts from the persisted cache.
    let restarted = PictureHook::new(HttpFetcher::new(&base), store);
    let third = restarted.load(day(2024, 7, 15), false).await;
    assert!(third.record.is_some());

    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upstream_404_surfaces_not_found() {
    let upstream = Arc::new(CountingUpstream {
        status: 404,
        body: r#"{"error":"Date not found"}"#,
        calls: AtomicUsize::new(0),
    });
    let base = spawn_proxy(upstream, keyed()).await;

    let err = HttpFetcher::new(&base).fetch("2024-07-15").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound));

    let (store, _temp_dir) = file_store();
    let state = PictureHook::new(HttpFetcher::new(&base), store)
        .load(day(2024, 7, 15), false)
        .await;
    assert!(state.record.is_none());
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("No image available for this date."));
}

#[tokio::test]
async fn test_other_statuses_surface_fetch_error() {
    let upstream = Arc::new(CountingUpstream {
        status: 200,
        body: "not json",
        calls: AtomicUsize::new(0),
    });
    let base = spawn_proxy(upstream, keyed()).await;

    let err = HttpFetcher::new(&base).fetch("2024-07-15").await.unwrap_err();
    assert!(matches!(err, ClientError::FetchStatus(502)));
    assert_eq!(err.to_string(), "Fetch error: 502");
}

#[tokio::test]
async fn test_payload_without_url_is_invalid_response() {
    let upstream = Arc::new(CountingUpstream {
        status: 200,
        body: r#"{"date":"2024-07-15","title":"No media"}"#,
        calls: AtomicUsize::new(0),
    });
    let base = spawn_proxy(upstream, keyed()).await;

    let err = HttpFetcher::new(&base).fetch("2024-07-15").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse));
}

#[tokio::test]
async fn test_unreachable_proxy_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpFetcher::new(&format!("http://{}", addr))
        .fetch("2024-07-15")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.to_string(), "Unable to reach the APOD service");
}

#[tokio::test]
async fn test_favorites_from_fetched_records() {
    let upstream = Arc::new(CountingUpstream {
        status: 200,
        body: RECORD_BODY,
        calls: AtomicUsize::new(0),
    });
    let base = spawn_proxy(upstream, keyed()).await;
    let (store, _temp_dir) = file_store();

    let state = PictureHook::new(HttpFetcher::new(&base), store.clone())
        .load(day(2024, 7, 15), false)
        .await;
    let record = state.record.expect("record should load");

    let mut favorites = FavoriteSet::load(store.clone());
    assert_eq!(favorites.add(record.clone()).unwrap(), AddOutcome::Added);
    assert_eq!(favorites.add(record).unwrap(), AddOutcome::AlreadyPresent);
    assert!(!favorites.remove("1999-12-31").unwrap());

    let reloaded = FavoriteSet::load(store);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.list()[0].title, "Saturn at Opposition");
}
