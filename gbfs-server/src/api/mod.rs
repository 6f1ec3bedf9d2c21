//! HTTP surface: one route per feed and version, plus a landing page.
//!
//! Versions are mounted under their major number (`/2`, `/3`). Discovery
//! links are absolute; they use the configured public URL when there is one
//! and are otherwise derived from the request's `Host` header.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::routing::get;
use chrono::Utc;
use gbfs_core::FeedStore;
use gbfs_feeds::{
    BaseUrl, FeedContext, FeedDocument, FeedRequest, GbfsVersion, Publisher, build_feed,
};
use tower_http::cors::{Any, CorsLayer};

mod error;
mod home;

pub use error::ApiError;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn FeedStore>,
    publisher: Arc<Publisher>,
    public_url: Option<BaseUrl>,
    ttl: u32,
}

impl AppState {
    /// State over `store` with default publisher details and no caching.
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self {
            store,
            publisher: Arc::new(Publisher::default()),
            public_url: None,
            ttl: 0,
        }
    }

    /// Use a fixed base for generated links.
    #[must_use]
    pub fn with_public_url(mut self, public_url: BaseUrl) -> Self {
        self.public_url = Some(public_url);
        self
    }

    /// Replace the publisher details.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = Arc::new(publisher);
        self
    }

    /// Advertise a cache lifetime in every envelope.
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    fn base_url(&self, headers: &HeaderMap) -> BaseUrl {
        if let Some(public_url) = &self.public_url {
            return public_url.clone();
        }
        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get(FORWARDED_PROTO)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("http");
        BaseUrl::new(format!("{scheme}://{host}"))
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing))
        .nest("/2", version_routes(GbfsVersion::V2))
        .nest("/3", version_routes(GbfsVersion::V3))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

fn version_routes(version: GbfsVersion) -> Router<AppState> {
    version
        .routes()
        .iter()
        .fold(Router::new(), |router, &feed| {
            if feed.is_network_scoped() {
                router.route(
                    &format!("/{{uid}}/{}", feed.file_name()),
                    get(
                        move |State(state): State<AppState>,
                              Path(uid): Path<String>,
                              headers: HeaderMap| async move {
                            respond(&state, &headers, FeedRequest::network(version, feed, &uid))
                                .await
                        },
                    ),
                )
            } else {
                router.route(
                    &format!("/{}", feed.file_name()),
                    get(
                        move |State(state): State<AppState>, headers: HeaderMap| async move {
                            respond(&state, &headers, FeedRequest::global(version, feed)).await
                        },
                    ),
                )
            }
        })
}

async fn respond(
    state: &AppState,
    headers: &HeaderMap,
    request: FeedRequest<'_>,
) -> Result<Json<FeedDocument>, ApiError> {
    let urls = state.base_url(headers);
    let context = FeedContext {
        store: state.store.as_ref(),
        urls: &urls,
        publisher: &state.publisher,
        ttl: state.ttl,
        now: Utc::now(),
    };
    Ok(Json(build_feed(&context, request).await?))
}

async fn landing(State(state): State<AppState>, headers: HeaderMap) -> String {
    home::render(state.base_url(&headers).as_str())
}
