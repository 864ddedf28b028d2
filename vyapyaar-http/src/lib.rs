//! HTTP front door for price lookups.
//!
//! - `POST /api/scrape-prices` validates `{"productName": ...}` and answers with
//!   the [`ScrapeOutcome`](vyapyaar_common::ScrapeOutcome) verbatim
//! - `GET /` is a liveness banner, `GET /health` reports the scrape gate
//! - CORS is open to any origin; every request is traced by `tower-http`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo(source: std::sync::Arc<dyn vyapyaar_web::PriceSource>) -> std::io::Result<()> {
//! let state = vyapyaar_http::AppState::new(source, 2);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! vyapyaar_http::serve(listener, vyapyaar_http::router(state), std::future::pending()).await
//! # }
//! ```
//!
//! Observability: each scrape runs in a `scrape_request` span carrying a
//! `req_id` (UUID v4) and the product name, so extractor events nest under it.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{HealthReport, SERVICE_BANNER, ScrapeRequest};

use axum::Router;
use axum::http::{Method, header::CONTENT_TYPE};
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use vyapyaar_web::PriceSource;

/// Shared handler state: the price source and the gate bounding live browser sessions.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn PriceSource>,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AppState {
    /// `max_concurrent` of zero is raised to one so the gate can always open.
    pub fn new(source: Arc<dyn PriceSource>, max_concurrent: usize) -> Self {
        let capacity = max_concurrent.max(1);
        Self {
            source,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Scrapes currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Stop admitting new scrapes; waiters and later requests get `503`.
    pub fn close_gate(&self) {
        self.permits.close();
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(routes::banner))
        .route("/health", get(routes::health))
        .route("/api/scrape-prices", post(routes::scrape_prices))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<S>(listener: TcpListener, app: Router, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "http.server.listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("http.server.shutting_down");
        })
        .await
}
