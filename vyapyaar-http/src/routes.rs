use crate::{AppState, error::ApiError};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;
use vyapyaar_common::ScrapeOutcome;

pub const SERVICE_BANNER: &str = "VyapyaarAI price service is running";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub in_flight: usize,
    pub capacity: usize,
}

pub(crate) async fn banner() -> &'static str {
    SERVICE_BANNER
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        in_flight: state.in_flight(),
        capacity: state.capacity(),
    })
}

/// Look up prices for `productName`.
///
/// Anything short of a JSON object with a non-empty `productName` string is
/// a `400`, and the price source is never called for it.
pub(crate) async fn scrape_prices(
    State(state): State<AppState>,
    body: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeOutcome>, ApiError> {
    let product_name = match body {
        Ok(Json(ScrapeRequest {
            product_name: Some(name),
        })) if !name.is_empty() => name,
        Ok(_) => return Err(ApiError::MissingProductName),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "scrape.request.rejected");
            return Err(ApiError::MissingProductName);
        }
    };

    let req_id = Uuid::new_v4();
    let span = info_span!("scrape_request", %req_id, product = %product_name);
    async move {
        let _permit = state
            .permits
            .acquire()
            .await
            .map_err(|_| ApiError::ShuttingDown)?;

        let t0 = Instant::now();
        info!(in_flight = state.in_flight(), "scrape.request.start");
        let outcome = state.source.scrape(&product_name).await;
        info!(
            duration_ms = t0.elapsed().as_millis() as u64,
            failed = outcome.is_failure(),
            "scrape.request.done"
        );
        Ok(Json(outcome))
    }
    .instrument(span)
    .await
}
