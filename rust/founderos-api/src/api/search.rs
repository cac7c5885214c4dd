//! Competitor scan and market-intelligence endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;
use crate::search::intel::demo_brief;
use crate::search::scan::{demo_report, fallback_report};
use crate::search::{
    CompetitorScanner, IntelReport, IntelRequest, MarketAnalyst, ScanReport, ScanRequest,
};

const INTEL_UNAVAILABLE: &str = "Demo data - Tavily API unavailable";

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tavily/competitor-scan", post(competitor_scan))
        .route("/api/tavily/market-intelligence", post(market_intelligence))
}

/// Market-intelligence answer when no search provider is configured.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Unconfigured {
    error: &'static str,
    mock_data: IntelReport,
}

/// Always answers 200: unreadable requests get the fallback payload and a
/// missing search provider gets demo data.
async fn competitor_scan(
    State(state): State<AppState>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Json<ScanReport> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Competitor scan request rejected, serving fallback");
            return Json(fallback_report(Utc::now()));
        }
    };

    let Some(provider) = &state.search else {
        tracing::info!("No search provider configured, serving demo scan");
        return Json(demo_report(&request.competitors, Utc::now()));
    };

    let scanner = CompetitorScanner::new(Arc::clone(provider));
    Json(scanner.scan(&request).await)
}

/// Always answers 200. Without a provider the brief is wrapped under
/// `mockData` next to an `error`; a failed search or unreadable request gets
/// the demo brief with a `note`.
async fn market_intelligence(
    State(state): State<AppState>,
    body: Result<Json<IntelRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(
                error = %rejection,
                "Market intelligence request rejected, serving demo brief"
            );
            return Json(unavailable(&IntelRequest::default())).into_response();
        }
    };

    let Some(provider) = &state.search else {
        tracing::info!("No search provider configured, serving demo brief");
        return Json(Unconfigured {
            error: "Tavily API key not configured",
            mock_data: demo_brief(
                request.analysis(),
                request.company_name.as_deref(),
                Utc::now(),
            ),
        })
        .into_response();
    };

    let analyst = MarketAnalyst::new(Arc::clone(provider));
    match analyst.analyze(&request, Utc::now()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Market intelligence failed, serving demo brief");
            Json(unavailable(&request)).into_response()
        }
    }
}

fn unavailable(request: &IntelRequest) -> IntelReport {
    IntelReport {
        note: Some(INTEL_UNAVAILABLE.to_string()),
        ..demo_brief(
            request.analysis(),
            request.company_name.as_deref(),
            Utc::now(),
        )
    }
}
