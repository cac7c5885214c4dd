//! Health endpoint tests.

mod common;

use std::sync::Arc;

use serde_json::Value;

use common::{CannedSearch, HarnessBuilder, harness};

#[tokio::test]
async fn test_health_routes_agree() {
    let h = harness();

    for path in ["/health", "/api/ai/health"] {
        let response = h.server.get(path).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["services"]["anthropic"], false);
        assert_eq!(body["services"]["tavily"], false);
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_health_reports_configured_search() {
    let h = HarnessBuilder::new()
        .search(Arc::new(CannedSearch::default()))
        .build();

    let body: Value = h.server.get("/health").await.json();
    assert_eq!(body["services"]["tavily"], true);
}
