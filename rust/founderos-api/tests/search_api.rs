//! Competitor scan and market-intelligence endpoint tests.

mod common;

use std::sync::Arc;

use serde_json::{Value, json};

use common::{CannedSearch, FailingSearch, HarnessBuilder, harness};
use founderos_api::search::SearchHit;

const SCAN: &str = "/api/tavily/competitor-scan";
const INTEL: &str = "/api/tavily/market-intelligence";

fn request() -> Value {
    json!({
        "competitors": ["Wealthsimple"],
        "industries": ["fintech"],
        "regions": ["Canada"],
        "timeframe": "2024"
    })
}

#[tokio::test]
async fn test_demo_data_without_provider() {
    let h = harness();

    let response = h.server.post(SCAN).json(&request()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["insights"].as_array().unwrap().len(), 3);
    assert_eq!(body["insights"][0]["competitor"], "Wealthsimple");
    assert_eq!(body["marketTrends"].as_array().unwrap().len(), 2);
    assert_eq!(body["scanMetadata"]["sources"], 47);
    assert!(body["scanMetadata"].get("error").is_none());
}

#[tokio::test]
async fn test_malformed_request_gets_fallback() {
    let h = harness();

    let response = h
        .server
        .post(SCAN)
        .text("{ not json")
        .content_type("application/json")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["insights"][0]["competitor"], "Demo Corp");
    assert_eq!(body["marketTrends"], json!([]));
    assert_eq!(body["scanMetadata"]["confidence"], 0);
    assert_eq!(
        body["scanMetadata"]["error"],
        "Demo mode - Tavily API unavailable"
    );
}

#[tokio::test]
async fn test_live_scan_synthesizes_results() {
    let provider = Arc::new(CannedSearch {
        hits: vec![SearchHit {
            title: "Wealthsimple raises $750 million as fintech adoption grows 40%".to_string(),
            url: "https://www.betakit.com/wealthsimple-round".to_string(),
            content: "The Canadian fintech closed a major round.".to_string(),
        }],
    });
    let h = HarnessBuilder::new().search(provider).build();

    let body: Value = h.server.post(SCAN).json(&request()).await.json();

    // funding, product, partnership, market, hiring
    assert_eq!(body["scanMetadata"]["queriesExecuted"], 5);
    assert_eq!(body["scanMetadata"]["failedQueries"], 0);
    assert_eq!(body["scanMetadata"]["sources"], 5);

    let insights = body["insights"].as_array().unwrap();
    assert_eq!(insights.len(), 5);
    assert_eq!(insights[0]["type"], "funding");
    assert_eq!(insights[0]["impact"], "high");
    assert_eq!(insights[0]["source"], "betakit");

    let trends = body["marketTrends"].as_array().unwrap();
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0]["confidence"], 40);
    // base 5, million +2, major +2, canadian +1
    assert_eq!(trends[0]["impactScore"], 10.0);
}

#[tokio::test]
async fn test_intel_without_provider_wraps_mock_data() {
    let h = harness();

    let response = h
        .server
        .post(INTEL)
        .json(&json!({ "analysisType": "funding", "companyName": "Acme" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["error"], "Tavily API key not configured");
    assert_eq!(body["mockData"]["summary"], "Mock funding analysis for Acme");
    assert_eq!(body["mockData"]["sources"], 25);
    assert_eq!(
        body["mockData"]["fundingOpportunities"][0]["program"],
        "SR&ED Tax Credits"
    );
}

#[tokio::test]
async fn test_intel_live_brief() {
    let provider = Arc::new(CannedSearch {
        hits: vec![SearchHit {
            title: "IRAP - Industrial Research Assistance Program".to_string(),
            url: "https://nrc.canada.ca/irap".to_string(),
            content: "IRAP offers grant funding to Canada based startups. SMEs are eligible."
                .to_string(),
        }],
    });
    let h = HarnessBuilder::new().search(provider).build();

    let body: Value = h
        .server
        .post(INTEL)
        .json(&json!({ "analysisType": "funding", "industry": "cleantech" }))
        .await
        .json();

    assert_eq!(body["summary"], "Comprehensive funding analysis for your startup");
    // two funding queries, one hit each
    assert_eq!(body["sources"], 2);
    assert_eq!(body["canadianFocus"], true);
    assert_eq!(body["insights"].as_array().unwrap().len(), 2);
    assert_eq!(body["insights"][0]["type"], "funding");
    assert_eq!(body["fundingOpportunities"][0]["program"], "IRAP");
    assert_eq!(body["fundingOpportunities"][0]["type"], "Government Grant");
    assert_eq!(body["fundingOpportunities"][0]["eligibility"], "SMEs are eligible...");
    assert_eq!(body["recommendations"][0]["action"], "Funding Pipeline");
    assert_eq!(body["confidence"], 95);
    assert!(body.get("note").is_none());
}

#[tokio::test]
async fn test_intel_failed_search_serves_demo_with_note() {
    let h = HarnessBuilder::new().search(Arc::new(FailingSearch)).build();

    let body: Value = h
        .server
        .post(INTEL)
        .json(&json!({ "analysisType": "acquisition" }))
        .await
        .json();
    assert_eq!(body["note"], "Demo data - Tavily API unavailable");
    assert_eq!(body["summary"], "Mock acquisition analysis for your startup");

    let malformed: Value = h
        .server
        .post(INTEL)
        .text("{ nope")
        .content_type("application/json")
        .await
        .json();
    assert_eq!(malformed["note"], "Demo data - Tavily API unavailable");
    assert_eq!(malformed["summary"], "Mock competitor analysis for your startup");
}
