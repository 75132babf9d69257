use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::matching::router::{eligibility_handler, program_handler, search_handler};
use crate::matching::search::{CatalogFilter, SearchOptions};
use crate::matching::{MatchRequest, MatchingService, ScoringConfig};

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn medic_json(total_points: i64) -> Value {
    serde_json::to_value(raw_profile(medic_subjects(), total_points)).unwrap()
}

#[tokio::test]
async fn matches_route_returns_ranked_results() {
    let router = router_with(search_catalog());

    let response = router
        .oneshot(json_request(
            "/api/v1/matches",
            json!({ "profile": medic_json(37), "include_ineligible": true }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], json!(4));
    assert_eq!(payload["results"][0]["program"]["id"], json!("open-arts"));
    assert_eq!(payload["results"][2]["verdict"]["eligible"], json!(false));
    assert_eq!(
        payload["results"][2]["shortfalls"][0]["kind"],
        json!("points")
    );
    assert!(payload["results"][3]["score"].is_null());
}

#[tokio::test]
async fn matches_route_applies_filters() {
    let router = router_with(search_catalog());

    let response = router
        .oneshot(json_request(
            "/api/v1/matches",
            json!({
                "profile": medic_json(40),
                "filter": { "countries": ["netherlands"] },
                "include_ineligible": true,
                "limit": 5
            }),
        ))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], json!(1));
    assert_eq!(
        payload["results"][0]["program"]["id"],
        json!("delft-engineering")
    );
}

#[tokio::test]
async fn search_handler_rejects_invalid_profiles() {
    let service = Arc::new(service_with(search_catalog()));
    let request = MatchRequest {
        profile: raw_profile(vec![subject("ASTROLOGY", "HL", 7)], 30),
        filter: CatalogFilter::default(),
        options: SearchOptions::default(),
    };

    let response = search_handler::<MemoryRepository>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("ASTROLOGY"));
}

#[tokio::test]
async fn search_handler_reports_unavailable_catalog() {
    let service = Arc::new(MatchingService::new(
        Arc::new(UnavailableRepository),
        courses(),
        ScoringConfig::default(),
    ));
    let request = MatchRequest {
        profile: raw_profile(medic_subjects(), 38),
        filter: CatalogFilter::default(),
        options: SearchOptions::default(),
    };

    let response =
        search_handler::<UnavailableRepository>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn eligibility_route_explains_a_single_program() {
    let router = router_with(search_catalog());

    let response = router
        .oneshot(json_request(
            "/api/v1/programs/medicine/eligibility",
            medic_json(38),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["verdict"]["eligible"], json!(true));
    assert_eq!(payload["verdict"]["points_margin"], json!(0));
    assert_eq!(payload["components"][0]["source"]["kind"], json!("points_margin"));
}

#[tokio::test]
async fn eligibility_handler_returns_not_found_for_unknown_programs() {
    let service = Arc::new(service_with(search_catalog()));

    let response = eligibility_handler::<MemoryRepository>(
        State(service),
        Path("veterinary".to_string()),
        axum::Json(raw_profile(medic_subjects(), 38)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn program_handler_returns_catalog_entries() {
    let service = Arc::new(service_with(search_catalog()));

    let found =
        program_handler::<MemoryRepository>(State(service.clone()), Path("medicine".to_string()))
            .await;
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["min_ib_points"], json!(38));
    assert_eq!(
        payload["requirement_groups"][0]["alternatives"][0]["level"],
        json!("HL")
    );

    let missing =
        program_handler::<MemoryRepository>(State(service), Path("nowhere".to_string())).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
