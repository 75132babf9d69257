use crate::infra::{AppState, CatalogSummary};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use ib_match::matching::{matching_router, MatchingService, ProgramRepository};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_matching_routes<R>(service: Arc<MatchingService<R>>) -> axum::Router
where
    R: ProgramRepository + 'static,
{
    matching_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/catalog", axum::routing::get(catalog_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "programs": state.catalog.programs })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn catalog_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<CatalogSummary> {
    Json(CatalogSummary::clone(&state.catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{load_catalog, CatalogSource};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use ib_match::config::CatalogConfig;
    use ib_match::matching::{CourseCatalog, ScoringConfig, StaticProgramRepository};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let courses = Arc::new(CourseCatalog::standard());
        let (load, source) = load_catalog(&CatalogConfig::default(), &courses).expect("loads");
        let summary = CatalogSummary::new(source, &load);
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            catalog: Arc::new(summary),
        };
        let service = Arc::new(MatchingService::new(
            Arc::new(StaticProgramRepository::new(load.catalog)),
            courses,
            ScoringConfig::default(),
        ));

        with_matching_routes(service).layer(Extension(state))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn readiness_reflects_the_flag() {
        let (status, body) = get(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], json!("initializing"));

        let (status, body) = get(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["programs"].as_u64().unwrap_or_default() > 0);
    }

    #[tokio::test]
    async fn catalog_endpoint_reports_the_load() {
        let (status, body) = get(app(true), "/api/v1/catalog").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"]["kind"], json!("bundled"));
        assert_eq!(body["rejected"], json!([]));
        assert!(body["loaded_at"].is_string());
    }

    #[tokio::test]
    async fn matching_routes_are_mounted() {
        let (status, body) = get(app(true), "/api/v1/programs/uk-imperial-medicine").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["min_ib_points"], json!(38));
    }

    #[test]
    fn bundled_source_serializes_with_kind_tag() {
        let value = serde_json::to_value(CatalogSource::Bundled).expect("serializes");
        assert_eq!(value, json!({ "kind": "bundled" }));
    }
}
