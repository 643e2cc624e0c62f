use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use crate::catalog::{CatalogError, RuleCatalogProvider};
use crate::engine::{EngineError, FeatureVector, FortuneDomain, FortuneEngine};

/// Router builder exposing the evaluation endpoint.
pub fn fortune_router<P>(engine: Arc<FortuneEngine<P>>) -> Router
where
    P: RuleCatalogProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/fortune/:domain/evaluate",
            post(evaluate_handler::<P>),
        )
        .with_state(engine)
}

pub(crate) async fn evaluate_handler<P>(
    State(engine): State<Arc<FortuneEngine<P>>>,
    Path(domain): Path<String>,
    axum::Json(features): axum::Json<FeatureVector>,
) -> Response
where
    P: RuleCatalogProvider + 'static,
{
    let Some(domain) = FortuneDomain::parse(&domain) else {
        let payload = json!({
            "error": format!("unknown fortune domain '{domain}'"),
        });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    match engine.evaluate(domain, &features) {
        Ok(evaluation) => {
            (StatusCode::OK, axum::Json(evaluation.view())).into_response()
        }
        Err(EngineError::Catalog(CatalogError::Unavailable(detail))) => {
            tracing::error!(domain = domain.label(), detail, "rule catalog unavailable");
            let payload = json!({
                "error": "rule catalog unavailable",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
