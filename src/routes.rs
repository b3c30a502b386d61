//! Router construction: one CRUD router per resource, plus common routes.

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::domain::CatalogEntity;
use crate::handlers;
use crate::lifecycle::LifecycleController;

/// CRUD routes for one resource, mounted by the caller at `/{resource}`:
///
/// ```text
/// GET    /             -> list     (?include_deleted=true)
/// POST   /             -> create
/// GET    /:id          -> show     (?include_deleted=true)
/// PUT    /:id          -> update
/// DELETE /:id          -> destroy  (soft delete)
/// POST   /:id/restore  -> restore
/// ```
pub fn resource_routes<T>(controller: LifecycleController<T>) -> Router
where
    T: CatalogEntity + Serialize,
{
    Router::new()
        .route("/", get(handlers::list::<T>).post(handlers::create::<T>))
        .route(
            "/:id",
            get(handlers::show::<T>)
                .put(handlers::update::<T>)
                .delete(handlers::destroy::<T>),
        )
        .route("/:id/restore", post(handlers::restore::<T>))
        .with_state(controller)
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes (no state): GET /health, GET /version.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}

/// Common routes including readiness with a storage probe.
pub fn common_routes_with_ready<T>(controller: LifecycleController<T>) -> Router
where
    T: CatalogEntity,
{
    async fn ready<T: CatalogEntity>(
        axum::extract::State(controller): axum::extract::State<LifecycleController<T>>,
    ) -> Result<Json<ReadyBody>, (axum::http::StatusCode, Json<ReadyBody>)> {
        if controller.ping().await.is_err() {
            return Err((
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyBody {
                    status: "degraded",
                    storage: Some("unavailable"),
                }),
            ));
        }
        Ok(Json(ReadyBody {
            status: "ok",
            storage: Some("ok"),
        }))
    }

    common_routes().merge(
        Router::new()
            .route("/ready", get(ready::<T>))
            .with_state(controller),
    )
}
