//! Server entry point: env config, Postgres bootstrap, routers, serve.

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use catalog_api::{
    common_routes_with_ready, ensure_catalog_tables, ensure_database_exists, resource_routes,
    Category, Genre, LifecycleController, PgEntityStore, ServerConfig,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("catalog_api=info".parse()?))
        .init();

    let config = ServerConfig::from_env();
    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    ensure_catalog_tables(&pool).await?;

    let categories =
        LifecycleController::new(Arc::new(PgEntityStore::<Category>::new(pool.clone())));
    let genres = LifecycleController::new(Arc::new(PgEntityStore::<Genre>::new(pool)));

    let app = Router::new()
        .merge(common_routes_with_ready(categories.clone()))
        .nest("/categories", resource_routes(categories))
        .nest("/genres", resource_routes(genres))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
