//! HTTP handlers for catalog resources, generic over the entity type.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::{CatalogEntity, Record};
use crate::error::AppError;
use crate::lifecycle::LifecycleController;
use crate::store::Scope;

fn parse_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest("invalid uuid".into()))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(default)]
    include_deleted: bool,
}

impl ScopeQuery {
    fn scope(&self) -> Scope {
        if self.include_deleted {
            Scope::WithDeleted
        } else {
            Scope::Active
        }
    }
}

pub async fn list<T>(
    State(controller): State<LifecycleController<T>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<Record<T>>>, AppError>
where
    T: CatalogEntity + Serialize,
{
    Ok(Json(controller.list(query.scope()).await?))
}

pub async fn show<T>(
    State(controller): State<LifecycleController<T>>,
    Path(id_str): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Record<T>>, AppError>
where
    T: CatalogEntity + Serialize,
{
    let id = parse_id(&id_str)?;
    Ok(Json(controller.find(id, query.scope()).await?))
}

pub async fn create<T>(
    State(controller): State<LifecycleController<T>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Record<T>>), AppError>
where
    T: CatalogEntity + Serialize,
{
    let body = body_to_map(body)?;
    let record = controller.create(&body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<T>(
    State(controller): State<LifecycleController<T>>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Record<T>>, AppError>
where
    T: CatalogEntity + Serialize,
{
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    Ok(Json(controller.update(id, &body).await?))
}

pub async fn destroy<T>(
    State(controller): State<LifecycleController<T>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError>
where
    T: CatalogEntity,
{
    let id = parse_id(&id_str)?;
    controller.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore<T>(
    State(controller): State<LifecycleController<T>>,
    Path(id_str): Path<String>,
) -> Result<Json<Record<T>>, AppError>
where
    T: CatalogEntity + Serialize,
{
    let id = parse_id(&id_str)?;
    Ok(Json(controller.restore(id).await?))
}
