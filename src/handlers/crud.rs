//! Generic CRUD handlers: list, create, read, update, delete.

use crate::error::AppError;
use crate::extractors::RequestMeta;
use crate::model::Resource;
use crate::state::CrudState;
use crate::storage::StorageBackend;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v).map_err(|e| AppError::BadRequest(e.body_text()))
}

pub async fn list<M, S>(
    State(state): State<CrudState<M, S>>,
    meta: RequestMeta,
) -> Result<Json<Vec<M>>, AppError>
where
    M: Resource,
    S: StorageBackend<M>,
{
    Ok(Json(state.service.list(&meta).await?))
}

pub async fn create<M, S>(
    State(state): State<CrudState<M, S>>,
    meta: RequestMeta,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<M>), AppError>
where
    M: Resource,
    S: StorageBackend<M>,
{
    let body = json_body(body)?;
    let item = state.service.create(body, &meta).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn read<M, S>(
    State(state): State<CrudState<M, S>>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<M>, AppError>
where
    M: Resource,
    S: StorageBackend<M>,
{
    Ok(Json(state.service.get(&id, &meta).await?))
}

pub async fn update<M, S>(
    State(state): State<CrudState<M, S>>,
    Path(id): Path<String>,
    meta: RequestMeta,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<M>, AppError>
where
    M: Resource,
    S: StorageBackend<M>,
{
    let body = json_body(body)?;
    Ok(Json(state.service.update(&id, body, &meta).await?))
}

pub async fn delete<M, S>(
    State(state): State<CrudState<M, S>>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError>
where
    M: Resource,
    S: StorageBackend<M>,
{
    state.service.delete(&id, &meta).await?;
    Ok(StatusCode::NO_CONTENT)
}
