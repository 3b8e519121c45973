use std::{fmt, str::FromStr};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    Json,
};
use serde::{de, Deserialize, Deserializer};
use service::animal::domain::{Animal, AnimalFilter, AnimalInput};
use tracing::info;

use crate::{errors::JsonApiError, state::ServerState};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub species: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, rename = "minimumAge", alias = "minimum_age", deserialize_with = "empty_string_as_none")]
    pub minimum_age: Option<i32>,
}

/// `?species=` arrives as an empty string; treat it like an absent parameter.
fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

fn location(id: i32) -> String {
    format!("/animals/{}", id)
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Animal>>, JsonApiError> {
    let Query(q) = query?;
    let filter = AnimalFilter::new(q.species, q.name, q.minimum_age);
    let list = state.animals.list(filter).await?;
    info!(count = list.len(), "list animals");
    Ok(Json(list))
}

pub async fn get(State(state): State<ServerState>, path: Result<Path<i32>, PathRejection>) -> Result<Json<Animal>, JsonApiError> {
    let Path(id) = path?;
    Ok(Json(state.animals.get(id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<AnimalInput>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Animal>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.animals.create(input).await?;
    info!(id = created.id, "created animal");
    Ok((StatusCode::CREATED, [(header::LOCATION, location(created.id))], Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AnimalInput>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    state.animals.update(id, input).await?;
    info!(id, "updated animal");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(State(state): State<ServerState>, path: Result<Path<i32>, PathRejection>) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    state.animals.delete(id).await?;
    info!(id, "deleted animal");
    Ok(StatusCode::NO_CONTENT)
}
