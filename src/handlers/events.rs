use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthAdmin;
use crate::models::EventDraft;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Serialize)]
struct CreatedEvent {
    event_id: i64,
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.catalog.list().await?;
    Ok(success(events, "Events retrieved successfully").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = state.catalog.find(event_id).await?;
    Ok(success(event, "Event retrieved successfully").into_response())
}

pub async fn managed_events(
    State(state): State<AppState>,
    AuthAdmin(claims): AuthAdmin,
) -> Result<Response, AppError> {
    let events = state.catalog.list_managed(&claims).await?;
    Ok(success(events, "Managed events retrieved successfully").into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    AuthAdmin(claims): AuthAdmin,
    Json(draft): Json<EventDraft>,
) -> Result<Response, AppError> {
    let event_id = state.catalog.create(&claims, &draft).await?;
    Ok(created(CreatedEvent { event_id }, "Event created successfully").into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    AuthAdmin(claims): AuthAdmin,
    Path(event_id): Path<i64>,
    Json(draft): Json<EventDraft>,
) -> Result<Response, AppError> {
    state.catalog.update(&claims, event_id, &draft).await?;
    Ok(empty_success("Event updated successfully").into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    AuthAdmin(claims): AuthAdmin,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    state.catalog.delete(&claims, event_id).await?;
    Ok(empty_success("Event and associated tickets deleted successfully").into_response())
}
