use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthAdmin, AuthUser};
use crate::models::Ticket;
use crate::render;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub event_id: i64,
    pub quantity: i64,
}

#[derive(Serialize)]
struct PurchasedTicket {
    #[serde(flatten)]
    ticket: Ticket,
    code_image: String,
}

#[derive(Deserialize)]
pub struct ScanRequest {
    pub code: Option<String>,
}

pub async fn purchase(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(request): Json<PurchaseRequest>,
) -> Result<Response, AppError> {
    let ticket = state
        .issuance
        .purchase(claims.user_id, request.event_id, request.quantity)
        .await?;
    let code_image = render::data_url(state.renderer.as_ref(), &ticket.code);

    Ok(created(
        PurchasedTicket { ticket, code_image },
        "Ticket purchased successfully",
    )
    .into_response())
}

pub async fn my_tickets(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Response, AppError> {
    let tickets = state.reporting.my_tickets(claims.user_id).await?;
    Ok(success(tickets, "Tickets retrieved successfully").into_response())
}

/// Raw image bytes for a code, for clients that want to display or print
/// the scannable image directly.
pub async fn code_image(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    if code.trim().is_empty() {
        return Err(AppError::Validation("Code is required".to_string()));
    }
    let bytes = state.renderer.render(&code);
    Ok((
        [(header::CONTENT_TYPE, state.renderer.content_type())],
        bytes,
    )
        .into_response())
}

pub async fn scan(
    State(state): State<AppState>,
    AuthAdmin(_claims): AuthAdmin,
    Json(request): Json<ScanRequest>,
) -> Result<Response, AppError> {
    let code = request.code.unwrap_or_default();
    let scan = state.validation.validate(&code).await?;
    let message = if scan.valid {
        "Ticket validated successfully"
    } else {
        "Ticket rejected"
    };
    Ok(success(scan, message).into_response())
}

pub async fn all_tickets(
    State(state): State<AppState>,
    AuthAdmin(_claims): AuthAdmin,
) -> Result<Response, AppError> {
    let tickets = state.reporting.all_tickets().await?;
    Ok(success(tickets, "Tickets retrieved successfully").into_response())
}

pub async fn stats(
    State(state): State<AppState>,
    AuthAdmin(_claims): AuthAdmin,
) -> Result<Response, AppError> {
    let stats = state.reporting.stats().await?;
    Ok(success(stats, "Ticket statistics retrieved successfully").into_response())
}
