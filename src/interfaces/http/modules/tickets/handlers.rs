//! Ticket API handlers: check-in, lookup and checkout

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;

use super::dto::{CheckInBody, CheckInResponse, CheckOutBody};
use crate::application::{CheckInRequest, CheckoutResult, ParkingEngine};
use crate::domain::{DomainError, Ticket, TicketType};
use crate::interfaces::http::common::{ApiResult, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    post,
    path = "/api/v1/tickets/checkin",
    tag = "Tickets",
    request_body = CheckInBody,
    responses(
        (status = 200, description = "Ticket issued", body = CheckInResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Unknown gate, zone or subscription", body = ErrorBody),
        (status = 409, description = "Zone full or closed, subscription not eligible", body = ErrorBody)
    )
)]
pub async fn check_in(
    State(engine): State<ParkingEngine>,
    ValidatedJson(body): ValidatedJson<CheckInBody>,
) -> ApiResult<Json<CheckInResponse>> {
    let outcome = engine
        .admission
        .check_in(CheckInRequest {
            gate_id: body.gate_id,
            zone_id: body.zone_id,
            ticket_type: body.ticket_type,
            subscription_id: body.subscription_id,
        })
        .await?;

    let message = match outcome.ticket.ticket_type {
        TicketType::Visitor => format!("Visitor checked in to {}", outcome.zone_state.name),
        TicketType::Subscriber => format!("Subscriber checked in to {}", outcome.zone_state.name),
    };

    Ok(Json(CheckInResponse {
        ticket: outcome.ticket,
        zone_state: outcome.zone_state,
        message,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    tag = "Tickets",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket", body = Ticket),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_ticket(
    State(engine): State<ParkingEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ticket>> {
    let ticket = engine
        .repos
        .tickets()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Ticket", &id))?;
    Ok(Json(ticket))
}

#[utoipa::path(
    post,
    path = "/api/v1/tickets/checkout",
    tag = "Tickets",
    security(("bearer_auth" = [])),
    request_body = CheckOutBody,
    responses(
        (status = 200, description = "Ticket closed and billed", body = CheckoutResult),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Unknown ticket", body = ErrorBody),
        (status = 409, description = "Already checked out", body = ErrorBody)
    )
)]
pub async fn check_out(
    State(engine): State<ParkingEngine>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<CheckOutBody>,
) -> ApiResult<Json<CheckoutResult>> {
    let result = engine
        .billing
        .check_out(&body.ticket_id, body.force_convert_to_visitor)
        .await?;
    info!(
        ticket_id = %result.ticket_id,
        operator = %user.username,
        amount = %result.amount,
        "Checkout processed"
    );
    Ok(Json(result))
}
