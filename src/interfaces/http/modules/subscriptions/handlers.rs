use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::ParkingEngine;
use crate::domain::{DomainError, Subscription};
use crate::interfaces::http::common::{ApiResult, ErrorBody};

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    tag = "Subscriptions",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription with current check-ins", body = Subscription),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_subscription(
    State(engine): State<ParkingEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Subscription>> {
    let subscription = engine
        .repos
        .subscriptions()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Subscription", &id))?;
    Ok(Json(subscription))
}
