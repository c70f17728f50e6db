//! Master data: gates, zones and categories as the gate screens see them.

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::ZoneFilter;
use crate::application::ParkingEngine;
use crate::domain::{Category, DomainError, Gate, ZoneState};
use crate::interfaces::http::common::{ApiResult, ErrorBody};

#[utoipa::path(
    get,
    path = "/api/v1/master/gates",
    tag = "Master Data",
    responses(
        (status = 200, description = "All gates", body = Vec<Gate>)
    )
)]
pub async fn list_gates(State(engine): State<ParkingEngine>) -> ApiResult<Json<Vec<Gate>>> {
    let mut gates = engine.repos.gates().find_all().await?;
    gates.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(gates))
}

#[utoipa::path(
    get,
    path = "/api/v1/master/zones",
    tag = "Master Data",
    params(ZoneFilter),
    responses(
        (status = 200, description = "Zones with live occupancy", body = Vec<ZoneState>),
        (status = 404, description = "Unknown gate", body = ErrorBody)
    )
)]
pub async fn list_zones(
    State(engine): State<ParkingEngine>,
    Query(filter): Query<ZoneFilter>,
) -> ApiResult<Json<Vec<ZoneState>>> {
    let zones = engine.config.zone_states()?;
    let Some(gate_id) = filter.gate_id else {
        return Ok(Json(zones));
    };

    let gate = engine
        .repos
        .gates()
        .find_by_id(&gate_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Gate", &gate_id))?;

    Ok(Json(
        zones.into_iter().filter(|z| gate.serves(&z.id)).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/master/categories",
    tag = "Master Data",
    responses(
        (status = 200, description = "Pricing categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(State(engine): State<ParkingEngine>) -> Json<Vec<Category>> {
    Json(engine.config.categories())
}
