//! Ticket DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Ticket, TicketType, ZoneState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInBody {
    #[validate(length(min = 1, message = "gateId is required"))]
    pub gate_id: String,
    #[validate(length(min = 1, message = "zoneId is required"))]
    pub zone_id: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    #[validate(length(min = 1, message = "subscriptionId must not be empty"))]
    pub subscription_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub ticket: Ticket,
    pub zone_state: ZoneState,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutBody {
    #[validate(length(min = 1, message = "ticketId is required"))]
    pub ticket_id: String,
    /// Bill a subscriber ticket at the zone's visitor rates
    #[serde(default)]
    pub force_convert_to_visitor: bool,
}
