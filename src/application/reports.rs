//! Admin read models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Subscription, Zone};

/// Occupancy of one zone as shown on the admin parking-state report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneReport {
    pub zone_id: String,
    pub name: String,
    pub total_slots: u32,
    pub occupied: u32,
    pub free: u32,
    pub reserved: u32,
    pub available_for_visitors: u32,
    pub available_for_subscribers: u32,
    /// Active, unexpired subscriptions in the zone's category
    pub subscriber_count: usize,
    pub open: bool,
}

pub fn parking_state(
    zones: &[Zone],
    subscriptions: &[Subscription],
    at: DateTime<Utc>,
) -> Vec<ZoneReport> {
    zones
        .iter()
        .map(|zone| ZoneReport {
            zone_id: zone.id.clone(),
            name: zone.name.clone(),
            total_slots: zone.total_slots,
            occupied: zone.occupied,
            free: zone.free(),
            reserved: zone.reserved,
            available_for_visitors: zone.available_for_visitors(),
            available_for_subscribers: zone.available_for_subscribers(),
            subscriber_count: subscriptions
                .iter()
                .filter(|s| s.category_id == zone.category_id && s.is_valid_at(at))
                .count(),
            open: zone.open,
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subscription(id: &str, category: &str, active: bool, expires_in_days: i64) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: id.into(),
            user_name: id.into(),
            active,
            category_id: category.into(),
            cars: vec![],
            starts_at: now - Duration::days(10),
            expires_at: now + Duration::days(expires_in_days),
            current_checkins: vec![],
        }
    }

    #[test]
    fn counts_only_valid_subscriptions_in_category() {
        let zone = Zone {
            id: "zone_a".into(),
            name: "Zone A".into(),
            category_id: "cat_premium".into(),
            gate_ids: vec![],
            total_slots: 10,
            occupied: 3,
            reserved: 2,
            reserved_capacity: 2,
            open: true,
            rate_normal: None,
            rate_special: None,
        };
        let subs = vec![
            subscription("s1", "cat_premium", true, 5),
            subscription("s2", "cat_premium", false, 5),
            subscription("s3", "cat_premium", true, -1),
            subscription("s4", "cat_regular", true, 5),
        ];
        let report = parking_state(&[zone], &subs, Utc::now());
        assert_eq!(report[0].subscriber_count, 1);
        assert_eq!(report[0].free, 7);
        assert_eq!(report[0].available_for_visitors, 5);
    }
}
