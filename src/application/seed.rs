//! Startup data loading
//!
//! Seed files use the same JSON shapes the API returns. Everything goes
//! through the runtime validation rules, and any invalid entry aborts startup.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::engine::ParkingEngine;
use crate::domain::{
    Category, DomainError, Gate, RushHour, Subscription, User, UserRole, Vacation, Zone,
};
use crate::infrastructure::crypto::hash_password;

const DEMO_SEED: &str = include_str!("../../seed/demo.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed seed data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid seed data: {0}")]
    Invalid(#[from] DomainError),
    #[error("Failed to hash password for {username}: {source}")]
    Hash {
        username: String,
        source: bcrypt::BcryptError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub categories: Vec<Category>,
    pub gates: Vec<Gate>,
    pub zones: Vec<ZoneSeed>,
    pub subscriptions: Vec<Subscription>,
    pub users: Vec<UserSeed>,
    pub rush_hours: Vec<RushHourSeed>,
    pub vacations: Vec<VacationSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSeed {
    pub id: String,
    pub name: String,
    pub category_id: String,
    #[serde(default)]
    pub gate_ids: Vec<String>,
    pub total_slots: u32,
    #[serde(default)]
    pub occupied: u32,
    #[serde(default)]
    pub reserved_capacity: u32,
    #[serde(default = "default_true")]
    pub open: bool,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rate_normal: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rate_special: Option<Decimal>,
}

impl ZoneSeed {
    /// Pre-occupied slots come out of the general pool first.
    fn into_zone(self) -> Zone {
        let free = self.total_slots.saturating_sub(self.occupied);
        Zone {
            id: self.id,
            name: self.name,
            category_id: self.category_id,
            gate_ids: self.gate_ids,
            total_slots: self.total_slots,
            occupied: self.occupied,
            reserved: self.reserved_capacity.min(free),
            reserved_capacity: self.reserved_capacity,
            open: self.open,
            rate_normal: self.rate_normal,
            rate_special: self.rate_special,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSeed {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    pub password: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RushHourSeed {
    pub week_day: i64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct VacationSeed {
    pub name: String,
    pub from: String,
    pub to: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub gates: usize,
    pub zones: usize,
    pub subscriptions: usize,
    pub users: usize,
    pub rush_hours: usize,
    pub vacations: usize,
}

impl SeedData {
    pub fn demo() -> Result<Self, SeedError> {
        Ok(serde_json::from_str(DEMO_SEED)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validates cross references and loads everything into `engine`.
    pub async fn apply(
        self,
        engine: &ParkingEngine,
        bcrypt_cost: u32,
    ) -> Result<SeedSummary, SeedError> {
        let summary = SeedSummary {
            categories: self.categories.len(),
            gates: self.gates.len(),
            zones: self.zones.len(),
            subscriptions: self.subscriptions.len(),
            users: self.users.len(),
            rush_hours: self.rush_hours.len(),
            vacations: self.vacations.len(),
        };
        self.check_references()?;

        let rush_hours = self
            .rush_hours
            .iter()
            .map(|r| RushHour::parse(r.week_day, &r.from, &r.to))
            .collect::<Result<Vec<_>, _>>()?;
        let vacations = self
            .vacations
            .iter()
            .map(|v| Vacation::parse(&v.name, &v.from, &v.to))
            .collect::<Result<Vec<_>, _>>()?;

        for category in self.categories {
            engine.config.insert_category(category)?;
        }
        for zone in self.zones {
            engine.ledger.insert(zone.into_zone())?;
        }
        for gate in self.gates {
            engine.repos.gates().save(gate).await?;
        }
        for mut subscription in self.subscriptions {
            subscription.current_checkins.clear();
            engine.repos.subscriptions().save(subscription).await?;
        }
        for user in self.users {
            let password_hash =
                hash_password(&user.password, bcrypt_cost).map_err(|source| SeedError::Hash {
                    username: user.username.clone(),
                    source,
                })?;
            engine
                .repos
                .users()
                .create(User {
                    id: user.id.unwrap_or_else(|| format!("u_{}", Uuid::new_v4().simple())),
                    name: if user.name.is_empty() {
                        user.username.clone()
                    } else {
                        user.name
                    },
                    username: user.username,
                    password_hash,
                    role: user.role,
                    active: user.active,
                })
                .await?;
        }
        engine.config.load_calendar(rush_hours, vacations);

        info!(
            categories = summary.categories,
            gates = summary.gates,
            zones = summary.zones,
            subscriptions = summary.subscriptions,
            users = summary.users,
            rush_hours = summary.rush_hours,
            vacations = summary.vacations,
            "Seed data loaded"
        );
        Ok(summary)
    }

    fn check_references(&self) -> Result<(), DomainError> {
        let categories: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let zones: HashMap<&str, &ZoneSeed> =
            self.zones.iter().map(|z| (z.id.as_str(), z)).collect();
        let gates: HashMap<&str, &Gate> = self.gates.iter().map(|g| (g.id.as_str(), g)).collect();

        // Gate and zone must list each other; admission reads one side,
        // event routing the other.
        for zone in &self.zones {
            if !categories.contains(zone.category_id.as_str()) {
                return Err(DomainError::field(
                    &format!("zones.{}.categoryId", zone.id),
                    format!("unknown category {}", zone.category_id),
                ));
            }
            for gate_id in &zone.gate_ids {
                let Some(gate) = gates.get(gate_id.as_str()) else {
                    return Err(DomainError::field(
                        &format!("zones.{}.gateIds", zone.id),
                        format!("unknown gate {}", gate_id),
                    ));
                };
                if !gate.serves(&zone.id) {
                    return Err(DomainError::field(
                        &format!("zones.{}.gateIds", zone.id),
                        format!("gate {} does not list zone {}", gate_id, zone.id),
                    ));
                }
            }
        }
        for gate in &self.gates {
            for zone_id in &gate.zone_ids {
                let Some(zone) = zones.get(zone_id.as_str()) else {
                    return Err(DomainError::field(
                        &format!("gates.{}.zoneIds", gate.id),
                        format!("unknown zone {}", zone_id),
                    ));
                };
                if !zone.gate_ids.iter().any(|g| g == &gate.id) {
                    return Err(DomainError::field(
                        &format!("gates.{}.zoneIds", gate.id),
                        format!("zone {} does not list gate {}", zone_id, gate.id),
                    ));
                }
            }
        }
        for sub in &self.subscriptions {
            if !categories.contains(sub.category_id.as_str()) {
                return Err(DomainError::field(
                    &format!("subscriptions.{}.category", sub.id),
                    format!("unknown category {}", sub.category_id),
                ));
            }
        }
        Ok(())
    }
}

/// Creates the configured admin account when no admin exists yet.
pub async fn ensure_admin(
    engine: &ParkingEngine,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<bool, SeedError> {
    let users = engine.repos.users().find_all().await?;
    if users.iter().any(|u| u.is_admin()) {
        return Ok(false);
    }
    let password_hash = hash_password(password, bcrypt_cost).map_err(|source| SeedError::Hash {
        username: username.to_string(),
        source,
    })?;
    engine
        .repos
        .users()
        .create(User {
            id: format!("u_{}", Uuid::new_v4().simple()),
            username: username.to_string(),
            name: "Administrator".to_string(),
            password_hash,
            role: UserRole::Admin,
            active: true,
        })
        .await?;
    info!(username, "Default admin user created");
    Ok(true)
}

// ── Tests ──────────────────────────────────────────────────────
