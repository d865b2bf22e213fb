use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::FrequencyUnit;

/// A budget item as stored: one flat row scoped to a category/period pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItemRecord {
    pub id: i64,
    pub category_id: i64,
    pub period_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub level: u32,
    pub order: u32,
    #[serde(default)]
    pub target_frequency: Option<u32>,
    #[serde(default)]
    pub frequency_unit: Option<FrequencyUnit>,
    #[serde(default)]
    pub unit_amount: Option<f64>,
    #[serde(default)]
    pub total_target: Option<f64>,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// The upsert payload for one node. `parent_id` always carries the *real*
/// (store-resolved) parent id, never a session-local one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItemPayload {
    pub category_id: i64,
    pub period_id: i64,
    pub parent_id: Option<i64>,
    pub code: String,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub order: u32,
    pub target_frequency: Option<u32>,
    pub frequency_unit: Option<FrequencyUnit>,
    pub unit_amount: Option<f64>,
    pub total_target: Option<f64>,
    pub active: bool,
}

impl BudgetItemRecord {
    /// Apply an upsert payload, leaving id and `created` untouched.
    pub fn apply(&mut self, payload: &BudgetItemPayload, now: DateTime<Utc>) {
        self.category_id = payload.category_id;
        self.period_id = payload.period_id;
        self.parent_id = payload.parent_id;
        self.code = payload.code.clone();
        self.name = payload.name.clone();
        self.description = payload.description.clone();
        self.level = payload.level;
        self.order = payload.order;
        self.target_frequency = payload.target_frequency;
        self.frequency_unit = payload.frequency_unit;
        self.unit_amount = payload.unit_amount;
        self.total_target = payload.total_target;
        self.active = payload.active;
        self.updated = now;
    }

    /// Materialize a new record from a create payload.
    pub fn from_payload(id: i64, payload: &BudgetItemPayload, now: DateTime<Utc>) -> Self {
        BudgetItemRecord {
            id,
            category_id: payload.category_id,
            period_id: payload.period_id,
            parent_id: payload.parent_id,
            code: payload.code.clone(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            level: payload.level,
            order: payload.order,
            target_frequency: payload.target_frequency,
            frequency_unit: payload.frequency_unit,
            unit_amount: payload.unit_amount,
            total_target: payload.total_target,
            active: payload.active,
            created: now,
            updated: now,
        }
    }
}
