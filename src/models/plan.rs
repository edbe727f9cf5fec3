//! Daily plans
//!
//! A plan belongs to one "day". Days start at 07:00 in a fixed UTC-7
//! offset, so a plan written at 2am still belongs to the previous day.

use super::Document;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Offset of the day start from midnight UTC: 07:00 at UTC-7 is 14:00 UTC.
const DAY_START_UTC_SECS: i64 = 14 * 3600;
const SECS_PER_DAY: i64 = 86_400;

/// Start of the day containing `now`.
pub fn day_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let into_day = (now.timestamp() - DAY_START_UTC_SECS).rem_euclid(SECS_PER_DAY);
    now - TimeDelta::seconds(into_day)
        - TimeDelta::nanoseconds(i64::from(now.timestamp_subsec_nanos()))
}

/// A daily plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    /// The day the plan corresponds to
    pub day: DateTime<Utc>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a plan. Without `day` the plan is filed under today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<DateTime<Utc>>,
    pub text: String,
}

/// Request to update a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl UpdatePlanRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl Document for Plan {
    const COLLECTION: &'static str = "dailyPlans";
    const ROUTE: &'static str = "plans";

    type Create = CreatePlanRequest;
    type Patch = UpdatePlanRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreatePlanRequest) -> Self {
        Self {
            id,
            day: create.day.map(day_boundary).unwrap_or_else(|| day_boundary(now)),
            text: create.text,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_boundary_after_day_start() {
        assert_eq!(
            day_boundary(at("2024-03-10T15:30:12.250Z")),
            at("2024-03-10T14:00:00Z")
        );
    }

    #[test]
    fn test_boundary_before_day_start_is_previous_day() {
        // 06:59 local (UTC-7)
        assert_eq!(
            day_boundary(at("2024-03-10T13:59:59Z")),
            at("2024-03-09T14:00:00Z")
        );
        // Just after local midnight
        assert_eq!(
            day_boundary(at("2024-03-11T07:05:00Z")),
            at("2024-03-10T14:00:00Z")
        );
    }

    #[test]
    fn test_boundary_is_idempotent() {
        let b = at("2024-03-10T14:00:00Z");
        assert_eq!(day_boundary(b), b);
    }

    #[test]
    fn test_from_create_defaults_to_today() {
        let now = at("2024-03-10T20:00:00Z");
        let plan = Plan::from_create(
            Uuid::new_v4(),
            now,
            CreatePlanRequest {
                day: None,
                text: "ship it".into(),
            },
        );
        assert_eq!(plan.day, at("2024-03-10T14:00:00Z"));
        assert_eq!(plan.created_at, now);
        assert_eq!(plan.updated_at, now);
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let now = at("2024-03-10T20:00:00Z");
        let plan = Plan::from_create(
            Uuid::new_v4(),
            now,
            CreatePlanRequest {
                day: None,
                text: "x".into(),
            },
        );
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        let json = serde_json::to_value(UpdatePlanRequest::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
