use crate::models::{day_boundary, CreatePlanRequest, Plan, UpdatePlanRequest};
use crate::store::Collection;
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

impl Collection<Plan> {
    /// The plan filed under the day containing `now`
    pub async fn plan_for(&self, now: DateTime<Utc>) -> Result<Option<Plan>> {
        let day = day_boundary(now);
        Ok(self.filter(|p| p.day == day).await?.into_iter().next())
    }

    pub async fn get_today(&self) -> Result<Option<Plan>> {
        self.plan_for(Utc::now()).await
    }

    /// Create today's plan. If one already exists it is returned unchanged
    /// and the boolean is `false`.
    pub async fn create_today(&self, text: impl Into<String>) -> Result<(Plan, bool)> {
        let _guard = self.lock_edits().await;
        if let Some(existing) = self.get_today().await? {
            debug!(plan_id = %existing.id, "Plan for today already exists");
            return Ok((existing, false));
        }
        let plan = self
            .create(CreatePlanRequest {
                day: None,
                text: text.into(),
            })
            .await?;
        info!(plan_id = %plan.id, day = %plan.day, "Created plan for today");
        Ok((plan, true))
    }

    pub async fn update_plan(&self, id: Uuid, text: impl Into<String>) -> Result<Option<Plan>> {
        self.update(id, &UpdatePlanRequest::text(text)).await
    }

    pub async fn all_plans(&self) -> Result<Vec<Plan>> {
        self.all().await
    }

    /// Plans for days strictly before the day containing `now`, most recent
    /// day first
    pub async fn past_plans_before(&self, now: DateTime<Utc>) -> Result<Vec<Plan>> {
        let today = day_boundary(now);
        let mut plans = self.filter(|p| p.day < today).await?;
        plans.sort_by(|a, b| b.day.cmp(&a.day));
        Ok(plans)
    }

    pub async fn past_plans(&self) -> Result<Vec<Plan>> {
        self.past_plans_before(Utc::now()).await
    }
}
