use time::OffsetDateTime;

use super::AsyncStatus;
use crate::api::subscription::{self, Plan, Subscription};
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::types::PlanId;

const PLANS_FAILED: &str = "Could not load subscription plans.";
const CURRENT_FAILED: &str = "Could not load your subscription.";
const SUBSCRIBE_FAILED: &str = "Could not update your subscription.";

#[derive(Debug, Clone, Default)]
pub struct SubscriptionSlice {
    pub status: AsyncStatus,
    plans: Vec<Plan>,
    current: Option<Subscription>,
}

impl SubscriptionSlice {
    #[must_use]
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    #[must_use]
    pub fn current(&self) -> Option<&Subscription> {
        self.current.as_ref()
    }

    /// Plan of the current subscription, if both are loaded.
    #[must_use]
    pub fn current_plan(&self) -> Option<&Plan> {
        let plan_id = self.current.as_ref()?.plan_id;
        self.plans.iter().find(|p| p.id == plan_id)
    }

    #[must_use]
    pub fn has_active(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.is_active_at(OffsetDateTime::now_utc()))
    }

    pub async fn fetch_plans<T: Transport>(&mut self, client: &ApiClient<T>) -> Result<(), Error> {
        self.status.pending();
        let result = subscription::plans(client).await;
        self.plans = self.status.settle(result, PLANS_FAILED)?;
        Ok(())
    }

    pub async fn fetch_current<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = subscription::current(client).await;
        self.current = self.status.settle(result, CURRENT_FAILED)?;
        Ok(())
    }

    pub async fn subscribe<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        plan_id: PlanId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = subscription::subscribe(client, plan_id).await;
        self.refetch_after(client, result).await
    }

    pub async fn change_plan<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        plan_id: PlanId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = subscription::change_plan(client, plan_id).await;
        self.refetch_after(client, result).await
    }

    pub async fn cancel<T: Transport>(&mut self, client: &ApiClient<T>) -> Result<(), Error> {
        self.status.pending();
        let result = subscription::cancel(client).await;
        self.refetch_after(client, result).await
    }

    /// After a mutation, reload the current subscription from the server.
    async fn refetch_after<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        mutation: Result<Subscription, Error>,
    ) -> Result<(), Error> {
        let result = match mutation {
            Ok(_) => subscription::current(client).await,
            Err(e) => Err(e),
        };
        self.current = self.status.settle(result, SUBSCRIBE_FAILED)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{Value as JsonValue, json};

    use super::*;
    use crate::api::subscription::SubscriptionStatus;
    use crate::http::RequestBody;
    use crate::testing::{Harness, envelope_ok, json_response};

    fn billing_backend() -> Harness {
        let current: Arc<Mutex<Option<JsonValue>>> = Arc::default();
        Harness::new(move |req| {
            let mut current = current.lock().unwrap();
            match req.path.as_str() {
                "/Subscriptions/Plans" => envelope_ok(json!([
                    { "id": 1, "name": "Free", "priceCents": 0, "billingPeriod": "Monthly", "dailyMessageLimit": 10 },
                    { "id": 2, "name": "Plus", "priceCents": 999, "billingPeriod": "Monthly" }
                ])),
                "/Subscriptions/Current" => envelope_ok(current.clone().unwrap_or(JsonValue::Null)),
                "/Subscriptions/Subscribe" | "/Subscriptions/ChangePlan" => {
                    let RequestBody::Json(body) = &req.body else {
                        return json_response(400, json!({}));
                    };
                    let sub = json!({
                        "id": 1,
                        "planId": body["planId"],
                        "status": "Active",
                        "startedAt": "2025-01-01T00:00:00Z"
                    });
                    *current = Some(sub.clone());
                    envelope_ok(sub)
                }
                "/Subscriptions/Cancel" => {
                    let Some(sub) = current.as_mut() else {
                        return json_response(200, json!({ "success": false, "message": "No subscription" }));
                    };
                    sub["status"] = json!("Cancelled");
                    envelope_ok(sub.clone())
                }
                _ => json_response(404, json!({})),
            }
        })
    }

    #[tokio::test]
    async fn free_tier_has_no_current_subscription() {
        let harness = billing_backend();
        let mut slice = SubscriptionSlice::default();

        slice.fetch_current(&harness.client).await.unwrap();

        assert!(slice.current().is_none());
        assert!(!slice.has_active());
    }

    #[tokio::test]
    async fn subscribe_then_change_plan() {
        let harness = billing_backend();
        let mut slice = SubscriptionSlice::default();
        slice.fetch_plans(&harness.client).await.unwrap();

        slice.subscribe(&harness.client, PlanId(1)).await.unwrap();
        assert_eq!(slice.current_plan().map(|p| p.name.as_str()), Some("Free"));
        assert!(slice.has_active());

        slice.change_plan(&harness.client, PlanId(2)).await.unwrap();
        assert_eq!(slice.current_plan().map(|p| p.name.as_str()), Some("Plus"));
        assert!(!slice.status.is_loading());
    }

    #[tokio::test]
    async fn cancel_updates_status() {
        let harness = billing_backend();
        let mut slice = SubscriptionSlice::default();
        slice.subscribe(&harness.client, PlanId(2)).await.unwrap();

        slice.cancel(&harness.client).await.unwrap();

        assert_eq!(slice.current().unwrap().status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_without_subscription_reports_server_message() {
        let harness = billing_backend();
        let mut slice = SubscriptionSlice::default();

        assert!(slice.cancel(&harness.client).await.is_err());

        assert_eq!(slice.status.error(), Some("No subscription"));
        assert_eq!(
            harness.requests().len(),
            1,
            "a failed mutation is not followed by a re-fetch"
        );
    }
}
