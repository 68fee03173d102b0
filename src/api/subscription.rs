use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, Transport};
use crate::types::{PlanId, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingPeriod {
    Monthly,
    Yearly,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor currency units.
    pub price_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub billing_period: BillingPeriod,
    #[serde(default)]
    pub features: Vec<String>,
    /// Therapy chat messages per day; `None` means unlimited.
    #[serde(default)]
    pub daily_message_limit: Option<u32>,
}

fn default_currency() -> String {
    "USD".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub plan_id: PlanId,
    #[serde(default)]
    pub plan_name: Option<String>,
    pub status: SubscriptionStatus,
    #[serde(with = "crate::timestamp")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "crate::timestamp::option")]
    pub current_period_end: Option<OffsetDateTime>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl Subscription {
    /// Whether the subscription currently grants plan features.
    #[must_use]
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        let in_period = self.current_period_end.is_none_or(|end| end > now);
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trialing => in_period,
            // Cancelled subscriptions run until the end of the paid period.
            SubscriptionStatus::Cancelled => self.current_period_end.is_some() && in_period,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanRequest {
    plan_id: PlanId,
}

/// `GET /Subscriptions/Plans`.
pub async fn plans<T: Transport>(client: &ApiClient<T>) -> Result<Vec<Plan>, Error> {
    let plans: Option<Vec<Plan>> = client.call(ApiRequest::get("/Subscriptions/Plans")).await?;
    Ok(plans.unwrap_or_default())
}

/// `GET /Subscriptions/Current`. `None` for accounts on the free tier.
pub async fn current<T: Transport>(client: &ApiClient<T>) -> Result<Option<Subscription>, Error> {
    client.call(ApiRequest::get("/Subscriptions/Current")).await
}

/// `POST /Subscriptions/Subscribe`.
pub async fn subscribe<T: Transport>(
    client: &ApiClient<T>,
    plan_id: PlanId,
) -> Result<Subscription, Error> {
    let request = ApiRequest::post("/Subscriptions/Subscribe").json(&PlanRequest { plan_id })?;
    client.call(request).await
}

/// `PUT /Subscriptions/ChangePlan`.
pub async fn change_plan<T: Transport>(
    client: &ApiClient<T>,
    plan_id: PlanId,
) -> Result<Subscription, Error> {
    let request = ApiRequest::put("/Subscriptions/ChangePlan").json(&PlanRequest { plan_id })?;
    client.call(request).await
}

/// `PUT /Subscriptions/Cancel`.
pub async fn cancel<T: Transport>(client: &ApiClient<T>) -> Result<Subscription, Error> {
    client.call(ApiRequest::put("/Subscriptions/Cancel")).await
}
