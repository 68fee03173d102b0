use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, Transport};
use crate::types::TipId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: TipId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default, with = "crate::timestamp::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// `GET /DailyTips/Today`. `None` when no tip is scheduled.
pub async fn today<T: Transport>(client: &ApiClient<T>) -> Result<Option<Tip>, Error> {
    client.call(ApiRequest::get("/DailyTips/Today")).await
}

/// `GET /DailyTips`, optionally narrowed to one category.
pub async fn list<T: Transport>(
    client: &ApiClient<T>,
    category: Option<&str>,
) -> Result<Vec<Tip>, Error> {
    let mut request = ApiRequest::get("/DailyTips");
    if let Some(category) = category {
        request = request.query("category", category);
    }
    let tips: Option<Vec<Tip>> = client.call(request).await?;
    Ok(tips.unwrap_or_default())
}

/// `GET /DailyTips/Bookmarks`.
pub async fn bookmarked<T: Transport>(client: &ApiClient<T>) -> Result<Vec<Tip>, Error> {
    let tips: Option<Vec<Tip>> = client.call(ApiRequest::get("/DailyTips/Bookmarks")).await?;
    Ok(tips.unwrap_or_default())
}

/// `POST /DailyTips/{id}/ToggleBookmark`. Returns the tip with its new bookmark state.
pub async fn toggle_bookmark<T: Transport>(client: &ApiClient<T>, id: TipId) -> Result<Tip, Error> {
    client
        .call(ApiRequest::post(format!("/DailyTips/{id}/ToggleBookmark")))
        .await
}
