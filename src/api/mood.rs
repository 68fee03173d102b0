use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, Transport, segment};
use crate::types::{EntryId, UserId};

/// Mood recorded in an emotional-state entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoodKind {
    Happy,
    Calm,
    Neutral,
    Sad,
    Anxious,
    Stressed,
    Angry,
    Tired,
    #[serde(other)]
    Other,
}

/// One mood journal entry ("emotional state").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub mood: MoodKind,
    /// 1 (barely noticeable) to 10 (overwhelming).
    pub intensity: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(with = "crate::timestamp")]
    pub recorded_at: OffsetDateTime,
}

/// Body for create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryInput {
    pub mood: MoodKind,
    pub intensity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::timestamp::option"
    )]
    pub recorded_at: Option<OffsetDateTime>,
}

impl MoodEntryInput {
    #[must_use]
    pub fn new(mood: MoodKind, intensity: u8) -> Self {
        Self {
            mood,
            intensity,
            notes: None,
            triggers: Vec::new(),
            recorded_at: None,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_triggers(mut self, triggers: Vec<String>) -> Self {
        self.triggers = triggers;
        self
    }

    #[must_use]
    pub fn recorded_at(mut self, at: OffsetDateTime) -> Self {
        self.recorded_at = Some(at);
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if (1..=10).contains(&self.intensity) {
            Ok(())
        } else {
            Err(Error::Business {
                message: format!("intensity must be between 1 and 10, got {}", self.intensity),
            })
        }
    }
}

/// Aggregates over a date range, computed by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSummary {
    #[serde(default)]
    pub total_entries: u32,
    #[serde(default)]
    pub average_intensity: f64,
    #[serde(default)]
    pub most_frequent_mood: Option<MoodKind>,
    #[serde(default)]
    pub counts_by_mood: BTreeMap<MoodKind, u32>,
}

/// `GET /EmotionalStates/User/{userId}`.
pub async fn list<T: Transport>(
    client: &ApiClient<T>,
    user_id: &UserId,
) -> Result<Vec<MoodEntry>, Error> {
    let request = ApiRequest::get(format!("/EmotionalStates/User/{}", segment(user_id)));
    let entries: Option<Vec<MoodEntry>> = client.call(request).await?;
    Ok(entries.unwrap_or_default())
}

/// `GET /EmotionalStates/{id}`.
pub async fn get<T: Transport>(client: &ApiClient<T>, id: EntryId) -> Result<MoodEntry, Error> {
    client
        .call(ApiRequest::get(format!("/EmotionalStates/{id}")))
        .await
}

/// `POST /EmotionalStates`.
///
/// # Errors
///
/// Intensity outside 1..=10 is rejected locally as [`Error::Business`].
pub async fn create<T: Transport>(
    client: &ApiClient<T>,
    input: &MoodEntryInput,
) -> Result<MoodEntry, Error> {
    input.validate()?;
    client
        .call(ApiRequest::post("/EmotionalStates").json(input)?)
        .await
}

/// `PUT /EmotionalStates/{id}`.
pub async fn update<T: Transport>(
    client: &ApiClient<T>,
    id: EntryId,
    input: &MoodEntryInput,
) -> Result<MoodEntry, Error> {
    input.validate()?;
    client
        .call(ApiRequest::put(format!("/EmotionalStates/{id}")).json(input)?)
        .await
}

/// `DELETE /EmotionalStates/{id}`.
pub async fn delete<T: Transport>(client: &ApiClient<T>, id: EntryId) -> Result<(), Error> {
    client
        .call::<serde_json::Value>(ApiRequest::delete(format!("/EmotionalStates/{id}")))
        .await?;
    Ok(())
}

/// `GET /EmotionalStates/User/{userId}/Summary?from=&to=`.
pub async fn summary<T: Transport>(
    client: &ApiClient<T>,
    user_id: &UserId,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
) -> Result<MoodSummary, Error> {
    let mut request =
        ApiRequest::get(format!("/EmotionalStates/User/{}/Summary", segment(user_id)));
    for (key, value) in [("from", from), ("to", to)] {
        if let Some(at) = value {
            let formatted = at
                .format(&time::format_description::well_known::Rfc3339)
                .map_err(|e| Error::Config(format!("{key}: {e}")))?;
            request = request.query(key, formatted);
        }
    }
    client.call(request).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::http::RequestBody;
    use crate::testing::{Harness, envelope_ok};

    #[test]
    fn unknown_mood_decodes_as_other() {
        let mood: MoodKind = serde_json::from_str("\"Euphoric\"").unwrap();
        assert_eq!(mood, MoodKind::Other);
    }

    #[test]
    fn input_skips_empty_fields() {
        let body = serde_json::to_value(MoodEntryInput::new(MoodKind::Calm, 4)).unwrap();
        assert_eq!(body, json!({ "mood": "Calm", "intensity": 4 }));
    }

    #[tokio::test]
    async fn list_with_null_data_is_empty() {
        let harness = Harness::new(|_| envelope_ok(json!(null)));

        let entries = list(&harness.client, &UserId::from("u-1")).await.unwrap();

        assert!(entries.is_empty());
        assert_eq!(harness.requests()[0].path, "/EmotionalStates/User/u-1");
    }

    #[tokio::test]
    async fn create_posts_input() {
        let harness = Harness::new(|_| {
            envelope_ok(json!({
                "id": 11,
                "userId": "u-1",
                "mood": "Anxious",
                "intensity": 7,
                "triggers": ["exam"],
                "recordedAt": "2025-03-01T09:30:00"
            }))
        });
        let input = MoodEntryInput::new(MoodKind::Anxious, 7).with_triggers(vec!["exam".into()]);

        let entry = create(&harness.client, &input).await.unwrap();

        assert_eq!(entry.id, EntryId(11));
        assert_eq!(entry.recorded_at, datetime!(2025-03-01 09:30:00 UTC));
        let sent = &harness.requests()[0];
        assert_eq!(sent.path, "/EmotionalStates");
        assert_eq!(
            sent.body,
            RequestBody::Json(json!({ "mood": "Anxious", "intensity": 7, "triggers": ["exam"] }))
        );
    }

    #[tokio::test]
    async fn out_of_range_intensity_is_rejected_locally() {
        let harness = Harness::new(|_| envelope_ok(json!(null)));

        let err = create(&harness.client, &MoodEntryInput::new(MoodKind::Sad, 11))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Business { .. }));
        assert!(harness.requests().is_empty());
    }

    #[tokio::test]
    async fn summary_sends_range_query() {
        let harness = Harness::new(|_| {
            envelope_ok(json!({
                "totalEntries": 3,
                "averageIntensity": 5.5,
                "mostFrequentMood": "Calm",
                "countsByMood": { "Calm": 2, "Sad": 1 }
            }))
        });

        let summary = summary(
            &harness.client,
            &UserId::from("u-1"),
            Some(datetime!(2025-03-01 0:00 UTC)),
            None,
        )
        .await
        .unwrap();

        assert_eq!(summary.counts_by_mood.get(&MoodKind::Calm), Some(&2));
        let sent = &harness.requests()[0];
        assert_eq!(sent.path, "/EmotionalStates/User/u-1/Summary");
        assert_eq!(
            sent.query,
            vec![("from".to_owned(), "2025-03-01T00:00:00Z".to_owned())]
        );
    }
}
