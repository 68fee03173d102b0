use time::OffsetDateTime;

use super::AsyncStatus;
use crate::api::mood::{self, MoodEntry, MoodEntryInput, MoodKind, MoodSummary};
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::types::{EntryId, UserId};

const FETCH_FAILED: &str = "Could not load your mood entries.";
const FETCH_ONE_FAILED: &str = "Could not load this mood entry.";
const SAVE_FAILED: &str = "Could not save the mood entry.";
const DELETE_FAILED: &str = "Could not delete the mood entry.";
const SUMMARY_FAILED: &str = "Could not load your mood summary.";

/// How the journal is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Calendar,
    Chart,
}

/// Client-side narrowing of already-fetched entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodFilter {
    pub mood: Option<MoodKind>,
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub min_intensity: Option<u8>,
}

impl MoodFilter {
    #[must_use]
    pub fn matches(&self, entry: &MoodEntry) -> bool {
        self.mood.is_none_or(|m| entry.mood == m)
            && self.from.is_none_or(|from| entry.recorded_at >= from)
            && self.to.is_none_or(|to| entry.recorded_at <= to)
            && self.min_intensity.is_none_or(|min| entry.intensity >= min)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Mood journal ("emotional states") of the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct MoodSlice {
    pub status: AsyncStatus,
    entries: Vec<MoodEntry>,
    selected: Option<MoodEntry>,
    summary: Option<MoodSummary>,
    filter: MoodFilter,
    view_mode: ViewMode,
}

impl MoodSlice {
    #[must_use]
    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    #[must_use]
    pub fn selected(&self) -> Option<&MoodEntry> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&MoodSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn filter(&self) -> &MoodFilter {
        &self.filter
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// No entries fetched at all; selects the empty-state screen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries passing the filter, newest first.
    #[must_use]
    pub fn visible_entries(&self) -> Vec<&MoodEntry> {
        let mut visible: Vec<&MoodEntry> =
            self.entries.iter().filter(|e| self.filter.matches(e)).collect();
        visible.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        visible
    }

    pub fn set_filter(&mut self, filter: MoodFilter) {
        self.filter = filter;
    }

    pub fn clear_filter(&mut self) {
        self.filter = MoodFilter::default();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub async fn fetch_entries<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        user_id: &UserId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = mood::list(client, user_id).await;
        self.entries = self.status.settle(result, FETCH_FAILED)?;
        Ok(())
    }

    pub async fn fetch_entry<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        id: EntryId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = mood::get(client, id).await;
        self.selected = Some(self.status.settle(result, FETCH_ONE_FAILED)?);
        Ok(())
    }

    /// Create an entry, then re-fetch the whole journal.
    pub async fn create_entry<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        user_id: &UserId,
        input: &MoodEntryInput,
    ) -> Result<(), Error> {
        self.status.pending();
        if let Err(e) = mood::create(client, input).await {
            return self.status.settle(Err(e), SAVE_FAILED);
        }
        // Saved; a failed reload is reported as a fetch failure.
        let result = mood::list(client, user_id).await;
        self.entries = self.status.settle(result, FETCH_FAILED)?;
        Ok(())
    }

    /// Update an entry, then re-fetch the whole journal.
    pub async fn update_entry<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        user_id: &UserId,
        id: EntryId,
        input: &MoodEntryInput,
    ) -> Result<(), Error> {
        self.status.pending();
        let updated = match mood::update(client, id, input).await {
            Ok(entry) => entry,
            Err(e) => return self.status.settle(Err(e), SAVE_FAILED),
        };
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.selected = Some(updated);
        }
        let result = mood::list(client, user_id).await;
        self.entries = self.status.settle(result, FETCH_FAILED)?;
        Ok(())
    }

    /// Delete an entry and drop it from the cache.
    pub async fn delete_entry<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        id: EntryId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = mood::delete(client, id).await;
        self.status.settle(result, DELETE_FAILED)?;
        self.entries.retain(|e| e.id != id);
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.selected = None;
        }
        Ok(())
    }

    pub async fn fetch_summary<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        user_id: &UserId,
        from: Option<OffsetDateTime>,
        to: Option<OffsetDateTime>,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = mood::summary(client, user_id, from, to).await;
        self.summary = Some(self.status.settle(result, SUMMARY_FAILED)?);
        Ok(())
    }
}
