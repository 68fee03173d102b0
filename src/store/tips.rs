use super::AsyncStatus;
use crate::api::tips::{self, Tip};
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::types::TipId;

const TODAY_FAILED: &str = "Could not load today's tip.";
const LIST_FAILED: &str = "Could not load tips.";
const BOOKMARKS_FAILED: &str = "Could not load your saved tips.";
const TOGGLE_FAILED: &str = "Could not update the bookmark.";

#[derive(Debug, Clone, Default)]
pub struct TipsSlice {
    pub status: AsyncStatus,
    today: Option<Tip>,
    tips: Vec<Tip>,
    bookmarks: Vec<Tip>,
    category: Option<String>,
}

impl TipsSlice {
    #[must_use]
    pub fn today(&self) -> Option<&Tip> {
        self.today.as_ref()
    }

    #[must_use]
    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    #[must_use]
    pub fn bookmarks(&self) -> &[Tip] {
        &self.bookmarks
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Category used by the next [`fetch_tips`](Self::fetch_tips).
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    /// Distinct categories among fetched tips, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .tips
            .iter()
            .filter_map(|t| t.category.as_deref())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub async fn fetch_today<T: Transport>(&mut self, client: &ApiClient<T>) -> Result<(), Error> {
        self.status.pending();
        let result = tips::today(client).await;
        self.today = self.status.settle(result, TODAY_FAILED)?;
        Ok(())
    }

    pub async fn fetch_tips<T: Transport>(&mut self, client: &ApiClient<T>) -> Result<(), Error> {
        self.status.pending();
        let result = tips::list(client, self.category.as_deref()).await;
        self.tips = self.status.settle(result, LIST_FAILED)?;
        Ok(())
    }

    pub async fn fetch_bookmarks<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = tips::bookmarked(client).await;
        self.bookmarks = self.status.settle(result, BOOKMARKS_FAILED)?;
        Ok(())
    }

    /// Flip the bookmark on one tip and merge the server's copy everywhere it is cached.
    pub async fn toggle_bookmark<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        id: TipId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = tips::toggle_bookmark(client, id).await;
        let updated = self.status.settle(result, TOGGLE_FAILED)?;
        self.merge(updated);
        Ok(())
    }

    fn merge(&mut self, updated: Tip) {
        if let Some(tip) = self.tips.iter_mut().find(|t| t.id == updated.id) {
            *tip = updated.clone();
        }
        if let Some(today) = self.today.as_mut().filter(|t| t.id == updated.id) {
            *today = updated.clone();
        }
        match self.bookmarks.iter().position(|t| t.id == updated.id) {
            Some(index) if updated.is_bookmarked => self.bookmarks[index] = updated,
            Some(index) => {
                self.bookmarks.remove(index);
            }
            None if updated.is_bookmarked => self.bookmarks.push(updated),
            None => {}
        }
    }
}
