//! Match fetcher: the only component that calls the rate-limited match endpoints.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::upstream::{GameApi, MatchDetail, MatchIdQuery};

/// Classifying wrapper over a [`GameApi`]'s match-v5 endpoints. Does not retry.
pub struct MatchFetcher<'a, A> {
    api: &'a A,
    config: &'a SyncConfig,
}

impl<'a, A: GameApi> MatchFetcher<'a, A> {
    /// Wrap an API client.
    pub fn new(api: &'a A, config: &'a SyncConfig) -> Self {
        Self { api, config }
    }

    /// Match ids for `puuid`, newest first, exactly as upstream returns them. `limit` is
    /// clamped to [`SyncConfig::max_page_size`].
    pub async fn list_match_ids(
        &self,
        puuid: &str,
        offset: u32,
        limit: u32,
        queue: Option<u16>,
    ) -> Result<Vec<String>> {
        let query = MatchIdQuery {
            start: offset,
            count: self.config.clamp_page(limit),
            queue,
        };
        log::debug!("Listing match ids for {}: {:?}", puuid, query);
        let ids = self.api.match_ids(puuid, query).await?;
        Ok(ids)
    }

    /// Walk the match id list page by page until a short page or `cap` ids.
    pub async fn list_all_match_ids(
        &self,
        puuid: &str,
        cap: u32,
        queue: Option<u16>,
    ) -> Result<Vec<String>> {
        let page_size = self.config.clamp_page(self.config.max_page_size);
        let mut ids = Vec::new();
        while (ids.len() as u32) < cap {
            let want = page_size.min(cap - ids.len() as u32);
            let page = self
                .list_match_ids(puuid, ids.len() as u32, want, queue)
                .await?;
            let short = (page.len() as u32) < want;
            ids.extend(page);
            if short {
                break;
            }
        }
        Ok(ids)
    }

    /// Full, schema-validated match detail.
    pub async fn match_detail(&self, match_id: &str) -> Result<MatchDetail> {
        let value = self
            .api
            .match_detail(match_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Match {}", match_id)))?;
        MatchDetail::from_json(match_id, value)
    }
}
