//! Sync pipeline settings.

use std::time::Duration;

use serde_with::serde_as;

/// Settings for [`crate::sync`], [`crate::fetcher`], and the reference list cache.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// `gameMode` a match must have to be tracked.
    pub tracked_game_mode: String,
    /// Queue ID passed as the match list filter (`1700` is Arena).
    pub tracked_queue: u16,
    /// Match ids requested by an incremental sync.
    pub incremental_page_size: u32,
    /// Match ids requested by a non-incremental sync without an explicit count.
    pub default_page_size: u32,
    /// Upper bound for any single match list request.
    pub max_page_size: u32,
    /// Upper bound on match ids walked by a full-history sync.
    pub full_history_limit: u32,
    /// Minimum time between consecutive match detail requests.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub detail_interval: Duration,
    /// How long a fetched champion reference list is reused.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub reference_ttl: Duration,
    /// Data Dragon origin, with trailing slash.
    pub ddragon_base_url: String,
    /// Data Dragon locale, e.g. `en_US`.
    pub ddragon_locale: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tracked_game_mode: "CHERRY".to_owned(),
            tracked_queue: 1700,
            incremental_page_size: 10,
            default_page_size: 30,
            max_page_size: 100,
            full_history_limit: 1000,
            detail_interval: Duration::from_millis(100),
            reference_ttl: Duration::from_secs(6 * 60 * 60),
            ddragon_base_url: "https://ddragon.leagueoflegends.com/".to_owned(),
            ddragon_locale: "en_US".to_owned(),
        }
    }
}

impl SyncConfig {
    /// Clamp a requested match list size to `1..=max_page_size`.
    pub fn clamp_page(&self, requested: u32) -> u32 {
        requested.clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{ "detailInterval": 1200, "incrementalPageSize": 5 }"#)
                .unwrap();
        assert_eq!(Duration::from_millis(1200), config.detail_interval);
        assert_eq!(5, config.incremental_page_size);
        assert_eq!("CHERRY", config.tracked_game_mode);
        assert_eq!(30, config.default_page_size);
    }

    #[test]
    fn test_clamp_page() {
        let config = SyncConfig::default();
        assert_eq!(1, config.clamp_page(0));
        assert_eq!(30, config.clamp_page(30));
        assert_eq!(100, config.clamp_page(5000));
    }
}
