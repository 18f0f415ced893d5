//! Persistent store seam: players, watermarks, and match records.

use crate::error::Result;
use crate::model::{MatchRecord, Player};

/// History query. All criteria are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    /// Earliest game creation (unix epoch seconds, inclusive).
    pub from: Option<i64>,
    /// Latest game creation (unix epoch seconds, inclusive).
    pub to: Option<i64>,
    /// Exact `major.minor` patch.
    pub patch: Option<String>,
    /// Calendar year.
    pub season: Option<i32>,
    /// Champion name.
    pub champion: Option<String>,
    /// Max rows, newest first.
    pub limit: Option<u32>,
}

impl MatchFilter {
    /// If `record` satisfies every criterion except `limit`.
    pub fn matches(&self, record: &MatchRecord) -> bool {
        self.from.map_or(true, |from| from <= record.game_creation)
            && self.to.map_or(true, |to| record.game_creation <= to)
            && self.patch.as_deref().map_or(true, |p| p == record.patch)
            && self.season.map_or(true, |s| s == record.season)
            && self
                .champion
                .as_deref()
                .map_or(true, |c| c.eq_ignore_ascii_case(&record.champion))
    }
}

/// Id and creation time of a stored match. Field names match the `arena_match` columns.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct MatchStamp {
    /// Upstream match id.
    pub match_id: String,
    /// Game creation (unix epoch seconds).
    pub game_creation: i64,
}

/// Summary of a player's stored history.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    /// Number of stored matches.
    pub total: u64,
    /// Distinct patches, newest first.
    pub patches: Vec<String>,
    /// Distinct seasons, newest first.
    pub seasons: Vec<i32>,
    /// Oldest game creation (unix epoch seconds).
    pub earliest: Option<i64>,
    /// Newest game creation (unix epoch seconds).
    pub latest: Option<i64>,
}

/// SQL-capable store holding players and their Arena matches.
///
/// Uniqueness of `(puuid, match_id)` must be enforced by the store itself: it is
/// the final idempotency guarantee of a sync.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Look up a player by PUUID.
    async fn player(&self, puuid: &str) -> Result<Option<Player>>;

    /// Look up a player by Riot ID, ignoring ASCII case.
    ///
    /// Non-ASCII letters compare case-sensitively, matching SQLite's `NOCASE`. A Riot ID
    /// that differs only in non-ASCII case misses here and is resolved upstream, which
    /// returns the same PUUID, so the upsert refreshes the existing row.
    async fn player_by_riot_id(&self, game_name: &str, tag_line: &str) -> Result<Option<Player>>;

    /// Insert a player, or refresh the display fields of an existing PUUID. Never
    /// touches the watermark.
    async fn upsert_player(&self, player: &Player) -> Result<()>;

    /// Creation time (unix epoch seconds) of the newest fully processed match.
    async fn watermark(&self, puuid: &str) -> Result<Option<i64>>;

    /// Raise the watermark to `timestamp`. Never lowers it.
    async fn advance_watermark(&self, puuid: &str, timestamp: i64) -> Result<()>;

    /// Stored match ids for a player, newest first.
    async fn recent_matches(&self, puuid: &str, limit: u32) -> Result<Vec<MatchStamp>>;

    /// Insert unless `(puuid, match_id)` exists. Returns if a row was written.
    async fn insert_match(&self, record: &MatchRecord) -> Result<bool>;

    /// Stored matches for a player, newest first.
    async fn matches(&self, puuid: &str, filter: &MatchFilter) -> Result<Vec<MatchRecord>>;

    /// Aggregate metadata for a player's stored matches.
    async fn match_metadata(&self, puuid: &str) -> Result<MatchMetadata>;
}
