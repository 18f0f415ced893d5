//! Model structs corresponding to database tables. Must be kept in sync with migrations.

use chrono::{DateTime, Datelike};

/// Lowest Arena placement.
pub const PLACEMENT_MIN: u8 = 1;
/// Highest Arena placement (eight duos).
pub const PLACEMENT_MAX: u8 = 8;

/// A Riot Games account tracked by this app.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Riot PUUID (player universally unique ID).
    pub puuid: String,
    /// Riot ID game username (`game_name#tag_line`).
    pub game_name: String,
    /// Riot ID tag line (`game_name#tag_line`).
    pub tag_line: String,
    /// Regional route the account was resolved through, e.g. `AMERICAS`.
    pub region: String,
}

/// One Arena game played by a [`Player`]. Unique per `(puuid, match_id)`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// FK [`Player::puuid`].
    pub puuid: String,
    /// Upstream match id, e.g. `NA1_4987654321`.
    pub match_id: String,
    /// Champion name as reported by the match, e.g. `MonkeyKing`.
    pub champion: String,
    /// Final placement, `1..=8`.
    pub placement: u8,
    /// First place. Redundant with `placement == 1`.
    pub win: bool,
    /// Game creation (unix epoch seconds).
    pub game_creation: i64,
    /// Game end (unix epoch seconds).
    pub game_end: Option<i64>,
    /// Full game version, e.g. `14.23.636.2153`.
    pub game_version: String,
    /// `major.minor` of [`Self::game_version`].
    pub patch: String,
    /// Calendar year (UTC) of [`Self::game_creation`].
    pub season: i32,
}

impl MatchRecord {
    /// Top four finish.
    pub fn is_top4(&self) -> bool {
        self.placement <= 4
    }
}

/// Truncate a game version to its `major.minor` patch.
pub fn patch_of(game_version: &str) -> String {
    let mut parts = game_version.splitn(3, '.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => game_version.to_owned(),
    }
}

/// Sort `major.minor` patches newest first, numerically (`14.10` after `14.9`).
pub fn sort_patches_desc(patches: &mut [String]) {
    fn key(patch: &str) -> (u32, u32) {
        let mut parts = patch.split('.').map(|p| p.parse().unwrap_or(0));
        (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
    }
    patches.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| b.cmp(a)));
}

/// Season (calendar year, UTC) of a unix epoch seconds timestamp.
pub fn season_of(epoch_secs: i64) -> i32 {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.year())
        .unwrap_or(1970)
}
