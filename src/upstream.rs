//! Boundary to the Riot Games API, plus the validated shapes of its responses.

use serde_with::serde_as;

use crate::error::{Error, Result};

/// Riot account returned by account-v1.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Riot PUUID.
    pub puuid: String,
    /// Riot ID game username.
    pub game_name: Option<String>,
    /// Riot ID tag line.
    pub tag_line: Option<String>,
}

/// Parameters of a match-v5 match id list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchIdQuery {
    /// Index of the first (newest) id to return.
    pub start: u32,
    /// How many ids to return.
    pub count: u32,
    /// Only return matches from this queue.
    pub queue: Option<u16>,
}

/// Transport failure reported by a [`GameApi`], before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    /// HTTP status, if any response was received.
    pub status: Option<u16>,
    /// Description, never shown to end users.
    pub message: String,
}
impl From<UpstreamError> for Error {
    fn from(value: UpstreamError) -> Self {
        Error::from_upstream_status(value.status, value.message)
    }
}

/// Authenticated access to the Riot Games API.
///
/// Implementations do not retry and do not classify errors, see
/// [`crate::fetcher::MatchFetcher`].
#[allow(async_fn_in_trait)]
pub trait GameApi {
    /// account-v1 by Riot ID. `Ok(None)` on 404.
    async fn account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> std::result::Result<Option<Account>, UpstreamError>;

    /// match-v5 match ids for a PUUID, newest first.
    async fn match_ids(
        &self,
        puuid: &str,
        query: MatchIdQuery,
    ) -> std::result::Result<Vec<String>, UpstreamError>;

    /// match-v5 match detail as raw JSON. `Ok(None)` on 404.
    async fn match_detail(
        &self,
        match_id: &str,
    ) -> std::result::Result<Option<serde_json::Value>, UpstreamError>;
}

/// Validated subset of a match-v5 `MatchDto`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct MatchDetail {
    /// `metadata` section.
    pub metadata: MatchMetadataDto,
    /// `info` section.
    pub info: MatchInfoDto,
}

/// match-v5 `MetadataDto`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadataDto {
    /// Match id, e.g. `NA1_4987654321`.
    pub match_id: String,
}

/// match-v5 `InfoDto`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfoDto {
    /// Game mode, `CHERRY` for Arena.
    pub game_mode: String,
    /// Queue ID. Informational, [`Self::game_mode`] decides relevance.
    #[serde_as(as = "serde_with::DefaultOnError")]
    #[serde(default)]
    pub queue_id: Option<u16>,
    /// Unix epoch milliseconds.
    pub game_creation: i64,
    /// Unix epoch milliseconds. Missing on old matches.
    #[serde(default)]
    pub game_end_timestamp: Option<i64>,
    /// e.g. `14.23.636.2153`.
    pub game_version: String,
    /// Everyone in the game.
    pub participants: Vec<ParticipantDto>,
}

/// match-v5 `ParticipantDto`, Arena-relevant fields only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    /// Riot PUUID.
    pub puuid: String,
    /// Champion name, e.g. `MonkeyKing`.
    pub champion_name: String,
    /// Arena placement, `1..=8`.
    #[serde(default)]
    pub placement: Option<i32>,
    /// Team won.
    #[serde(default)]
    pub win: bool,
}

impl MatchDetail {
    /// Validate raw match JSON against the expected schema.
    pub fn from_json(match_id: &str, value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::MalformedMatchData {
            match_id: match_id.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Creation time in unix epoch seconds.
    pub fn creation_secs(&self) -> i64 {
        self.info.game_creation.div_euclid(1000)
    }

    /// Find the participant entry for `puuid`.
    pub fn participant(&self, puuid: &str) -> Option<&ParticipantDto> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }
}
