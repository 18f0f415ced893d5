//! [`Store`] backed by Cloudflare D1. Row structs must be kept in sync with `migrations/`.

use std::fmt::Write;

use arena_tracker::error::{Error, Result};
use arena_tracker::model::{sort_patches_desc, MatchRecord, Player};
use arena_tracker::store::{MatchFilter, MatchMetadata, MatchStamp, Store};
use serde_with::serde_as;
use wasm_bindgen::JsValue;
use worker::{query, D1Database, D1PreparedStatement};

const MATCH_COLUMNS: &str = "puuid, match_id, champion, placement, win, \
    game_creation, game_end, game_version, patch, season";

/// `player` row, without the watermark.
#[derive(Debug, serde::Deserialize)]
struct PlayerRow {
    puuid: String,
    game_name: String,
    tag_line: String,
    region: String,
}
impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            puuid: row.puuid,
            game_name: row.game_name,
            tag_line: row.tag_line,
            region: row.region,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct WatermarkRow {
    last_match_ts: Option<i64>,
}

/// `arena_match` row.
#[serde_as]
#[derive(Debug, serde::Deserialize)]
struct MatchRow {
    puuid: String,
    match_id: String,
    champion: String,
    placement: u8,
    #[serde_as(as = "serde_with::BoolFromInt")]
    win: bool,
    game_creation: i64,
    game_end: Option<i64>,
    game_version: String,
    patch: String,
    season: i32,
}
impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        MatchRecord {
            puuid: row.puuid,
            match_id: row.match_id,
            champion: row.champion,
            placement: row.placement,
            win: row.win,
            game_creation: row.game_creation,
            game_end: row.game_end,
            game_version: row.game_version,
            patch: row.patch,
            season: row.season,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct InsertedRow {
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, serde::Deserialize)]
struct SummaryRow {
    total: u64,
    earliest: Option<i64>,
    latest: Option<i64>,
}

#[derive(Debug, serde::Deserialize)]
struct PatchRow {
    patch: String,
}

#[derive(Debug, serde::Deserialize)]
struct SeasonRow {
    season: i32,
}

fn storage(error: worker::Error) -> Error {
    Error::Storage(error.to_string())
}

/// D1 numbers are JS doubles, timestamps in seconds fit exactly.
fn number(value: i64) -> JsValue {
    JsValue::from_f64(value as f64)
}

fn nullable(value: Option<i64>) -> JsValue {
    value.map_or(JsValue::NULL, number)
}

/// Player and match tables in the `BINDING_D1_DB` database.
pub struct D1Store {
    db: D1Database,
}

impl D1Store {
    /// Wrap a D1 binding.
    pub fn new(db: D1Database) -> Self {
        Self { db }
    }

    fn prepare(&self, sql: &str, binds: &[JsValue]) -> Result<D1PreparedStatement> {
        self.db.prepare(sql).bind(binds).map_err(storage)
    }
}

impl Store for D1Store {
    async fn player(&self, puuid: &str) -> Result<Option<Player>> {
        let query = query!(
            &self.db,
            "SELECT puuid, game_name, tag_line, region FROM player WHERE puuid = ?1",
            puuid,
        )
        .map_err(storage)?;
        let row: Option<PlayerRow> = query.first(None).await.map_err(storage)?;
        Ok(row.map(Player::from))
    }

    async fn player_by_riot_id(&self, game_name: &str, tag_line: &str) -> Result<Option<Player>> {
        // Riot IDs can move between accounts, so the newest row wins.
        let query = query!(
            &self.db,
            "SELECT puuid, game_name, tag_line, region FROM player
            WHERE game_name = ?1 COLLATE NOCASE AND tag_line = ?2 COLLATE NOCASE
            ORDER BY id DESC LIMIT 1",
            game_name,
            tag_line,
        )
        .map_err(storage)?;
        let row: Option<PlayerRow> = query.first(None).await.map_err(storage)?;
        Ok(row.map(Player::from))
    }

    async fn upsert_player(&self, player: &Player) -> Result<()> {
        let query = query!(
            &self.db,
            "INSERT INTO player(puuid, game_name, tag_line, region)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(puuid) DO UPDATE SET
                game_name = excluded.game_name,
                tag_line = excluded.tag_line,
                region = excluded.region",
            player.puuid,
            player.game_name,
            player.tag_line,
            player.region,
        )
        .map_err(storage)?;
        query.run().await.map_err(storage)?;
        Ok(())
    }

    async fn watermark(&self, puuid: &str) -> Result<Option<i64>> {
        let query = query!(
            &self.db,
            "SELECT last_match_ts FROM player WHERE puuid = ?1",
            puuid,
        )
        .map_err(storage)?;
        let row: Option<WatermarkRow> = query.first(None).await.map_err(storage)?;
        Ok(row.and_then(|row| row.last_match_ts))
    }

    async fn advance_watermark(&self, puuid: &str, timestamp: i64) -> Result<()> {
        let query = self.prepare(
            "UPDATE player SET last_match_ts = MAX(COALESCE(last_match_ts, ?2), ?2)
            WHERE puuid = ?1",
            &[puuid.into(), number(timestamp)],
        )?;
        query.run().await.map_err(storage)?;
        Ok(())
    }

    async fn recent_matches(&self, puuid: &str, limit: u32) -> Result<Vec<MatchStamp>> {
        let query = self.prepare(
            "SELECT match_id, game_creation FROM arena_match
            WHERE puuid = ?1
            ORDER BY game_creation DESC, match_id DESC LIMIT ?2",
            &[puuid.into(), limit.into()],
        )?;
        query
            .all()
            .await
            .and_then(|result| result.results())
            .map_err(storage)
    }

    async fn insert_match(&self, record: &MatchRecord) -> Result<bool> {
        let sql = format!(
            "INSERT INTO arena_match({})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(puuid, match_id) DO NOTHING
            RETURNING id",
            MATCH_COLUMNS
        );
        let query = self.prepare(
            &sql,
            &[
                record.puuid.as_str().into(),
                record.match_id.as_str().into(),
                record.champion.as_str().into(),
                u32::from(record.placement).into(),
                u32::from(record.win).into(),
                number(record.game_creation),
                nullable(record.game_end),
                record.game_version.as_str().into(),
                record.patch.as_str().into(),
                record.season.into(),
            ],
        )?;
        let inserted: Option<InsertedRow> = query.first(None).await.map_err(storage)?;
        Ok(inserted.is_some())
    }

    async fn matches(&self, puuid: &str, filter: &MatchFilter) -> Result<Vec<MatchRecord>> {
        let mut sql = format!("SELECT {} FROM arena_match WHERE puuid = ?1", MATCH_COLUMNS);
        let mut binds = vec![JsValue::from_str(puuid)];
        // Infallible, writing to a `String`.
        let mut clause = |sql: &mut String, condition: &str, value: JsValue| {
            binds.push(value);
            let _ = write!(sql, " AND {} ?{}", condition, binds.len());
        };
        if let Some(from) = filter.from {
            clause(&mut sql, "game_creation >=", number(from));
        }
        if let Some(to) = filter.to {
            clause(&mut sql, "game_creation <=", number(to));
        }
        if let Some(patch) = &filter.patch {
            clause(&mut sql, "patch =", patch.as_str().into());
        }
        if let Some(season) = filter.season {
            clause(&mut sql, "season =", season.into());
        }
        if let Some(champion) = &filter.champion {
            clause(&mut sql, "champion COLLATE NOCASE =", champion.as_str().into());
        }
        sql.push_str(" ORDER BY game_creation DESC, match_id DESC");
        if let Some(limit) = filter.limit {
            binds.push(limit.into());
            let _ = write!(sql, " LIMIT ?{}", binds.len());
        }

        let rows: Vec<MatchRow> = self
            .prepare(&sql, &binds)?
            .all()
            .await
            .and_then(|result| result.results())
            .map_err(storage)?;
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }

    async fn match_metadata(&self, puuid: &str) -> Result<MatchMetadata> {
        let summary = query!(
            &self.db,
            "SELECT COUNT(*) AS total, MIN(game_creation) AS earliest, MAX(game_creation) AS latest
            FROM arena_match WHERE puuid = ?1",
            puuid,
        )
        .map_err(storage)?;
        let patches = query!(
            &self.db,
            "SELECT DISTINCT patch FROM arena_match WHERE puuid = ?1",
            puuid,
        )
        .map_err(storage)?;
        let seasons = query!(
            &self.db,
            "SELECT DISTINCT season FROM arena_match WHERE puuid = ?1 ORDER BY season DESC",
            puuid,
        )
        .map_err(storage)?;

        let mut results = self
            .db
            .batch(vec![summary, patches, seasons])
            .await
            .map_err(storage)?
            .into_iter();
        let (Some(summary), Some(patches), Some(seasons)) =
            (results.next(), results.next(), results.next())
        else {
            return Err(Error::Storage("Incomplete metadata batch.".to_owned()));
        };

        let summary = summary
            .results::<SummaryRow>()
            .map_err(storage)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Storage("Missing metadata summary row.".to_owned()))?;
        let mut patches = patches
            .results::<PatchRow>()
            .map_err(storage)?
            .into_iter()
            .map(|row| row.patch)
            .collect::<Vec<_>>();
        // Lexical order puts 14.9 after 14.10.
        sort_patches_desc(&mut patches);
        let seasons = seasons
            .results::<SeasonRow>()
            .map_err(storage)?
            .into_iter()
            .map(|row| row.season)
            .collect();

        Ok(MatchMetadata {
            total: summary.total,
            patches,
            seasons,
            earliest: summary.earliest,
            latest: summary.latest,
        })
    }
}
