//! In-memory [`Store`], for tests and local development.

use std::cell::RefCell;
use std::collections::BTreeMap;

use itertools::Itertools;

use crate::error::Result;
use crate::model::{sort_patches_desc, MatchRecord, Player};
use crate::store::{MatchFilter, MatchMetadata, MatchStamp, Store};

#[derive(Debug, Default)]
struct Tables {
    /// PUUID -> (player, watermark).
    players: BTreeMap<String, (Player, Option<i64>)>,
    /// (PUUID, match id) -> record.
    matches: BTreeMap<(String, String), MatchRecord>,
}

/// Single-threaded in-memory store with the same uniqueness rules as the SQL schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored match rows across all players.
    pub fn match_count(&self) -> usize {
        self.tables.borrow().matches.len()
    }

    fn player_matches(&self, puuid: &str) -> Vec<MatchRecord> {
        let tables = self.tables.borrow();
        tables
            .matches
            .values()
            .filter(|m| m.puuid == puuid)
            .cloned()
            .sorted_by(|a, b| {
                b.game_creation
                    .cmp(&a.game_creation)
                    .then_with(|| b.match_id.cmp(&a.match_id))
            })
            .collect()
    }
}

impl Store for MemoryStore {
    async fn player(&self, puuid: &str) -> Result<Option<Player>> {
        Ok(self
            .tables
            .borrow()
            .players
            .get(puuid)
            .map(|(player, _)| player.clone()))
    }

    async fn player_by_riot_id(&self, game_name: &str, tag_line: &str) -> Result<Option<Player>> {
        Ok(self
            .tables
            .borrow()
            .players
            .values()
            .map(|(player, _)| player)
            .find(|p| {
                p.game_name.eq_ignore_ascii_case(game_name)
                    && p.tag_line.eq_ignore_ascii_case(tag_line)
            })
            .cloned())
    }

    async fn upsert_player(&self, player: &Player) -> Result<()> {
        let mut tables = self.tables.borrow_mut();
        tables
            .players
            .entry(player.puuid.clone())
            .and_modify(|(existing, _)| {
                existing.game_name.clone_from(&player.game_name);
                existing.tag_line.clone_from(&player.tag_line);
                existing.region.clone_from(&player.region);
            })
            .or_insert_with(|| (player.clone(), None));
        Ok(())
    }

    async fn watermark(&self, puuid: &str) -> Result<Option<i64>> {
        Ok(self
            .tables
            .borrow()
            .players
            .get(puuid)
            .and_then(|&(_, watermark)| watermark))
    }

    async fn advance_watermark(&self, puuid: &str, timestamp: i64) -> Result<()> {
        if let Some((_, watermark)) = self.tables.borrow_mut().players.get_mut(puuid) {
            *watermark = Some(watermark.map_or(timestamp, |w| w.max(timestamp)));
        }
        Ok(())
    }

    async fn recent_matches(&self, puuid: &str, limit: u32) -> Result<Vec<MatchStamp>> {
        Ok(self
            .player_matches(puuid)
            .into_iter()
            .take(limit as usize)
            .map(|m| MatchStamp {
                match_id: m.match_id,
                game_creation: m.game_creation,
            })
            .collect())
    }

    async fn insert_match(&self, record: &MatchRecord) -> Result<bool> {
        let mut tables = self.tables.borrow_mut();
        let key = (record.puuid.clone(), record.match_id.clone());
        if tables.matches.contains_key(&key) {
            return Ok(false);
        }
        tables.matches.insert(key, record.clone());
        Ok(true)
    }

    async fn matches(&self, puuid: &str, filter: &MatchFilter) -> Result<Vec<MatchRecord>> {
        Ok(self
            .player_matches(puuid)
            .into_iter()
            .filter(|m| filter.matches(m))
            .take(filter.limit.map_or(usize::MAX, |l| l as usize))
            .collect())
    }

    async fn match_metadata(&self, puuid: &str) -> Result<MatchMetadata> {
        let matches = self.player_matches(puuid);
        let mut patches = matches.iter().map(|m| m.patch.clone()).unique().collect_vec();
        sort_patches_desc(&mut patches);
        let seasons = matches
            .iter()
            .map(|m| m.season)
            .unique()
            .sorted_by(|a, b| b.cmp(a))
            .collect();
        Ok(MatchMetadata {
            total: matches.len() as u64,
            patches,
            seasons,
            earliest: matches.iter().map(|m| m.game_creation).min(),
            latest: matches.iter().map(|m| m.game_creation).max(),
        })
    }
}
