//! Incremental match reconciliation.
//!
//! A sync lists recent match ids, works out which ones still need a detail fetch,
//! stores the relevant ones with insert-or-ignore semantics, and only then advances
//! the player's watermark. Every step is safe to repeat: the `(puuid, match_id)`
//! uniqueness of the store absorbs anything the watermark check lets through.

use std::collections::HashMap;

use itertools::Itertools;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::fetcher::MatchFetcher;
use crate::model::{patch_of, season_of, MatchRecord, PLACEMENT_MAX, PLACEMENT_MIN};
use crate::sequencer::{Pacer, Sequencer};
use crate::store::{MatchStamp, Store};
use crate::upstream::{GameApi, MatchDetail};
use crate::watermark;

/// How much of the match history a sync looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncOptions {
    /// Only look at the newest few matches and skip anything at or before the watermark.
    /// Ignored when the player has no watermark yet.
    pub incremental: bool,
    /// Match ids to request (non-incremental) or report (incremental).
    pub count: Option<u32>,
    /// Walk the whole match list instead of one page.
    pub full_history: bool,
}

/// Outcome of [`Reconciler::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Rows written.
    pub saved: u32,
    /// Wrong mode, at or before the watermark, or already stored.
    pub skipped: u32,
    /// Malformed matches, failed detail fetches, and failed writes.
    pub errors: u32,
    /// Listed ids that were not stored before this sync.
    pub new_matches: u32,
    /// Watermark after the sync.
    pub latest_timestamp: Option<i64>,
    /// Listed ids, newest first. Incremental syncs include stored ids up to `count`.
    pub match_ids: Vec<String>,
}

/// Per-batch tallies.
#[derive(Debug, Default)]
struct Batch {
    saved: u32,
    skipped: u32,
    errors: u32,
    /// Creation time of the newest relevant match known to be stored.
    newest: Option<i64>,
    /// A retryable failure happened; hold the watermark so the window is retried.
    hold_watermark: bool,
}

/// Reconciliation engine for one request.
pub struct Reconciler<'a, S, A, P> {
    store: &'a S,
    api: &'a A,
    config: &'a SyncConfig,
    sequencer: Sequencer<P>,
}

impl<'a, S: Store, A: GameApi, P: Pacer> Reconciler<'a, S, A, P> {
    /// Create an engine. Detail fetches are spaced by [`SyncConfig::detail_interval`].
    pub fn new(store: &'a S, api: &'a A, config: &'a SyncConfig, pacer: P) -> Self {
        Self {
            store,
            api,
            config,
            sequencer: Sequencer::new(pacer, config.detail_interval),
        }
    }

    /// The detail request sequencer.
    pub fn sequencer(&self) -> &Sequencer<P> {
        &self.sequencer
    }

    /// Sync the stored Arena history of `puuid` with upstream.
    pub async fn sync(&mut self, puuid: &str, options: SyncOptions) -> Result<SyncReport> {
        let store = self.store;
        let config = self.config;
        let fetcher = MatchFetcher::new(self.api, config);

        if store.player(puuid).await?.is_none() {
            return Err(Error::NotFound(format!("Player {}", puuid)));
        }
        let watermark = watermark::read(store, puuid).await?;
        let incremental = options.incremental && watermark.is_some();
        let requested = config.clamp_page(options.count.unwrap_or(config.default_page_size));
        let queue = Some(config.tracked_queue);

        let fresh = if options.full_history {
            fetcher
                .list_all_match_ids(puuid, config.full_history_limit, queue)
                .await?
        } else if incremental {
            fetcher
                .list_match_ids(puuid, 0, config.incremental_page_size, queue)
                .await?
        } else {
            fetcher.list_match_ids(puuid, 0, requested, queue).await?
        };

        // Stored ids are a subset of the upstream list in the same order, so any stored
        // id among the newest `n` listed ids is among the newest `n` stored ids.
        let cached = store
            .recent_matches(puuid, (fresh.len() as u32).max(requested))
            .await?;
        let known = cached
            .iter()
            .map(|m| (m.match_id.as_str(), m.game_creation))
            .collect::<HashMap<_, _>>();
        let new_matches = fresh
            .iter()
            .filter(|id| !known.contains_key(id.as_str()))
            .count() as u32;

        let mut batch = Batch::default();
        let mut candidates = Vec::new();
        for match_id in fresh.iter() {
            match known.get(match_id.as_str()) {
                // Already stored, so already processed.
                Some(&game_creation) if incremental => {
                    batch.skipped += 1;
                    batch.newest = batch.newest.max(Some(game_creation));
                }
                _ => candidates.push(match_id),
            }
        }
        log::info!(
            "Syncing {} (incremental: {}, watermark: {:?}): {} listed, {} new, {} to fetch.",
            puuid,
            incremental,
            watermark,
            fresh.len(),
            new_matches,
            candidates.len()
        );

        for match_id in candidates {
            let detail = match self.sequencer.dispatch(fetcher.match_detail(match_id)).await {
                Ok(detail) => detail,
                Err(e) if e.is_fatal() => {
                    log::error!("Aborting sync of {} at {}: {:?}", puuid, match_id, e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("Skipping match {}: {:?}", match_id, e);
                    batch.errors += 1;
                    batch.hold_watermark |= !matches!(
                        e,
                        Error::MalformedMatchData { .. } | Error::NotFound(_)
                    );
                    continue;
                }
            };
            let skip_until = if incremental { watermark } else { None };
            self.reconcile_one(puuid, match_id, detail, skip_until, &mut batch)
                .await;
        }

        let latest_timestamp = if batch.hold_watermark {
            log::warn!(
                "Holding watermark of {} at {:?} after retryable failures.",
                puuid,
                watermark
            );
            watermark
        } else {
            match watermark::advance(store, puuid, watermark, batch.newest).await {
                Ok(advanced) => advanced,
                // Stored rows stay; the next sync re-covers the window.
                Err(e) => {
                    log::error!("Failed to advance watermark of {}: {:?}", puuid, e);
                    batch.errors += 1;
                    watermark
                }
            }
        };

        let match_ids = if incremental {
            fresh
                .into_iter()
                .chain(cached.into_iter().map(|MatchStamp { match_id, .. }| match_id))
                .unique()
                .take(requested as usize)
                .collect()
        } else {
            fresh
        };

        let report = SyncReport {
            saved: batch.saved,
            skipped: batch.skipped,
            errors: batch.errors,
            new_matches,
            latest_timestamp,
            match_ids,
        };
        log::info!(
            "Synced {}: saved {}, skipped {}, errors {}, watermark {:?}.",
            puuid,
            report.saved,
            report.skipped,
            report.errors,
            report.latest_timestamp
        );
        Ok(report)
    }

    /// Filter, validate, and store one fetched match.
    async fn reconcile_one(
        &self,
        puuid: &str,
        match_id: &str,
        detail: MatchDetail,
        watermark: Option<i64>,
        batch: &mut Batch,
    ) {
        if detail.info.game_mode != self.config.tracked_game_mode {
            log::debug!("Skipping {} match {}.", detail.info.game_mode, match_id);
            batch.skipped += 1;
            return;
        }
        let game_creation = detail.creation_secs();
        if watermark.is_some_and(|w| game_creation <= w) {
            batch.skipped += 1;
            return;
        }

        let record = match to_record(puuid, match_id, &detail) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping match {}: {}", match_id, e);
                batch.errors += 1;
                return;
            }
        };
        match self.store.insert_match(&record).await {
            Ok(inserted) => {
                if inserted {
                    batch.saved += 1;
                } else {
                    batch.skipped += 1;
                }
                batch.newest = batch.newest.max(Some(game_creation));
            }
            Err(e) => {
                log::error!("Failed to store match {}: {:?}", match_id, e);
                batch.errors += 1;
                batch.hold_watermark = true;
            }
        }
    }
}

/// Build the stored row for `puuid`'s participation in `detail`.
fn to_record(puuid: &str, match_id: &str, detail: &MatchDetail) -> Result<MatchRecord> {
    let malformed = |reason: &str| Error::MalformedMatchData {
        match_id: match_id.to_owned(),
        reason: reason.to_owned(),
    };
    let participant = detail
        .participant(puuid)
        .ok_or_else(|| malformed("player is not a participant"))?;
    let placement = participant
        .placement
        .and_then(|p| u8::try_from(p).ok())
        .filter(|p| (PLACEMENT_MIN..=PLACEMENT_MAX).contains(p))
        .ok_or_else(|| malformed("placement missing or out of range"))?;

    let game_creation = detail.creation_secs();
    Ok(MatchRecord {
        puuid: puuid.to_owned(),
        match_id: match_id.to_owned(),
        champion: participant.champion_name.clone(),
        placement,
        win: placement == PLACEMENT_MIN,
        game_creation,
        game_end: detail.info.game_end_timestamp.map(|ms| ms.div_euclid(1000)),
        game_version: detail.info.game_version.clone(),
        patch: patch_of(&detail.info.game_version),
        season: season_of(game_creation),
    })
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use futures::executor::block_on;
    use serde_json::{json, Value};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::model::Player;
    use crate::sequencer::test::RecordingPacer;
    use crate::store::{MatchFilter, MatchMetadata};
    use crate::upstream::{Account, MatchIdQuery, UpstreamError};

    const ME: &str = "me-puuid";

    /// Upstream with a fixed newest-first id list and canned details.
    #[derive(Default)]
    struct ScriptedApi {
        ids: Vec<String>,
        details: HashMap<String, std::result::Result<Value, u16>>,
        detail_calls: RefCell<Vec<String>>,
    }
    impl ScriptedApi {
        /// Add a match at the front (newest).
        fn push(&mut self, match_id: &str, detail: std::result::Result<Value, u16>) {
            self.ids.insert(0, match_id.to_owned());
            self.details.insert(match_id.to_owned(), detail);
        }
    }
    impl GameApi for ScriptedApi {
        async fn account_by_riot_id(
            &self,
            _game_name: &str,
            _tag_line: &str,
        ) -> std::result::Result<Option<Account>, UpstreamError> {
            unreachable!()
        }

        async fn match_ids(
            &self,
            _puuid: &str,
            query: MatchIdQuery,
        ) -> std::result::Result<Vec<String>, UpstreamError> {
            Ok(self
                .ids
                .iter()
                .skip(query.start as usize)
                .take(query.count as usize)
                .cloned()
                .collect())
        }

        async fn match_detail(
            &self,
            match_id: &str,
        ) -> std::result::Result<Option<Value>, UpstreamError> {
            self.detail_calls.borrow_mut().push(match_id.to_owned());
            match self.details.get(match_id) {
                None => Ok(None),
                Some(Ok(value)) => Ok(Some(value.clone())),
                Some(Err(status)) => Err(UpstreamError {
                    status: Some(*status),
                    message: "scripted".to_owned(),
                }),
            }
        }
    }

    fn game(match_id: &str, mode: &str, creation_secs: i64, me: Option<i32>) -> Value {
        let mut participants = vec![json!({
            "puuid": "someone-else", "championName": "Garen", "placement": 5, "win": false
        })];
        if let Some(placement) = me {
            participants.push(json!({
                "puuid": ME, "championName": "Ahri", "placement": placement, "win": placement == 1
            }));
        }
        json!({
            "metadata": { "matchId": match_id },
            "info": {
                "gameMode": mode,
                "queueId": 1700,
                "gameCreation": creation_secs * 1000 + 123,
                "gameEndTimestamp": creation_secs * 1000 + 1_200_000,
                "gameVersion": "14.23.636.2153",
                "participants": participants,
            }
        })
    }

    fn arena(match_id: &str, creation_secs: i64) -> std::result::Result<Value, u16> {
        Ok(game(match_id, "CHERRY", creation_secs, Some(2)))
    }

    fn store_with_player(watermark: Option<i64>) -> MemoryStore {
        let store = MemoryStore::new();
        block_on(async {
            store
                .upsert_player(&Player {
                    puuid: ME.to_owned(),
                    game_name: "Me".to_owned(),
                    tag_line: "NA1".to_owned(),
                    region: "AMERICAS".to_owned(),
                })
                .await
                .unwrap();
            if let Some(watermark) = watermark {
                store.advance_watermark(ME, watermark).await.unwrap();
            }
        });
        store
    }

    fn config() -> SyncConfig {
        SyncConfig {
            detail_interval: std::time::Duration::ZERO,
            ..SyncConfig::default()
        }
    }

    fn run<S: Store>(store: &S, api: &ScriptedApi, options: SyncOptions) -> Result<SyncReport> {
        let config = config();
        let mut reconciler = Reconciler::new(store, api, &config, RecordingPacer::default());
        block_on(reconciler.sync(ME, options))
    }

    const INCREMENTAL: SyncOptions = SyncOptions {
        incremental: true,
        count: None,
        full_history: false,
    };

    #[test]
    fn test_watermark_skips_old_and_equal() {
        let store = store_with_player(Some(1000));
        let mut api = ScriptedApi::default();
        api.push("NA1_900", arena("NA1_900", 900));
        api.push("NA1_1000", arena("NA1_1000", 1000));
        api.push("NA1_1100", arena("NA1_1100", 1100));

        let report = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(2, report.skipped);
        assert_eq!(0, report.errors);
        assert_eq!(Some(1100), report.latest_timestamp);
        assert_eq!(Some(1100), block_on(store.watermark(ME)).unwrap());

        let stored = block_on(store.matches(ME, &MatchFilter::default())).unwrap();
        assert_eq!(1, stored.len());
        assert_eq!("NA1_1100", stored[0].match_id);
        assert_eq!(2, stored[0].placement);
        assert!(!stored[0].win);
        assert_eq!("14.23", stored[0].patch);
        assert_eq!(1100 + 1200, stored[0].game_end.unwrap());
    }

    #[test]
    fn test_second_sync_is_noop() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        for (i, ts) in [100, 200, 300].into_iter().enumerate() {
            let id = format!("NA1_{}", i);
            api.push(&id, arena(&id, ts));
        }

        // No watermark yet, so this is a full sync despite the flag.
        let first = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(3, first.saved);
        assert_eq!(3, first.new_matches);
        assert_eq!(Some(300), first.latest_timestamp);
        assert_eq!(3, api.detail_calls.borrow().len());

        let second = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(0, second.saved);
        assert_eq!(3, second.skipped);
        assert_eq!(0, second.new_matches);
        assert_eq!(Some(300), second.latest_timestamp);
        // Stored ids are not fetched again.
        assert_eq!(3, api.detail_calls.borrow().len());
    }

    #[test]
    fn test_repeated_full_syncs_store_each_match_once() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        api.push("NA1_1", arena("NA1_1", 10));
        api.push("NA1_2", arena("NA1_2", 20));

        for _ in 0..3 {
            run(&store, &api, SyncOptions::default()).unwrap();
        }
        assert_eq!(2, store.match_count());
        let last = run(&store, &api, SyncOptions::default()).unwrap();
        assert_eq!(0, last.saved);
        assert_eq!(2, last.skipped);
        assert_eq!(0, last.new_matches);
    }

    #[test]
    fn test_other_modes_are_never_stored() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        api.push("NA1_1", arena("NA1_1", 100));
        api.push("NA1_2", Ok(game("NA1_2", "CLASSIC", 5000, Some(1))));
        api.push("NA1_3", Ok(game("NA1_3", "cherry", 6000, Some(1))));

        let report = run(&store, &api, SyncOptions::default()).unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(2, report.skipped);
        assert_eq!(Some(100), report.latest_timestamp);
        assert_eq!(1, store.match_count());
    }

    #[test]
    fn test_missing_participant_is_counted_error() {
        let store = store_with_player(Some(50));
        let mut api = ScriptedApi::default();
        api.push("NA1_1", arena("NA1_1", 100));
        api.push("NA1_2", Ok(game("NA1_2", "CHERRY", 200, None)));

        let report = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(1, report.errors);
        assert_eq!(Some(100), report.latest_timestamp);
        assert_eq!(1, store.match_count());
    }

    #[test]
    fn test_out_of_range_placement_is_malformed() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        api.push("NA1_1", Ok(game("NA1_1", "CHERRY", 100, Some(9))));
        api.push("NA1_2", Ok(json!({ "metadata": {}, "info": [] })));

        let report = run(&store, &api, SyncOptions::default()).unwrap();
        assert_eq!(0, report.saved);
        assert_eq!(2, report.errors);
        // Permanent failures do not hold the watermark, but nothing was stored either.
        assert_eq!(None, report.latest_timestamp);
    }

    #[test]
    fn test_transient_failure_holds_watermark() {
        let store = store_with_player(Some(50));
        let mut api = ScriptedApi::default();
        api.push("NA1_1", Err(503));
        api.push("NA1_2", arena("NA1_2", 200));

        let report = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(1, report.errors);
        assert_eq!(Some(50), report.latest_timestamp);
        assert_eq!(Some(50), block_on(store.watermark(ME)).unwrap());

        // Upstream recovers: the held window is retried and the watermark catches up.
        api.details.insert("NA1_1".to_owned(), arena("NA1_1", 100));
        let retry = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(1, retry.saved);
        assert_eq!(1, retry.skipped);
        assert_eq!(Some(200), retry.latest_timestamp);
    }

    #[test]
    fn test_auth_failure_aborts() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        api.push("NA1_1", Err(403));
        api.push("NA1_2", arena("NA1_2", 200));

        let err = run(&store, &api, SyncOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth(_)));
        // Already stored rows stay, the watermark does not move.
        assert_eq!(1, store.match_count());
        assert_eq!(None, block_on(store.watermark(ME)).unwrap());
    }

    #[test]
    fn test_rate_limit_aborts() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        api.push("NA1_1", arena("NA1_1", 100));
        api.push("NA1_2", Err(429));

        let err = run(&store, &api, SyncOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UpstreamRateLimited(_)));
        assert_eq!(vec!["NA1_2"], *api.detail_calls.borrow());
    }

    #[test]
    fn test_unknown_player() {
        let store = MemoryStore::new();
        let api = ScriptedApi::default();
        assert!(matches!(
            run(&store, &api, SyncOptions::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_incremental_reports_union_with_cache() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        for i in 0..15 {
            let id = format!("NA1_{:02}", i);
            api.push(&id, arena(&id, 100 + i));
        }
        let full = run(&store, &api, SyncOptions::default()).unwrap();
        assert_eq!(15, full.saved);

        api.push("NA1_99", arena("NA1_99", 999));
        let report = run(
            &store,
            &api,
            SyncOptions {
                count: Some(12),
                ..INCREMENTAL
            },
        )
        .unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(1, report.new_matches);
        // Incremental page of 10 listed, 9 already stored.
        assert_eq!(9, report.skipped);
        assert_eq!(12, report.match_ids.len());
        assert_eq!("NA1_99", report.match_ids[0]);
        assert_eq!("NA1_14", report.match_ids[1]);
        assert_eq!("NA1_04", report.match_ids[11]);
        assert!(report.match_ids.iter().all_unique());
    }

    #[test]
    fn test_full_history_walks_pages() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        for i in 0..130 {
            let id = format!("NA1_{}", i);
            api.push(&id, arena(&id, 1000 + i));
        }
        let report = run(
            &store,
            &api,
            SyncOptions {
                full_history: true,
                ..SyncOptions::default()
            },
        )
        .unwrap();
        assert_eq!(130, report.saved);
        assert_eq!(Some(1129), report.latest_timestamp);
    }

    #[test]
    fn test_watermark_is_monotonic() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        api.push("NA1_new", arena("NA1_new", 500));
        run(&store, &api, SyncOptions::default()).unwrap();
        assert_eq!(Some(500), block_on(store.watermark(ME)).unwrap());

        // Upstream now only lists an older match (e.g. the newer one aged out).
        let mut older = ScriptedApi::default();
        older.push("NA1_old", arena("NA1_old", 100));
        let mut seen = Vec::new();
        for options in [SyncOptions::default(), INCREMENTAL, SyncOptions::default()] {
            let report = run(&store, &older, options).unwrap();
            seen.push(report.latest_timestamp);
        }
        assert_eq!(vec![Some(500); 3], seen);
    }

    #[test]
    fn test_detail_requests_are_spaced() {
        let store = store_with_player(None);
        let mut api = ScriptedApi::default();
        for i in 0..4 {
            let id = format!("NA1_{}", i);
            api.push(&id, arena(&id, i));
        }
        let config = SyncConfig {
            detail_interval: std::time::Duration::from_secs(3600),
            ..SyncConfig::default()
        };
        let mut reconciler = Reconciler::new(&store, &api, &config, RecordingPacer::default());
        block_on(reconciler.sync(ME, SyncOptions::default())).unwrap();
        assert_eq!(3, reconciler.sequencer().pacer().0.borrow().len());
    }

    /// Fails `insert_match` for one match id, and optionally every watermark write.
    struct FlakyStore {
        inner: MemoryStore,
        fail_match_id: &'static str,
        fail_watermark: bool,
    }
    impl Store for FlakyStore {
        async fn player(&self, puuid: &str) -> Result<Option<Player>> {
            self.inner.player(puuid).await
        }
        async fn player_by_riot_id(
            &self,
            game_name: &str,
            tag_line: &str,
        ) -> Result<Option<Player>> {
            self.inner.player_by_riot_id(game_name, tag_line).await
        }
        async fn upsert_player(&self, player: &Player) -> Result<()> {
            self.inner.upsert_player(player).await
        }
        async fn watermark(&self, puuid: &str) -> Result<Option<i64>> {
            self.inner.watermark(puuid).await
        }
        async fn advance_watermark(&self, puuid: &str, timestamp: i64) -> Result<()> {
            if self.fail_watermark {
                return Err(Error::Storage("watermark write failed".to_owned()));
            }
            self.inner.advance_watermark(puuid, timestamp).await
        }
        async fn recent_matches(&self, puuid: &str, limit: u32) -> Result<Vec<MatchStamp>> {
            self.inner.recent_matches(puuid, limit).await
        }
        async fn insert_match(&self, record: &MatchRecord) -> Result<bool> {
            if record.match_id == self.fail_match_id {
                return Err(Error::Storage("disk full".to_owned()));
            }
            self.inner.insert_match(record).await
        }
        async fn matches(&self, puuid: &str, filter: &MatchFilter) -> Result<Vec<MatchRecord>> {
            self.inner.matches(puuid, filter).await
        }
        async fn match_metadata(&self, puuid: &str) -> Result<MatchMetadata> {
            self.inner.match_metadata(puuid).await
        }
    }

    #[test]
    fn test_storage_failure_holds_watermark() {
        let store = FlakyStore {
            inner: store_with_player(Some(10)),
            fail_match_id: "NA1_1",
            fail_watermark: false,
        };
        let mut api = ScriptedApi::default();
        api.push("NA1_1", arena("NA1_1", 100));
        api.push("NA1_2", arena("NA1_2", 200));

        let report = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(1, report.errors);
        assert_eq!(Some(10), report.latest_timestamp);
        assert_eq!(1, store.inner.match_count());
    }

    #[test]
    fn test_watermark_write_failure_keeps_report() {
        let store = FlakyStore {
            inner: store_with_player(Some(10)),
            fail_match_id: "",
            fail_watermark: true,
        };
        let mut api = ScriptedApi::default();
        api.push("NA1_1", arena("NA1_1", 100));

        let report = run(&store, &api, INCREMENTAL).unwrap();
        assert_eq!(1, report.saved);
        assert_eq!(1, report.errors);
        assert_eq!(Some(10), report.latest_timestamp);
        assert_eq!(1, store.inner.match_count());
        assert_eq!(Some(10), block_on(store.inner.watermark(ME)).unwrap());
    }
}
