//! [`GameApi`] backed by [`riven`].

use arena_tracker::upstream::{Account, GameApi, MatchIdQuery, UpstreamError};
use riven::consts::{Queue, RegionalRoute};
use riven::reqwest::Method;
use riven::{RiotApi, RiotApiError};

fn upstream_error(context: &str, error: RiotApiError) -> UpstreamError {
    UpstreamError {
        status: error.status_code().map(|status| status.as_u16()),
        message: format!("{}: {}", context, error),
    }
}

/// Riot API access through one regional route.
pub struct RiotGameApi {
    riot_api: &'static RiotApi,
    route: RegionalRoute,
}

impl RiotGameApi {
    /// Create with the per-isolate client.
    pub fn new(riot_api: &'static RiotApi, route: RegionalRoute) -> Self {
        Self { riot_api, route }
    }
}

impl GameApi for RiotGameApi {
    async fn account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Account>, UpstreamError> {
        let account = self
            .riot_api
            .account_v1()
            .get_by_riot_id(self.route, game_name, tag_line)
            .await
            .map_err(|e| upstream_error("account-v1.getByRiotId", e))?;
        Ok(account.map(|account| Account {
            puuid: account.puuid,
            game_name: account.game_name,
            tag_line: account.tag_line,
        }))
    }

    async fn match_ids(
        &self,
        puuid: &str,
        query: MatchIdQuery,
    ) -> Result<Vec<String>, UpstreamError> {
        self.riot_api
            .match_v5()
            .get_match_ids_by_puuid(
                self.route,
                puuid,
                Some(query.count as i32),
                None,
                query.queue.map(Queue::from),
                None,
                Some(query.start as i32),
                None,
            )
            .await
            .map_err(|e| upstream_error("match-v5.getMatchIdsByPUUID", e))
    }

    async fn match_detail(
        &self,
        match_id: &str,
    ) -> Result<Option<serde_json::Value>, UpstreamError> {
        // Raw JSON, so schema validation stays with `MatchDetail` and riven's typed DTO
        // can't reject Arena-only fields.
        let route: &'static str = self.route.into();
        let request = self.riot_api.request(
            Method::GET,
            route,
            &format!("/lol/match/v5/matches/{}", match_id),
        );
        self.riot_api
            .execute_opt::<serde_json::Value>("match-v5.getMatch", route, request)
            .await
            .map_err(|e| upstream_error("match-v5.getMatch", e))
    }
}
