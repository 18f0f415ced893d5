//! Riot ID to PUUID resolution, store first (cache-aside).

use crate::error::{Error, Result};
use crate::model::Player;
use crate::store::Store;
use crate::upstream::GameApi;

/// Resolve `game_name#tag_line` to a [`Player`].
///
/// A stored player is returned without calling upstream. Otherwise account-v1 is
/// queried and the result persisted; the upsert tolerates a concurrent resolver
/// having inserted the same PUUID first.
pub async fn resolve<S: Store, A: GameApi>(
    store: &S,
    api: &A,
    region: &str,
    game_name: &str,
    tag_line: &str,
) -> Result<Player> {
    let game_name = game_name.trim();
    let tag_line = tag_line.trim().trim_start_matches('#');
    if game_name.is_empty() || tag_line.is_empty() {
        return Err(Error::Validation(
            "`gameName` and `tagLine` are required.".to_owned(),
        ));
    }

    if let Some(player) = store.player_by_riot_id(game_name, tag_line).await? {
        log::debug!("Resolved {}#{} from store.", game_name, tag_line);
        return Ok(player);
    }

    let account = api
        .account_by_riot_id(game_name, tag_line)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Riot ID {}#{}", game_name, tag_line)))?;
    let player = Player {
        game_name: account.game_name.unwrap_or_else(|| game_name.to_owned()),
        tag_line: account.tag_line.unwrap_or_else(|| tag_line.to_owned()),
        puuid: account.puuid,
        region: region.to_owned(),
    };
    store.upsert_player(&player).await?;
    log::info!(
        "Resolved {}#{} from upstream: {}",
        player.game_name,
        player.tag_line,
        player.puuid
    );
    Ok(player)
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use futures::executor::block_on;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::upstream::{Account, MatchIdQuery, UpstreamError};

    struct AccountApi {
        calls: Cell<u32>,
        status: Option<u16>,
    }
    impl GameApi for AccountApi {
        async fn account_by_riot_id(
            &self,
            game_name: &str,
            tag_line: &str,
        ) -> std::result::Result<Option<Account>, UpstreamError> {
            self.calls.set(self.calls.get() + 1);
            match self.status {
                Some(404) => Ok(None),
                Some(status) => Err(UpstreamError {
                    status: Some(status),
                    message: "error".to_owned(),
                }),
                None => Ok(Some(Account {
                    puuid: format!("puuid-{}", game_name.to_lowercase()),
                    game_name: Some(game_name.to_owned()),
                    tag_line: Some(tag_line.to_uppercase()),
                })),
            }
        }

        async fn match_ids(
            &self,
            _puuid: &str,
            _query: MatchIdQuery,
        ) -> std::result::Result<Vec<String>, UpstreamError> {
            unreachable!()
        }

        async fn match_detail(
            &self,
            _match_id: &str,
        ) -> std::result::Result<Option<serde_json::Value>, UpstreamError> {
            unreachable!()
        }
    }

    fn api(status: Option<u16>) -> AccountApi {
        AccountApi {
            calls: Cell::new(0),
            status,
        }
    }

    #[test]
    fn test_resolve_caches_in_store() {
        let store = MemoryStore::new();
        let api = api(None);
        block_on(async {
            let first = resolve(&store, &api, "AMERICAS", "LugnutsK", "000").await.unwrap();
            assert_eq!("puuid-lugnutsk", first.puuid);
            assert_eq!(1, api.calls.get());

            // Case-insensitive store hit, no upstream call.
            let second = resolve(&store, &api, "AMERICAS", "lugnutsk", "#000").await.unwrap();
            assert_eq!(first, second);
            assert_eq!(1, api.calls.get());
        });
    }

    #[test]
    fn test_resolve_errors() {
        let store = MemoryStore::new();
        block_on(async {
            assert!(matches!(
                resolve(&store, &api(None), "AMERICAS", " ", "NA1").await,
                Err(Error::Validation(_))
            ));
            assert!(matches!(
                resolve(&store, &api(Some(404)), "AMERICAS", "Nobody", "NA1").await,
                Err(Error::NotFound(_))
            ));
            assert!(matches!(
                resolve(&store, &api(Some(403)), "AMERICAS", "Nobody", "NA1").await,
                Err(Error::UpstreamAuth(_))
            ));
            assert!(matches!(
                resolve(&store, &api(Some(502)), "AMERICAS", "Nobody", "NA1").await,
                Err(Error::Upstream {
                    status: Some(502),
                    ..
                })
            ));
        });
        assert_eq!(None, block_on(store.player("puuid-nobody")).unwrap());
    }

    #[test]
    fn test_resolve_race_is_tolerated() {
        let store = MemoryStore::new();
        block_on(async {
            // Another request stored the same account under a different display case.
            store
                .upsert_player(&Player {
                    puuid: "puuid-racer".to_owned(),
                    game_name: "RACER".to_owned(),
                    tag_line: "EUW".to_owned(),
                    region: "EUROPE".to_owned(),
                })
                .await
                .unwrap();
            let api = api(None);
            let player = resolve(&store, &api, "EUROPE", "Racer", "euw2").await.unwrap();
            assert_eq!("puuid-racer", player.puuid);
            assert_eq!(Some(player), store.player("puuid-racer").await.unwrap());
        });
    }
}
