#![warn(missing_docs)]

//! Cloudflare worker.

use arena_tracker::progress::{self, ChampionProgress, ProgressSummary};
use arena_tracker::store::{MatchFilter, Store};
use arena_tracker::{identity, stats, Error, Reconciler, SyncOptions};
use worker::{event, Context, Env, Request, Response, Result, RouteContext, Router};

use crate::d1::D1Store;
use crate::error::AtError;
use crate::riot::RiotGameApi;
use crate::util::{Services, WorkerPacer};

pub mod d1;
pub mod ddragon;
pub mod error;
pub mod riot;
pub mod util;

type Ctx = RouteContext<&'static Services>;

const API_ROUTES: [&str; 7] = [
    "/api/account",
    "/api/matches/sync",
    "/api/matches",
    "/api/matches/meta",
    "/api/stats",
    "/api/champions",
    "/api/progress/refresh",
];

/// Cloudflare fetch request handler.
#[event(fetch, respond_with_errors)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let level = util::envvar_parse(&env, "LOG_LEVEL")?.unwrap_or(log::LevelFilter::Info);
    util::init_logging(level);
    let services = util::get_services(&env)?;

    let mut router = Router::with_data(services)
        .get_async("/api/account", account_get)
        .post_async("/api/matches/sync", sync_post)
        .get_async("/api/matches", matches_get)
        .get_async("/api/matches/meta", meta_get)
        .get_async("/api/stats", stats_get)
        .get_async("/api/champions", champions_get)
        .post_async("/api/progress/refresh", refresh_post);
    for route in API_ROUTES {
        router = router.options(route, preflight);
    }
    router.run(req, env).await
}

/// `{"success": true, ...payload}`. `T` must serialize as a map.
#[derive(serde::Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

fn respond<T: serde::Serialize>(
    services: &Services,
    result: std::result::Result<T, AtError>,
) -> Result<Response> {
    let response = match result {
        Ok(payload) => Response::from_json(&Success {
            success: true,
            payload,
        })?,
        Err(error) => error.into_response()?,
    };
    with_cors(services, response)
}

fn with_cors(services: &Services, mut response: Response) -> Result<Response> {
    if let Some(origin) = &services.cors_origin {
        let headers = response.headers_mut();
        headers.set("Access-Control-Allow-Origin", origin)?;
        headers.set("Access-Control-Allow-Methods", "GET, POST, OPTIONS")?;
        headers.set("Access-Control-Allow-Headers", "Content-Type")?;
        headers.set("Vary", "Origin")?;
    }
    Ok(response)
}

/// `OPTIONS /api/*`
pub fn preflight(_req: Request, ctx: Ctx) -> Result<Response> {
    with_cors(ctx.data, Response::empty()?.with_status(204))
}

fn d1_store(ctx: &Ctx) -> std::result::Result<D1Store, AtError> {
    Ok(D1Store::new(ctx.env.d1("BINDING_D1_DB")?))
}

fn required(value: Option<String>, name: &str) -> std::result::Result<String, AtError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Validation(format!("`{}` is required.", name)).into())
}

fn query<T: serde::de::DeserializeOwned>(req: &Request) -> std::result::Result<T, AtError> {
    req.query()
        .map_err(|e| Error::Validation(format!("Bad query string: {}", e)).into())
}

/// Query of `GET /api/account`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountQuery {
    game_name: Option<String>,
    tag_line: Option<String>,
}

/// `GET /api/account`
pub async fn account_get(req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let AccountQuery {
            game_name,
            tag_line,
        } = query(&req)?;
        let store = d1_store(&ctx)?;
        let api = RiotGameApi::new(&services.riot_api, services.region);
        let player = identity::resolve(
            &store,
            &api,
            &services.region.to_string(),
            game_name.as_deref().unwrap_or_default(),
            tag_line.as_deref().unwrap_or_default(),
        )
        .await?;
        Ok(player)
    }
    .await;
    respond(services, result)
}

/// Query of `POST /api/matches/sync`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncQuery {
    puuid: Option<String>,
    incremental: Option<bool>,
    count: Option<u32>,
    full_history: Option<bool>,
}

/// `POST /api/matches/sync`
pub async fn sync_post(req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let SyncQuery {
            puuid,
            incremental,
            count,
            full_history,
        } = query(&req)?;
        let puuid = required(puuid, "puuid")?;
        let options = SyncOptions {
            incremental: incremental.unwrap_or(true),
            count,
            full_history: full_history.unwrap_or(false),
        };

        let store = d1_store(&ctx)?;
        let api = RiotGameApi::new(&services.riot_api, services.region);
        let mut reconciler = Reconciler::new(&store, &api, &services.config, WorkerPacer);
        log::info!("Syncing {} with {:?}.", puuid, options);
        Ok(reconciler.sync(&puuid, options).await?)
    }
    .await;
    respond(services, result)
}

/// Query of the history and stats routes.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    puuid: Option<String>,
    from: Option<i64>,
    to: Option<i64>,
    patch: Option<String>,
    season: Option<i32>,
    champion: Option<String>,
    limit: Option<u32>,
}
impl HistoryQuery {
    fn into_filter(self) -> std::result::Result<(String, MatchFilter), AtError> {
        let puuid = required(self.puuid, "puuid")?;
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(Error::Validation("`from` is after `to`.".to_owned()).into());
            }
        }
        let filter = MatchFilter {
            from: self.from,
            to: self.to,
            patch: self.patch.filter(|p| !p.is_empty()),
            season: self.season,
            champion: self.champion.filter(|c| !c.is_empty()),
            limit: self.limit,
        };
        Ok((puuid, filter))
    }
}

async fn known_player(store: &D1Store, puuid: &str) -> std::result::Result<(), AtError> {
    match store.player(puuid).await? {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(format!("Player {}", puuid)).into()),
    }
}

#[derive(serde::Serialize)]
struct MatchList {
    matches: Vec<arena_tracker::model::MatchRecord>,
}

/// `GET /api/matches`
pub async fn matches_get(req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let (puuid, filter) = query::<HistoryQuery>(&req)?.into_filter()?;
        let store = d1_store(&ctx)?;
        known_player(&store, &puuid).await?;
        let matches = store.matches(&puuid, &filter).await?;
        Ok(MatchList { matches })
    }
    .await;
    respond(services, result)
}

/// Query of `GET /api/matches/meta`.
#[derive(Debug, serde::Deserialize)]
struct MetaQuery {
    puuid: Option<String>,
}

/// `GET /api/matches/meta`
pub async fn meta_get(req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let MetaQuery { puuid } = query(&req)?;
        let puuid = required(puuid, "puuid")?;
        let store = d1_store(&ctx)?;
        known_player(&store, &puuid).await?;
        Ok(store.match_metadata(&puuid).await?)
    }
    .await;
    respond(services, result)
}

/// `GET /api/stats`
pub async fn stats_get(req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let (puuid, mut filter) = query::<HistoryQuery>(&req)?.into_filter()?;
        // Stats cover everything that matches, `limit` only applies to listings.
        filter.limit = None;
        let store = d1_store(&ctx)?;
        known_player(&store, &puuid).await?;
        let matches = store.matches(&puuid, &filter).await?;
        Ok(stats::aggregate(&matches))
    }
    .await;
    respond(services, result)
}

#[derive(serde::Serialize)]
struct ChampionList {
    champions: Vec<ChampionProgress>,
}

/// `GET /api/champions`
pub async fn champions_get(_req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let champions = ddragon::champions(services).await?;
        Ok(ChampionList { champions })
    }
    .await;
    respond(services, result)
}

/// Response of `POST /api/progress/refresh`.
#[derive(serde::Serialize)]
struct Refreshed {
    champions: Vec<ChampionProgress>,
    summary: ProgressSummary,
}

/// `POST /api/progress/refresh`, body is the client's saved progress array.
pub async fn refresh_post(mut req: Request, ctx: Ctx) -> Result<Response> {
    let services = ctx.data;
    let result: std::result::Result<_, AtError> = async {
        let body = req.text().await?;
        // No saved progress yet: plain reference list.
        let previous: Vec<ChampionProgress> = if body.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&body)
                .map_err(|e| Error::Validation(format!("Bad progress body: {}", e)))?
        };
        let fresh = ddragon::champions(services).await?;
        let champions = progress::merge(fresh, &previous);
        let summary = progress::summarize(&champions);
        log::debug!(
            "Refreshed progress: {} previous, {} merged.",
            previous.len(),
            champions.len()
        );
        Ok(Refreshed { champions, summary })
    }
    .await;
    respond(services, result)
}
