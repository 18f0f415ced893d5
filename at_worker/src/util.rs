//! Helper utilities.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::{Mutex, Once, OnceLock};
use std::time::Duration;

use arena_tracker::cache::TtlCache;
use arena_tracker::progress::ChampionProgress;
use arena_tracker::sequencer::Pacer;
use arena_tracker::SyncConfig;
use riven::consts::RegionalRoute;
use riven::reqwest::Client;
use riven::{RiotApi, RiotApiConfig};
use secrecy::{ExposeSecret, SecretString};
use url::Url;
use web_sys::console;
use worker::{console_error, console_log, Delay, Env, Error, Result};

/// Initialize [`log`] logging into Cloudflare's [`console`] logging system, if not already
/// initialized. `level` only applies to the first call.
pub fn init_logging(level: log::LevelFilter) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        {
            fn hook(info: &std::panic::PanicInfo) {
                console_error!("{}", info);
            }
            std::panic::set_hook(Box::new(hook));
            console_log!("[panic hook set]");
        }
        {
            struct ConsoleLog;
            static LOG: ConsoleLog = ConsoleLog;
            impl log::Log for ConsoleLog {
                fn enabled(&self, metadata: &log::Metadata) -> bool {
                    metadata.level() <= log::max_level()
                }

                fn log(&self, record: &log::Record) {
                    if !self.enabled(record.metadata()) {
                        return;
                    }
                    let method = match record.level() {
                        log::Level::Error => console::error_1,
                        log::Level::Warn => console::warn_1,
                        log::Level::Info => console::info_1,
                        log::Level::Debug => console::debug_1,
                        log::Level::Trace => console::trace_1,
                    };
                    (method)(
                        &format!(
                            "[{} {}] {}",
                            record.level(),
                            record.module_path().unwrap_or("?"),
                            record.args()
                        )
                        .into(),
                    );
                }

                fn flush(&self) {}
            }
            if log::set_logger(&LOG).is_ok() {
                log::set_max_level(level);
            }

            log::info!("logger set, level: {}", level);
        }
    });
}

/// Per-isolate services, shared by every request.
pub struct Services {
    /// Riot API client, with its own rate limiting.
    pub riot_api: RiotApi,
    /// Regional route for account-v1 and match-v5.
    pub region: RegionalRoute,
    /// General HTTP client, for Data Dragon.
    pub reqwest_client: Client,
    /// Sync and reference list settings.
    pub config: SyncConfig,
    /// Parsed [`SyncConfig::ddragon_base_url`].
    pub ddragon_base: Url,
    /// Champion reference lists by locale.
    pub reference_cache: Mutex<TtlCache<String, Vec<ChampionProgress>>>,
    /// Origin allowed to call the API from a browser, e.g. the static site.
    pub cors_origin: Option<String>,
}

/// Get the [`Services`], initializing them if needed.
pub fn get_services(env: &Env) -> Result<&'static Services> {
    static ONCE: OnceLock<Services> = OnceLock::new();
    if let Some(services) = ONCE.get() {
        return Ok(services);
    }

    let config = load_config(env)?;
    // 429 and 5xx reach the sync as classified errors instead of being retried here.
    let riot_api = RiotApi::new(
        RiotApiConfig::with_key(secret(env, "RGAPI_KEY")?.expose_secret()).set_retries(0),
    );
    let region =
        envvar_parse::<RegionalRoute>(env, "RIOT_REGION")?.unwrap_or(RegionalRoute::AMERICAS);
    let reqwest_client = {
        let user_agent = format!(
            "arena_tracker:{version}",
            version = option_env!("GIT_HASH").unwrap_or("localdev"),
        );
        log::info!(
            "Initializing reqwest client with user agent: {:?}",
            user_agent
        );
        Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| format!("Failed to build reqwest client: {}", e))?
    };
    let ddragon_base = Url::parse(&config.ddragon_base_url)
        .map_err(|e| format!("Invalid url in `DDRAGON_BASE_URL`: {}", e))?;
    let cors_origin = env.var("PAGES_ORIGIN").ok().map(|v| v.to_string());
    log::info!("Services initialized, region: {}, config: {:?}", region, config);

    Ok(ONCE.get_or_init(|| Services {
        riot_api,
        region,
        reqwest_client,
        config,
        ddragon_base,
        reference_cache: Mutex::new(TtlCache::new()),
        cors_origin,
    }))
}

/// Build the [`SyncConfig`] from `SYNC_*` and `DDRAGON_*` vars, defaulting unset ones.
pub fn load_config(env: &Env) -> Result<SyncConfig> {
    let mut config = SyncConfig::default();
    if let Some(mode) = envvar_parse(env, "SYNC_TRACKED_GAME_MODE")? {
        config.tracked_game_mode = mode;
    }
    if let Some(queue) = envvar_parse(env, "SYNC_TRACKED_QUEUE")? {
        config.tracked_queue = queue;
    }
    if let Some(size) = envvar_parse(env, "SYNC_INCREMENTAL_PAGE_SIZE")? {
        config.incremental_page_size = size;
    }
    if let Some(size) = envvar_parse(env, "SYNC_DEFAULT_PAGE_SIZE")? {
        config.default_page_size = size;
    }
    if let Some(size) = envvar_parse(env, "SYNC_MAX_PAGE_SIZE")? {
        config.max_page_size = size;
    }
    if let Some(limit) = envvar_parse(env, "SYNC_FULL_HISTORY_LIMIT")? {
        config.full_history_limit = limit;
    }
    if let Some(millis) = envvar_parse(env, "SYNC_DETAIL_INTERVAL_MS")? {
        config.detail_interval = Duration::from_millis(millis);
    }
    if let Some(secs) = envvar_parse(env, "DDRAGON_TTL_SECS")? {
        config.reference_ttl = Duration::from_secs(secs);
    }
    if let Some(url) = envvar_parse(env, "DDRAGON_BASE_URL")? {
        config.ddragon_base_url = url;
    }
    if let Some(locale) = envvar_parse(env, "DDRAGON_LOCALE")? {
        config.ddragon_locale = locale;
    }
    Ok(config)
}

/// Sleeps on the JS event loop between match detail requests.
pub struct WorkerPacer;
impl Pacer for WorkerPacer {
    async fn pause(&self, duration: Duration) {
        Delay::from(duration).await;
    }
}

/// Get an env var.
pub fn envvar(env: &Env, name: &str) -> Result<String> {
    env.var(name).map(|v| v.to_string())
}
/// Get and parse an optional env var. Unset is `Ok(None)`, unparseable is an error.
pub fn envvar_parse<T>(env: &Env, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let Ok(value) = envvar(env, name) else {
        return Ok(None);
    };
    value.parse().map(Some).map_err(|e| {
        Error::RustError(format!(
            "Env var `{}` has invalid value {:?}: {}",
            name, value, e
        ))
    })
}
/// Get an env secret.
pub fn secret(env: &Env, name: &str) -> Result<SecretString> {
    env.secret(name).map(|v| v.to_string().into())
}
