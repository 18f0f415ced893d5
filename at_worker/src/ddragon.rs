//! Data Dragon champion reference list, cached per isolate.

use arena_tracker::error::{Error, Result};
use arena_tracker::progress::ChampionProgress;
use arena_tracker::reference;
use url::Url;

use crate::util::Services;

async fn get_text(services: &Services, url: Url) -> Result<String> {
    let response = services
        .reqwest_client
        .get(url.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| Error::Upstream {
            status: e.status().map(|status| status.as_u16()),
            message: format!("GET {}: {}", url, e),
        })?;
    response.text().await.map_err(|e| Error::Upstream {
        status: None,
        message: format!("GET {} body: {}", url, e),
    })
}

/// Current champion list for the configured locale, from cache when fresh.
pub async fn champions(services: &Services) -> Result<Vec<ChampionProgress>> {
    let locale = &services.config.ddragon_locale;
    if let Some(cached) = services
        .reference_cache
        .lock()
        .ok()
        .and_then(|cache| cache.get(locale))
    {
        return Ok(cached);
    }

    let base = &services.ddragon_base;
    let versions = get_text(services, reference::versions_url(base)?).await?;
    let version = reference::parse_latest_version(&versions)?;
    let body = get_text(services, reference::champions_url(base, &version, locale)?).await?;
    let champions = reference::parse_champions(&body)?;
    log::info!(
        "Loaded {} champions for version {}, locale {}.",
        champions.len(),
        version,
        locale
    );

    if let Ok(mut cache) = services.reference_cache.lock() {
        cache.purge();
        cache.set(
            locale.clone(),
            champions.clone(),
            services.config.reference_ttl,
        );
    }
    Ok(champions)
}
