//! Champion reference list, built from Data Dragon.

use std::collections::HashMap;

use url::Url;

use crate::error::{Error, Result};
use crate::progress::{Checklist, ChampionProgress};

/// `champion.json` body.
#[derive(Debug, serde::Deserialize)]
struct ChampionFile {
    data: HashMap<String, ChampionDto>,
}

/// One entry of `champion.json`'s `data` map.
#[derive(Debug, serde::Deserialize)]
struct ChampionDto {
    /// Image/asset key, e.g. `MonkeyKing`.
    id: String,
    /// Numeric champion id as a string, e.g. `"62"`.
    key: String,
    /// Display name, e.g. `Wukong`.
    name: String,
}

/// URL of the Data Dragon version list.
pub fn versions_url(base: &Url) -> Result<Url> {
    base.join("api/versions.json")
        .map_err(|e| Error::Validation(format!("Bad Data Dragon URL: {}", e)))
}

/// URL of `champion.json` for a version and locale.
pub fn champions_url(base: &Url, version: &str, locale: &str) -> Result<Url> {
    base.join(&format!("cdn/{}/data/{}/champion.json", version, locale))
        .map_err(|e| Error::Validation(format!("Bad Data Dragon URL: {}", e)))
}

/// Newest version from a `versions.json` body.
pub fn parse_latest_version(body: &str) -> Result<String> {
    let versions: Vec<String> = serde_json::from_str(body).map_err(|e| Error::Upstream {
        status: None,
        message: format!("Bad versions.json: {}", e),
    })?;
    versions.into_iter().next().ok_or_else(|| Error::Upstream {
        status: None,
        message: "Empty versions.json".to_owned(),
    })
}

/// Reference list from a `champion.json` body: sorted by display name, numbered from 1,
/// empty checklists.
pub fn parse_champions(body: &str) -> Result<Vec<ChampionProgress>> {
    let file: ChampionFile = serde_json::from_str(body).map_err(|e| Error::Upstream {
        status: None,
        message: format!("Bad champion.json: {}", e),
    })?;
    let mut champions = file.data.into_values().collect::<Vec<_>>();
    champions.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
    Ok(champions
        .into_iter()
        .zip(1..)
        .map(|(champ, id)| ChampionProgress {
            id,
            riot_key: Some(champ.key),
            name: champ.name,
            image: champ.id,
            checklist: Checklist::default(),
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    const CHAMPIONS: &str = r#"{
        "type": "champion",
        "version": "14.23.1",
        "data": {
            "MonkeyKing": { "id": "MonkeyKing", "key": "62", "name": "Wukong", "title": "the Monkey King" },
            "Aatrox": { "id": "Aatrox", "key": "266", "name": "Aatrox", "title": "the Darkin Blade" },
            "Nunu": { "id": "Nunu", "key": "20", "name": "Nunu & Willump", "title": "the Boy and His Yeti" }
        }
    }"#;

    #[test]
    fn test_parse_champions() {
        let champions = parse_champions(CHAMPIONS).unwrap();
        let rows = champions
            .iter()
            .map(|c| (c.id, c.name.as_str(), c.image.as_str(), c.riot_key.as_deref()))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (1, "Aatrox", "Aatrox", Some("266")),
                (2, "Nunu & Willump", "Nunu", Some("20")),
                (3, "Wukong", "MonkeyKing", Some("62")),
            ],
            rows
        );
        assert!(champions.iter().all(|c| c.checklist == Checklist::default()));
    }

    #[test]
    fn test_parse_latest_version() {
        assert_eq!(
            "14.23.1",
            parse_latest_version(r#"["14.23.1", "14.22.1"]"#).unwrap()
        );
        assert!(parse_latest_version("[]").is_err());
        assert!(parse_latest_version("<html>").is_err());
    }

    #[test]
    fn test_urls() {
        let base = Url::parse("https://ddragon.leagueoflegends.com/").unwrap();
        assert_eq!(
            "https://ddragon.leagueoflegends.com/api/versions.json",
            versions_url(&base).unwrap().as_str()
        );
        assert_eq!(
            "https://ddragon.leagueoflegends.com/cdn/14.23.1/data/en_US/champion.json",
            champions_url(&base, "14.23.1", "en_US").unwrap().as_str()
        );
    }
}
