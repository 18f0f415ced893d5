//! User-owned champion checklist and its merge with a refreshed reference list.

use std::collections::HashMap;

/// Played / top-four / win flags for one champion.
///
/// The UI keeps `win ⇒ top4 ⇒ played`, but this type stores whatever it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Checklist {
    /// Played at least one Arena game.
    pub played: bool,
    /// Placed top four.
    pub top4: bool,
    /// Won (placed first).
    pub win: bool,
}

/// One champion as shown in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionProgress {
    /// Position in the alphabetical reference list, 1-based. Reassigned on every refresh.
    pub id: u32,
    /// Riot's numeric champion key, e.g. `"62"`. Missing in progress saved by old clients.
    #[serde(default)]
    pub riot_key: Option<String>,
    /// Display name, e.g. `Wukong`.
    pub name: String,
    /// Data Dragon image key, e.g. `MonkeyKing`.
    pub image: String,
    /// User progress.
    #[serde(flatten)]
    pub checklist: Checklist,
}

/// Carry checklists from `previous` onto `fresh`.
///
/// `fresh` decides membership, order, and metadata. An entry is matched by
/// [`ChampionProgress::riot_key`] when both sides have one, otherwise by display name;
/// unmatched fresh entries start with an empty checklist and previous-only entries are
/// dropped.
pub fn merge(fresh: Vec<ChampionProgress>, previous: &[ChampionProgress]) -> Vec<ChampionProgress> {
    let mut by_key = HashMap::new();
    // Name lookups for a keyed fresh entry may only hit keyless previous entries.
    let mut by_name_keyless = HashMap::new();
    let mut by_name = HashMap::new();
    for entry in previous {
        match entry.riot_key.as_deref() {
            Some(key) => {
                by_key.entry(key).or_insert(entry.checklist);
            }
            None => {
                by_name_keyless
                    .entry(entry.name.as_str())
                    .or_insert(entry.checklist);
            }
        }
        by_name.entry(entry.name.as_str()).or_insert(entry.checklist);
    }

    fresh
        .into_iter()
        .map(|entry| {
            let name = entry.name.as_str();
            let checklist = match entry.riot_key.as_deref() {
                Some(key) => by_key.get(key).or_else(|| by_name_keyless.get(name)),
                None => by_name.get(name),
            }
            .copied()
            .unwrap_or_default();
            ChampionProgress { checklist, ..entry }
        })
        .collect()
}

/// Clear every checklist. Only for an explicit user reset.
pub fn reset(progress: &mut [ChampionProgress]) {
    for entry in progress {
        entry.checklist = Checklist::default();
    }
}

/// Checklist counts over a reference list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Champions in the list.
    pub total: u32,
    /// Entries with `played`.
    pub played: u32,
    /// Entries with `top4`.
    pub top4: u32,
    /// Entries with `win`.
    pub win: u32,
}

/// Count checked flags.
pub fn summarize(progress: &[ChampionProgress]) -> ProgressSummary {
    progress
        .iter()
        .fold(ProgressSummary::default(), |mut sum, entry| {
            sum.total += 1;
            sum.played += entry.checklist.played as u32;
            sum.top4 += entry.checklist.top4 as u32;
            sum.win += entry.checklist.win as u32;
            sum
        })
}
