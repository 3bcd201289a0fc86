//! Champion and summoner spell lists shared by the LCU and Data Dragon
//! sources, plus name lookup for the auto-pick settings.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const NONE_CHAMPION_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub id: i64,
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonerSpell {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl Champion {
    pub fn new(id: i64, name: &str) -> Self {
        Champion {
            id,
            name: name.to_string(),
            available: true,
        }
    }

    pub fn none() -> Self {
        Champion::new(NONE_CHAMPION_ID, "None")
    }
}

pub fn fallback_champions() -> Vec<Champion> {
    [
        (103, "Ahri"),
        (22, "Ashe"),
        (86, "Garen"),
        (1, "Annie"),
        (11, "Master Yi"),
        (99, "Lux"),
        (157, "Yasuo"),
        (238, "Zed"),
    ]
    .iter()
    .map(|(id, name)| Champion::new(*id, name))
    .collect()
}

pub fn fallback_spells() -> Vec<SummonerSpell> {
    [
        (4, "Flash", "Teleports your champion a short distance."),
        (14, "Ignite", "Ignites target enemy champion, dealing true damage."),
        (7, "Heal", "Restores health to your champion and an ally."),
        (12, "Teleport", "Teleports to target allied structure or minion."),
        (3, "Exhaust", "Slows an enemy champion and reduces their damage."),
        (21, "Barrier", "Shields your champion from damage."),
        (1, "Cleanse", "Removes all disables and summoner spell debuffs."),
        (11, "Smite", "Deals true damage to target monster or minion."),
    ]
    .iter()
    .map(|(id, name, description)| SummonerSpell {
        id: *id,
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

/// Puts "None" first and sorts the rest by name.
pub fn with_none_entry(mut champions: Vec<Champion>) -> Vec<Champion> {
    champions.retain(|c| c.id != NONE_CHAMPION_ID);
    champions.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    champions.insert(0, Champion::none());
    champions
}

fn simplify(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Accepts a numeric id or a name, ignoring case, spaces and punctuation
/// (`"kaisa"` finds `Kai'Sa`).
pub fn resolve_champion<'a>(champions: &'a [Champion], query: &str) -> Result<&'a Champion, AppError> {
    let query = query.trim();
    if let Ok(id) = query.parse::<i64>() {
        if let Some(c) = champions.iter().find(|c| c.id == id) {
            return Ok(c);
        }
    }

    let wanted = simplify(query);
    champions
        .iter()
        .find(|c| simplify(&c.name) == wanted)
        .ok_or_else(|| AppError::UnknownChampion(query.to_string()))
}

pub fn resolve_spell<'a>(spells: &'a [SummonerSpell], query: &str) -> Result<&'a SummonerSpell, AppError> {
    let query = query.trim();
    if let Ok(id) = query.parse::<i64>() {
        if let Some(s) = spells.iter().find(|s| s.id == id) {
            return Ok(s);
        }
    }

    let wanted = simplify(query);
    spells
        .iter()
        .find(|s| simplify(&s.name) == wanted)
        .ok_or_else(|| AppError::UnknownSpell(query.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_champion_by_loose_name_or_id() {
        let mut champions = fallback_champions();
        champions.push(Champion::new(145, "Kai'Sa"));

        assert_eq!(resolve_champion(&champions, "kaisa").unwrap().id, 145);
        assert_eq!(resolve_champion(&champions, "master yi").unwrap().id, 11);
        assert_eq!(resolve_champion(&champions, "103").unwrap().name, "Ahri");
        assert!(matches!(
            resolve_champion(&champions, "Teemo"),
            Err(AppError::UnknownChampion(_))
        ));
    }

    #[test]
    fn resolves_spells() {
        let spells = fallback_spells();
        assert_eq!(resolve_spell(&spells, "flash").unwrap().id, 4);
        assert_eq!(resolve_spell(&spells, "14").unwrap().name, "Ignite");
        assert!(resolve_spell(&spells, "Ghost").is_err());
    }

    #[test]
    fn none_entry_leads_sorted_list() {
        let list = with_none_entry(vec![
            Champion::new(238, "Zed"),
            Champion::none(),
            Champion::new(103, "Ahri"),
        ]);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["None", "Ahri", "Zed"]);
    }
}
