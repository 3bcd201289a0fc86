//! Data Dragon: champion list, icon URLs and the on-disk icon cache.

use crate::cache::DataDragonCache;
use crate::catalog::{self, Champion, SummonerSpell};
use crate::error::AppError;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DDRAGON_URL: &str = "https://ddragon.leagueoflegends.com";
pub const FALLBACK_VERSION: &str = "14.1.1";
const CACHE_MAX_AGE_MINS: u64 = 24 * 60;
const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub enum DDragonEndpoint<'a> {
    Versions,
    Champions(&'a str),
    ChampionIcon(&'a str, &'a str),
    SpellIcon(&'a str, &'a str),
}

impl DDragonEndpoint<'_> {
    pub fn url(&self) -> String {
        match self {
            DDragonEndpoint::Versions => format!("{}/api/versions.json", DDRAGON_URL),
            DDragonEndpoint::Champions(version) => {
                format!("{}/cdn/{}/data/en_US/champion.json", DDRAGON_URL, version)
            }
            DDragonEndpoint::ChampionIcon(version, name) => format!(
                "{}/cdn/{}/img/champion/{}.png",
                DDRAGON_URL,
                version,
                normalize_champion_name(name)
            ),
            DDragonEndpoint::SpellIcon(version, name) => format!(
                "{}/cdn/{}/img/spell/{}.png",
                DDRAGON_URL,
                version,
                normalize_spell_name(name)
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChampionFile {
    #[serde(default)]
    data: HashMap<String, ChampionEntry>,
}

#[derive(Debug, Deserialize)]
struct ChampionEntry {
    #[serde(default)]
    key: String,
    #[serde(default)]
    name: String,
}

/// Champion ids and display names from `champion.json`, sorted by name.
pub fn parse_champion_list(json: &str) -> Result<Vec<Champion>, AppError> {
    let file: ChampionFile = serde_json::from_str(json)?;
    let mut champions: Vec<Champion> = file
        .data
        .into_values()
        .filter(|c| !c.name.is_empty())
        .filter_map(|c| c.key.parse::<i64>().ok().map(|id| Champion::new(id, &c.name)))
        .collect();
    champions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(champions)
}

/// Display name to the id Data Dragon uses in file names.
pub fn normalize_champion_name(name: &str) -> String {
    match name {
        "" | "None" => name.to_string(),
        "Nunu & Willump" => "Nunu".to_string(),
        "Wukong" => "MonkeyKing".to_string(),
        "Renata Glasc" => "Renata".to_string(),
        "Vel'Koz" => "Velkoz".to_string(),
        "Cho'Gath" => "Chogath".to_string(),
        "Kai'Sa" => "Kaisa".to_string(),
        "Kha'Zix" => "Khazix".to_string(),
        "LeBlanc" => "Leblanc".to_string(),
        _ => name
            .chars()
            .filter(|c| !matches!(c, ' ' | '\'' | '.' | ':'))
            .collect(),
    }
}

pub fn normalize_spell_name(name: &str) -> String {
    let mapped = match name {
        "" => return String::new(),
        "Flash" => "SummonerFlash",
        "Ignite" => "SummonerDot",
        "Heal" => "SummonerHeal",
        "Teleport" => "SummonerTeleport",
        "Exhaust" => "SummonerExhaust",
        "Barrier" => "SummonerBarrier",
        "Cleanse" => "SummonerBoost",
        "Smite" => "SummonerSmite",
        "Ghost" => "SummonerHaste",
        "Clarity" => "SummonerMana",
        "Mark" => "SummonerSnowball",
        other => return format!("Summoner{}", other.replace(' ', "")),
    };
    mapped.to_string()
}

/// File name for a cached download: URL-safe base64 of the URL plus its
/// extension (`.png` when the URL has none or it looks wrong).
pub fn cache_file_name(url: &str) -> String {
    let encoded = URL_SAFE.encode(url.as_bytes());
    let extension = match (url.rfind('.'), url.rfind('/')) {
        (Some(dot), Some(slash)) if dot > slash => &url[dot..],
        (Some(dot), None) => &url[dot..],
        _ => ".png",
    };
    let extension = if extension.len() > 5 { ".png" } else { extension };
    format!("{}{}", encoded, extension)
}

pub struct DataDragon {
    agent: ureq::Agent,
    image_dir: PathBuf,
}

impl DataDragon {
    pub fn new(image_dir: &Path) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("riot_autologin/", env!("CARGO_PKG_VERSION")))
            .build();

        DataDragon {
            agent,
            image_dir: image_dir.to_path_buf(),
        }
    }

    fn get_string(&self, url: &str) -> Result<String, AppError> {
        self.agent
            .get(url)
            .call()
            .map_err(|e| AppError::HttpError(format!("{}: {}", url, e)))?
            .into_string()
            .map_err(|e| AppError::HttpError(format!("Failed to read response: {}", e)))
    }

    /// Newest game version, or a known-good one when Data Dragon is down.
    pub fn latest_version(&self) -> String {
        let versions = self
            .get_string(&DDragonEndpoint::Versions.url())
            .and_then(|body| serde_json::from_str::<Vec<String>>(&body).map_err(AppError::from));

        match versions {
            Ok(list) if !list.is_empty() => list[0].clone(),
            Ok(_) => FALLBACK_VERSION.to_string(),
            Err(e) => {
                log::warn!("Could not fetch Data Dragon versions: {}", e);
                FALLBACK_VERSION.to_string()
            }
        }
    }

    pub fn all_champions(&self, version: &str) -> Result<Vec<Champion>, AppError> {
        let body = self.get_string(&DDragonEndpoint::Champions(version).url())?;
        parse_champion_list(&body)
    }

    /// Champion list from the cache when fresh, otherwise from Data Dragon.
    /// Falls back to a stale cache, then the built-in list, when offline.
    pub fn champions(&self, cache_path: &Path) -> Vec<Champion> {
        let cached = DataDragonCache::load(cache_path).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable champion cache: {}", e);
            None
        });

        if let Some(cache) = &cached {
            if !cache.is_stale(CACHE_MAX_AGE_MINS) && !cache.champions.is_empty() {
                return cache.champions.clone();
            }
        }

        let version = self.latest_version();
        match self.all_champions(&version) {
            Ok(champions) if !champions.is_empty() => {
                let mut cache = cached
                    .unwrap_or_else(|| DataDragonCache::new(cache_path, &version, Vec::new()));
                cache.replace(&version, champions.clone());
                if let Err(e) = cache.save() {
                    log::warn!("Could not save champion cache: {}", e);
                }
                champions
            }
            Ok(_) | Err(_) => match cached {
                Some(cache) if !cache.champions.is_empty() => {
                    log::info!("Using cached champion list from {}", cache.version);
                    cache.champions
                }
                _ => {
                    log::info!("Using built-in champion list");
                    catalog::fallback_champions()
                }
            },
        }
    }

    pub fn cached_image_path(&self, url: &str) -> PathBuf {
        self.image_dir.join(cache_file_name(url))
    }

    /// Downloads `url` into the image cache unless it is already there.
    pub fn cache_image(&self, url: &str) -> Result<PathBuf, AppError> {
        let path = self.cached_image_path(url);
        if path.is_file() {
            return Ok(path);
        }

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| AppError::HttpError(format!("{}: {}", url, e)))?;

        let bytes = read_image(response.into_reader(), MAX_IMAGE_BYTES)
            .map_err(|e| AppError::HttpError(format!("{}: {}", url, e)))?;

        fs::create_dir_all(&self.image_dir)?;
        fs::write(&path, &bytes)?;
        Ok(path)
    }

    /// Warms the image cache with every champion and spell icon.
    /// Returns how many downloads failed.
    pub fn prefetch(&self, version: &str, champions: &[Champion], spells: &[SummonerSpell]) -> usize {
        let urls: Vec<String> = champions
            .iter()
            .filter(|c| c.id != catalog::NONE_CHAMPION_ID)
            .map(|c| DDragonEndpoint::ChampionIcon(version, &c.name).url())
            .chain(spells.iter().map(|s| DDragonEndpoint::SpellIcon(version, &s.name).url()))
            .collect();

        let pb = ProgressBar::new(urls.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut failed = 0;
        for url in &urls {
            if let Err(e) = self.cache_image(url) {
                log::debug!("Image download failed: {}", e);
                failed += 1;
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");
        failed
    }
}

/// Reads a whole image body. Empty or oversized bodies are refused so a
/// partial file never lands in the cache.
fn read_image(reader: impl Read, limit: u64) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| format!("Failed to read image: {}", e))?;

    if bytes.is_empty() {
        return Err("empty image body".to_string());
    }
    if bytes.len() as u64 > limit {
        return Err(format!("image larger than {} bytes", limit));
    }
    Ok(bytes)
}
