use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Champion-select automation preferences. Ids of 0 or below mean "not set".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutoPickSettings {
    pub pick_champion_id: i64,
    pub pick_champion_name: String,
    pub secondary_champion_id: i64,
    pub secondary_champion_name: String,
    pub ban_champion_id: i64,
    pub ban_champion_name: String,
    pub summoner_spell1_id: i64,
    pub summoner_spell1_name: String,
    pub summoner_spell2_id: i64,
    pub summoner_spell2_name: String,

    pub pick_hover_delay_ms: u64,
    pub pick_lock_delay_ms: u64,
    pub ban_hover_delay_ms: u64,
    pub ban_lock_delay_ms: u64,

    pub auto_accept_enabled: bool,
    pub auto_pick_enabled: bool,
    pub auto_ban_enabled: bool,
    pub auto_spells_enabled: bool,
    pub instant_lock: bool,
    pub instant_ban: bool,
}

impl Default for AutoPickSettings {
    fn default() -> Self {
        AutoPickSettings {
            pick_champion_id: 0,
            pick_champion_name: String::new(),
            secondary_champion_id: 0,
            secondary_champion_name: String::new(),
            ban_champion_id: 0,
            ban_champion_name: String::new(),
            summoner_spell1_id: 0,
            summoner_spell1_name: String::new(),
            summoner_spell2_id: 0,
            summoner_spell2_name: String::new(),
            pick_hover_delay_ms: 0,
            pick_lock_delay_ms: 1000,
            ban_hover_delay_ms: 0,
            ban_lock_delay_ms: 1000,
            auto_accept_enabled: false,
            auto_pick_enabled: false,
            auto_ban_enabled: false,
            auto_spells_enabled: false,
            instant_lock: false,
            instant_ban: false,
        }
    }
}

/// When to lock in after hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTiming {
    Immediately,
    After(Duration),
    Never,
}

impl AutoPickSettings {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::JsonError(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AutoPickSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn champ_select_enabled(&self) -> bool {
        self.auto_pick_enabled || self.auto_ban_enabled || self.auto_spells_enabled
    }

    /// Primary then secondary pick, skipping unset slots.
    pub fn pick_candidates(&self) -> Vec<i64> {
        [self.pick_champion_id, self.secondary_champion_id]
            .into_iter()
            .filter(|id| *id > 0)
            .collect()
    }

    pub fn pick_lock_timing(&self) -> LockTiming {
        lock_timing(self.instant_lock, self.pick_lock_delay_ms)
    }

    pub fn ban_lock_timing(&self) -> LockTiming {
        lock_timing(self.instant_ban, self.ban_lock_delay_ms)
    }
}

fn lock_timing(instant: bool, delay_ms: u64) -> LockTiming {
    if instant {
        LockTiming::Immediately
    } else if delay_ms > 0 {
        LockTiming::After(Duration::from_millis(delay_ms))
    } else {
        LockTiming::Never
    }
}
