use crate::error::AppError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "RiotClientAutoLogin";
const API_KEY_FILE: &str = "apikey.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub default_region: String,
    pub riot_client_path: Option<PathBuf>,
    pub league_install_dir: Option<PathBuf>,
    pub passphrase: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_dir = match env::var("RIOT_AUTOLOGIN_HOME") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| {
                    AppError::ConfigError(
                        "could not determine the user config directory, set RIOT_AUTOLOGIN_HOME"
                            .to_string(),
                    )
                })?
                .join(APP_DIR_NAME),
        };

        // The environment wins over the key saved with `api-key set`.
        let api_key = non_empty_var("RIOT_API_KEY").or_else(|| read_api_key(&data_dir));

        Ok(Config {
            api_key,
            default_region: non_empty_var("RIOT_REGION").unwrap_or_else(|| "eun1".to_string()),
            riot_client_path: non_empty_var("RIOT_CLIENT_PATH").map(PathBuf::from),
            league_install_dir: non_empty_var("LEAGUE_INSTALL_DIR").map(PathBuf::from),
            passphrase: non_empty_var("RIOT_AUTOLOGIN_PASSPHRASE"),
            data_dir,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ConfigError(
                "no Riot API key available, run `api-key set <KEY>` or set RIOT_API_KEY".to_string(),
            )
        })
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join("accounts.json")
    }

    pub fn autopick_path(&self) -> PathBuf {
        self.data_dir.join("autopick_settings.json")
    }

    pub fn ddragon_cache_path(&self) -> PathBuf {
        self.data_dir.join("ddragon.json")
    }

    pub fn image_cache_dir(&self) -> PathBuf {
        self.data_dir.join("ImageCache")
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn read_api_key(data_dir: &Path) -> Option<String> {
    fs::read_to_string(data_dir.join(API_KEY_FILE))
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub fn save_api_key(data_dir: &Path, api_key: &str) -> Result<(), AppError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::ConfigError("API key must not be empty".to_string()));
    }

    fs::create_dir_all(data_dir)?;
    fs::write(data_dir.join(API_KEY_FILE), api_key)?;
    Ok(())
}

/// Shows the first and last four characters of a key.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
