use crate::error::AppError;
use crate::process::{self, ProcessInfo};
use base64::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub const LEAGUE_UX_PROCESS: &str = "LeagueClientUx";

static APP_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"--app-port="?(\d+)"?"#).expect("app port pattern is valid"));
static AUTH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"--remoting-auth-token=([a-zA-Z0-9_-]+)").expect("auth token pattern is valid")
});
static INSTALL_DIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"--install-directory=("[^"]+"|\S+)"#).expect("install dir pattern is valid")
});

const DEFAULT_INSTALL_DIRS: [&str; 3] = [
    r"C:\Riot Games\League of Legends",
    r"C:\Program Files\Riot Games\League of Legends",
    r"C:\Program Files (x86)\Riot Games\League of Legends",
];

#[derive(Debug, Clone, PartialEq)]
pub struct LcuCredentials {
    pub port: u16,
    pub token: String,
    pub pid: Option<u32>,
}

impl LcuCredentials {
    pub fn basic_auth(&self) -> String {
        format!("Basic {}", BASE64_STANDARD.encode(format!("riot:{}", self.token)))
    }

    /// Reads `--app-port` and `--remoting-auth-token` from a client command line.
    pub fn from_command_line(args: &[String]) -> Option<Self> {
        let joined = args.join(" ");
        let port = APP_PORT.captures(&joined)?[1].parse::<u16>().ok()?;
        let token = AUTH_TOKEN.captures(&joined)?[1].to_string();
        Some(LcuCredentials { port, token, pid: None })
    }

    /// Parses `name:pid:port:password:protocol`.
    pub fn from_lockfile(content: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = content.trim().splitn(5, ':').collect();
        if parts.len() < 5 {
            return Err(AppError::LcuError("lockfile is incomplete".to_string()));
        }

        let port = parts[2]
            .parse::<u16>()
            .map_err(|_| AppError::LcuError(format!("invalid lockfile port '{}'", parts[2])))?;
        Ok(LcuCredentials {
            port,
            token: parts[3].to_string(),
            pid: parts[1].parse().ok(),
        })
    }
}

/// Finds the running client: process command line first, lockfile second.
pub fn discover(install_dir: Option<&Path>) -> Result<LcuCredentials, AppError> {
    let processes = process::find_processes(&[LEAGUE_UX_PROCESS]);

    for ux in &processes {
        if let Some(mut credentials) = LcuCredentials::from_command_line(&ux.cmd) {
            credentials.pid = Some(ux.pid);
            log::debug!("LCU credentials from {} (pid {})", ux.name, ux.pid);
            return Ok(credentials);
        }
    }

    for dir in lockfile_dirs(install_dir, &processes) {
        let path = dir.join("lockfile");
        match fs::read_to_string(&path) {
            // The client creates the file before writing to it.
            Ok(content) if !content.trim().is_empty() => {
                log::debug!("LCU credentials from {}", path.display());
                return LcuCredentials::from_lockfile(&content);
            }
            _ => continue,
        }
    }

    Err(AppError::LcuNotRunning)
}

fn lockfile_dirs(install_dir: Option<&Path>, processes: &[ProcessInfo]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(dir) = install_dir {
        dirs.push(dir.to_path_buf());
    }

    for ux in processes {
        let joined = ux.cmd.join(" ");
        if let Some(caps) = INSTALL_DIR.captures(&joined) {
            dirs.push(PathBuf::from(caps[1].trim_matches('"')));
        }
        if let Some(parent) = ux.exe.as_deref().and_then(Path::parent) {
            dirs.push(parent.to_path_buf());
        }
    }

    dirs.extend(DEFAULT_INSTALL_DIRS.iter().map(PathBuf::from));
    dirs.dedup();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_command_line_arguments() {
        let creds = LcuCredentials::from_command_line(&args(
            r#""C:/Riot Games/League of Legends/LeagueClientUx.exe" "--riotclient-auth-token=abc" "--app-port=54321" "--remoting-auth-token=Xy_9-z""#,
        ))
        .unwrap();
        assert_eq!(creds.port, 54321);
        assert_eq!(creds.token, "Xy_9-z");
    }

    #[test]
    fn command_line_without_token_is_ignored() {
        assert!(LcuCredentials::from_command_line(&args("--app-port=54321")).is_none());
    }

    #[test]
    fn parses_lockfile() {
        let creds = LcuCredentials::from_lockfile("LeagueClient:1234:60123:s3cr3t:https\n").unwrap();
        assert_eq!(creds.port, 60123);
        assert_eq!(creds.token, "s3cr3t");
        assert_eq!(creds.pid, Some(1234));
    }

    #[test]
    fn rejects_short_lockfile() {
        assert!(LcuCredentials::from_lockfile("LeagueClient:1234").is_err());
        assert!(LcuCredentials::from_lockfile("LeagueClient:1234:port:x:https").is_err());
    }

    #[test]
    fn basic_auth_uses_riot_user() {
        let creds = LcuCredentials {
            port: 1,
            token: "token".to_string(),
            pid: None,
        };
        assert_eq!(creds.basic_auth(), "Basic cmlvdDp0b2tlbg==");
    }

    #[test]
    fn reads_lockfile_from_configured_dir() {
        let dir = std::env::temp_dir().join(format!("riot_autologin_lockfile_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("lockfile"), "LeagueClient:1:60000:tok:https").unwrap();

        // Only valid when no real client is running on the test machine.
        if process::find_processes(&[LEAGUE_UX_PROCESS]).is_empty() {
            let creds = discover(Some(&dir)).unwrap();
            assert_eq!(creds.port, 60000);
            assert_eq!(creds.token, "tok");
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
