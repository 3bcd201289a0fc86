//! Starting, stopping and logging into the Riot Client.

pub mod automation;

use crate::config::Config;
use crate::error::AppError;
use crate::process;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

pub const RIOT_CLIENT_EXE: &str = "RiotClientServices.exe";

/// Processes that own the login window.
pub const LOGIN_PROCESSES: [&str; 2] = ["Riot Client", "RiotClientServices"];

/// Everything `close` shuts down.
pub const CLIENT_PROCESSES: [&str; 5] = [
    "RiotClientServices",
    "Riot Client",
    "RiotClientUx",
    "LeagueClient",
    "LeagueClientUx",
];

const INSTALL_ROOTS: [&str; 3] = [
    r"C:\Riot Games",
    r"C:\Program Files\Riot Games",
    r"C:\Program Files (x86)\Riot Games",
];

const LOGIN_FORM_TIMEOUT: Duration = Duration::from_secs(30);
const LOGIN_FORM_POLL: Duration = Duration::from_millis(500);
const STARTUP_GRACE: Duration = Duration::from_millis(800);

pub fn launch_arguments() -> [&'static str; 2] {
    ["--launch-product=league_of_legends", "--launch-patchline=live"]
}

/// Install locations to probe, most likely first.
pub fn candidate_paths(override_path: Option<&Path>, local_data: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = override_path {
        paths.push(path.to_path_buf());
    }
    for root in INSTALL_ROOTS {
        paths.push(Path::new(root).join("Riot Client").join(RIOT_CLIENT_EXE));
    }
    if let Some(local) = local_data {
        paths.push(local.join("Riot Games").join("Riot Client").join(RIOT_CLIENT_EXE));
    }
    paths
}

pub fn find_riot_client_path(config: &Config) -> Result<PathBuf, AppError> {
    let local_data = dirs::data_local_dir();
    let candidates = candidate_paths(config.riot_client_path.as_deref(), local_data.as_deref());

    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            AppError::ConfigError(format!(
                "Riot Client not found (tried {}), set RIOT_CLIENT_PATH",
                tried.join(", ")
            ))
        })
}

/// Starts the Riot Client and asks it to bring up League.
pub fn launch(path: &Path) -> Result<u32, AppError> {
    let child = Command::new(path)
        .args(launch_arguments())
        .spawn()
        .map_err(|e| AppError::Automation(format!("could not start {}: {}", path.display(), e)))?;
    log::info!("Riot Client launched from {} (pid {})", path.display(), child.id());
    Ok(child.id())
}

pub fn is_running() -> bool {
    process::is_running(&LOGIN_PROCESSES)
}

pub fn close_all() -> usize {
    process::kill_all(&CLIENT_PROCESSES)
}

/// Reuses a running client or starts one, then fills in and submits the
/// login form.
pub fn launch_and_login(config: &Config, username: &str, password: &str) -> Result<(), AppError> {
    automation::ensure_supported()?;

    let mut pids: Vec<u32> = process::find_processes(&LOGIN_PROCESSES)
        .into_iter()
        .map(|p| p.pid)
        .collect();

    if pids.is_empty() {
        let path = find_riot_client_path(config)?;
        pids.push(launch(&path)?);
        thread::sleep(STARTUP_GRACE);
    } else {
        log::info!("Riot Client already running");
    }

    log::info!("Waiting for the login form");
    let submitted = poll_until(LOGIN_FORM_TIMEOUT, LOGIN_FORM_POLL, || {
        // The UX process is spawned after the launcher; pick it up as it appears.
        for p in process::find_processes(&LOGIN_PROCESSES) {
            if !pids.contains(&p.pid) {
                pids.push(p.pid);
            }
        }
        automation::fill_login_form(&pids, username, password).map(|done| done.then_some(()))
    })?;

    match submitted {
        Some(()) => {
            log::info!("Login submitted for {}", username);
            Ok(())
        }
        None => Err(AppError::Automation(format!(
            "login form did not appear within {} seconds",
            LOGIN_FORM_TIMEOUT.as_secs()
        ))),
    }
}

/// Calls `attempt` until it yields a value, fails, or `timeout` passes.
pub fn poll_until<T, F>(timeout: Duration, interval: Duration, mut attempt: F) -> Result<Option<T>, AppError>
where
    F: FnMut() -> Result<Option<T>, AppError>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = attempt()? {
            return Ok(Some(value));
        }
        if Instant::now() + interval > deadline {
            return Ok(None);
        }
        thread::sleep(interval);
    }
}
