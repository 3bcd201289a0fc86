//! Background polling of the League client: ready-check auto-accept and
//! champion-select automation, each on its own thread.

use crate::autopick::champ_select::ChampSelectTracker;
use crate::autopick::settings::AutoPickSettings;
use crate::error::AppError;
use crate::lcu::client::LcuClient;
use crate::lcu::endpoints::{self, PHASE_CHAMP_SELECT, PHASE_READY_CHECK};
use crate::lcu::LcuApi;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const IDLE_DELAY: Duration = Duration::from_secs(2);
const FAST_DELAY: Duration = Duration::from_secs(1);
const CHAMP_SELECT_DELAY: Duration = Duration::from_millis(500);

/// Phases where nothing can need accepting soon.
const SLOW_PHASES: [&str; 7] = [
    "Lobby",
    "Matchmaking",
    "ChampSelect",
    "InProgress",
    "WaitingForStats",
    "PreEndOfGame",
    "EndOfGame",
];

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub auto_accept: bool,
    pub champ_select: bool,
    pub install_dir: Option<PathBuf>,
    /// Re-read at the start of every champion select.
    pub settings_path: Option<PathBuf>,
}

pub struct Monitor {
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl Monitor {
    pub fn start(options: MonitorOptions, settings: AutoPickSettings) -> Result<Self, AppError> {
        let stop = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::new();

        if options.auto_accept {
            let stop = stop.clone();
            let install_dir = options.install_dir.clone();
            handles.push(spawn("auto-accept", move || {
                run_loop(
                    &stop,
                    || LcuClient::connect(install_dir.as_deref()),
                    |api: &LcuClient| accept_tick(api),
                )
            })?);
        }

        if options.champ_select {
            let stop = stop.clone();
            let install_dir = options.install_dir.clone();
            let settings_path = options.settings_path.clone();
            let mut watcher = ChampSelectWatcher::new(settings, settings_path);
            handles.push(spawn("champ-select", move || {
                run_loop(
                    &stop,
                    || LcuClient::connect(install_dir.as_deref()),
                    |api: &LcuClient| watcher.tick(api),
                )
            })?);
        }

        Ok(Monitor { stop, handles })
    }

    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        self.join();
    }

    pub fn join(self) {
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("monitor").to_string();
            if handle.join().is_err() {
                log::error!("{} thread panicked", name);
            }
        }
    }
}

fn spawn<F>(name: &str, f: F) -> Result<JoinHandle<()>, AppError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(|e| AppError::LcuError(format!("could not start {} thread: {}", name, e)))
}

/// Keeps a connection, runs `tick` and sleeps for whatever it returns.
/// A failed tick drops the connection so the next round rediscovers it.
fn run_loop<A, C, T>(stop: &AtomicBool, connect: C, mut tick: T)
where
    A: LcuApi,
    C: Fn() -> Result<A, AppError>,
    T: FnMut(&A) -> Result<Duration, AppError>,
{
    log::info!("{} monitor started", current_thread_name());
    let mut connection: Option<A> = None;

    while !stop.load(Ordering::SeqCst) {
        if connection.is_none() {
            match connect() {
                Ok(api) => connection = Some(api),
                Err(AppError::LcuNotRunning) => {
                    sleep_unless_stopped(stop, IDLE_DELAY);
                    continue;
                }
                Err(e) => {
                    log::warn!("Could not connect to League client: {}", e);
                    sleep_unless_stopped(stop, IDLE_DELAY);
                    continue;
                }
            }
        }

        let delay = match connection.as_ref().map(&mut tick) {
            Some(Ok(delay)) => delay,
            Some(Err(e)) => {
                log::warn!("Lost League client connection: {}", e);
                connection = None;
                IDLE_DELAY
            }
            None => IDLE_DELAY,
        };
        sleep_unless_stopped(stop, delay);
    }

    log::info!("{} monitor stopped", current_thread_name());
}

fn current_thread_name() -> String {
    thread::current().name().unwrap_or("monitor").to_string()
}

fn sleep_unless_stopped(stop: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}

/// One auto-accept poll; returns the delay before the next one.
pub fn accept_tick(api: &impl LcuApi) -> Result<Duration, AppError> {
    let Some(phase) = endpoints::session_phase(api)? else {
        return Ok(IDLE_DELAY);
    };

    if phase == PHASE_READY_CHECK {
        if endpoints::accept_ready_check(api)? {
            log::info!("Match accepted");
        } else {
            log::warn!("Ready check accept was rejected");
        }
    }

    Ok(if SLOW_PHASES.contains(&phase.as_str()) {
        IDLE_DELAY
    } else {
        FAST_DELAY
    })
}

pub struct ChampSelectWatcher {
    tracker: ChampSelectTracker,
    settings: AutoPickSettings,
    settings_path: Option<PathBuf>,
    in_champ_select: bool,
}

impl ChampSelectWatcher {
    pub fn new(settings: AutoPickSettings, settings_path: Option<PathBuf>) -> Self {
        ChampSelectWatcher {
            tracker: ChampSelectTracker::new(),
            settings,
            settings_path,
            in_champ_select: false,
        }
    }

    /// One champion-select poll; returns the delay before the next one.
    pub fn tick(&mut self, api: &impl LcuApi) -> Result<Duration, AppError> {
        if endpoints::gameflow_phase(api)? != PHASE_CHAMP_SELECT {
            if self.in_champ_select {
                log::debug!("Left champion select");
            }
            self.in_champ_select = false;
            self.tracker.reset();
            return Ok(IDLE_DELAY);
        }

        if !self.in_champ_select {
            self.in_champ_select = true;
            self.reload_settings();
        }

        if let Some(session) = endpoints::champ_select_session(api)? {
            self.tracker.step(api, &session, &self.settings)?;
        }
        Ok(CHAMP_SELECT_DELAY)
    }

    fn reload_settings(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        match AutoPickSettings::load(path) {
            Ok(settings) => self.settings = settings,
            Err(e) => log::warn!("Keeping previous auto-pick settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcu::endpoints::fake::FakeLcu;
    use crate::lcu::endpoints::{
        champ_select_action, CHAMP_SELECT_SESSION, GAMEFLOW_SESSION, READY_CHECK_ACCEPT,
    };
    use std::cell::Cell;

    #[test]
    fn accepts_ready_check() {
        let lcu = FakeLcu::default();
        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"ReadyCheck"}"#);
        lcu.respond("POST", READY_CHECK_ACCEPT, 204, "");

        assert_eq!(accept_tick(&lcu).unwrap(), FAST_DELAY);
        assert_eq!(lcu.calls_to("POST", READY_CHECK_ACCEPT).len(), 1);
    }

    #[test]
    fn slow_phases_back_off_without_accepting() {
        let lcu = FakeLcu::default();
        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"Matchmaking"}"#);

        assert_eq!(accept_tick(&lcu).unwrap(), IDLE_DELAY);
        assert!(lcu.calls_to("POST", READY_CHECK_ACCEPT).is_empty());
    }

    #[test]
    fn no_gameflow_session_backs_off() {
        let lcu = FakeLcu::default();

        assert_eq!(accept_tick(&lcu).unwrap(), IDLE_DELAY);
        assert!(lcu.calls_to("POST", READY_CHECK_ACCEPT).is_empty());
    }

    #[test]
    fn watcher_picks_in_champ_select_and_resets_outside() {
        let lcu = FakeLcu::default();
        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"ChampSelect"}"#);
        lcu.respond(
            "GET",
            CHAMP_SELECT_SESSION,
            200,
            r#"{"localPlayerCellId":0,"chatDetails":{"multiUserChatId":"r1"},
                "actions":[[{"id":5,"actorCellId":0,"type":"pick","isInProgress":true,"completed":false}]]}"#,
        );
        lcu.respond("PATCH", &champ_select_action(5), 204, "");

        let settings = AutoPickSettings {
            pick_champion_id: 99,
            auto_pick_enabled: true,
            instant_lock: true,
            ..Default::default()
        };
        let mut watcher = ChampSelectWatcher::new(settings, None);

        assert_eq!(watcher.tick(&lcu).unwrap(), CHAMP_SELECT_DELAY);
        assert_eq!(lcu.calls_to("PATCH", &champ_select_action(5)).len(), 2);

        // Same session: already picked.
        watcher.tick(&lcu).unwrap();
        assert_eq!(lcu.calls_to("PATCH", &champ_select_action(5)).len(), 2);

        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"InProgress"}"#);
        assert_eq!(watcher.tick(&lcu).unwrap(), IDLE_DELAY);

        // Back in champ select with the same room id: the reset allows another pick.
        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"ChampSelect"}"#);
        watcher.tick(&lcu).unwrap();
        assert_eq!(lcu.calls_to("PATCH", &champ_select_action(5)).len(), 4);
    }

    #[test]
    fn watcher_reloads_settings_on_entering_champ_select() {
        let path = std::env::temp_dir()
            .join(format!("riot_autologin_monitor_{}", std::process::id()))
            .join("autopick_settings.json");
        AutoPickSettings {
            ban_champion_id: 157,
            ..Default::default()
        }
        .save(&path)
        .unwrap();

        let lcu = FakeLcu::default();
        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"ChampSelect"}"#);
        let mut watcher = ChampSelectWatcher::new(AutoPickSettings::default(), Some(path.clone()));
        watcher.tick(&lcu).unwrap();
        assert_eq!(watcher.settings.ban_champion_id, 157);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn stop_ends_threads_without_a_client() {
        let dir = std::env::temp_dir().join(format!("riot_autologin_no_client_{}", std::process::id()));
        let monitor = Monitor::start(
            MonitorOptions {
                auto_accept: true,
                champ_select: true,
                install_dir: Some(dir),
                settings_path: None,
            },
            AutoPickSettings::default(),
        )
        .unwrap();
        assert_eq!(monitor.handles.len(), 2);
        monitor.stop();
    }

    #[test]
    fn loop_reconnects_after_failure_and_honours_stop() {
        let stop = AtomicBool::new(false);
        let connects = Cell::new(0);
        let ticks = Cell::new(0);

        run_loop(
            &stop,
            || {
                connects.set(connects.get() + 1);
                Ok(FakeLcu::default())
            },
            |_api: &FakeLcu| {
                ticks.set(ticks.get() + 1);
                if ticks.get() >= 2 {
                    stop.store(true, Ordering::SeqCst);
                    return Ok(Duration::ZERO);
                }
                Err(AppError::LcuError("connection reset".to_string()))
            },
        );

        assert_eq!(ticks.get(), 2);
        assert_eq!(connects.get(), 2);
    }
}
