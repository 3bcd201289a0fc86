use std::path::PathBuf;
use sysinfo::{Pid, System};

/// Snapshot of a running process we care about.
#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cmd: Vec<String>,
    pub exe: Option<PathBuf>,
}

/// `LeagueClientUx.exe` and `LeagueClientUx` both match `LeagueClientUx`.
pub fn name_matches(process_name: &str, wanted: &str) -> bool {
    let stem = process_name
        .strip_suffix(".exe")
        .or_else(|| process_name.strip_suffix(".EXE"))
        .unwrap_or(process_name);
    stem.eq_ignore_ascii_case(wanted)
}

pub fn find_processes(names: &[&str]) -> Vec<ProcessInfo> {
    let mut sys = System::new();
    sys.refresh_processes();

    let mut found: Vec<ProcessInfo> = sys
        .processes()
        .values()
        .filter(|p| names.iter().any(|n| name_matches(p.name(), n)))
        .map(|p| ProcessInfo {
            pid: p.pid().as_u32(),
            name: p.name().to_string(),
            cmd: p.cmd().to_vec(),
            exe: p.exe().map(|e| e.to_path_buf()),
        })
        .collect();
    found.sort_by_key(|p| p.pid);
    found
}

pub fn is_running(names: &[&str]) -> bool {
    !find_processes(names).is_empty()
}

/// Kills every process matching `names`, returning how many were signalled.
pub fn kill_all(names: &[&str]) -> usize {
    let mut sys = System::new();
    sys.refresh_processes();

    let targets: Vec<Pid> = sys
        .processes()
        .values()
        .filter(|p| names.iter().any(|n| name_matches(p.name(), n)))
        .map(|p| p.pid())
        .collect();

    targets
        .into_iter()
        .filter(|pid| match sys.process(*pid) {
            Some(process) => {
                log::info!("Stopping {} (pid {})", process.name(), pid);
                process.kill()
            }
            None => false,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_with_or_without_exe_suffix() {
        assert!(name_matches("LeagueClientUx.exe", "LeagueClientUx"));
        assert!(name_matches("leagueclientux", "LeagueClientUx"));
        assert!(name_matches("Riot Client.EXE", "Riot Client"));
        assert!(!name_matches("LeagueClientUxRender.exe", "LeagueClientUx"));
    }

    #[test]
    fn unknown_process_is_not_running() {
        assert!(!is_running(&["definitely-not-a-real-process-name"]));
    }
}
