use crate::error::AppError;
use crate::lcu::endpoints::{self, select_champion, select_summoner_spell};
use crate::lcu::models::{ActionKind, ChampSelectSession};
use crate::lcu::LcuApi;
use std::fmt;
use std::thread;
use std::time::Duration;

use super::settings::{AutoPickSettings, LockTiming};

/// What the tracker did during one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Spell { slot: u8, spell_id: i64, ok: bool },
    Hover { kind: ActionKind, champion_id: i64, ok: bool },
    Lock { kind: ActionKind, champion_id: i64, ok: bool },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, ok) = match self {
            Step::Spell { slot, spell_id, ok } => (format!("summoner spell {} -> {}", slot, spell_id), ok),
            Step::Hover { kind, champion_id, ok } => (format!("hover {:?} {}", kind, champion_id), ok),
            Step::Lock { kind, champion_id, ok } => (format!("lock {:?} {}", kind, champion_id), ok),
        };
        write!(f, "{}: {}", what, if *ok { "ok" } else { "rejected" })
    }
}

fn record(steps: &mut Vec<Step>, step: Step) {
    log::info!("Champion select {}", step);
    steps.push(step);
}

/// Remembers what was already done in the current champion select so that
/// every action is attempted once per session.
#[derive(Debug, Default)]
pub struct ChampSelectTracker {
    room_id: String,
    pick_done: bool,
    ban_done: bool,
    spells_done: bool,
}

impl ChampSelectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn step(
        &mut self,
        api: &impl LcuApi,
        session: &ChampSelectSession,
        settings: &AutoPickSettings,
    ) -> Result<Vec<Step>, AppError> {
        if self.room_id != session.room_id() {
            log::info!("New champion select session");
            self.reset();
            self.room_id = session.room_id().to_string();
        }

        let mut steps = Vec::new();

        if settings.auto_spells_enabled && !self.spells_done {
            for (slot, spell_id) in [(1u8, settings.summoner_spell1_id), (2, settings.summoner_spell2_id)] {
                if spell_id > 0 {
                    let ok = select_summoner_spell(api, slot, spell_id)?;
                    record(&mut steps, Step::Spell { slot, spell_id, ok });
                }
            }
            self.spells_done = true;
        }

        let Some(action) = endpoints::my_turn(session) else {
            return Ok(steps);
        };

        match action.kind() {
            ActionKind::Pick if settings.auto_pick_enabled && !self.pick_done => {
                self.pick_done = true;
                sleep_ms(settings.pick_hover_delay_ms);
                take_turn(
                    api,
                    action.id,
                    ActionKind::Pick,
                    &settings.pick_candidates(),
                    settings.pick_lock_timing(),
                    &mut steps,
                )?;
            }
            ActionKind::Ban if settings.auto_ban_enabled && !self.ban_done => {
                self.ban_done = true;
                sleep_ms(settings.ban_hover_delay_ms);
                let candidates: Vec<i64> = Some(settings.ban_champion_id).filter(|id| *id > 0).into_iter().collect();
                take_turn(
                    api,
                    action.id,
                    ActionKind::Ban,
                    &candidates,
                    settings.ban_lock_timing(),
                    &mut steps,
                )?;
            }
            _ => {}
        }

        Ok(steps)
    }
}

/// Hovers the first candidate the client accepts, then locks that one in.
fn take_turn(
    api: &impl LcuApi,
    action_id: i64,
    kind: ActionKind,
    candidates: &[i64],
    timing: LockTiming,
    steps: &mut Vec<Step>,
) -> Result<(), AppError> {
    let mut hovered = None;
    for &champion_id in candidates {
        let ok = select_champion(api, action_id, champion_id, false)?;
        record(steps, Step::Hover { kind, champion_id, ok });
        if ok {
            hovered = Some(champion_id);
            break;
        }
    }

    let Some(champion_id) = hovered else {
        return Ok(());
    };

    match timing {
        LockTiming::Never => return Ok(()),
        LockTiming::After(delay) => thread::sleep(delay),
        LockTiming::Immediately => {}
    }

    let ok = select_champion(api, action_id, champion_id, true)?;
    record(steps, Step::Lock { kind, champion_id, ok });
    Ok(())
}

fn sleep_ms(ms: u64) {
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcu::endpoints::fake::FakeLcu;
    use crate::lcu::endpoints::{champ_select_action, CHAMP_SELECT_MY_SELECTION};

    fn session(room: &str, action_type: &str, in_progress: bool) -> ChampSelectSession {
        serde_json::from_str(&format!(
            r#"{{"localPlayerCellId": 4,
                "chatDetails": {{"multiUserChatId": "{}"}},
                "actions": [[{{"id": 11, "actorCellId": 4, "type": "{}", "isInProgress": {}, "completed": false}}]]}}"#,
            room, action_type, in_progress
        ))
        .unwrap()
    }

    fn pick_settings() -> AutoPickSettings {
        AutoPickSettings {
            pick_champion_id: 103,
            secondary_champion_id: 22,
            ban_champion_id: 157,
            summoner_spell1_id: 4,
            summoner_spell2_id: 14,
            auto_pick_enabled: true,
            auto_ban_enabled: true,
            auto_spells_enabled: true,
            instant_lock: true,
            instant_ban: true,
            ..Default::default()
        }
    }

    fn accepting_lcu() -> FakeLcu {
        let lcu = FakeLcu::default();
        lcu.respond("PATCH", &champ_select_action(11), 204, "");
        lcu.respond("PATCH", CHAMP_SELECT_MY_SELECTION, 204, "");
        lcu
    }

    #[test]
    fn sets_spells_once_per_session() {
        let lcu = accepting_lcu();
        let mut tracker = ChampSelectTracker::new();
        let settings = pick_settings();
        let waiting = session("room-a", "pick", false);

        let steps = tracker.step(&lcu, &waiting, &settings).unwrap();
        assert_eq!(steps.len(), 2);
        assert!(tracker.spells_done);

        let steps = tracker.step(&lcu, &waiting, &settings).unwrap();
        assert!(steps.is_empty());
        assert_eq!(lcu.calls_to("PATCH", CHAMP_SELECT_MY_SELECTION).len(), 2);
    }

    #[test]
    fn hovers_and_locks_primary_pick() {
        let lcu = accepting_lcu();
        let mut tracker = ChampSelectTracker::new();
        let settings = AutoPickSettings {
            auto_spells_enabled: false,
            ..pick_settings()
        };

        let steps = tracker.step(&lcu, &session("room-a", "pick", true), &settings).unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Hover { kind: ActionKind::Pick, champion_id: 103, ok: true },
                Step::Lock { kind: ActionKind::Pick, champion_id: 103, ok: true },
            ]
        );
        assert!(tracker.pick_done);

        // Same session: nothing more to do.
        let again = tracker.step(&lcu, &session("room-a", "pick", true), &settings).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn falls_back_to_secondary_and_locks_it() {
        struct RejectPrimary(FakeLcu);
        impl LcuApi for RejectPrimary {
            fn request(&self, method: &str, endpoint: &str, body: Option<&str>) -> Result<crate::lcu::LcuResponse, AppError> {
                let resp = self.0.request(method, endpoint, body)?;
                if body.map_or(false, |b| b.contains("\"championId\":103")) {
                    return Ok(crate::lcu::LcuResponse { status: 500, body: String::new() });
                }
                Ok(resp)
            }
        }

        let lcu = RejectPrimary(accepting_lcu());
        let mut tracker = ChampSelectTracker::new();
        let settings = AutoPickSettings {
            auto_spells_enabled: false,
            ..pick_settings()
        };

        let steps = tracker.step(&lcu, &session("room-a", "pick", true), &settings).unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Hover { kind: ActionKind::Pick, champion_id: 103, ok: false },
                Step::Hover { kind: ActionKind::Pick, champion_id: 22, ok: true },
                Step::Lock { kind: ActionKind::Pick, champion_id: 22, ok: true },
            ]
        );
    }

    #[test]
    fn zero_lock_delay_only_hovers() {
        let lcu = accepting_lcu();
        let mut tracker = ChampSelectTracker::new();
        let settings = AutoPickSettings {
            auto_spells_enabled: false,
            instant_ban: false,
            ban_lock_delay_ms: 0,
            ..pick_settings()
        };

        let steps = tracker.step(&lcu, &session("room-a", "ban", true), &settings).unwrap();
        assert_eq!(steps, vec![Step::Hover { kind: ActionKind::Ban, champion_id: 157, ok: true }]);
        assert!(tracker.ban_done);
        assert!(!tracker.pick_done);
    }

    #[test]
    fn new_room_resets_flags() {
        let lcu = accepting_lcu();
        let mut tracker = ChampSelectTracker::new();
        let settings = AutoPickSettings {
            auto_spells_enabled: false,
            ..pick_settings()
        };

        tracker.step(&lcu, &session("room-a", "ban", true), &settings).unwrap();
        assert!(tracker.ban_done);

        tracker.step(&lcu, &session("room-b", "pick", false), &settings).unwrap();
        assert!(!tracker.ban_done);
    }

    #[test]
    fn steps_describe_themselves() {
        let step = Step::Lock { kind: ActionKind::Ban, champion_id: 157, ok: false };
        assert_eq!(step.to_string(), "lock Ban 157: rejected");
    }

    #[test]
    fn disabled_features_do_nothing() {
        let lcu = accepting_lcu();
        let mut tracker = ChampSelectTracker::new();
        let settings = AutoPickSettings::default();

        let steps = tracker.step(&lcu, &session("room-a", "pick", true), &settings).unwrap();
        assert!(steps.is_empty());
        assert!(lcu.calls.borrow().is_empty());
    }
}
