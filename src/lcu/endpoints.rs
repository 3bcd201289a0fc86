use crate::catalog::{self, Champion, SummonerSpell};
use crate::error::AppError;
use serde_json::json;

use super::models::*;
use super::LcuApi;

pub const GAMEFLOW_SESSION: &str = "/lol-gameflow/v1/session";
pub const READY_CHECK_ACCEPT: &str = "/lol-matchmaking/v1/ready-check/accept";
pub const CHAMP_SELECT_SESSION: &str = "/lol-champ-select/v1/session";
pub const CHAMP_SELECT_MY_SELECTION: &str = "/lol-champ-select/v1/session/my-selection";
pub const CURRENT_SUMMONER: &str = "/lol-summoner/v1/current-summoner";
pub const OWNED_CHAMPIONS: &str = "/lol-champions/v1/owned-champions-minimal";
pub const SUMMONER_SPELLS: &str = "/lol-game-data/assets/v1/summoner-spells.json";

pub const PHASE_NONE: &str = "None";
pub const PHASE_READY_CHECK: &str = "ReadyCheck";
pub const PHASE_CHAMP_SELECT: &str = "ChampSelect";

pub fn champ_select_action(action_id: i64) -> String {
    format!("/lol-champ-select/v1/session/actions/{}", action_id)
}

/// Gameflow phase, or `None` when the client answers without a session.
pub fn session_phase(api: &impl LcuApi) -> Result<Option<String>, AppError> {
    let resp = api.request("GET", GAMEFLOW_SESSION, None)?;
    if !resp.is_success() {
        return Ok(None);
    }

    let phase = resp
        .json::<GameflowSession>()
        .ok()
        .and_then(|s| s.phase)
        .unwrap_or_else(|| PHASE_NONE.to_string());
    Ok(Some(phase))
}

/// Current gameflow phase, `"None"` when there is no session.
pub fn gameflow_phase(api: &impl LcuApi) -> Result<String, AppError> {
    Ok(session_phase(api)?.unwrap_or_else(|| PHASE_NONE.to_string()))
}

pub fn accept_ready_check(api: &impl LcuApi) -> Result<bool, AppError> {
    Ok(api.request("POST", READY_CHECK_ACCEPT, None)?.is_success())
}

/// `None` outside champion select.
pub fn champ_select_session(api: &impl LcuApi) -> Result<Option<ChampSelectSession>, AppError> {
    let resp = api.request("GET", CHAMP_SELECT_SESSION, None)?;
    if !resp.is_success() {
        return Ok(None);
    }
    resp.json().map(Some)
}

pub fn current_summoner(api: &impl LcuApi) -> Result<CurrentSummoner, AppError> {
    let resp = api.request("GET", CURRENT_SUMMONER, None)?;
    if !resp.is_success() {
        return Err(AppError::LcuError(format!(
            "current summoner unavailable (status {})",
            resp.status
        )));
    }
    resp.json()
}

/// Hovers (`complete == false`) or locks in a champion for an action.
pub fn select_champion(
    api: &impl LcuApi,
    action_id: i64,
    champion_id: i64,
    complete: bool,
) -> Result<bool, AppError> {
    let body = json!({ "championId": champion_id, "completed": complete }).to_string();
    let resp = api.request("PATCH", &champ_select_action(action_id), Some(&body))?;
    Ok(resp.is_success())
}

/// `slot` is 1 or 2.
pub fn select_summoner_spell(api: &impl LcuApi, slot: u8, spell_id: i64) -> Result<bool, AppError> {
    let field = if slot == 1 { "spell1Id" } else { "spell2Id" };
    let mut selection = serde_json::Map::new();
    selection.insert(field.to_string(), json!(spell_id));
    let body = serde_json::Value::Object(selection).to_string();
    let resp = api.request("PATCH", CHAMP_SELECT_MY_SELECTION, Some(&body))?;
    Ok(resp.is_success())
}

/// The in-progress, uncompleted action belonging to the local player's cell.
pub fn my_turn(session: &ChampSelectSession) -> Option<&ChampSelectAction> {
    session
        .actions
        .iter()
        .flatten()
        .find(|a| a.actor_cell_id == session.local_player_cell_id && a.is_in_progress && !a.completed)
}

/// Champions the logged-in summoner can play, "None" first.
pub fn owned_champions(api: &impl LcuApi) -> Result<Vec<Champion>, AppError> {
    let resp = api.request("GET", OWNED_CHAMPIONS, None)?;
    if !resp.is_success() {
        return Err(AppError::LcuError(format!(
            "owned champions unavailable (status {})",
            resp.status
        )));
    }

    let owned: Vec<OwnedChampion> = resp.json()?;
    let champions = owned
        .into_iter()
        .filter(|c| !c.name.is_empty())
        .map(|c| Champion {
            id: c.id,
            available: c.ownership.map(|o| o.owned).unwrap_or(false),
            name: c.name,
        })
        .collect();
    Ok(catalog::with_none_entry(champions))
}

/// Spell list from the client's game data, or the built-in list.
pub fn summoner_spells(api: &impl LcuApi) -> Vec<SummonerSpell> {
    let spells = api
        .request("GET", SUMMONER_SPELLS, None)
        .ok()
        .filter(|r| r.is_success())
        .and_then(|r| r.json::<Vec<SpellAsset>>().ok())
        .map(|assets| {
            assets
                .into_iter()
                .filter(|s| !s.name.is_empty())
                .map(|s| SummonerSpell {
                    id: s.id,
                    name: s.name,
                    description: s.description,
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if spells.is_empty() {
        log::debug!("Using built-in summoner spell list");
        catalog::fallback_spells()
    } else {
        spells
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeLcu;
    use super::*;

    #[test]
    fn phase_defaults_to_none() {
        let lcu = FakeLcu::default();
        assert_eq!(gameflow_phase(&lcu).unwrap(), "None");

        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"ReadyCheck","map":{}}"#);
        assert_eq!(gameflow_phase(&lcu).unwrap(), "ReadyCheck");

        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"gameData":{}}"#);
        assert_eq!(gameflow_phase(&lcu).unwrap(), "None");
    }

    #[test]
    fn missing_session_is_told_apart_from_phase_none() {
        let lcu = FakeLcu::default();
        assert_eq!(session_phase(&lcu).unwrap(), None);

        lcu.respond("GET", GAMEFLOW_SESSION, 200, r#"{"phase":"None"}"#);
        assert_eq!(session_phase(&lcu).unwrap().as_deref(), Some(PHASE_NONE));
    }

    #[test]
    fn transport_failure_is_an_error() {
        let lcu = FakeLcu {
            offline: true,
            ..Default::default()
        };
        assert!(gameflow_phase(&lcu).is_err());
    }

    #[test]
    fn select_champion_sends_patch_body() {
        let lcu = FakeLcu::default();
        lcu.respond("PATCH", &champ_select_action(7), 204, "");
        assert!(select_champion(&lcu, 7, 103, true).unwrap());

        let bodies = lcu.calls_to("PATCH", "/lol-champ-select/v1/session/actions/7");
        let sent: serde_json::Value = serde_json::from_str(bodies[0].as_deref().unwrap()).unwrap();
        assert_eq!(sent["championId"], 103);
        assert_eq!(sent["completed"], true);
    }

    #[test]
    fn spell_slot_picks_field() {
        let lcu = FakeLcu::default();
        lcu.respond("PATCH", CHAMP_SELECT_MY_SELECTION, 204, "");
        select_summoner_spell(&lcu, 2, 4).unwrap();
        let body = lcu.calls_to("PATCH", CHAMP_SELECT_MY_SELECTION)[0].clone().unwrap();
        assert_eq!(body, r#"{"spell2Id":4}"#);
    }

    #[test]
    fn my_turn_requires_own_in_progress_action() {
        let session: ChampSelectSession = serde_json::from_str(
            r#"{"localPlayerCellId": 3, "actions": [
                [{"id": 1, "actorCellId": 3, "type": "ban", "isInProgress": false, "completed": true}],
                [{"id": 2, "actorCellId": 1, "type": "pick", "isInProgress": true, "completed": false},
                 {"id": 3, "actorCellId": 3, "type": "pick", "isInProgress": true, "completed": false}]
            ]}"#,
        )
        .unwrap();
        assert_eq!(my_turn(&session).map(|a| a.id), Some(3));

        let waiting: ChampSelectSession = serde_json::from_str(
            r#"{"localPlayerCellId": 3, "actions": [[{"id": 2, "actorCellId": 1, "type": "pick", "isInProgress": true}]]}"#,
        )
        .unwrap();
        assert!(my_turn(&waiting).is_none());
    }

    #[test]
    fn owned_champions_are_sorted_with_none_first() {
        let lcu = FakeLcu::default();
        lcu.respond(
            "GET",
            OWNED_CHAMPIONS,
            200,
            r#"[{"id":238,"name":"Zed","ownership":{"owned":true}},
                {"id":103,"name":"Ahri","ownership":{"owned":false}},
                {"id":999,"name":""}]"#,
        );
        let champions = owned_champions(&lcu).unwrap();
        let names: Vec<&str> = champions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["None", "Ahri", "Zed"]);
        assert!(!champions[1].available);
    }

    #[test]
    fn spells_fall_back_when_client_has_none() {
        let lcu = FakeLcu::default();
        assert_eq!(summoner_spells(&lcu), catalog::fallback_spells());

        lcu.respond(
            "GET",
            SUMMONER_SPELLS,
            200,
            r#"[{"id":4,"name":"Flash","description":"Blink"},{"id":54,"name":"","description":""}]"#,
        );
        let spells = summoner_spells(&lcu);
        assert_eq!(spells.len(), 1);
        assert_eq!(spells[0].name, "Flash");
    }
}
