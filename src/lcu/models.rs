use serde::Deserialize;

// /lol-gameflow/v1/session
#[derive(Debug, Deserialize)]
pub struct GameflowSession {
    #[serde(default)]
    pub phase: Option<String>,
}

// /lol-champ-select/v1/session
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChampSelectSession {
    #[serde(default = "no_cell")]
    pub local_player_cell_id: i64,
    #[serde(default)]
    pub actions: Vec<Vec<ChampSelectAction>>,
    #[serde(default)]
    pub chat_details: Option<ChatDetails>,
}

fn no_cell() -> i64 {
    -1
}

impl ChampSelectSession {
    /// Chat room id; changes with every new champion select.
    pub fn room_id(&self) -> &str {
        self.chat_details
            .as_ref()
            .and_then(|c| c.multi_user_chat_id.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetails {
    #[serde(default)]
    pub multi_user_chat_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChampSelectAction {
    pub id: i64,
    pub actor_cell_id: i64,
    #[serde(rename = "type", default)]
    pub action_type: String,
    #[serde(default)]
    pub is_in_progress: bool,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Pick,
    Ban,
    Other,
}

impl ChampSelectAction {
    pub fn kind(&self) -> ActionKind {
        match self.action_type.as_str() {
            "pick" => ActionKind::Pick,
            "ban" => ActionKind::Ban,
            _ => ActionKind::Other,
        }
    }
}

// /lol-summoner/v1/current-summoner
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSummoner {
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
}

// /lol-champions/v1/owned-champions-minimal
#[derive(Debug, Deserialize)]
pub struct OwnedChampion {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ownership: Option<Ownership>,
}

#[derive(Debug, Deserialize)]
pub struct Ownership {
    #[serde(default)]
    pub owned: bool,
}

// /lol-game-data/assets/v1/summoner-spells.json
#[derive(Debug, Deserialize)]
pub struct SpellAsset {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_champ_select_session() {
        let body = r#"{
            "localPlayerCellId": 2,
            "chatDetails": {"multiUserChatId": "room-1"},
            "actions": [
                [{"id": 1, "actorCellId": 0, "championId": 0, "type": "ban", "isInProgress": false, "completed": true, "pickTurn": 1}],
                [{"id": 7, "actorCellId": 2, "championId": 0, "type": "pick", "isInProgress": true, "completed": false}]
            ],
            "myTeam": []
        }"#;
        let session: ChampSelectSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.local_player_cell_id, 2);
        assert_eq!(session.room_id(), "room-1");
        assert_eq!(session.actions[1][0].kind(), ActionKind::Pick);
    }

    #[test]
    fn session_without_chat_has_empty_room() {
        let session: ChampSelectSession = serde_json::from_str("{}").unwrap();
        assert_eq!(session.room_id(), "");
        assert_eq!(session.local_player_cell_id, -1);
    }
}
