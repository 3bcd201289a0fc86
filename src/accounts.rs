use crate::api::rank::RankOutcome;
use crate::error::AppError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

static RANK_COUNTERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((-?\d+)\s*LP,\s*(\d+)W/(\d+)L\)").expect("rank counter pattern is valid")
});

/// One stored login. `account_name` is the Riot Client username and the
/// store's key; game name and tag line are only used for rank lookups.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Account {
    pub account_name: String,
    pub game_name: String,
    pub tag_line: String,
    pub region: String,
    pub encrypted_password: String,
    pub rank_info: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
    pub avatar_path: String,
}

impl Account {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }

    /// Tier and division without the counters, e.g. `GOLD II`.
    pub fn rank_label(&self) -> &str {
        match self.rank_info.find('(') {
            Some(idx) if idx > 0 => self.rank_info[..idx].trim(),
            _ => self.rank_info.as_str(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.account_name.eq_ignore_ascii_case(query) || self.riot_id().eq_ignore_ascii_case(query)
    }
}

/// Fields to change on an existing account; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct AccountUpdate {
    pub account_name: Option<String>,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
    pub region: Option<String>,
    pub encrypted_password: Option<String>,
    pub avatar_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountStats {
    pub total_games: i32,
    pub total_wins: i32,
    pub total_losses: i32,
    pub win_rate: f64,
}

#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let accounts = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::JsonError(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(AccountStore {
            path: path.to_path_buf(),
            accounts,
        })
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.accounts).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize accounts: {}", e))
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn find(&self, query: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.matches(query))
    }

    fn find_mut(&mut self, query: &str) -> Result<&mut Account, AppError> {
        self.accounts
            .iter_mut()
            .find(|a| a.matches(query))
            .ok_or_else(|| AppError::UnknownAccount(query.to_string()))
    }

    pub fn add(&mut self, mut account: Account) -> Result<(), AppError> {
        for field in [
            &mut account.account_name,
            &mut account.game_name,
            &mut account.tag_line,
            &mut account.region,
        ] {
            *field = field.trim().to_string();
        }

        let required = [
            ("account login", &account.account_name),
            ("game name", &account.game_name),
            ("tag line", &account.tag_line),
            ("password", &account.encrypted_password),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AppError::AccountError(format!("{} must not be empty", field)));
        }
        if self.name_taken(&account.account_name, None) {
            return Err(AppError::AccountError(format!(
                "an account with login '{}' already exists",
                account.account_name
            )));
        }

        self.accounts.push(account);
        Ok(())
    }

    pub fn update(&mut self, query: &str, update: AccountUpdate) -> Result<(), AppError> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.matches(query))
            .ok_or_else(|| AppError::UnknownAccount(query.to_string()))?;

        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
        let account_name = trimmed(update.account_name);
        if let Some(name) = account_name.as_deref() {
            if name.is_empty() {
                return Err(AppError::AccountError("account login must not be empty".to_string()));
            }
            if self.name_taken(name, Some(index)) {
                return Err(AppError::AccountError(format!(
                    "an account with login '{}' already exists",
                    name
                )));
            }
        }

        let account = &mut self.accounts[index];
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        if let Some(v) = account_name {
            account.account_name = v;
        }
        if let Some(v) = non_empty(trimmed(update.game_name)) {
            account.game_name = v;
        }
        if let Some(v) = non_empty(trimmed(update.tag_line)) {
            account.tag_line = v;
        }
        if let Some(v) = non_empty(trimmed(update.region)) {
            account.region = v;
        }
        if let Some(v) = non_empty(update.encrypted_password) {
            account.encrypted_password = v;
        }
        if let Some(v) = non_empty(update.avatar_path) {
            account.avatar_path = v;
        }
        Ok(())
    }

    pub fn remove(&mut self, query: &str) -> Result<Account, AppError> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.matches(query))
            .ok_or_else(|| AppError::UnknownAccount(query.to_string()))?;
        Ok(self.accounts.remove(index))
    }

    pub fn apply_rank(&mut self, query: &str, outcome: &RankOutcome) -> Result<(), AppError> {
        let account = self.find_mut(query)?;
        account.rank_info = outcome.to_string();
        match outcome {
            RankOutcome::Ranked(data) => {
                account.league_points = data.league_points;
                account.wins = data.wins;
                account.losses = data.losses;
            }
            RankOutcome::Unranked => {
                account.league_points = 0;
                account.wins = 0;
                account.losses = 0;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> AccountStats {
        let total_wins: i32 = self.accounts.iter().map(|a| a.wins).sum();
        let total_losses: i32 = self.accounts.iter().map(|a| a.losses).sum();
        let total_games = total_wins + total_losses;
        let win_rate = if total_games > 0 {
            total_wins as f64 / total_games as f64 * 100.0
        } else {
            0.0
        };

        AccountStats {
            total_games,
            total_wins,
            total_losses,
            win_rate,
        }
    }

    /// Fills LP/W/L from `rank_info` for accounts saved with the string only.
    pub fn backfill_counters(&mut self) -> usize {
        let mut filled = 0;
        for account in &mut self.accounts {
            let empty = account.league_points == 0 && account.wins == 0 && account.losses == 0;
            if !empty {
                continue;
            }
            if let Some((lp, wins, losses)) = parse_rank_info(&account.rank_info) {
                account.league_points = lp;
                account.wins = wins;
                account.losses = losses;
                filled += 1;
            }
        }
        filled
    }

    fn name_taken(&self, name: &str, except: Option<usize>) -> bool {
        self.accounts
            .iter()
            .enumerate()
            .any(|(i, a)| Some(i) != except && a.account_name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Extracts `(lp, wins, losses)` from `"GOLD II (42 LP, 10W/8L)"`.
pub fn parse_rank_info(rank_info: &str) -> Option<(i32, i32, i32)> {
    let caps = RANK_COUNTERS.captures(rank_info)?;
    let lp = caps[1].parse().ok()?;
    let wins = caps[2].parse().ok()?;
    let losses = caps[3].parse().ok()?;
    Some((lp, wins, losses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rank::RankData;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("riot_autologin_accounts_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("accounts.json")
    }

    fn account(login: &str) -> Account {
        Account {
            account_name: login.to_string(),
            game_name: format!("{}Game", login),
            tag_line: "EUW".to_string(),
            region: "euw1".to_string(),
            encrypted_password: "sealed".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = AccountStore::load(&temp_path("missing")).unwrap();
        assert!(store.accounts().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AccountStore::load(&path), Err(AppError::JsonError(_))));
    }

    #[test]
    fn saved_accounts_reload_with_pascal_case_fields() {
        let path = temp_path("save");
        let mut store = AccountStore::load(&path).unwrap();
        store.add(account("alice")).unwrap();
        store.save().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"AccountName\": \"alice\""));
        assert!(raw.contains("\"EncryptedPassword\""));

        let reloaded = AccountStore::load(&path).unwrap();
        assert_eq!(reloaded.accounts(), store.accounts());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn reads_files_missing_newer_fields() {
        let path = temp_path("legacy");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"[{"AccountName":"bob","GameName":"Bob","TagLine":"EUNE","Region":"eun1","EncryptedPassword":"x","RankInfo":"GOLD IV (12 LP, 30W/25L)"}]"#,
        )
        .unwrap();

        let mut store = AccountStore::load(&path).unwrap();
        assert_eq!(store.backfill_counters(), 1);
        let bob = store.find("bob").unwrap();
        assert_eq!((bob.league_points, bob.wins, bob.losses), (12, 30, 25));
        assert_eq!(bob.rank_label(), "GOLD IV");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn add_rejects_duplicates_and_blank_fields() {
        let mut store = AccountStore::load(&temp_path("dup")).unwrap();
        store.add(account("alice")).unwrap();
        assert!(store.add(account("ALICE")).is_err());

        let mut blank = account("carol");
        blank.encrypted_password.clear();
        assert!(matches!(store.add(blank), Err(AppError::AccountError(_))));
    }

    #[test]
    fn find_matches_login_or_riot_id() {
        let mut store = AccountStore::load(&temp_path("find")).unwrap();
        store.add(account("alice")).unwrap();
        assert!(store.find("Alice").is_some());
        assert!(store.find("aliceGame#euw").is_some());
        assert!(store.find("nobody").is_none());
    }

    #[test]
    fn update_keeps_unset_fields() {
        let mut store = AccountStore::load(&temp_path("update")).unwrap();
        store.add(account("alice")).unwrap();
        store
            .update(
                "alice",
                AccountUpdate {
                    region: Some("na1".to_string()),
                    encrypted_password: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();

        let alice = store.find("alice").unwrap();
        assert_eq!(alice.region, "na1");
        assert_eq!(alice.encrypted_password, "sealed");
        assert_eq!(alice.game_name, "aliceGame");
    }

    #[test]
    fn update_cannot_rename_onto_existing_login() {
        let mut store = AccountStore::load(&temp_path("rename")).unwrap();
        store.add(account("alice")).unwrap();
        store.add(account("bob")).unwrap();
        let result = store.update(
            "bob",
            AccountUpdate {
                account_name: Some("alice".to_string()),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert!(store.find("bob").is_some());
    }

    #[test]
    fn logins_are_stored_trimmed() {
        let mut store = AccountStore::load(&temp_path("trim")).unwrap();
        store.add(account("  alice ")).unwrap();
        assert_eq!(store.accounts()[0].account_name, "alice");
        assert!(store.add(account("alice")).is_err());

        store
            .update(
                "alice",
                AccountUpdate {
                    account_name: Some(" carol ".to_string()),
                    game_name: Some(" Carol ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let carol = store.find("carol").unwrap();
        assert_eq!(carol.account_name, "carol");
        assert_eq!(carol.game_name, "Carol");
        assert!(store.find("alice").is_none());
    }

    #[test]
    fn remove_unknown_account_errors() {
        let mut store = AccountStore::load(&temp_path("remove")).unwrap();
        store.add(account("alice")).unwrap();
        assert!(matches!(store.remove("bob"), Err(AppError::UnknownAccount(_))));
        assert_eq!(store.remove("alice").unwrap().account_name, "alice");
        assert!(store.accounts().is_empty());
    }

    #[test]
    fn rank_updates_feed_stats() {
        let mut store = AccountStore::load(&temp_path("stats")).unwrap();
        store.add(account("alice")).unwrap();
        store.add(account("bob")).unwrap();

        let ranked = RankOutcome::Ranked(RankData {
            tier: "GOLD".to_string(),
            rank: "I".to_string(),
            league_points: 50,
            wins: 30,
            losses: 10,
        });
        store.apply_rank("alice", &ranked).unwrap();
        store.apply_rank("bob", &RankOutcome::Unranked).unwrap();

        assert_eq!(store.find("alice").unwrap().rank_info, "GOLD I (50 LP, 30W/10L)");
        assert_eq!(store.find("bob").unwrap().rank_info, "Unranked");

        let stats = store.stats();
        assert_eq!(stats.total_games, 40);
        assert_eq!(stats.total_wins, 30);
        assert!((stats.win_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_without_games_has_zero_win_rate() {
        let store = AccountStore::load(&temp_path("nostats")).unwrap();
        assert_eq!(store.stats().win_rate, 0.0);
    }

    #[test]
    fn parses_rank_counters() {
        assert_eq!(parse_rank_info("MASTER (231 LP, 100W/90L)"), Some((231, 100, 90)));
        assert_eq!(parse_rank_info("Unranked"), None);
    }
}
