use crate::accounts::{Account, AccountStats};
use crate::autopick::settings::AutoPickSettings;
use crate::catalog::{Champion, SummonerSpell};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "#")]
    number: String,
    login: String,
    #[tabled(rename = "riot id")]
    riot_id: String,
    region: String,
    rank: String,
    record: String,
}

#[derive(Tabled)]
struct ChampionRow {
    id: i64,
    name: String,
    owned: String,
}

#[derive(Tabled)]
struct SpellRow {
    id: i64,
    name: String,
    description: String,
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_warn(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

fn colored_rank(account: &Account) -> String {
    let label = account.rank_label();
    let tier = label.split_whitespace().next().unwrap_or_default().to_ascii_uppercase();
    match tier.as_str() {
        "" => "-".dimmed().to_string(),
        "UNRANKED" => label.dimmed().to_string(),
        "IRON" | "BRONZE" => label.yellow().to_string(),
        "SILVER" => label.white().to_string(),
        "GOLD" => label.bright_yellow().to_string(),
        "PLATINUM" | "EMERALD" => label.green().to_string(),
        "DIAMOND" => label.bright_blue().to_string(),
        _ => label.magenta().bold().to_string(),
    }
}

fn record(account: &Account) -> String {
    let games = account.wins + account.losses;
    if games == 0 {
        return "-".to_string();
    }
    format!(
        "{} LP, {}W/{}L ({:.1}%)",
        account.league_points,
        account.wins,
        account.losses,
        account.wins as f64 / games as f64 * 100.0
    )
}

pub fn display_accounts(accounts: &[Account]) {
    println!("\n{}", format!("👤 ACCOUNTS ({})", accounts.len()).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if accounts.is_empty() {
        println!("{}", "No accounts saved yet, add one with `account add`".yellow());
        return;
    }

    let rows: Vec<AccountRow> = accounts
        .iter()
        .enumerate()
        .map(|(idx, account)| AccountRow {
            number: format!("{}", idx + 1),
            login: account.account_name.clone(),
            riot_id: account.riot_id(),
            region: account.region.clone(),
            rank: colored_rank(account),
            record: record(account),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_stats(stats: &AccountStats, account_count: usize) {
    println!("\n{}", "📊 ACCOUNT STATISTICS".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
    println!("{} {}", "Accounts:".bold(), account_count);
    println!("{} {}", "Ranked games:".bold(), stats.total_games);
    println!(
        "{} {} W / {} L ({:.1}% WR)\n",
        "📈 Overall:".bold(),
        stats.total_wins.to_string().green(),
        stats.total_losses.to_string().red(),
        stats.win_rate
    );
}

pub fn display_champions(champions: &[Champion]) {
    let rows: Vec<ChampionRow> = champions
        .iter()
        .map(|c| ChampionRow {
            id: c.id,
            name: c.name.clone(),
            owned: if c.available { "yes".green().to_string() } else { "no".red().to_string() },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_spells(spells: &[SummonerSpell]) {
    let rows: Vec<SpellRow> = spells
        .iter()
        .map(|s| SpellRow {
            id: s.id,
            name: s.name.clone(),
            description: s.description.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn on_off(enabled: bool) -> ColoredString {
    if enabled {
        "on".green()
    } else {
        "off".red()
    }
}

fn slot(id: i64, name: &str) -> String {
    if id <= 0 {
        "-".to_string()
    } else if name.is_empty() {
        format!("#{}", id)
    } else {
        format!("{} (#{})", name, id)
    }
}

fn lock_label(instant: bool, delay_ms: u64) -> String {
    match (instant, delay_ms) {
        (true, _) => "instant".to_string(),
        (false, 0) => "hover only".to_string(),
        (false, ms) => format!("after {} ms", ms),
    }
}

pub fn display_settings(settings: &AutoPickSettings) {
    println!("\n{}", "⚙️ AUTO-PICK SETTINGS".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    println!("{} {}", "Auto accept:".bold(), on_off(settings.auto_accept_enabled));
    println!(
        "{} {}  pick {} / secondary {}",
        "Auto pick:".bold(),
        on_off(settings.auto_pick_enabled),
        slot(settings.pick_champion_id, &settings.pick_champion_name),
        slot(settings.secondary_champion_id, &settings.secondary_champion_name)
    );
    println!(
        "  hover after {} ms, lock {}",
        settings.pick_hover_delay_ms,
        lock_label(settings.instant_lock, settings.pick_lock_delay_ms)
    );
    println!(
        "{} {}  ban {}",
        "Auto ban:".bold(),
        on_off(settings.auto_ban_enabled),
        slot(settings.ban_champion_id, &settings.ban_champion_name)
    );
    println!(
        "  hover after {} ms, lock {}",
        settings.ban_hover_delay_ms,
        lock_label(settings.instant_ban, settings.ban_lock_delay_ms)
    );
    println!(
        "{} {}  {} + {}\n",
        "Auto spells:".bold(),
        on_off(settings.auto_spells_enabled),
        slot(settings.summoner_spell1_id, &settings.summoner_spell1_name),
        slot(settings.summoner_spell2_id, &settings.summoner_spell2_name)
    );
}
