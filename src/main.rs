mod accounts;
mod api;
mod autopick;
mod cache;
mod catalog;
mod config;
mod ddragon;
mod display;
mod error;
mod lcu;
mod monitor;
mod process;
mod riot_client;
mod vault;

use accounts::{Account, AccountStore, AccountUpdate};
use api::client::RiotApiClient;
use api::rank::lookup_rank;
use autopick::settings::AutoPickSettings;
use catalog::{Champion, SummonerSpell, NONE_CHAMPION_ID};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use ddragon::DataDragon;
use display::output::{
    display_accounts, display_champions, display_error, display_info, display_settings,
    display_spells, display_stats, display_success, display_warn,
};
use error::AppError;
use indicatif::ProgressBar;
use lcu::client::LcuClient;
use monitor::{Monitor, MonitorOptions};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use vault::Vault;

#[derive(Parser, Debug)]
#[command(name = "riot-autologin")]
#[command(about = "Manage Riot accounts, log into the Riot Client and automate champion select", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage saved accounts
    #[command(subcommand)]
    Account(AccountCommand),

    /// Log into the Riot Client with a saved account
    Login {
        /// Login name or Riot ID (Name#TAG)
        account: String,
    },

    /// Start the Riot Client and League of Legends
    Launch,

    /// Close the Riot Client and League of Legends
    Close,

    /// Refresh Solo/Duo ranks from the Riot API
    Rank {
        /// Only this account (default: all)
        account: Option<String>,
    },

    /// Manage the Riot API key
    #[command(subcommand)]
    ApiKey(ApiKeyCommand),

    /// Champion select automation settings
    #[command(subcommand)]
    Autopick(AutopickCommand),

    /// Auto-accept matches and run champion select automation
    Watch {
        /// Do not accept ready checks
        #[arg(long)]
        no_accept: bool,

        /// Do not pick, ban or set spells
        #[arg(long)]
        no_champ_select: bool,

        /// Stop after this many seconds (default: run until interrupted)
        #[arg(long)]
        duration: Option<u64>,
    },

    /// List champions
    Champions {
        /// Only champions owned by the logged-in summoner (needs the League client)
        #[arg(long)]
        owned: bool,
    },

    /// List summoner spells
    Spells,

    /// Download champion and spell icons into the image cache
    PrefetchImages,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Save a new account
    Add {
        /// Riot Client login name
        login: String,

        #[arg(long)]
        game_name: String,

        #[arg(long)]
        tag_line: String,

        /// Platform region, e.g. euw1 (default: RIOT_REGION or eun1)
        #[arg(short, long)]
        region: Option<String>,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// List saved accounts
    List,

    /// Change fields of a saved account
    Update {
        account: String,

        #[arg(long)]
        login: Option<String>,

        #[arg(long)]
        game_name: Option<String>,

        #[arg(long)]
        tag_line: Option<String>,

        #[arg(short, long)]
        region: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Read a new password from stdin
        #[arg(long, conflicts_with = "password")]
        prompt_password: bool,

        #[arg(long)]
        avatar: Option<String>,
    },

    /// Delete a saved account
    Remove { account: String },

    /// Combined ranked record across accounts
    Stats,
}

#[derive(Subcommand, Debug)]
enum ApiKeyCommand {
    /// Store the key in the data directory
    Set { key: String },
    /// Show the key in use (masked)
    Show,
}

#[derive(Subcommand, Debug)]
enum AutopickCommand {
    /// Print the current settings
    Show,

    /// Change champions, spells or delays
    Set {
        /// Champion name or id ("none" clears)
        #[arg(long)]
        pick: Option<String>,

        #[arg(long)]
        secondary: Option<String>,

        #[arg(long)]
        ban: Option<String>,

        /// Spell name or id ("none" clears)
        #[arg(long)]
        spell1: Option<String>,

        #[arg(long)]
        spell2: Option<String>,

        #[arg(long)]
        pick_hover_delay: Option<u64>,

        /// Milliseconds between hover and lock; 0 hovers only
        #[arg(long)]
        pick_lock_delay: Option<u64>,

        #[arg(long)]
        ban_hover_delay: Option<u64>,

        #[arg(long)]
        ban_lock_delay: Option<u64>,
    },

    Enable {
        #[arg(value_enum)]
        feature: Feature,
    },

    Disable {
        #[arg(value_enum)]
        feature: Feature,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Feature {
    Accept,
    Pick,
    Ban,
    Spells,
    InstantLock,
    InstantBan,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli.command) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AppError> {
    let config = Config::from_env()?;
    log::debug!("Data directory: {}", config.data_dir.display());

    match command {
        Command::Account(cmd) => run_account(&config, cmd),
        Command::Login { account } => login(&config, &account),
        Command::Launch => {
            if riot_client::is_running() {
                display_info("Riot Client is already running");
                return Ok(());
            }
            let path = riot_client::find_riot_client_path(&config)?;
            riot_client::launch(&path)?;
            display_success("Riot Client started");
            Ok(())
        }
        Command::Close => {
            let closed = riot_client::close_all();
            if closed == 0 {
                display_info("No Riot or League processes were running");
            } else {
                display_success(&format!("Closed {} process(es)", closed));
            }
            Ok(())
        }
        Command::Rank { account } => refresh_ranks(&config, account.as_deref()),
        Command::ApiKey(cmd) => run_api_key(&config, cmd),
        Command::Autopick(cmd) => run_autopick(&config, cmd),
        Command::Watch {
            no_accept,
            no_champ_select,
            duration,
        } => watch(&config, !no_accept, !no_champ_select, duration),
        Command::Champions { owned } => {
            let champions = if owned {
                let client = LcuClient::connect(config.league_install_dir.as_deref())?;
                if let Ok(summoner) = lcu::endpoints::current_summoner(&client) {
                    display_info(&format!(
                        "Champions for {}#{}",
                        summoner.game_name, summoner.tag_line
                    ));
                }
                lcu::endpoints::owned_champions(&client)?
            } else {
                catalog::with_none_entry(ddragon_champions(&config))
            };
            display_champions(&champions);
            Ok(())
        }
        Command::Spells => {
            display_spells(&spell_catalog(&config));
            Ok(())
        }
        Command::PrefetchImages => {
            let dd = DataDragon::new(&config.image_cache_dir());
            let version = dd.latest_version();
            display_info(&format!("Caching icons for patch {}", version));
            let champions = dd.champions(&config.ddragon_cache_path());
            let failed = dd.prefetch(&version, &champions, &catalog::fallback_spells());
            if failed > 0 {
                display_warn(&format!("{} icon(s) could not be downloaded", failed));
            }
            display_success(&format!("Icons cached in {}", config.image_cache_dir().display()));
            Ok(())
        }
    }
}

fn open_store(config: &Config) -> Result<AccountStore, AppError> {
    let mut store = AccountStore::load(&config.accounts_path())?;
    if store.backfill_counters() > 0 {
        store.save()?;
    }
    Ok(store)
}

fn open_vault(config: &Config) -> Result<Vault, AppError> {
    Vault::open(&config.data_dir, config.passphrase.as_deref())
}

/// Uses `given` or asks on stdin.
fn read_password(given: Option<String>) -> Result<String, AppError> {
    if let Some(password) = given {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(AppError::AccountError("password must not be empty".to_string()));
    }
    Ok(password)
}

fn run_account(config: &Config, cmd: AccountCommand) -> Result<(), AppError> {
    let mut store = open_store(config)?;

    match cmd {
        AccountCommand::Add {
            login,
            game_name,
            tag_line,
            region,
            password,
        } => {
            let password = read_password(password)?;
            let account = Account {
                account_name: login.trim().to_string(),
                game_name: game_name.trim().to_string(),
                tag_line: tag_line.trim().trim_start_matches('#').to_string(),
                region: region.unwrap_or_else(|| config.default_region.clone()),
                encrypted_password: open_vault(config)?.encrypt(&password)?,
                rank_info: "Unranked".to_string(),
                ..Default::default()
            };
            let riot_id = account.riot_id();
            store.add(account)?;
            store.save()?;
            display_success(&format!("Saved {} ({})", login.trim(), riot_id));
        }
        AccountCommand::List => display_accounts(store.accounts()),
        AccountCommand::Update {
            account,
            login,
            game_name,
            tag_line,
            region,
            password,
            prompt_password,
            avatar,
        } => {
            let password = if prompt_password {
                Some(read_password(None)?)
            } else {
                password
            };
            let encrypted_password = match password {
                Some(p) => Some(open_vault(config)?.encrypt(&p)?),
                None => None,
            };
            store.update(
                &account,
                AccountUpdate {
                    account_name: login,
                    game_name,
                    tag_line: tag_line.map(|t| t.trim_start_matches('#').to_string()),
                    region,
                    encrypted_password,
                    avatar_path: avatar,
                },
            )?;
            store.save()?;
            display_success(&format!("Updated {}", account));
        }
        AccountCommand::Remove { account } => {
            let removed = store.remove(&account)?;
            store.save()?;
            display_success(&format!("Removed {}", removed.account_name));
        }
        AccountCommand::Stats => display_stats(&store.stats(), store.accounts().len()),
    }
    Ok(())
}

fn login(config: &Config, query: &str) -> Result<(), AppError> {
    let store = open_store(config)?;
    let account = store
        .find(query)
        .ok_or_else(|| AppError::UnknownAccount(query.to_string()))?;
    let password = open_vault(config)?.decrypt(&account.encrypted_password)?;

    display_info(&format!("Logging in as {}...", account.account_name));
    riot_client::launch_and_login(config, &account.account_name, &password)?;
    display_success("Login submitted, check the Riot Client for any prompts");
    Ok(())
}

fn refresh_ranks(config: &Config, only: Option<&str>) -> Result<(), AppError> {
    let client = RiotApiClient::new(config.require_api_key()?);
    let mut store = open_store(config)?;

    let targets: Vec<Account> = match only {
        Some(query) => vec![store
            .find(query)
            .cloned()
            .ok_or_else(|| AppError::UnknownAccount(query.to_string()))?],
        None => store.accounts().to_vec(),
    };
    if targets.is_empty() {
        display_info("No accounts saved");
        return Ok(());
    }

    let pb = ProgressBar::new(targets.len() as u64);
    pb.set_message("Fetching ranks");
    let mut failures = Vec::new();

    for account in &targets {
        let region = if account.region.trim().is_empty() {
            config.default_region.as_str()
        } else {
            account.region.as_str()
        };

        // A failed lookup keeps whatever rank was stored before.
        match lookup_rank(&client, &account.game_name, &account.tag_line, region) {
            Ok(outcome) => store.apply_rank(&account.account_name, &outcome)?,
            Err(e) => failures.push(format!("{}: {}", account.riot_id(), e)),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    store.save()?;
    for failure in &failures {
        display_warn(failure);
    }
    display_success(&format!(
        "Updated {} of {} account(s)",
        targets.len() - failures.len(),
        targets.len()
    ));
    display_accounts(store.accounts());
    Ok(())
}

fn run_api_key(config: &Config, cmd: ApiKeyCommand) -> Result<(), AppError> {
    match cmd {
        ApiKeyCommand::Set { key } => {
            config::save_api_key(&config.data_dir, &key)?;
            display_success("API key saved");
            if std::env::var("RIOT_API_KEY").is_ok() {
                display_warn("RIOT_API_KEY is set and takes precedence over the saved key");
            }
        }
        ApiKeyCommand::Show => match &config.api_key {
            Some(key) => display_info(&format!("API key: {}", config::mask_secret(key))),
            None => display_warn("No API key configured"),
        },
    }
    Ok(())
}

/// Champions from Data Dragon (cached), or the built-in list offline.
fn ddragon_champions(config: &Config) -> Vec<Champion> {
    DataDragon::new(&config.image_cache_dir()).champions(&config.ddragon_cache_path())
}

/// Prefers what the running League client knows about.
fn champion_catalog(config: &Config) -> Vec<Champion> {
    let owned = LcuClient::connect(config.league_install_dir.as_deref())
        .and_then(|client| lcu::endpoints::owned_champions(&client));
    match owned {
        Ok(champions) if champions.len() > 1 => champions,
        _ => catalog::with_none_entry(ddragon_champions(config)),
    }
}

fn spell_catalog(config: &Config) -> Vec<SummonerSpell> {
    match LcuClient::connect(config.league_install_dir.as_deref()) {
        Ok(client) => lcu::endpoints::summoner_spells(&client),
        Err(_) => catalog::fallback_spells(),
    }
}

fn is_none(query: &str) -> bool {
    query.trim().eq_ignore_ascii_case("none")
}

fn choose_champion(champions: &[Champion], query: &str) -> Result<(i64, String), AppError> {
    if is_none(query) {
        return Ok((0, String::new()));
    }
    let champion = catalog::resolve_champion(champions, query)?;
    if champion.id == NONE_CHAMPION_ID {
        return Ok((0, String::new()));
    }
    if !champion.available {
        display_warn(&format!("{} is not owned on the logged-in account", champion.name));
    }
    Ok((champion.id, champion.name.clone()))
}

fn choose_spell(spells: &[SummonerSpell], query: &str) -> Result<(i64, String), AppError> {
    if is_none(query) {
        return Ok((0, String::new()));
    }
    let spell = catalog::resolve_spell(spells, query)?;
    Ok((spell.id, spell.name.clone()))
}

fn run_autopick(config: &Config, cmd: AutopickCommand) -> Result<(), AppError> {
    let path = config.autopick_path();
    let mut settings = AutoPickSettings::load(&path)?;

    match cmd {
        AutopickCommand::Show => {
            display_settings(&settings);
            return Ok(());
        }
        AutopickCommand::Set {
            pick,
            secondary,
            ban,
            spell1,
            spell2,
            pick_hover_delay,
            pick_lock_delay,
            ban_hover_delay,
            ban_lock_delay,
        } => {
            if pick.is_some() || secondary.is_some() || ban.is_some() {
                let champions = champion_catalog(config);
                if let Some(q) = pick {
                    (settings.pick_champion_id, settings.pick_champion_name) =
                        choose_champion(&champions, &q)?;
                }
                if let Some(q) = secondary {
                    (settings.secondary_champion_id, settings.secondary_champion_name) =
                        choose_champion(&champions, &q)?;
                }
                if let Some(q) = ban {
                    (settings.ban_champion_id, settings.ban_champion_name) =
                        choose_champion(&champions, &q)?;
                }
            }
            if spell1.is_some() || spell2.is_some() {
                let spells = spell_catalog(config);
                if let Some(q) = spell1 {
                    (settings.summoner_spell1_id, settings.summoner_spell1_name) =
                        choose_spell(&spells, &q)?;
                }
                if let Some(q) = spell2 {
                    (settings.summoner_spell2_id, settings.summoner_spell2_name) =
                        choose_spell(&spells, &q)?;
                }
            }
            if let Some(ms) = pick_hover_delay {
                settings.pick_hover_delay_ms = ms;
            }
            if let Some(ms) = pick_lock_delay {
                settings.pick_lock_delay_ms = ms;
            }
            if let Some(ms) = ban_hover_delay {
                settings.ban_hover_delay_ms = ms;
            }
            if let Some(ms) = ban_lock_delay {
                settings.ban_lock_delay_ms = ms;
            }
        }
        AutopickCommand::Enable { feature } => set_feature(&mut settings, feature, true),
        AutopickCommand::Disable { feature } => set_feature(&mut settings, feature, false),
    }

    settings.save(&path)?;
    display_success("Auto-pick settings saved");
    display_settings(&settings);
    Ok(())
}

fn set_feature(settings: &mut AutoPickSettings, feature: Feature, enabled: bool) {
    let flag = match feature {
        Feature::Accept => &mut settings.auto_accept_enabled,
        Feature::Pick => &mut settings.auto_pick_enabled,
        Feature::Ban => &mut settings.auto_ban_enabled,
        Feature::Spells => &mut settings.auto_spells_enabled,
        Feature::InstantLock => &mut settings.instant_lock,
        Feature::InstantBan => &mut settings.instant_ban,
    };
    *flag = enabled;
}

fn watch(
    config: &Config,
    accept: bool,
    champ_select: bool,
    duration: Option<u64>,
) -> Result<(), AppError> {
    let settings_path = config.autopick_path();
    let settings = AutoPickSettings::load(&settings_path)?;

    let options = MonitorOptions {
        auto_accept: accept && settings.auto_accept_enabled,
        champ_select: champ_select && settings.champ_select_enabled(),
        install_dir: config.league_install_dir.clone(),
        settings_path: Some(settings_path),
    };
    if !options.auto_accept && !options.champ_select {
        display_warn("Nothing to do: auto accept and champion select automation are both off");
        return Ok(());
    }

    if options.auto_accept {
        display_info("Auto accept is on");
    }
    if options.champ_select {
        display_info("Champion select automation is on");
    }

    let monitor = Monitor::start(options, settings)?;
    match duration {
        Some(secs) => {
            std::thread::sleep(Duration::from_secs(secs));
            monitor.stop();
            display_success("Stopped watching");
        }
        None => {
            display_info("Watching the League client, press Ctrl+C to stop");
            monitor.join();
        }
    }
    Ok(())
}
