use crate::error::AppError;
use std::fmt;

use super::client::RiotApiClient;
use super::endpoints::SOLO_QUEUE;
use super::models::LeagueEntryDto;

const APEX_TIERS: [&str; 3] = ["MASTER", "GRANDMASTER", "CHALLENGER"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankData {
    pub tier: String,
    pub rank: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
}

impl fmt::Display for RankData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tier = if self.tier.is_empty() { "Unknown" } else { self.tier.as_str() };
        let apex = APEX_TIERS.iter().any(|t| t.eq_ignore_ascii_case(tier));

        if self.rank.is_empty() || apex {
            write!(f, "{} ({} LP, {}W/{}L)", tier, self.league_points, self.wins, self.losses)
        } else {
            write!(
                f,
                "{} {} ({} LP, {}W/{}L)",
                tier, self.rank, self.league_points, self.wins, self.losses
            )
        }
    }
}

impl From<&LeagueEntryDto> for RankData {
    fn from(entry: &LeagueEntryDto) -> Self {
        RankData {
            tier: entry.tier.clone(),
            rank: entry.rank.clone(),
            league_points: entry.league_points,
            wins: entry.wins,
            losses: entry.losses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankOutcome {
    Ranked(RankData),
    Unranked,
}

impl fmt::Display for RankOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankOutcome::Ranked(data) => write!(f, "{}", data),
            RankOutcome::Unranked => f.write_str("Unranked"),
        }
    }
}

pub fn solo_queue_outcome(entries: &[LeagueEntryDto]) -> RankOutcome {
    entries
        .iter()
        .find(|e| e.queue_type == SOLO_QUEUE)
        .map(|e| RankOutcome::Ranked(RankData::from(e)))
        .unwrap_or(RankOutcome::Unranked)
}

/// Resolves a Riot ID and returns its Solo/Duo standing.
pub fn lookup_rank(
    client: &RiotApiClient,
    game_name: &str,
    tag_line: &str,
    region: &str,
) -> Result<RankOutcome, AppError> {
    let game_name = game_name.trim();
    let tag_line = tag_line.trim().trim_start_matches('#');
    if game_name.is_empty() || tag_line.is_empty() {
        return Err(AppError::InvalidRiotId);
    }

    let account = client.get_account(game_name, tag_line, region)?;
    log::debug!(
        "Resolved {}#{} to a PUUID",
        account.game_name.as_deref().unwrap_or(game_name),
        account.tag_line.as_deref().unwrap_or(tag_line)
    );

    let entries = client.get_league_entries(&account.puuid, region)?;
    let outcome = solo_queue_outcome(&entries);
    log::info!("Rank for {}#{}: {}", game_name, tag_line, outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(queue: &str, tier: &str, rank: &str) -> LeagueEntryDto {
        LeagueEntryDto {
            queue_type: queue.to_string(),
            tier: tier.to_string(),
            rank: rank.to_string(),
            league_points: 42,
            wins: 10,
            losses: 8,
        }
    }

    #[test]
    fn formats_divisioned_tier() {
        let data = RankData::from(&entry(SOLO_QUEUE, "GOLD", "II"));
        assert_eq!(data.to_string(), "GOLD II (42 LP, 10W/8L)");
    }

    #[test]
    fn apex_tiers_drop_division() {
        let data = RankData::from(&entry(SOLO_QUEUE, "GRANDMASTER", "I"));
        assert_eq!(data.to_string(), "GRANDMASTER (42 LP, 10W/8L)");
    }

    #[test]
    fn picks_solo_queue_over_flex() {
        let entries = vec![
            entry("RANKED_FLEX_SR", "DIAMOND", "IV"),
            entry(SOLO_QUEUE, "SILVER", "I"),
        ];
        match solo_queue_outcome(&entries) {
            RankOutcome::Ranked(data) => assert_eq!(data.tier, "SILVER"),
            RankOutcome::Unranked => panic!("expected a ranked outcome"),
        }
    }

    #[test]
    fn flex_only_is_unranked() {
        let entries = vec![entry("RANKED_FLEX_SR", "DIAMOND", "IV")];
        assert_eq!(solo_queue_outcome(&entries), RankOutcome::Unranked);
        assert_eq!(RankOutcome::Unranked.to_string(), "Unranked");
    }

    #[test]
    fn empty_riot_id_is_rejected_before_any_request() {
        let client = RiotApiClient::new("RGAPI-test");
        assert!(matches!(
            lookup_rank(&client, "  ", "EUW", "euw1"),
            Err(AppError::InvalidRiotId)
        ));
        assert!(matches!(
            lookup_rank(&client, "Name", "#", "euw1"),
            Err(AppError::InvalidRiotId)
        ));
    }
}
