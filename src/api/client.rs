use crate::error::AppError;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints;
use super::models::*;

const USER_AGENT: &str = concat!("riot_autologin/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 3;

// Development keys allow 20 requests per second and 100 per two minutes.
const BURST: NonZeroU32 = match NonZeroU32::new(20) {
    Some(n) => n,
    None => unreachable!(),
};
const REPLENISH_EVERY: Duration = Duration::from_millis(1200);

pub struct RiotApiClient {
    api_key: String,
    agent: ureq::Agent,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    clock: DefaultClock,
}

impl RiotApiClient {
    pub fn new(api_key: &str) -> Self {
        let quota = Quota::with_period(REPLENISH_EVERY)
            .map(|q| q.allow_burst(BURST))
            .unwrap_or_else(|| Quota::per_second(BURST));

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build();

        RiotApiClient {
            api_key: api_key.trim().to_string(),
            agent,
            rate_limiter: RateLimiter::direct(quota),
            clock: DefaultClock::default(),
        }
    }

    fn wait_for_quota(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }

    /// GETs `url`. `Ok(None)` means the resource does not exist (404).
    fn execute_request(&self, url: &str) -> Result<Option<String>, AppError> {
        let mut retry_count = 0;

        loop {
            self.wait_for_quota();
            log::debug!("GET {}", url);

            let response = match self
                .agent
                .get(url)
                .set("X-Riot-Token", &self.api_key)
                .call()
            {
                Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
                Err(e) => return Err(AppError::HttpError(e.to_string())),
            };

            match classify(response.status(), response.header("Retry-After"), retry_count) {
                Outcome::Body => {
                    return response
                        .into_string()
                        .map(Some)
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Outcome::NotFound => return Ok(None),
                Outcome::Retry(wait) => {
                    log::warn!("Rate limited by Riot API, retrying in {}ms", wait.as_millis());
                    thread::sleep(wait);
                    retry_count += 1;
                }
                Outcome::Fail(e) => return Err(e),
            }
        }
    }

    pub fn get_account(
        &self,
        game_name: &str,
        tag_line: &str,
        region: &str,
    ) -> Result<AccountDto, AppError> {
        let url = endpoints::account_by_riot_id_url(region, game_name, tag_line);

        let body = found(self.execute_request(&url)?, || format!("{}#{}", game_name, tag_line))?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }

    pub fn get_league_entries(
        &self,
        puuid: &str,
        region: &str,
    ) -> Result<Vec<LeagueEntryDto>, AppError> {
        let url = endpoints::league_entries_by_puuid_url(region, puuid);

        // A 404 means no summoner on this shard, not an unranked one.
        let body = found(self.execute_request(&url)?, || format!("no summoner for {} on {}", puuid, region))?;
        serde_json::from_str(&body).map_err(|e| AppError::JsonError(e.to_string()))
    }
}

/// What `execute_request` does with a response status.
#[derive(Debug)]
enum Outcome {
    Body,
    NotFound,
    Retry(Duration),
    Fail(AppError),
}

fn classify(status: u16, retry_after: Option<&str>, attempt: u32) -> Outcome {
    match status {
        200..=399 => Outcome::Body,
        404 => Outcome::NotFound,
        429 if attempt >= MAX_RETRIES => Outcome::Fail(AppError::RateLimited),
        429 => {
            let wait_ms = retry_after
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(2000 * (attempt as u64 + 1));
            Outcome::Retry(Duration::from_millis(wait_ms))
        }
        401 | 403 => Outcome::Fail(AppError::ApiError(
            "API key invalid or expired (development keys expire every 24 hours)".to_string(),
        )),
        code => Outcome::Fail(AppError::ApiError(format!("Riot API returned status {}", code))),
    }
}

fn found(body: Option<String>, what: impl FnOnce() -> String) -> Result<String, AppError> {
    body.ok_or_else(|| AppError::PlayerNotFound(what()))
}
