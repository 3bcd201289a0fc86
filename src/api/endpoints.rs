// Riot REST endpoints. Account lookups go through a regional cluster,
// league data through the platform host of the account's region.

pub const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";

/// Maps a platform id (`euw1`, `na1`, ...) to its regional routing value.
pub fn regional_routing(region: &str) -> &'static str {
    match region.to_ascii_lowercase().as_str() {
        "na1" | "br1" | "la1" | "la2" => "americas",
        "euw1" | "eun1" | "tr1" | "ru" | "me1" => "europe",
        "kr" | "jp1" => "asia",
        "oc1" | "ph2" | "sg2" | "th2" | "tw2" | "vn2" => "sea",
        _ => "europe",
    }
}

pub fn account_by_riot_id_url(region: &str, game_name: &str, tag_line: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/riot/account/v1/accounts/by-riot-id/{}/{}",
        regional_routing(region),
        encode_path_segment(game_name),
        encode_path_segment(tag_line)
    )
}

pub fn league_entries_by_puuid_url(region: &str, puuid: &str) -> String {
    format!(
        "https://{}.api.riotgames.com/lol/league/v4/entries/by-puuid/{}",
        region.to_ascii_lowercase(),
        encode_path_segment(puuid)
    )
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
