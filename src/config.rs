use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::aggregate::AllowList;

const SOURCE_ENV_PREFIX: &str = "STATS_CSV_URL_";
const ALLOW_LIST_ENV: &str = "PLAYER_ALLOW_LIST";

/// One configured team: identifier plus the URL of its CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSource {
    pub team: String,
    pub url: String,
}

/// Discover team sources from `STATS_CSV_URL_<TEAM>` environment entries,
/// sorted by team for a deterministic run order.
pub fn team_sources_from_env() -> Vec<TeamSource> {
    team_sources(std::env::vars())
}

fn team_sources(vars: impl Iterator<Item = (String, String)>) -> Vec<TeamSource> {
    let mut sources: Vec<TeamSource> = vars
        .filter_map(|(key, value)| {
            let team = key.strip_prefix(SOURCE_ENV_PREFIX)?;
            let url = value.trim();
            if team.is_empty() || url.is_empty() {
                return None;
            }
            Some(TeamSource {
                team: team.to_string(),
                url: url.to_string(),
            })
        })
        .collect();
    sources.sort_by(|a, b| a.team.cmp(&b.team));
    sources
}

/// Read the optional `PLAYER_ALLOW_LIST` value. Absent or blank means
/// every player is tracked; invalid JSON is an error, not a fallback.
pub fn allow_list_from_env() -> Result<Option<AllowList>> {
    let raw = match std::env::var(ALLOW_LIST_ENV) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_allow_list(&raw).map(Some)
}

/// Parse a JSON object of `{team: [player, ...]}`.
pub fn parse_allow_list(raw: &str) -> Result<AllowList> {
    let list: HashMap<String, Vec<String>> =
        serde_json::from_str(raw.trim()).with_context(|| format!("invalid {ALLOW_LIST_ENV} json"))?;
    Ok(list
        .into_iter()
        .map(|(team, players)| (team, players.into_iter().collect()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{TeamSource, parse_allow_list, team_sources};

    fn var(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn team_sources_match_prefix_and_sort_by_team() {
        let vars = vec![
            var("STATS_CSV_URL_HUCK", "https://example.com/huck.csv"),
            var("PATH", "/usr/bin"),
            var("STATS_CSV_URL_DISC", " https://example.com/disc.csv "),
            var("STATS_CSV_URL_", "https://example.com/anonymous.csv"),
            var("STATS_CSV_URL_EMPTY", "   "),
        ];
        let sources = team_sources(vars.into_iter());
        assert_eq!(
            sources,
            vec![
                TeamSource {
                    team: "DISC".to_string(),
                    url: "https://example.com/disc.csv".to_string(),
                },
                TeamSource {
                    team: "HUCK".to_string(),
                    url: "https://example.com/huck.csv".to_string(),
                },
            ]
        );
    }

    #[test]
    fn allow_list_parses_team_membership() {
        let list = parse_allow_list(r#"{"HUCK": ["Alice", "Bob"], "DISC": []}"#).expect("valid");
        assert!(list["HUCK"].contains("Alice"));
        assert!(list["HUCK"].contains("Bob"));
        assert!(list["DISC"].is_empty());
    }

    #[test]
    fn allow_list_rejects_invalid_json() {
        assert!(parse_allow_list("{not json").is_err());
    }
}
