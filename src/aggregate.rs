use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::MalformedInputError;

/// Optional per-team restriction: team identifier -> player names to track.
pub type AllowList = HashMap<String, HashSet<String>>;

/// Number of `Player {i}` roster columns in the source export.
const ROSTER_COLUMNS: usize = 7;

/// One row of the remote `player_stats` table: a player's totals for one
/// game (identified by tournament + opponent) within one season export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerGameStats {
    pub timestamp: String,
    pub player_name: String,
    pub game_played: String,
    pub tournament_played: String,
    pub goals: u32,
    pub assists: u32,
    pub drops: u32,
    pub throwaways: u32,
    pub ds: u32,
}

#[derive(Debug, Default)]
struct StatLine {
    goals: u32,
    assists: u32,
    drops: u32,
    throwaways: u32,
    ds: u32,
}

/// (player, tournament, opponent)
type StatKey = (String, String, String);

/// Flat accumulator store: one slot per (player, tournament, opponent),
/// held in first-encounter order with an index for get-or-insert.
#[derive(Default)]
struct Accumulators {
    slots: Vec<(StatKey, StatLine)>,
    index: HashMap<StatKey, usize>,
}

impl Accumulators {
    fn entry(&mut self, player: &str, tournament: &str, opponent: &str) -> &mut StatLine {
        let key = (
            player.to_string(),
            tournament.to_string(),
            opponent.to_string(),
        );
        let idx = match self.index.get(&key) {
            Some(idx) => *idx,
            None => {
                let idx = self.slots.len();
                self.slots.push((key.clone(), StatLine::default()));
                self.index.insert(key, idx);
                idx
            }
        };
        &mut self.slots[idx].1
    }

    fn into_records(
        self,
        game_timestamps: &HashMap<(String, String), String>,
    ) -> Vec<PlayerGameStats> {
        self.slots
            .into_iter()
            .map(|((player, tournament, opponent), line)| {
                let timestamp = game_timestamps
                    .get(&(tournament.clone(), opponent.clone()))
                    .cloned()
                    .unwrap_or_default();
                PlayerGameStats {
                    timestamp,
                    player_name: player,
                    game_played: opponent,
                    tournament_played: tournament,
                    goals: line.goals,
                    assists: line.assists,
                    drops: line.drops,
                    throwaways: line.throwaways,
                    ds: line.ds,
                }
            })
            .collect()
    }
}

/// Column indexes resolved from the header row. The timestamp column is
/// always the first column, whatever its header says; the rest are matched
/// by name and degrade to the empty string when absent.
struct Columns {
    passer: Option<usize>,
    receiver: Option<usize>,
    defender: Option<usize>,
    action: Option<usize>,
    tournament: Option<usize>,
    opponent: Option<usize>,
    roster: [Option<usize>; ROSTER_COLUMNS],
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Self {
        Self {
            passer: find_column(headers, "Passer"),
            receiver: find_column(headers, "Receiver"),
            defender: find_column(headers, "Defender"),
            action: find_column(headers, "Action"),
            // The source export misspells this header; matched as-is.
            tournament: find_column(headers, "Tournamemnt"),
            opponent: find_column(headers, "Opponent"),
            roster: std::array::from_fn(|i| find_column(headers, &format!("Player {i}"))),
        }
    }
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Aggregate a raw per-event CSV export into per-player, per-game stat
/// totals for `team`.
///
/// Rows with an empty tournament or opponent are discarded. A player
/// appearing only in a `Player {i}` roster column still produces a record
/// with all counters at zero. When `allow_list` has an entry for `team`,
/// only its members are tracked; otherwise every named player is.
pub fn aggregate(
    raw_text: &str,
    team: &str,
    allow_list: Option<&AllowList>,
) -> Result<Vec<PlayerGameStats>, MalformedInputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw_text.as_bytes());
    let headers = rdr.headers().map_err(|_| MalformedInputError)?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(MalformedInputError);
    }
    let cols = Columns::resolve(&headers);

    let mut acc = Accumulators::default();
    let mut game_timestamps: HashMap<(String, String), String> = HashMap::new();

    for result in rdr.records() {
        let Ok(record) = result else {
            continue;
        };
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let tournament = field(cols.tournament);
        let opponent = field(cols.opponent);
        if tournament.is_empty() || opponent.is_empty() {
            continue;
        }

        // Timestamp is a per-game attribute; keep the first non-empty one.
        let timestamp = record.get(0).unwrap_or("").trim();
        if !timestamp.is_empty() {
            game_timestamps
                .entry((tournament.to_string(), opponent.to_string()))
                .or_insert_with(|| timestamp.to_string());
        }

        let passer = field(cols.passer);
        let receiver = field(cols.receiver);
        let defender = field(cols.defender);

        match field(cols.action) {
            "Goal" => {
                if is_tracked(passer, team, allow_list) {
                    acc.entry(passer, tournament, opponent).assists += 1;
                }
                if is_tracked(receiver, team, allow_list) {
                    acc.entry(receiver, tournament, opponent).goals += 1;
                }
            }
            "D" => {
                if is_tracked(defender, team, allow_list) {
                    acc.entry(defender, tournament, opponent).ds += 1;
                }
            }
            "Throwaway" => {
                if is_tracked(passer, team, allow_list) {
                    acc.entry(passer, tournament, opponent).throwaways += 1;
                }
            }
            "Drop" => {
                if is_tracked(receiver, team, allow_list) {
                    acc.entry(receiver, tournament, opponent).drops += 1;
                }
            }
            _ => {}
        }

        // Roster mentions create a record even with no stat events.
        for slot in cols.roster {
            let player = field(slot);
            if is_tracked(player, team, allow_list) {
                acc.entry(player, tournament, opponent);
            }
        }
    }

    Ok(acc.into_records(&game_timestamps))
}

fn is_tracked(name: &str, team: &str, allow_list: Option<&AllowList>) -> bool {
    if name.is_empty() {
        return false;
    }
    match allow_list.and_then(|list| list.get(team)) {
        Some(players) => players.contains(name),
        None => true,
    }
}
