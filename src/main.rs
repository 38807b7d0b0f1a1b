use anyhow::{Context, Result, anyhow};

use ultistats_sync::aggregate::{PlayerGameStats, aggregate};
use ultistats_sync::config;
use ultistats_sync::fetch::fetch_csv;
use ultistats_sync::publish::publish;
use ultistats_sync::supabase::SupabaseStore;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let sources = config::team_sources_from_env();
    if sources.is_empty() {
        return Err(anyhow!(
            "no team sources configured, expected STATS_CSV_URL_<TEAM> entries"
        ));
    }
    let allow_list = config::allow_list_from_env()?;
    let store = SupabaseStore::from_env()?;

    // Best effort across teams: a bad source skips that team only. The
    // combined upload at the end is all-or-abort.
    let mut combined: Vec<PlayerGameStats> = Vec::new();
    let mut skipped = 0usize;
    for source in &sources {
        let raw = match fetch_csv(&source.url) {
            Ok(raw) => raw,
            Err(err) => {
                eprintln!("team {}: fetch failed, skipping: {err}", source.team);
                skipped += 1;
                continue;
            }
        };
        match aggregate(&raw, &source.team, allow_list.as_ref()) {
            Ok(records) => {
                println!(
                    "team {}: {} player/game records",
                    source.team,
                    records.len()
                );
                combined.extend(records);
            }
            Err(err) => {
                eprintln!("team {}: {err}, skipping", source.team);
                skipped += 1;
            }
        }
    }

    println!(
        "teams: {}/{} aggregated, {} records total",
        sources.len() - skipped,
        sources.len(),
        combined.len()
    );

    let uploaded = publish(&store, &combined).context("publish to player_stats failed")?;
    println!("uploaded {uploaded} records to player_stats");

    Ok(())
}
