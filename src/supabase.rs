use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::aggregate::PlayerGameStats;
use crate::fetch::{body_snippet, http_client};
use crate::publish::StatsStore;

const STATS_TABLE: &str = "player_stats";

/// PostgREST adapter for the hosted `player_stats` table.
///
/// The service-role key is sent as both `apikey` and bearer token so this
/// job can modify rows while RLS stays enabled on the table.
pub struct SupabaseStore {
    base_url: String,
    service_key: String,
    client: &'static Client,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            client: http_client()?,
        })
    }

    /// Build a store from `SUPABASE_URL` / `SUPABASE_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?;
        let service_key = std::env::var("SUPABASE_KEY").context("SUPABASE_KEY is not set")?;
        Self::new(base_url, service_key)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{STATS_TABLE}", self.base_url)
    }
}

impl StatsStore for SupabaseStore {
    fn delete_all(&self) -> Result<()> {
        // Full-table wipe: every row id is >= 0.
        let resp = self
            .client
            .delete(self.table_url())
            .query(&[("id", "gte.0")])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .context("delete request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "delete failed with http {status}: {}",
                body_snippet(&body)
            ));
        }
        Ok(())
    }

    fn insert(&self, rows: &[PlayerGameStats]) -> Result<usize> {
        let resp = self
            .client
            .post(self.table_url())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .context("insert request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading insert response")?;
        if !status.is_success() {
            return Err(anyhow!(
                "insert failed with http {status}: {}",
                body_snippet(&body)
            ));
        }

        // The store echoes inserted rows back; the echo length is the
        // confirmation count the publish protocol checks per batch.
        let echoed: Vec<Value> =
            serde_json::from_str(&body).context("invalid insert response json")?;
        Ok(echoed.len())
    }
}
