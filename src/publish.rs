use anyhow::Result;

use crate::aggregate::PlayerGameStats;
use crate::error::PublishError;

/// Hard ceiling on rows per insert call imposed by the store's API.
pub const INSERT_BATCH_MAX: usize = 1000;

/// Remote table holding `player_stats` rows. The store must confirm each
/// inserted row; `insert` returns how many rows it confirmed.
pub trait StatsStore {
    fn delete_all(&self) -> Result<()>;
    fn insert(&self, rows: &[PlayerGameStats]) -> Result<usize>;
}

/// Replace the full contents of the remote table with `records`.
///
/// Deletes every existing row, then inserts `records` in order in batches
/// of at most [`INSERT_BATCH_MAX`]. The sequence is deliberately not
/// transactional: a failure after the delete leaves the table empty or
/// partially filled, and the error reports how many rows were confirmed
/// before the abort.
pub fn publish(
    store: &impl StatsStore,
    records: &[PlayerGameStats],
) -> Result<usize, PublishError> {
    if records.is_empty() {
        return Err(PublishError::NoData);
    }

    store.delete_all().map_err(PublishError::DeleteFailed)?;

    let total = records.len();
    let mut uploaded = 0usize;
    for batch in records.chunks(INSERT_BATCH_MAX) {
        let confirmed = match store.insert(batch) {
            Ok(confirmed) => confirmed,
            Err(_) => return Err(PublishError::PartialUpload { uploaded, total }),
        };
        if confirmed != batch.len() {
            return Err(PublishError::PartialUpload { uploaded, total });
        }
        uploaded += confirmed;
    }

    Ok(uploaded)
}
