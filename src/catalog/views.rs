use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{decode, encode, Database, DatabaseError};
use super::models::{MediaId, MediaKind, MediaRecord, UserId, ViewHistoryEntry, ViewStats};
use super::tables::*;

impl Database {
    /// Upsert a playback: refresh the timestamp and bump the count, or create
    /// the entry with a count of 1. The read-modify-write happens inside a
    /// single write transaction, so simultaneous plays never lose an increment.
    pub fn record_view(
        &self,
        user_id: UserId,
        media_id: MediaId,
        now: DateTime<Utc>,
    ) -> Result<ViewHistoryEntry, DatabaseError> {
        let write_txn = self.begin_write()?;
        let entry = {
            let mut history = write_txn.open_table(VIEW_HISTORY)?;
            let existing: Option<ViewHistoryEntry> = match history.get((user_id, media_id))? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };

            let entry = match existing {
                Some(mut entry) => {
                    entry.last_viewed = now;
                    entry.view_count += 1;
                    entry
                }
                None => ViewHistoryEntry {
                    user_id,
                    media_id,
                    last_viewed: now,
                    view_count: 1,
                },
            };

            let data = encode(&entry)?;
            history.insert((user_id, media_id), data.as_slice())?;

            let mut viewers = write_txn.open_table(MEDIA_VIEWERS)?;
            viewers.insert((media_id, user_id), entry.view_count)?;
            entry
        };
        write_txn.commit()?;

        tracing::debug!(
            user_id,
            media_id,
            view_count = entry.view_count,
            "Recorded view"
        );
        Ok(entry)
    }

    pub fn get_view_entry(
        &self,
        user_id: UserId,
        media_id: MediaId,
    ) -> Result<Option<ViewHistoryEntry>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(VIEW_HISTORY)?;

        match table.get((user_id, media_id))? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    /// A user's view history, most recent first (ties broken by media id).
    pub fn view_history(&self, user_id: UserId) -> Result<Vec<ViewHistoryEntry>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(VIEW_HISTORY)?;

        let mut entries: Vec<ViewHistoryEntry> = Vec::new();
        for result in table.range((user_id, u64::MIN)..=(user_id, u64::MAX))? {
            let (_, value) = result?;
            entries.push(decode(value.value())?);
        }
        entries.sort_by(|a, b| {
            b.last_viewed
                .cmp(&a.last_viewed)
                .then(a.media_id.cmp(&b.media_id))
        });
        Ok(entries)
    }

    /// Up to `limit` media of `kind` the user viewed most recently.
    /// History entries whose media row has gone away are skipped.
    pub fn recently_viewed(
        &self,
        user_id: UserId,
        kind: MediaKind,
        limit: usize,
    ) -> Result<Vec<MediaRecord>, DatabaseError> {
        let history = self.view_history(user_id)?;

        let mut recent = Vec::with_capacity(limit.min(history.len()));
        for entry in history {
            if recent.len() == limit {
                break;
            }
            match self.get_media(entry.media_id)? {
                Some(media) if media.kind() == Some(kind) => recent.push(media),
                _ => {}
            }
        }
        Ok(recent)
    }

    /// Sum of view counts and number of distinct viewers for a media item.
    pub fn view_stats(&self, media_id: MediaId) -> Result<ViewStats, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(MEDIA_VIEWERS)?;

        let mut stats = ViewStats::default();
        for result in table.range((media_id, u64::MIN)..=(media_id, u64::MAX))? {
            let (_, count) = result?;
            stats.total_views += count.value();
            stats.unique_viewers += 1;
        }
        Ok(stats)
    }
}
