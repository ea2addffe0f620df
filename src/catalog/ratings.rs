use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{decode, encode, Database, DatabaseError};
use super::models::{MediaId, Rating, RatingKind, RatingOutcome, RatingSummary, UserId};
use super::tables::*;

impl Database {
    /// Set, change or clear (`kind = None`) a user's rating on a media item.
    /// Runs in one write transaction, so concurrent raters cannot interleave.
    pub fn set_rating(
        &self,
        user_id: UserId,
        media_id: MediaId,
        kind: Option<RatingKind>,
        now: DateTime<Utc>,
    ) -> Result<RatingOutcome, DatabaseError> {
        let write_txn = self.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(RATINGS)?;
            let existing: Option<Rating> = match table.get((media_id, user_id))? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };

            match (existing, kind) {
                (None, None) => RatingOutcome::NothingToRemove,
                (Some(_), None) => {
                    table.remove((media_id, user_id))?;
                    RatingOutcome::Removed
                }
                (Some(current), Some(kind)) if current.kind == kind => RatingOutcome::Unchanged,
                (existing, Some(kind)) => {
                    let rating = Rating {
                        user_id,
                        media_id,
                        kind,
                        rated_at: now,
                    };
                    let data = encode(&rating)?;
                    table.insert((media_id, user_id), data.as_slice())?;
                    if existing.is_some() {
                        RatingOutcome::Updated
                    } else {
                        RatingOutcome::Added
                    }
                }
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Every rating on a media item, ordered by user id.
    pub fn ratings_for_media(&self, media_id: MediaId) -> Result<Vec<Rating>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(RATINGS)?;

        let mut ratings = Vec::new();
        for result in table.range((media_id, u64::MIN)..=(media_id, u64::MAX))? {
            let (_, value) = result?;
            ratings.push(decode(value.value())?);
        }
        Ok(ratings)
    }

    /// Like/dislike counts for `media_id` and the sign of `user_id`'s own rating.
    pub fn rating_summary(
        &self,
        media_id: MediaId,
        user_id: UserId,
    ) -> Result<RatingSummary, DatabaseError> {
        let mut summary = RatingSummary::default();
        for rating in self.ratings_for_media(media_id)? {
            match rating.kind {
                RatingKind::Like => summary.likes += 1,
                RatingKind::Dislike => summary.dislikes += 1,
            }
            if rating.user_id == user_id {
                summary.user_rating = rating.kind.sign();
            }
        }
        Ok(summary)
    }
}
