//! Tag-weighted "what to watch next" ranking.
//!
//! Each media kind is ranked on its own. The personalized phase looks at the
//! user's most recent views, builds a tag frequency profile and scores fresh
//! uploads sharing those tags. When that yields fewer than the target size,
//! the cold-start phase tops the list up from the whole catalog, ranked by
//! community rating alone.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::catalog::{Database, DatabaseError, MediaId, MediaKind, MediaRecord, Rating, RatingKind, TagId, UserId};
use crate::config::RecommendationConfig;

const LIKE_FACTOR: f64 = 0.5;
const DISLIKE_FACTOR: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMedia {
    pub media: MediaRecord,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub video: Vec<MediaRecord>,
    pub audio: Vec<MediaRecord>,
}

/// `exp(-days / decay_days)` over whole elapsed days. Ratings stamped in the
/// future count as fresh.
pub fn time_decay(rated_at: DateTime<Utc>, now: DateTime<Utc>, decay_days: f64) -> f64 {
    let days = (now - rated_at).num_days().max(0) as f64;
    (-days / decay_days).exp()
}

#[derive(Debug, Clone)]
pub struct Recommender {
    config: RecommendationConfig,
}

impl Recommender {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Rank both kinds for `user_id`. Any catalog failure fails the whole call.
    pub fn recommend(
        &self,
        db: &Database,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Recommendations, DatabaseError> {
        let video = self.recommend_kind(db, user_id, MediaKind::Video, now)?;
        let audio = self.recommend_kind(db, user_id, MediaKind::Audio, now)?;
        Ok(Recommendations {
            video: video.into_iter().map(|s| s.media).collect(),
            audio: audio.into_iter().map(|s| s.media).collect(),
        })
    }

    /// Personalized entries first, then cold-start fill, each sorted by its
    /// own score (descending, stable).
    pub fn recommend_kind(
        &self,
        db: &Database,
        user_id: UserId,
        kind: MediaKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredMedia>, DatabaseError> {
        let recent = db.recently_viewed(user_id, kind, self.config.recent_history_size)?;
        let catalog = by_upload_recency(db.list_media(Some(kind))?);
        let mut ratings = RatingCache::new(db);

        let mut ranked = if recent.is_empty() {
            Vec::new()
        } else {
            self.personalized(&recent, &catalog, &mut ratings, now)?
        };

        let target = self.config.target_size;
        if ranked.len() < target {
            let selected: HashSet<MediaId> = ranked.iter().map(|s| s.media.id).collect();
            let mut fill = Vec::new();
            for media in catalog.iter().filter(|m| !selected.contains(&m.id)) {
                let score = self.rating_signal(ratings.get(media.id)?, now);
                fill.push(ScoredMedia {
                    media: media.clone(),
                    score,
                });
            }
            sort_by_score(&mut fill);
            fill.truncate(target - ranked.len());
            ranked.extend(fill);
        }

        tracing::debug!(
            user_id,
            kind = ?kind,
            recent = recent.len(),
            results = ranked.len(),
            "Computed recommendations"
        );
        Ok(ranked)
    }

    fn personalized(
        &self,
        recent: &[MediaRecord],
        catalog: &[MediaRecord],
        ratings: &mut RatingCache<'_>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredMedia>, DatabaseError> {
        let recent_ids: HashSet<MediaId> = recent.iter().map(|m| m.id).collect();

        // A tag on three of the recent items counts three.
        let mut tag_counts: HashMap<TagId, u32> = HashMap::new();
        for media in recent {
            for tag in distinct_tags(media) {
                *tag_counts.entry(tag).or_default() += 1;
            }
        }

        let cutoff = Duration::try_days(self.config.candidate_window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut scored = Vec::new();
        for media in catalog {
            if media.upload_time < cutoff || recent_ids.contains(&media.id) {
                continue;
            }

            let tag_weight: u32 = distinct_tags(media)
                .filter_map(|tag| tag_counts.get(&tag))
                .sum();
            // With no tags in the history every fresh upload is a candidate.
            if !tag_counts.is_empty() && tag_weight == 0 {
                continue;
            }

            let score = f64::from(tag_weight) + self.rating_signal(ratings.get(media.id)?, now);
            scored.push(ScoredMedia {
                media: media.clone(),
                score,
            });
        }

        sort_by_score(&mut scored);
        Ok(scored)
    }

    /// `likes * 0.5 - dislikes * 0.2`, each rating weighted by its age.
    fn rating_signal(&self, ratings: &[Rating], now: DateTime<Utc>) -> f64 {
        let decay_days = self.config.rating_decay_days;
        let (likes, dislikes) = ratings
            .iter()
            .fold((0.0, 0.0), |(likes, dislikes), rating| {
                let decay = time_decay(rating.rated_at, now, decay_days);
                match rating.kind {
                    RatingKind::Like => (likes + decay, dislikes),
                    RatingKind::Dislike => (likes, dislikes + decay),
                }
            });
        likes * LIKE_FACTOR - dislikes * DISLIKE_FACTOR
    }
}

/// Per-request memo of ratings so a media item is read at most once.
struct RatingCache<'a> {
    db: &'a Database,
    ratings: HashMap<MediaId, Vec<Rating>>,
}

impl<'a> RatingCache<'a> {
    fn new(db: &'a Database) -> Self {
        Self {
            db,
            ratings: HashMap::new(),
        }
    }

    fn get(&mut self, media_id: MediaId) -> Result<&[Rating], DatabaseError> {
        if !self.ratings.contains_key(&media_id) {
            let loaded = self.db.ratings_for_media(media_id)?;
            self.ratings.insert(media_id, loaded);
        }
        Ok(self.ratings.get(&media_id).map(Vec::as_slice).unwrap_or_default())
    }
}

fn distinct_tags(media: &MediaRecord) -> impl Iterator<Item = TagId> + '_ {
    let mut seen = HashSet::new();
    media.tag_ids.iter().copied().filter(move |t| seen.insert(*t))
}

/// Newest upload first, id as tie-breaker, so later stable sorts are deterministic.
fn by_upload_recency(mut media: Vec<MediaRecord>) -> Vec<MediaRecord> {
    media.sort_by(|a, b| b.upload_time.cmp(&a.upload_time).then(a.id.cmp(&b.id)));
    media
}

fn sort_by_score(scored: &mut [ScoredMedia]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}
