use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MediaId = u64;
pub type UserId = u64;
pub type TagId = u64;
pub type CompanyId = u64;

/// Whether a media file is played as video or audio.
/// Derived from the storage path's extension, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

impl MediaKind {
    /// Classify a path by its (case-insensitive) extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }
}

/// A media record as written by the upload service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: MediaId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub upload_time: DateTime<Utc>,
    /// Unique on-disk location. Relative paths resolve against the media root.
    pub storage_path: String,
    pub company_id: CompanyId,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

impl MediaRecord {
    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_path(&self.storage_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingKind {
    Dislike,
    Like,
}

impl RatingKind {
    /// +1 for a like, -1 for a dislike.
    pub fn sign(self) -> i8 {
        match self {
            RatingKind::Like => 1,
            RatingKind::Dislike => -1,
        }
    }

    /// Inverse of [`RatingKind::sign`]; 0 means "no rating".
    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            1 => Some(RatingKind::Like),
            -1 => Some(RatingKind::Dislike),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub media_id: MediaId,
    pub kind: RatingKind,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewHistoryEntry {
    pub user_id: UserId,
    pub media_id: MediaId,
    pub last_viewed: DateTime<Utc>,
    pub view_count: u64,
}

/// Like/dislike totals for a media item plus one user's own rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingSummary {
    pub likes: u64,
    pub dislikes: u64,
    /// -1, 0 or 1
    pub user_rating: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    pub total_views: u64,
    pub unique_viewers: u64,
}

/// What `set_rating` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOutcome {
    Added,
    Updated,
    Removed,
    /// Asked to clear a rating that did not exist
    NothingToRemove,
    /// The requested rating equals the stored one
    Unchanged,
}
