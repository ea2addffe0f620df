//! Byte-range reads of media files.
//!
//! A request's `Range` header is parsed and validated before any file is
//! touched, then planned against the real file size. Reads seek to the start
//! offset and are capped at the planned length, so memory use never depends on
//! the size of the file.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Media file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounds requested by a `Range: bytes=<start>-<end>` header. `end` is inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// The whole file, as served when no Range header is sent.
    pub fn full() -> Self {
        Self::default()
    }

    /// Parse a single `bytes=<start>-[<end>]` range. Suffix ranges
    /// (`bytes=-N`) are rejected rather than guessed at.
    pub fn parse(header: &str) -> Result<Self, StreamError> {
        let ranges = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or_else(|| StreamError::InvalidRange(format!("unsupported range unit in '{header}'")))?
            .trim();

        if ranges.contains(',') {
            return Err(StreamError::InvalidRange(
                "multiple ranges are not supported".to_string(),
            ));
        }

        let (start, end) = ranges
            .split_once('-')
            .ok_or_else(|| StreamError::InvalidRange(format!("missing '-' in '{header}'")))?;

        let start = parse_bound(start, "start")?.ok_or_else(|| {
            StreamError::InvalidRange("suffix ranges are not supported".to_string())
        })?;
        let end = parse_bound(end, "end")?;

        if let Some(end) = end {
            if start > end {
                return Err(StreamError::InvalidRange(format!(
                    "start {start} is greater than end {end}"
                )));
            }
        }

        Ok(Self { start, end })
    }
}

fn parse_bound(raw: &str, which: &str) -> Result<Option<u64>, StreamError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| StreamError::InvalidRange(format!("{which} '{raw}' is not a non-negative integer")))
}

/// The exact slice of a file that will be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: u64,
    pub length: u64,
    pub file_size: u64,
}

impl Chunk {
    /// Clamp a requested range to a file of `file_size` bytes.
    ///
    /// A start past the end of the file clamps to `file_size` and yields an
    /// empty chunk rather than an error.
    pub fn plan(range: ByteRange, file_size: u64) -> Self {
        let start = range.start.min(file_size);
        let remaining = file_size - start;
        let length = match range.end {
            Some(end) => end.saturating_add(1).saturating_sub(start).min(remaining),
            None => remaining,
        };
        Self {
            start,
            length,
            file_size,
        }
    }

    /// Value for the `Content-Range` header. An empty chunk reports
    /// `start-(start-1)`, e.g. `bytes 100-99/100`.
    pub fn content_range(&self) -> String {
        let last = i128::from(self.start) + i128::from(self.length) - 1;
        format!("bytes {}-{}/{}", self.start, last, self.file_size)
    }
}

/// Open `path`, seek to the planned start and return a reader limited to the
/// planned length. The file handle is owned by the reader and closed when it
/// is dropped, including when a client disconnects mid-stream.
pub async fn open_chunk(path: &Path, range: ByteRange) -> Result<(Chunk, Take<File>), StreamError> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StreamError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(StreamError::FileNotFound(path.to_path_buf()));
    }

    let chunk = Chunk::plan(range, metadata.len());
    file.seek(SeekFrom::Start(chunk.start)).await?;
    Ok((chunk, file.take(chunk.length)))
}

/// Content type for a display filename, by extension.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Absolute storage paths are used as-is; relative ones live under `media_root`.
pub fn resolve_storage_path(media_root: &Path, storage_path: &str) -> PathBuf {
    let path = Path::new(storage_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        media_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_range() {
        let range = ByteRange::parse("bytes=10-19").unwrap();
        assert_eq!(range.start, 10);
        assert_eq!(range.end, Some(19));
    }

    #[test]
    fn test_parse_open_end() {
        let range = ByteRange::parse("bytes=500-").unwrap();
        assert_eq!(range.start, 500);
        assert_eq!(range.end, None);
    }

    #[test]
    fn test_parse_rejects_suffix_range() {
        for header in ["bytes=-99", "bytes=-", "bytes= -500"] {
            assert!(
                matches!(ByteRange::parse(header), Err(StreamError::InvalidRange(_))),
                "{header}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_start_after_end() {
        assert!(matches!(
            ByteRange::parse("bytes=20-10"),
            Err(StreamError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(ByteRange::parse("bytes=-5-10").is_err());
        assert!(ByteRange::parse("bytes=abc-10").is_err());
        assert!(ByteRange::parse("bytes=10").is_err());
        assert!(ByteRange::parse("items=0-10").is_err());
        assert!(ByteRange::parse("bytes=0-1,5-6").is_err());
    }

    #[test]
    fn test_plan_inside_file() {
        let chunk = Chunk::plan(ByteRange::parse("bytes=10-19").unwrap(), 100);
        assert_eq!(chunk.start, 10);
        assert_eq!(chunk.length, 10);
        assert_eq!(chunk.content_range(), "bytes 10-19/100");
    }

    #[test]
    fn test_plan_clamps_end_to_file() {
        let chunk = Chunk::plan(ByteRange::parse("bytes=90-500").unwrap(), 100);
        assert_eq!(chunk.length, 10);
        assert_eq!(chunk.content_range(), "bytes 90-99/100");
    }

    #[test]
    fn test_plan_full_file() {
        let chunk = Chunk::plan(ByteRange::full(), 100);
        assert_eq!(chunk.start, 0);
        assert_eq!(chunk.length, 100);
        assert_eq!(chunk.content_range(), "bytes 0-99/100");
    }

    #[test]
    fn test_plan_start_at_file_size_is_empty() {
        let chunk = Chunk::plan(ByteRange::parse("bytes=100-").unwrap(), 100);
        assert_eq!(chunk.start, 100);
        assert_eq!(chunk.length, 0);
        assert_eq!(chunk.content_range(), "bytes 100-99/100");
    }

    #[test]
    fn test_plan_start_beyond_file_clamps() {
        for header in ["bytes=150-", "bytes=150-200", "bytes=1000-2000"] {
            let chunk = Chunk::plan(ByteRange::parse(header).unwrap(), 100);
            assert_eq!(chunk.start, 100, "{header}");
            assert_eq!(chunk.length, 0, "{header}");
            assert_eq!(chunk.file_size, 100, "{header}");
        }
    }

    #[test]
    fn test_plan_empty_file() {
        let chunk = Chunk::plan(ByteRange::full(), 0);
        assert_eq!(chunk.length, 0);
        assert_eq!(chunk.content_range(), "bytes 0--1/0");
    }

    #[test]
    fn test_plan_end_at_u64_max_does_not_overflow() {
        let range = ByteRange {
            start: 5,
            end: Some(u64::MAX),
        };
        assert_eq!(Chunk::plan(range, 10).length, 5);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("song.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("No Extension"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_resolve_storage_path() {
        let root = Path::new("/srv/media");
        assert_eq!(
            resolve_storage_path(root, "a/b.mp4"),
            PathBuf::from("/srv/media/a/b.mp4")
        );
        assert_eq!(
            resolve_storage_path(root, "/data/c.mp4"),
            PathBuf::from("/data/c.mp4")
        );
    }
}
