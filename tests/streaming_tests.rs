use media_stream::streaming::{open_chunk, ByteRange, StreamError};
use tokio::io::AsyncReadExt;

/// 1000 bytes where byte i == i % 251, so any slice is recognisable.
fn sample_bytes() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 251) as u8).collect()
}

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("sample.mp4");
    std::fs::write(&path, sample_bytes()).unwrap();
    path
}

async fn read_range(path: &std::path::Path, header: Option<&str>) -> (u64, u64, u64, Vec<u8>) {
    let range = match header {
        Some(h) => ByteRange::parse(h).unwrap(),
        None => ByteRange::full(),
    };
    let (chunk, mut reader) = open_chunk(path, range).await.unwrap();
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await.unwrap();
    (chunk.start, chunk.length, chunk.file_size, body)
}

#[tokio::test]
async fn test_closed_range_is_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);

    let (start, length, size, body) = read_range(&path, Some("bytes=100-199")).await;
    assert_eq!((start, length, size), (100, 100, 1000));
    assert_eq!(body, sample_bytes()[100..200].to_vec());
}

#[tokio::test]
async fn test_open_range_reads_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);

    let (start, length, _, body) = read_range(&path, Some("bytes=900-")).await;
    assert_eq!((start, length), (900, 100));
    assert_eq!(body, sample_bytes()[900..].to_vec());
}

#[tokio::test]
async fn test_no_range_serves_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);

    let (start, length, size, body) = read_range(&path, None).await;
    assert_eq!((start, length, size), (0, 1000, 1000));
    assert_eq!(body, sample_bytes());
}

#[tokio::test]
async fn test_end_past_file_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);

    let (start, length, _, body) = read_range(&path, Some("bytes=990-5000")).await;
    assert_eq!((start, length), (990, 10));
    assert_eq!(body.len(), 10);
}

#[tokio::test]
async fn test_start_past_file_yields_empty_body() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);

    for header in ["bytes=1000-", "bytes=4000-5000"] {
        let (start, length, size, body) = read_range(&path, Some(header)).await;
        assert_eq!(start, 1000, "{header}");
        assert_eq!(length, 0, "{header}");
        assert_eq!(size, 1000, "{header}");
        assert!(body.is_empty(), "{header}");
    }
}

#[tokio::test]
async fn test_consecutive_ranges_reassemble_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);

    let mut assembled = Vec::new();
    for (from, to) in [(0, 332), (333, 665), (666, 999)] {
        let (_, _, size, body) = read_range(&path, Some(&format!("bytes={from}-{to}"))).await;
        assert_eq!(size, 1000);
        assembled.extend(body);
    }
    assert_eq!(assembled, sample_bytes());
}

#[tokio::test]
async fn test_missing_file_is_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let result = open_chunk(&dir.path().join("gone.mp4"), ByteRange::full()).await;
    assert!(matches!(result, Err(StreamError::FileNotFound(_))));
}

#[tokio::test]
async fn test_directory_is_not_a_media_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = open_chunk(dir.path(), ByteRange::full()).await;
    assert!(matches!(result, Err(StreamError::FileNotFound(_))));
}
