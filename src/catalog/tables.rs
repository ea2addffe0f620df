use redb::TableDefinition;

/// Media records: media id -> MediaRecord (msgpack)
pub const MEDIA: TableDefinition<u64, &[u8]> = TableDefinition::new("media");

/// Tags: tag id -> Tag (msgpack)
pub const TAGS: TableDefinition<u64, &[u8]> = TableDefinition::new("tags");

/// Unique tag name index: name -> tag id
pub const TAG_NAMES: TableDefinition<&str, u64> = TableDefinition::new("tag_names");

/// Companies: company id -> Company (msgpack)
pub const COMPANIES: TableDefinition<u64, &[u8]> = TableDefinition::new("companies");

/// Ratings: (media id, user id) -> Rating (msgpack). At most one per pair.
pub const RATINGS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("ratings");

/// View history: (user id, media id) -> ViewHistoryEntry (msgpack)
pub const VIEW_HISTORY: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("view_history");

/// Per-media viewer index: (media id, user id) -> cumulative view count
pub const MEDIA_VIEWERS: TableDefinition<(u64, u64), u64> = TableDefinition::new("media_viewers");
