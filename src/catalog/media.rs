use redb::ReadableTable;

use super::db::{decode, encode, Database, DatabaseError};
use super::models::{Company, CompanyId, MediaId, MediaKind, MediaRecord, Tag, TagId};
use super::tables::*;

impl Database {
    // ========================================================================
    // Media
    // ========================================================================

    /// Insert or replace a media record
    pub fn put_media(&self, media: &MediaRecord) -> Result<(), DatabaseError> {
        debug_assert!(
            !media.storage_path.is_empty(),
            "media storage path must not be empty"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(MEDIA)?;
            let data = encode(media)?;
            table.insert(media.id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_media(&self, id: MediaId) -> Result<Option<MediaRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(MEDIA)?;

        match table.get(id)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    /// All media in id order, optionally restricted to one kind.
    /// Records whose extension maps to no kind only appear when `kind` is `None`.
    pub fn list_media(&self, kind: Option<MediaKind>) -> Result<Vec<MediaRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(MEDIA)?;

        let mut media = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let record: MediaRecord = decode(value.value())?;
            if kind.is_none() || record.kind() == kind {
                media.push(record);
            }
        }
        Ok(media)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Insert or replace a tag. Tag names are unique across ids.
    pub fn put_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut names = write_txn.open_table(TAG_NAMES)?;
            let owner = names.get(tag.name.as_str())?.map(|v| v.value());
            if let Some(owner) = owner {
                if owner != tag.id {
                    return Err(DatabaseError::Constraint(format!(
                        "tag name '{}' already belongs to tag {owner}",
                        tag.name
                    )));
                }
            }

            let mut table = write_txn.open_table(TAGS)?;
            let previous: Option<Tag> = match table.get(tag.id)? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };
            if let Some(previous) = previous {
                if previous.name != tag.name {
                    names.remove(previous.name.as_str())?;
                }
            }

            let data = encode(tag)?;
            table.insert(tag.id, data.as_slice())?;
            names.insert(tag.name.as_str(), tag.id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Resolve tag ids, skipping ids with no tag row. Order follows `ids`.
    pub fn get_tags(&self, ids: &[TagId]) -> Result<Vec<Tag>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TAGS)?;

        let mut tags = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(data) = table.get(*id)? {
                tags.push(decode(data.value())?);
            }
        }
        Ok(tags)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TAGS)?;

        let mut tags = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            tags.push(decode(value.value())?);
        }
        Ok(tags)
    }

    // ========================================================================
    // Companies
    // ========================================================================

    pub fn put_company(&self, company: &Company) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(COMPANIES)?;
            let data = encode(company)?;
            table.insert(company.id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_company(&self, id: CompanyId) -> Result<Option<Company>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COMPANIES)?;

        match table.get(id)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }
}
