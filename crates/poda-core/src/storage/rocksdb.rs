use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::failed_message::{FailedMessage, FailedMessageSummary};
use crate::storage::traits::{MessageStore, WriteBatchOp};

const CF_DOCUMENTS: &str = "failed_messages";
const CF_SUMMARIES: &str = "failed_message_summaries";
const CF_META: &str = "meta";

/// All column family names (excluding `default` which RocksDB creates
/// automatically). Documents and summaries share the same key: the raw
/// 16 bytes of the derived document id, so iteration order is ascending
/// document id.
const COLUMN_FAMILIES: &[&str] = &[CF_DOCUMENTS, CF_SUMMARIES, CF_META];

/// Marker written by `close`. While a session is open the marker is absent;
/// finding it absent on open means the previous session did not shut down
/// cleanly and the summaries projection cannot be trusted.
const META_CLEAN_SHUTDOWN: &[u8] = b"clean_shutdown";

type DB = DBWithThreadMode<MultiThreaded>;

/// RocksDB-backed failed-message store.
///
/// The handle assumes exclusive access for its whole lifetime; RocksDB's
/// LOCK file refuses a second opener. Release is by RAII on every exit
/// path. `close` is the additional clean-exit step that records a clean
/// shutdown so the next `open` can skip the projection rebuild.
pub struct RocksDbStore {
    db: DB,
}

impl RocksDbStore {
    /// Open an existing store at the given directory.
    ///
    /// A maintenance run must never materialize an empty database at a
    /// mistyped path, so a missing or malformed directory is an error. If
    /// the previous session did not close cleanly, the summaries projection
    /// is rebuilt from the documents before anything trusts it.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        // The engine creates the directory and an info log on open even with
        // `create_if_missing` off, so the path is vetted before it reaches
        // the engine.
        if !path.is_dir() {
            return Err(StorageError::Open {
                path: path.display().to_string(),
                message: "directory does not exist".to_string(),
            });
        }
        if !path.join("CURRENT").is_file() {
            return Err(StorageError::Open {
                path: path.display().to_string(),
                message: "no database found (missing CURRENT file)".to_string(),
            });
        }

        let mut db_opts = Options::default();
        db_opts.create_if_missing(false);
        db_opts.create_missing_column_families(true);

        let store = Self::open_with(&db_opts, path)?;
        if !store.take_clean_marker()? {
            store.rebuild_summaries()?;
        }
        Ok(store)
    }

    /// Create a new, empty store at the given directory.
    ///
    /// This is the bootstrap path of the owning service (and of test
    /// fixtures); the maintenance tool only ever opens existing stores.
    pub fn create(path: impl AsRef<Path>) -> StorageResult<Self> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        Self::open_with(&db_opts, path.as_ref())
    }

    /// Record a clean shutdown and release the store.
    ///
    /// Dropping the handle without calling `close` leaves the marker
    /// absent, so the next `open` rebuilds the summaries projection.
    pub fn close(self) -> StorageResult<()> {
        let cf = self.cf(CF_META)?;
        self.db.put_cf(&cf, META_CLEAN_SHUTDOWN, b"1")?;
        Ok(())
    }

    fn open_with(db_opts: &Options, path: &Path) -> StorageResult<Self> {
        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(db_opts, path, cf_descriptors).map_err(|e| {
            StorageError::Open {
                path: path.display().to_string(),
                message: e.into_string(),
            }
        })?;
        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> StorageResult<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::RocksDb(format!("column family not found: {name}")))
    }

    /// Consume the clean-shutdown marker. Returns whether it was present.
    fn take_clean_marker(&self) -> StorageResult<bool> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(&cf, META_CLEAN_SHUTDOWN)? {
            Some(_) => {
                self.db.delete_cf(&cf, META_CLEAN_SHUTDOWN)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop the summaries column family and re-project it from the
    /// documents. Runs when a session ended without `close`; until it
    /// finishes the projection must not be trusted.
    fn rebuild_summaries(&self) -> StorageResult<()> {
        self.db.drop_cf(CF_SUMMARIES)?;
        self.db.create_cf(CF_SUMMARIES, &Options::default())?;

        let documents = self.cf(CF_DOCUMENTS)?;
        let summaries = self.cf(CF_SUMMARIES)?;

        let mut batch = WriteBatch::default();
        let mut count = 0u64;
        for item in self.db.iterator_cf(&documents, IteratorMode::Start) {
            let (key, value) = item?;
            let document: FailedMessage = serde_json::from_slice(&value)?;
            let summary = FailedMessageSummary::from(&document);
            batch.put_cf(&summaries, key, serde_json::to_vec(&summary)?);
            count += 1;
        }
        self.db.write(batch)?;

        info!(documents = count, "rebuilt summaries after unclean shutdown");
        Ok(())
    }
}

impl MessageStore for RocksDbStore {
    fn list_summaries(
        &self,
        start: usize,
        limit: usize,
        group_id: Option<&str>,
    ) -> StorageResult<Vec<FailedMessageSummary>> {
        let cf = self.cf(CF_SUMMARIES)?;

        let mut page = Vec::new();
        if limit == 0 {
            return Ok(page);
        }

        let mut skipped = 0usize;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let summary: FailedMessageSummary = serde_json::from_slice(&value)?;

            if let Some(group) = group_id {
                if !summary.group_ids.iter().any(|g| g == group) {
                    continue;
                }
            }
            if skipped < start {
                skipped += 1;
                continue;
            }

            page.push(summary);
            if page.len() == limit {
                break;
            }
        }
        Ok(page)
    }

    fn get_document(&self, id: &Uuid) -> StorageResult<Option<FailedMessage>> {
        let cf = self.cf(CF_DOCUMENTS)?;
        match self.db.get_cf(&cf, id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn write_batch(&self, ops: Vec<WriteBatchOp>) -> StorageResult<()> {
        let documents = self.cf(CF_DOCUMENTS)?;
        let summaries = self.cf(CF_SUMMARIES)?;

        let mut batch = WriteBatch::default();
        for op in ops {
            match op {
                WriteBatchOp::PutDocument { document } => {
                    let key = document.document_id();
                    let summary = FailedMessageSummary::from(&document);
                    batch.put_cf(&documents, key.as_bytes(), serde_json::to_vec(&document)?);
                    batch.put_cf(&summaries, key.as_bytes(), serde_json::to_vec(&summary)?);
                }
                WriteBatchOp::DeleteDocument { id } => {
                    batch.delete_cf(&documents, id.as_bytes());
                    batch.delete_cf(&summaries, id.as_bytes());
                }
            }
        }
        self.db.write(batch)?;
        Ok(())
    }
}
