mod rocksdb;
mod traits;

pub use rocksdb::RocksDbStore;
pub use traits::{MessageStore, WriteBatchOp};
