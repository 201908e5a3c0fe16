pub mod kv;
pub mod session;
pub mod snapshot;

pub use kv::{DiskStore, KeyValueStore, MemoryStore};
pub use session::Session;
pub use snapshot::{load_snapshot, save_snapshot, SnapshotFile};
