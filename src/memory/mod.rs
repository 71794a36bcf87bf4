//! 记忆层：会话时间线、持久化槽位、保鲜期持久化、归档与后台写入

pub mod archive;
pub mod async_io;
pub mod conversation;
pub mod persistence;
pub mod slots;
pub mod writer;

pub use archive::{ArchiveEntry, ArchiveStore, ArchiveSummary, DEFAULT_ARCHIVE_CAPACITY};
pub use async_io::FileSlotStore;
pub use conversation::{Message, Role, Timeline, CONNECTION_ERROR_TEXT, GREETING};
pub use persistence::{TimelinePersistence, DEFAULT_TTL};
pub use slots::{
    MemorySlotStore, SlotStore, ARCHIVE_SLOT, INTENT_SLOT, SAVED_AT_SLOT, TIMELINE_SLOT,
};
pub use writer::{spawn_writer, PersistHandle, PersistJob};
