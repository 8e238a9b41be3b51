//! Storage adapters for [`StorageProvider`](crate::ports::outbound::StorageProvider)

mod file;
mod memory;

pub use file::FileStorageProvider;
pub use memory::InMemoryStorageProvider;
