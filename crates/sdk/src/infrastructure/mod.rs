//! Infrastructure adapters for the outbound ports

pub mod connectivity;
pub mod http_client;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use connectivity::{AlwaysReachable, ManualReachability};
pub use http_client::ReqwestTransport;
pub use storage::{FileStorageProvider, InMemoryStorageProvider};
