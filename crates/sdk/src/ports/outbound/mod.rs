//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters and the
//! host application implement, so the consent client and controller never
//! depend on concrete implementations.

pub mod connectivity;
pub mod consent_api_port;
pub mod delegates;
pub mod http_transport;
pub mod presenter;
pub mod storage;

pub use connectivity::ConnectivityProvider;
pub use consent_api_port::{ConsentApiPort, ConsentError};
pub use delegates::{ConsentErrorDelegate, ConsentReadyDelegate, ConsentUiDelegate};
pub use http_transport::{HttpTransport, TransportError};
pub use presenter::{ConsentPresenter, PresentationRequest};
pub use storage::{storage_keys, StorageProvider};

#[cfg(any(test, feature = "testing"))]
pub use consent_api_port::MockConsentApiPort;
