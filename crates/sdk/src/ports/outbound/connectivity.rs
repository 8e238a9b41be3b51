/// Answers whether the network is currently reachable.
///
/// Consulted before every request; a `false` answer fails the request
/// without touching the transport.
pub trait ConnectivityProvider: Send + Sync {
    fn is_connected_to_network(&self) -> bool;
}
