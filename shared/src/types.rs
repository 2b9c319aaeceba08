/// Identifies a connected peer. The server always uses `SERVER_CLIENT_ID`.
pub type ClientId = u64;

/// Seconds of network time, as reported by the host's tick system
pub type NetworkTime = f64;

pub const SERVER_CLIENT_ID: ClientId = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}
