use std::fmt;

use crate::permission::{PermissionPredicate, ReplicationPermission};

/// The channel a variable's updates are sent on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SendChannel {
    #[default]
    NetworkVariable,
    Reliable,
    Unreliable,
    Custom(u8),
}

/// What a `ReplicatedDictionary` does when asked to remove a key it doesn't hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AbsentKeyRemoval {
    /// Emit a `Remove` event with no value attached. Receivers treat it as a no-op.
    #[default]
    Emit,
    /// Fail with `ReplicationError::KeyNotFound`, emitting nothing
    Strict,
    /// Return `None`, emitting nothing
    Ignore,
}

/// Contains the replication settings of a single container
#[derive(Clone)]
pub struct VariableSettings {
    /// Who may mutate the container from a non-authority process
    pub write_permission: ReplicationPermission,
    /// Which clients receive the container's contents
    pub read_permission: ReplicationPermission,
    /// Sends per second. `0` sends on every tick, a negative rate never sends.
    pub send_rate: f32,
    pub channel: SendChannel,
    /// Consulted when `write_permission` is `Custom`
    pub write_predicate: Option<PermissionPredicate>,
    /// Consulted when `read_permission` is `Custom`
    pub read_predicate: Option<PermissionPredicate>,
    /// Only used by `ReplicatedDictionary`
    pub absent_key_removal: AbsentKeyRemoval,
}

impl Default for VariableSettings {
    fn default() -> Self {
        Self {
            write_permission: ReplicationPermission::AuthorityOnly,
            read_permission: ReplicationPermission::Everyone,
            send_rate: 0.0,
            channel: SendChannel::NetworkVariable,
            write_predicate: None,
            read_predicate: None,
            absent_key_removal: AbsentKeyRemoval::Emit,
        }
    }
}

impl fmt::Debug for VariableSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSettings")
            .field("write_permission", &self.write_permission)
            .field("read_permission", &self.read_permission)
            .field("send_rate", &self.send_rate)
            .field("channel", &self.channel)
            .field("write_predicate", &self.write_predicate.is_some())
            .field("read_predicate", &self.read_predicate.is_some())
            .field("absent_key_removal", &self.absent_key_removal)
            .finish()
    }
}
