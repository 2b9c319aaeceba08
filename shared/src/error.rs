use thiserror::Error;

use netcoll_serde::SerdeErr;

use crate::types::ClientId;

/// Errors that can occur while mutating, encoding or decoding a replicated container
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// A mutator was called before the container was bound to a host
    #[error("{kind} must be bound with set_host() before calling {operation}()")]
    NotInitialized {
        kind: &'static str,
        operation: &'static str,
    },

    /// The host the container was bound to no longer exists
    #[error("The host entity of this {kind} has been dropped")]
    HostDropped { kind: &'static str },

    /// set_host() was called a second time
    #[error("{kind} is already bound to a host. set_host() may only be called once")]
    AlreadyBound { kind: &'static str },

    /// A non-authority process attempted a write its settings don't allow
    #[error("Client {client} may not call {operation}() on {kind}. Check the write_permission in VariableSettings")]
    PermissionDenied {
        kind: &'static str,
        client: ClientId,
        operation: &'static str,
    },

    /// An index-addressed operation was given an index past the end
    #[error("Index {index} is out of range for {kind} of length {len}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// A strict add targeted a key that is already present
    #[error("Key is already present in {kind}. Use set() to overwrite an existing entry")]
    KeyAlreadyExists { kind: &'static str },

    /// A strict removal targeted a key that is not present
    #[error("Key is not present in {kind}")]
    KeyNotFound { kind: &'static str },

    /// A delta carried an event tag this container doesn't know
    #[error("Unknown event tag {tag} in {kind} delta. The stream is corrupt or was written by an incompatible version")]
    UnknownEventTag { kind: &'static str, tag: u8 },

    /// A decoded event can't be applied to the local mirror
    #[error("{kind} delta doesn't match the local mirror: {reason}. Request a full snapshot to resynchronize")]
    Desync { kind: &'static str, reason: String },

    /// A snapshot or delta has more entries than its 16-bit count can describe
    #[error("{kind} has {count} entries to encode but at most {max} fit in one message")]
    CountOverflow {
        kind: &'static str,
        count: usize,
        max: usize,
    },

    /// A list index is too large for the signed 32-bit wire encoding
    #[error("Index {index} of {kind} can't be encoded, the largest index on the wire is {max}")]
    IndexOverflow {
        kind: &'static str,
        index: usize,
        max: usize,
    },

    /// A client sent a delta for a variable it may not write
    #[error("Client {client} wrote to variable {variable} without permission. No more variables can be read from this update")]
    ClientWriteDenied { client: ClientId, variable: usize },

    /// A length-prefixed variable payload didn't fit its 16-bit prefix
    #[error("Variable {variable} encoded to {bytes} bytes, more than the {max} a length prefix can describe")]
    VariableLengthOverflow {
        variable: usize,
        bytes: usize,
        max: usize,
    },

    /// The underlying bit stream could not be decoded
    #[error("Failed to decode replicated data: {0}")]
    Serde(#[from] SerdeErr),
}
