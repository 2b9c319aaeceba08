use std::rc::Rc;

use crate::{settings::VariableSettings, types::ClientId};

/// Caller-supplied check used by `ReplicationPermission::Custom`
pub type PermissionPredicate = Rc<dyn Fn(ClientId) -> bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplicationPermission {
    /// Any client
    Everyone,
    /// Only the replication authority. Never true for a remote client.
    AuthorityOnly,
    /// Only the client owning the host entity
    OwnerOnly,
    /// Delegates to a predicate; fails closed when none is configured
    Custom,
}

/// Whether `requester` may write to a container whose host is owned by `owner`
pub fn can_write(settings: &VariableSettings, requester: ClientId, owner: ClientId) -> bool {
    evaluate(
        settings.write_permission,
        settings.write_predicate.as_ref(),
        requester,
        owner,
    )
}

/// Whether `requester` may receive a container whose host is owned by `owner`
pub fn can_read(settings: &VariableSettings, requester: ClientId, owner: ClientId) -> bool {
    evaluate(
        settings.read_permission,
        settings.read_predicate.as_ref(),
        requester,
        owner,
    )
}

fn evaluate(
    permission: ReplicationPermission,
    predicate: Option<&PermissionPredicate>,
    requester: ClientId,
    owner: ClientId,
) -> bool {
    match permission {
        ReplicationPermission::Everyone => true,
        ReplicationPermission::AuthorityOnly => false,
        ReplicationPermission::OwnerOnly => requester == owner,
        ReplicationPermission::Custom => predicate.is_some_and(|predicate| predicate(requester)),
    }
}
