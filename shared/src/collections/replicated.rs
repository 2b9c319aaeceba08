use std::{fmt, rc::Rc};

use log::{debug, trace};

use netcoll_serde::{read_u16_packed, write_u16_packed, BitReader, BitWrite};

use crate::{
    collections::listeners::{ChangeListeners, ListenerKey},
    dirty_log::DirtyLog,
    error::ReplicationError,
    host::{HostBinding, ReplicaHost},
    permission,
    settings::VariableSettings,
    types::{ClientId, NetworkTime},
};

/// Largest number of entries a snapshot or delta can carry, bounded by its 16-bit count
pub const MAX_ENCODED_COUNT: usize = u16::MAX as usize;

/// The operation vocabulary of one container kind.
///
/// `Replicated` handles binding, permissions, dirty tracking and
/// notification; an implementation of this trait only describes what the
/// snapshot is, which events exist, how they travel on the wire, and how an
/// event changes the snapshot.
pub trait CollectionOps {
    type Snapshot: Default;
    type Event: Clone;

    /// Name used in errors and logs
    const KIND: &'static str;
    /// Width of the event tag on the wire
    const TAG_BITS: u8;

    fn len(snapshot: &Self::Snapshot) -> usize;

    fn tag(event: &Self::Event) -> u8;

    /// Writes the event payload that follows its tag
    fn write_event(event: &Self::Event, writer: &mut dyn BitWrite)
        -> Result<(), ReplicationError>;

    /// Reads the payload for `tag`, filling in whatever the wire leaves implicit
    /// from `snapshot`. Returns `None` when the event would change nothing.
    fn read_event(
        tag: u8,
        reader: &mut BitReader,
        snapshot: &Self::Snapshot,
    ) -> Result<Option<Self::Event>, ReplicationError>;

    /// Applies an event that was validated against `snapshot`
    fn apply(snapshot: &mut Self::Snapshot, event: &Self::Event);

    fn write_snapshot(snapshot: &Self::Snapshot, writer: &mut dyn BitWrite);

    fn read_snapshot(
        reader: &mut BitReader,
        count: usize,
    ) -> Result<Self::Snapshot, ReplicationError>;
}

/// What a mutator learned from the host before touching anything
#[derive(Clone, Copy)]
pub(crate) struct MutationContext {
    is_authority: bool,
    has_observers: bool,
}

/// A container whose mutations are recorded as events and replicated from the
/// authority to every reader.
pub struct Replicated<C: CollectionOps> {
    snapshot: C::Snapshot,
    dirty_log: DirtyLog<C::Event>,
    settings: VariableSettings,
    binding: HostBinding,
    listeners: ChangeListeners<C::Event>,
}

impl<C: CollectionOps> Replicated<C> {
    pub fn new() -> Self {
        Self::with_settings_and_value(VariableSettings::default(), C::Snapshot::default())
    }

    pub fn with_settings(settings: VariableSettings) -> Self {
        Self::with_settings_and_value(settings, C::Snapshot::default())
    }

    pub fn with_value(value: C::Snapshot) -> Self {
        Self::with_settings_and_value(VariableSettings::default(), value)
    }

    pub fn with_settings_and_value(settings: VariableSettings, value: C::Snapshot) -> Self {
        Self {
            snapshot: value,
            dirty_log: DirtyLog::new(),
            settings,
            binding: HostBinding::new(C::KIND),
            listeners: ChangeListeners::new(),
        }
    }

    /// Binds the container to the entity hosting it. Must happen exactly once,
    /// before any mutation.
    pub fn set_host<H: ReplicaHost + 'static>(&mut self, host: &Rc<H>) -> Result<(), ReplicationError> {
        let host: Rc<dyn ReplicaHost> = host.clone();
        self.binding.bind(Rc::downgrade(&host))
    }

    pub fn binding(&self) -> &HostBinding {
        &self.binding
    }

    pub fn settings(&self) -> &VariableSettings {
        &self.settings
    }

    /// Registers a callback run for every change applied here, local or remote
    pub fn on_change(&mut self, listener: impl FnMut(&C::Event) + 'static) -> ListenerKey {
        self.listeners.add(Box::new(listener))
    }

    pub fn remove_listener(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key)
    }

    // Dirty tracking

    pub fn dirty_events(&self) -> &[C::Event] {
        self.dirty_log.events()
    }

    pub fn last_synced_time(&self) -> NetworkTime {
        self.dirty_log.last_synced_time()
    }

    pub fn is_dirty(&self, now: NetworkTime) -> bool {
        self.dirty_log.is_dirty(self.settings.send_rate, now)
    }

    /// Drops every pending event; call once after the delta has been sent
    pub fn reset_dirty(&mut self, now: NetworkTime) {
        self.dirty_log.reset(now);
    }

    // Permissions

    pub fn can_client_read(&self, client: ClientId) -> bool {
        match self.binding.owner_id() {
            Ok(owner) => permission::can_read(&self.settings, client, owner),
            Err(_) => false,
        }
    }

    pub fn can_client_write(&self, client: ClientId) -> bool {
        match self.binding.owner_id() {
            Ok(owner) => permission::can_write(&self.settings, client, owner),
            Err(_) => false,
        }
    }

    // Serialization / deserialization

    /// Writes the whole snapshot, for readers that have nothing yet
    pub fn write_field(&self, writer: &mut dyn BitWrite) -> Result<(), ReplicationError> {
        let count = encoded_count(C::KIND, C::len(&self.snapshot))?;
        write_u16_packed(writer, count);
        C::write_snapshot(&self.snapshot, writer);
        Ok(())
    }

    /// Replaces the snapshot with one written by `write_field`
    pub fn read_field(&mut self, reader: &mut BitReader) -> Result<(), ReplicationError> {
        let count = read_u16_packed(reader)? as usize;
        self.snapshot = C::read_snapshot(reader, count)?;
        debug!("{} read full snapshot of {} entries", C::KIND, count);
        Ok(())
    }

    /// Writes every pending event, in the order they happened
    pub fn write_delta(&self, writer: &mut dyn BitWrite) -> Result<(), ReplicationError> {
        let events = self.dirty_log.events();
        let count = encoded_count(C::KIND, events.len())?;
        write_u16_packed(writer, count);
        for event in events {
            writer.write_bits(C::tag(event) as u32, C::TAG_BITS);
            C::write_event(event, writer)?;
        }
        trace!("{} wrote delta of {} events", C::KIND, count);
        Ok(())
    }

    /// Replays a delta written by `write_delta`, in order, notifying listeners
    /// for each applied event. With `keep_dirty`, replayed events are queued to
    /// be forwarded again. Returns how many events changed the snapshot.
    ///
    /// An error stops the replay; events before it stay applied.
    pub fn read_delta(
        &mut self,
        reader: &mut BitReader,
        keep_dirty: bool,
    ) -> Result<usize, ReplicationError> {
        let count = read_u16_packed(reader)?;
        let mut applied = 0;

        for _ in 0..count {
            let tag = reader.read_bits(C::TAG_BITS)? as u8;
            let Some(event) = C::read_event(tag, reader, &self.snapshot)? else {
                continue;
            };

            C::apply(&mut self.snapshot, &event);
            self.listeners.notify(&event);
            if keep_dirty {
                self.dirty_log.push(event);
            }
            applied += 1;
        }

        trace!("{} replayed {} of {} events", C::KIND, applied, count);
        Ok(applied)
    }

    // Mutation plumbing shared by every container kind

    pub(crate) fn snapshot(&self) -> &C::Snapshot {
        &self.snapshot
    }

    /// Resolves the host and, for non-authority processes, checks write permission
    pub(crate) fn begin_mutation(
        &self,
        operation: &'static str,
    ) -> Result<MutationContext, ReplicationError> {
        let host = self.binding.host(operation)?;

        if host.is_authority() {
            return Ok(MutationContext {
                is_authority: true,
                has_observers: host.has_observers(),
            });
        }

        let requester = host.local_client_id();
        if !permission::can_write(&self.settings, requester, host.owner_id()) {
            return Err(ReplicationError::PermissionDenied {
                kind: C::KIND,
                client: requester,
                operation,
            });
        }

        Ok(MutationContext {
            is_authority: false,
            has_observers: true,
        })
    }

    /// Applies (on the authority), queues and announces a validated event
    pub(crate) fn commit(&mut self, context: MutationContext, event: C::Event) {
        if context.is_authority {
            C::apply(&mut self.snapshot, &event);
        }
        if context.has_observers {
            self.dirty_log.push(event.clone());
        }
        self.listeners.notify(&event);
    }
}

impl<C: CollectionOps> Default for Replicated<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CollectionOps> fmt::Debug for Replicated<C>
where
    C::Snapshot: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(C::KIND)
            .field("snapshot", &self.snapshot)
            .field("dirty_events", &self.dirty_log.len())
            .field("bound", &self.binding.is_bound())
            .field("settings", &self.settings)
            .finish()
    }
}

fn encoded_count(kind: &'static str, count: usize) -> Result<u16, ReplicationError> {
    u16::try_from(count).map_err(|_| ReplicationError::CountOverflow {
        kind,
        count,
        max: MAX_ENCODED_COUNT,
    })
}
