use std::{
    collections::{hash_set, HashSet},
    hash::Hash,
    marker::PhantomData,
};

use log::trace;

use netcoll_serde::{BitReader, BitWrite, Serde};

use crate::{
    collections::replicated::{CollectionOps, Replicated},
    error::ReplicationError,
};

const KIND: &str = "ReplicatedSet";

const ADD: u8 = 0;
const REMOVE: u8 = 1;
const CLEAR: u8 = 2;

/// A change to a `ReplicatedSet`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetEvent<T> {
    Add { value: T },
    Remove { value: T },
    Clear,
}

pub struct SetOps<T>(PhantomData<T>);

/// An unordered set replicated from the authority to its readers.
///
/// Bulk operations like `union_with` are decomposed into one `Add` or
/// `Remove` per affected element; there are no bulk events on the wire.
pub type ReplicatedSet<T> = Replicated<SetOps<T>>;

impl<T: Serde + Eq + Hash> CollectionOps for SetOps<T> {
    type Snapshot = HashSet<T>;
    type Event = SetEvent<T>;

    const KIND: &'static str = KIND;
    const TAG_BITS: u8 = 2;

    fn len(snapshot: &HashSet<T>) -> usize {
        snapshot.len()
    }

    fn tag(event: &SetEvent<T>) -> u8 {
        match event {
            SetEvent::Add { .. } => ADD,
            SetEvent::Remove { .. } => REMOVE,
            SetEvent::Clear => CLEAR,
        }
    }

    fn write_event(event: &SetEvent<T>, writer: &mut dyn BitWrite) -> Result<(), ReplicationError> {
        match event {
            SetEvent::Add { value } | SetEvent::Remove { value } => value.ser(writer),
            SetEvent::Clear => {}
        }
        Ok(())
    }

    fn read_event(
        tag: u8,
        reader: &mut BitReader,
        snapshot: &HashSet<T>,
    ) -> Result<Option<SetEvent<T>>, ReplicationError> {
        match tag {
            ADD => {
                let value = T::de(reader)?;
                if snapshot.contains(&value) {
                    trace!("ReplicatedSet received Add for a value it already holds");
                    return Ok(None);
                }
                Ok(Some(SetEvent::Add { value }))
            }
            REMOVE => {
                let value = T::de(reader)?;
                if !snapshot.contains(&value) {
                    trace!("ReplicatedSet received Remove for a value it doesn't hold");
                    return Ok(None);
                }
                Ok(Some(SetEvent::Remove { value }))
            }
            CLEAR => Ok(Some(SetEvent::Clear)),
            tag => Err(ReplicationError::UnknownEventTag { kind: KIND, tag }),
        }
    }

    fn apply(snapshot: &mut HashSet<T>, event: &SetEvent<T>) {
        match event {
            SetEvent::Add { value } => {
                snapshot.insert(value.clone());
            }
            SetEvent::Remove { value } => {
                snapshot.remove(value);
            }
            SetEvent::Clear => snapshot.clear(),
        }
    }

    fn write_snapshot(snapshot: &HashSet<T>, writer: &mut dyn BitWrite) {
        for value in snapshot {
            value.ser(writer);
        }
    }

    fn read_snapshot(reader: &mut BitReader, count: usize) -> Result<HashSet<T>, ReplicationError> {
        let mut output = HashSet::with_capacity(count);
        for _ in 0..count {
            output.insert(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<T: Serde + Eq + Hash> Replicated<SetOps<T>> {
    /// Adds `value`. Returns false, recording nothing, if it was already present.
    pub fn insert(&mut self, value: T) -> Result<bool, ReplicationError> {
        let context = self.begin_mutation("insert")?;
        if self.snapshot().contains(&value) {
            return Ok(false);
        }
        self.commit(context, SetEvent::Add { value });
        Ok(true)
    }

    /// Removes `value`. Returns false, recording nothing, if it was absent.
    pub fn remove(&mut self, value: &T) -> Result<bool, ReplicationError> {
        let context = self.begin_mutation("remove")?;
        if !self.snapshot().contains(value) {
            return Ok(false);
        }
        self.commit(
            context,
            SetEvent::Remove {
                value: value.clone(),
            },
        );
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("clear")?;
        self.commit(context, SetEvent::Clear);
        Ok(())
    }

    /// Adds every element of `other` not already present
    pub fn union_with(&mut self, other: impl IntoIterator<Item = T>) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("union_with")?;
        for value in distinct(other) {
            if !self.snapshot().contains(&value) {
                self.commit(context, SetEvent::Add { value });
            }
        }
        Ok(())
    }

    /// Removes every element not also in `other`
    pub fn intersect_with(&mut self, other: impl IntoIterator<Item = T>) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("intersect_with")?;
        let other = distinct(other);
        let removed: Vec<T> = self
            .snapshot()
            .iter()
            .filter(|value| !other.contains(*value))
            .cloned()
            .collect();
        for value in removed {
            self.commit(context, SetEvent::Remove { value });
        }
        Ok(())
    }

    /// Removes every element of `other`
    pub fn except_with(&mut self, other: impl IntoIterator<Item = T>) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("except_with")?;
        for value in distinct(other) {
            if self.snapshot().contains(&value) {
                self.commit(context, SetEvent::Remove { value });
            }
        }
        Ok(())
    }

    /// Keeps only the elements present in exactly one of `self` and `other`
    pub fn symmetric_except_with(
        &mut self,
        other: impl IntoIterator<Item = T>,
    ) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("symmetric_except_with")?;
        for value in distinct(other) {
            let event = if self.snapshot().contains(&value) {
                SetEvent::Remove { value }
            } else {
                SetEvent::Add { value }
            };
            self.commit(context, event);
        }
        Ok(())
    }

    // Queries

    pub fn contains(&self, value: &T) -> bool {
        self.snapshot().contains(value)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, T> {
        self.snapshot().iter()
    }

    pub fn is_subset_of(&self, other: &HashSet<T>) -> bool {
        self.snapshot().is_subset(other)
    }

    pub fn is_superset_of(&self, other: &HashSet<T>) -> bool {
        self.snapshot().is_superset(other)
    }

    pub fn is_proper_subset_of(&self, other: &HashSet<T>) -> bool {
        self.len() < other.len() && self.is_subset_of(other)
    }

    pub fn is_proper_superset_of(&self, other: &HashSet<T>) -> bool {
        self.len() > other.len() && self.is_superset_of(other)
    }

    pub fn overlaps(&self, other: &HashSet<T>) -> bool {
        !self.snapshot().is_disjoint(other)
    }

    pub fn set_equals(&self, other: &HashSet<T>) -> bool {
        self.snapshot() == other
    }
}

impl<'a, T: Serde + Eq + Hash> IntoIterator for &'a Replicated<SetOps<T>> {
    type Item = &'a T;
    type IntoIter = hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Collapses duplicates so a non-authority mirror, which doesn't apply its own
// writes, still emits at most one event per element.
fn distinct<T: Eq + Hash>(values: impl IntoIterator<Item = T>) -> HashSet<T> {
    values.into_iter().collect()
}
