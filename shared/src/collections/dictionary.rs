use std::{hash::Hash, marker::PhantomData};

use indexmap::IndexMap;
use log::warn;

use netcoll_serde::{BitReader, BitWrite, Serde};

use crate::{
    collections::replicated::{CollectionOps, Replicated},
    error::ReplicationError,
    settings::AbsentKeyRemoval,
};

const KIND: &str = "ReplicatedDictionary";

const ADD: u8 = 0;
const REMOVE: u8 = 1;
const REMOVE_PAIR: u8 = 2;
const CLEAR: u8 = 3;
const SET_VALUE: u8 = 4;

/// A change to a `ReplicatedDictionary`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DictionaryEvent<K, V> {
    Add { key: K, value: V },
    /// `value` is what the key held, or `None` when it held nothing
    Remove { key: K, value: Option<V> },
    RemovePair { key: K, value: V },
    SetValue { key: K, value: V },
    Clear,
}

impl<K, V> DictionaryEvent<K, V> {
    pub fn key(&self) -> Option<&K> {
        match self {
            DictionaryEvent::Add { key, .. }
            | DictionaryEvent::Remove { key, .. }
            | DictionaryEvent::RemovePair { key, .. }
            | DictionaryEvent::SetValue { key, .. } => Some(key),
            DictionaryEvent::Clear => None,
        }
    }
}

pub struct DictionaryOps<K, V>(PhantomData<(K, V)>);

/// An insertion-ordered map replicated from the authority to its readers
pub type ReplicatedDictionary<K, V> = Replicated<DictionaryOps<K, V>>;

impl<K: Serde + Eq + Hash, V: Serde> CollectionOps for DictionaryOps<K, V> {
    type Snapshot = IndexMap<K, V>;
    type Event = DictionaryEvent<K, V>;

    const KIND: &'static str = KIND;
    const TAG_BITS: u8 = 3;

    fn len(snapshot: &IndexMap<K, V>) -> usize {
        snapshot.len()
    }

    fn tag(event: &DictionaryEvent<K, V>) -> u8 {
        match event {
            DictionaryEvent::Add { .. } => ADD,
            DictionaryEvent::Remove { .. } => REMOVE,
            DictionaryEvent::RemovePair { .. } => REMOVE_PAIR,
            DictionaryEvent::Clear => CLEAR,
            DictionaryEvent::SetValue { .. } => SET_VALUE,
        }
    }

    fn write_event(
        event: &DictionaryEvent<K, V>,
        writer: &mut dyn BitWrite,
    ) -> Result<(), ReplicationError> {
        match event {
            DictionaryEvent::Add { key, value }
            | DictionaryEvent::RemovePair { key, value }
            | DictionaryEvent::SetValue { key, value } => {
                key.ser(writer);
                value.ser(writer);
            }
            // receivers look the value up in their own mirror
            DictionaryEvent::Remove { key, .. } => key.ser(writer),
            DictionaryEvent::Clear => {}
        }
        Ok(())
    }

    fn read_event(
        tag: u8,
        reader: &mut BitReader,
        snapshot: &IndexMap<K, V>,
    ) -> Result<Option<DictionaryEvent<K, V>>, ReplicationError> {
        match tag {
            ADD => {
                let key = K::de(reader)?;
                let value = V::de(reader)?;
                if snapshot.contains_key(&key) {
                    return Err(ReplicationError::Desync {
                        kind: KIND,
                        reason: "add of a key the mirror already holds".to_string(),
                    });
                }
                Ok(Some(DictionaryEvent::Add { key, value }))
            }
            REMOVE => {
                let key = K::de(reader)?;
                match snapshot.get(&key) {
                    Some(value) => Ok(Some(DictionaryEvent::Remove {
                        value: Some(value.clone()),
                        key,
                    })),
                    None => {
                        warn!("ReplicatedDictionary received Remove for a key it doesn't hold, ignoring");
                        Ok(None)
                    }
                }
            }
            REMOVE_PAIR => {
                let key = K::de(reader)?;
                let value = V::de(reader)?;
                if snapshot.get(&key) != Some(&value) {
                    warn!("ReplicatedDictionary received RemovePair that doesn't match its mirror, ignoring");
                    return Ok(None);
                }
                Ok(Some(DictionaryEvent::RemovePair { key, value }))
            }
            CLEAR => Ok(Some(DictionaryEvent::Clear)),
            SET_VALUE => {
                let key = K::de(reader)?;
                let value = V::de(reader)?;
                Ok(Some(DictionaryEvent::SetValue { key, value }))
            }
            tag => Err(ReplicationError::UnknownEventTag { kind: KIND, tag }),
        }
    }

    fn apply(snapshot: &mut IndexMap<K, V>, event: &DictionaryEvent<K, V>) {
        match event {
            DictionaryEvent::Add { key, value } | DictionaryEvent::SetValue { key, value } => {
                snapshot.insert(key.clone(), value.clone());
            }
            DictionaryEvent::Remove { key, .. } | DictionaryEvent::RemovePair { key, .. } => {
                snapshot.shift_remove(key);
            }
            DictionaryEvent::Clear => snapshot.clear(),
        }
    }

    fn write_snapshot(snapshot: &IndexMap<K, V>, writer: &mut dyn BitWrite) {
        for (key, value) in snapshot {
            key.ser(writer);
            value.ser(writer);
        }
    }

    fn read_snapshot(
        reader: &mut BitReader,
        count: usize,
    ) -> Result<IndexMap<K, V>, ReplicationError> {
        let mut output = IndexMap::with_capacity(count);
        for _ in 0..count {
            let key = K::de(reader)?;
            let value = V::de(reader)?;
            if output.insert(key, value).is_some() {
                return Err(ReplicationError::Desync {
                    kind: KIND,
                    reason: "snapshot holds a duplicate key".to_string(),
                });
            }
        }
        Ok(output)
    }
}

impl<K: Serde + Eq + Hash, V: Serde> Replicated<DictionaryOps<K, V>> {
    /// Adds a new entry. Fails if `key` is already present.
    pub fn add(&mut self, key: K, value: V) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("add")?;
        if self.snapshot().contains_key(&key) {
            return Err(ReplicationError::KeyAlreadyExists { kind: KIND });
        }
        self.commit(context, DictionaryEvent::Add { key, value });
        Ok(())
    }

    /// Inserts or overwrites the entry for `key`, returning the previous value
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, ReplicationError> {
        let context = self.begin_mutation("set")?;
        let previous = self.snapshot().get(&key).cloned();
        self.commit(context, DictionaryEvent::SetValue { key, value });
        Ok(previous)
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// What happens when `key` is absent depends on the container's
    /// `AbsentKeyRemoval` setting.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, ReplicationError> {
        let context = self.begin_mutation("remove")?;
        let value = self.snapshot().get(key).cloned();

        if value.is_none() {
            match self.settings().absent_key_removal {
                AbsentKeyRemoval::Emit => {}
                AbsentKeyRemoval::Strict => {
                    return Err(ReplicationError::KeyNotFound { kind: KIND });
                }
                AbsentKeyRemoval::Ignore => return Ok(None),
            }
        }

        self.commit(
            context,
            DictionaryEvent::Remove {
                key: key.clone(),
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Removes the entry only if `key` currently maps to `value`
    pub fn remove_pair(&mut self, key: &K, value: &V) -> Result<bool, ReplicationError> {
        let context = self.begin_mutation("remove_pair")?;
        if self.snapshot().get(key) != Some(value) {
            return Ok(false);
        }
        self.commit(
            context,
            DictionaryEvent::RemovePair {
                key: key.clone(),
                value: value.clone(),
            },
        );
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("clear")?;
        self.commit(context, DictionaryEvent::Clear);
        Ok(())
    }

    // Queries

    pub fn get(&self, key: &K) -> Option<&V> {
        self.snapshot().get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.snapshot().contains_key(key)
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.snapshot().keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.snapshot().values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.snapshot().iter()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl<'a, K: Serde + Eq + Hash, V: Serde> IntoIterator for &'a Replicated<DictionaryOps<K, V>> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
