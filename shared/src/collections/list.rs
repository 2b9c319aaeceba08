use std::{marker::PhantomData, ops::Index};

use log::warn;

use netcoll_serde::{read_i32_packed, write_i32_packed, BitReader, BitWrite, Serde};

use crate::{
    collections::replicated::{CollectionOps, Replicated},
    error::ReplicationError,
};

const KIND: &str = "ReplicatedList";

const ADD: u8 = 0;
const INSERT: u8 = 1;
const REMOVE: u8 = 2;
const REMOVE_AT: u8 = 3;
const SET_VALUE: u8 = 4;
const CLEAR: u8 = 5;

/// A change to a `ReplicatedList`. Indices are the positions the element held
/// (or ended up at) when the change was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListEvent<T> {
    Add { index: usize, value: T },
    Insert { index: usize, value: T },
    Remove { index: usize, value: T },
    RemoveAt { index: usize, value: T },
    SetValue { index: usize, value: T },
    Clear,
}

impl<T> ListEvent<T> {
    pub fn index(&self) -> Option<usize> {
        match self {
            ListEvent::Add { index, .. }
            | ListEvent::Insert { index, .. }
            | ListEvent::Remove { index, .. }
            | ListEvent::RemoveAt { index, .. }
            | ListEvent::SetValue { index, .. } => Some(*index),
            ListEvent::Clear => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ListEvent::Add { value, .. }
            | ListEvent::Insert { value, .. }
            | ListEvent::Remove { value, .. }
            | ListEvent::RemoveAt { value, .. }
            | ListEvent::SetValue { value, .. } => Some(value),
            ListEvent::Clear => None,
        }
    }
}

pub struct ListOps<T>(PhantomData<T>);

/// An ordered sequence replicated from the authority to its readers
pub type ReplicatedList<T> = Replicated<ListOps<T>>;

impl<T: Serde> CollectionOps for ListOps<T> {
    type Snapshot = Vec<T>;
    type Event = ListEvent<T>;

    const KIND: &'static str = KIND;
    const TAG_BITS: u8 = 3;

    fn len(snapshot: &Vec<T>) -> usize {
        snapshot.len()
    }

    fn tag(event: &ListEvent<T>) -> u8 {
        match event {
            ListEvent::Add { .. } => ADD,
            ListEvent::Insert { .. } => INSERT,
            ListEvent::Remove { .. } => REMOVE,
            ListEvent::RemoveAt { .. } => REMOVE_AT,
            ListEvent::SetValue { .. } => SET_VALUE,
            ListEvent::Clear => CLEAR,
        }
    }

    fn write_event(event: &ListEvent<T>, writer: &mut dyn BitWrite) -> Result<(), ReplicationError> {
        match event {
            // index is implicit: the receiver appends
            ListEvent::Add { value, .. } => value.ser(writer),
            ListEvent::Insert { index, value } | ListEvent::SetValue { index, value } => {
                write_index(writer, *index)?;
                value.ser(writer);
            }
            // the receiver finds the index itself
            ListEvent::Remove { value, .. } => value.ser(writer),
            ListEvent::RemoveAt { index, .. } => write_index(writer, *index)?,
            ListEvent::Clear => {}
        }
        Ok(())
    }

    fn read_event(
        tag: u8,
        reader: &mut BitReader,
        snapshot: &Vec<T>,
    ) -> Result<Option<ListEvent<T>>, ReplicationError> {
        let len = snapshot.len();
        match tag {
            ADD => {
                let value = T::de(reader)?;
                Ok(Some(ListEvent::Add { index: len, value }))
            }
            INSERT => {
                let index = read_index(reader)?;
                let value = T::de(reader)?;
                if index > len {
                    return Err(desync(format!("insert at {index} but length is {len}")));
                }
                Ok(Some(ListEvent::Insert { index, value }))
            }
            REMOVE => {
                let value = T::de(reader)?;
                match snapshot.iter().position(|item| *item == value) {
                    Some(index) => Ok(Some(ListEvent::Remove { index, value })),
                    None => {
                        warn!("ReplicatedList received Remove for a value it doesn't hold, ignoring");
                        Ok(None)
                    }
                }
            }
            REMOVE_AT => {
                let index = read_index(reader)?;
                let Some(value) = snapshot.get(index) else {
                    return Err(desync(format!("remove at {index} but length is {len}")));
                };
                Ok(Some(ListEvent::RemoveAt {
                    index,
                    value: value.clone(),
                }))
            }
            SET_VALUE => {
                let index = read_index(reader)?;
                let value = T::de(reader)?;
                if index >= len {
                    return Err(desync(format!("set at {index} but length is {len}")));
                }
                Ok(Some(ListEvent::SetValue { index, value }))
            }
            CLEAR => Ok(Some(ListEvent::Clear)),
            tag => Err(ReplicationError::UnknownEventTag { kind: KIND, tag }),
        }
    }

    fn apply(snapshot: &mut Vec<T>, event: &ListEvent<T>) {
        match event {
            ListEvent::Add { value, .. } => snapshot.push(value.clone()),
            ListEvent::Insert { index, value } => {
                if *index <= snapshot.len() {
                    snapshot.insert(*index, value.clone());
                }
            }
            ListEvent::Remove { index, .. } | ListEvent::RemoveAt { index, .. } => {
                if *index < snapshot.len() {
                    snapshot.remove(*index);
                }
            }
            ListEvent::SetValue { index, value } => {
                if let Some(slot) = snapshot.get_mut(*index) {
                    *slot = value.clone();
                }
            }
            ListEvent::Clear => snapshot.clear(),
        }
    }

    fn write_snapshot(snapshot: &Vec<T>, writer: &mut dyn BitWrite) {
        for item in snapshot {
            item.ser(writer);
        }
    }

    fn read_snapshot(reader: &mut BitReader, count: usize) -> Result<Vec<T>, ReplicationError> {
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

fn write_index(writer: &mut dyn BitWrite, index: usize) -> Result<(), ReplicationError> {
    let index = i32::try_from(index).map_err(|_| ReplicationError::IndexOverflow {
        kind: KIND,
        index,
        max: i32::MAX as usize,
    })?;
    write_i32_packed(writer, index);
    Ok(())
}

fn read_index(reader: &mut BitReader) -> Result<usize, ReplicationError> {
    let index = read_i32_packed(reader)?;
    usize::try_from(index).map_err(|_| desync(format!("negative index {index}")))
}

fn desync(reason: String) -> ReplicationError {
    ReplicationError::Desync {
        kind: KIND,
        reason,
    }
}

impl<T: Serde> Replicated<ListOps<T>> {
    /// Appends `value`
    pub fn push(&mut self, value: T) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("push")?;
        let index = self.snapshot().len();
        self.commit(context, ListEvent::Add { index, value });
        Ok(())
    }

    /// Inserts `value` at `index`, shifting later elements back.
    /// `index` may equal the length.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("insert")?;
        let len = self.snapshot().len();
        if index > len {
            return Err(out_of_range(index, len));
        }
        self.commit(context, ListEvent::Insert { index, value });
        Ok(())
    }

    /// Removes and returns the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T, ReplicationError> {
        let context = self.begin_mutation("remove_at")?;
        let len = self.snapshot().len();
        let Some(value) = self.snapshot().get(index).cloned() else {
            return Err(out_of_range(index, len));
        };
        self.commit(
            context,
            ListEvent::RemoveAt {
                index,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Removes the first element equal to `value`. Returns false, and records
    /// nothing, when no element matches.
    pub fn remove(&mut self, value: &T) -> Result<bool, ReplicationError> {
        let context = self.begin_mutation("remove")?;
        let Some(index) = self.index_of(value) else {
            return Ok(false);
        };
        self.commit(
            context,
            ListEvent::Remove {
                index,
                value: value.clone(),
            },
        );
        Ok(true)
    }

    /// Overwrites the element at `index`
    pub fn set(&mut self, index: usize, value: T) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("set")?;
        let len = self.snapshot().len();
        if index >= len {
            return Err(out_of_range(index, len));
        }
        self.commit(context, ListEvent::SetValue { index, value });
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ReplicationError> {
        let context = self.begin_mutation("clear")?;
        self.commit(context, ListEvent::Clear);
        Ok(())
    }

    // Queries

    pub fn get(&self, index: usize) -> Option<&T> {
        self.snapshot().get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.snapshot().contains(value)
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.snapshot().iter().position(|item| item == value)
    }

    pub fn as_slice(&self) -> &[T] {
        self.snapshot()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.snapshot().iter()
    }
}

impl<T: Serde> Index<usize> for Replicated<ListOps<T>> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.snapshot()[index]
    }
}

impl<'a, T: Serde> IntoIterator for &'a Replicated<ListOps<T>> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn out_of_range(index: usize, len: usize) -> ReplicationError {
    ReplicationError::IndexOutOfRange {
        kind: KIND,
        index,
        len,
    }
}
