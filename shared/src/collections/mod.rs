mod dictionary;
mod list;
mod listeners;
mod replicated;
mod set;

pub use dictionary::{DictionaryEvent, DictionaryOps, ReplicatedDictionary};
pub use list::{ListEvent, ListOps, ReplicatedList};
pub use listeners::{ChangeListeners, ListenerKey};
pub use replicated::{CollectionOps, Replicated, MAX_ENCODED_COUNT};
pub use set::{ReplicatedSet, SetEvent, SetOps};
