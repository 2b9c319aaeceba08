/// Handle returned by `on_change`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerKey(u32);

/// Callbacks run synchronously, in registration order, for every applied change
pub struct ChangeListeners<E> {
    next_key: u32,
    listeners: Vec<(ListenerKey, Box<dyn FnMut(&E)>)>,
}

impl<E> ChangeListeners<E> {
    pub fn new() -> Self {
        Self {
            next_key: 0,
            listeners: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: Box<dyn FnMut(&E)>) -> ListenerKey {
        let key = ListenerKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        self.listeners.push((key, listener));
        key
    }

    pub fn remove(&mut self, key: ListenerKey) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_key, _)| *listener_key != key);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for ChangeListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}
