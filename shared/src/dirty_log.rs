use crate::types::NetworkTime;

/// Ordered, append-only record of change events waiting to be flushed.
///
/// Events are never edited once pushed; the log only grows until it is
/// cleared wholesale after a flush.
pub struct DirtyLog<E> {
    events: Vec<E>,
    last_synced_time: NetworkTime,
}

impl<E> DirtyLog<E> {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            last_synced_time: 0.0,
        }
    }

    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Clears the log and restarts the send-rate throttle at `now`
    pub fn reset(&mut self, now: NetworkTime) {
        self.clear();
        self.last_synced_time = now;
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_synced_time(&self) -> NetworkTime {
        self.last_synced_time
    }

    /// True if there are pending events and the send rate allows a flush at `now`
    pub fn is_dirty(&self, send_rate: f32, now: NetworkTime) -> bool {
        if self.events.is_empty() {
            return false;
        }
        if send_rate == 0.0 {
            return true;
        }
        if send_rate < 0.0 {
            return false;
        }
        now - self.last_synced_time >= 1.0 / send_rate as f64
    }
}

impl<E> Default for DirtyLog<E> {
    fn default() -> Self {
        Self::new()
    }
}
