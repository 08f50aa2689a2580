use std::ops::{Deref, DerefMut};

use super::History;

/// Sets the history's tracking flag for a scope and restores the previous
/// value when dropped, including on early return and unwinding.
///
/// The guard borrows the history mutably and dereferences to it, so work done
/// inside the scope goes through the guard.
pub struct TrackGuard<'a> {
    history: &'a mut History,
    previous: bool,
}

impl<'a> TrackGuard<'a> {
    pub fn new(history: &'a mut History, enabled: bool) -> Self {
        let previous = history.is_tracking_enabled();
        history.set_tracking_enabled(enabled);
        Self { history, previous }
    }

    /// Tracking state that will be restored on drop
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl Deref for TrackGuard<'_> {
    type Target = History;

    fn deref(&self) -> &History {
        self.history
    }
}

impl DerefMut for TrackGuard<'_> {
    fn deref_mut(&mut self) -> &mut History {
        self.history
    }
}

impl Drop for TrackGuard<'_> {
    fn drop(&mut self) {
        self.history.set_tracking_enabled(self.previous);
    }
}
