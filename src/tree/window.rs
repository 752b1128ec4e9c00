/*!
 * Seen-Timestamp Window
 *
 * Bounded, sorted history of the most recent distinct event timestamps.
 * Rejects redelivered events and tells the tree when a pending removal has
 * aged out.
 */

use crate::core::types::Timestamp;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub(crate) struct SeenWindow {
    /// Ascending, distinct
    timestamps: VecDeque<Timestamp>,
    capacity: usize,
}

impl SeenWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            timestamps: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record `timestamp`, returning whether it is novel
    ///
    /// A timestamp older than everything in a full window may or may not have
    /// been processed already; it is conservatively reported as seen.
    pub(crate) fn observe(&mut self, timestamp: Timestamp) -> bool {
        if self.is_full() && self.timestamps.front().is_some_and(|&oldest| timestamp < oldest) {
            return false;
        }

        match self.timestamps.binary_search(&timestamp) {
            Ok(_) => false,
            Err(index) => {
                self.timestamps.insert(index, timestamp);
                if self.timestamps.len() > self.capacity {
                    self.timestamps.pop_front();
                }
                true
            }
        }
    }

    /// Pending removals recorded strictly before this timestamp have aged out
    ///
    /// `None` until the window has filled, since fewer than `capacity` events
    /// have been seen.
    pub(crate) fn cutoff(&self) -> Option<Timestamp> {
        if self.is_full() {
            self.timestamps.front().copied()
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.timestamps.len() >= self.capacity
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_rejected() {
        let mut window = SeenWindow::new(4);
        assert!(window.observe(10));
        assert!(!window.observe(10));
        assert!(window.observe(11));
        assert!(!window.observe(10));
    }

    #[test]
    fn test_out_of_order_within_window() {
        let mut window = SeenWindow::new(4);
        assert!(window.observe(10));
        assert!(window.observe(12));
        assert!(window.observe(11));
        assert!(!window.observe(12));
        assert_eq!(window.timestamps, VecDeque::from([10, 11, 12]));
    }

    #[test]
    fn test_oldest_evicted_when_full() {
        let mut window = SeenWindow::new(3);
        for ts in 1..=3 {
            assert!(window.observe(ts));
        }
        assert_eq!(window.cutoff(), Some(1));

        assert!(window.observe(4));
        assert_eq!(window.cutoff(), Some(2));
        assert_eq!(window.timestamps.len(), 3);
    }

    #[test]
    fn test_too_old_is_treated_as_seen() {
        let mut window = SeenWindow::new(2);
        assert!(window.observe(5));
        assert!(window.observe(6));
        assert!(!window.observe(1));
    }

    #[test]
    fn test_no_cutoff_until_full() {
        let mut window = SeenWindow::new(3);
        window.observe(1);
        window.observe(2);
        assert_eq!(window.cutoff(), None);
        window.observe(3);
        assert_eq!(window.cutoff(), Some(1));
    }
}
